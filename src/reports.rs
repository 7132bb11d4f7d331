use crate::aggregate::{category_counts, top_n};
use crate::category::legend;
use crate::types::{
    GroupMean, GroupMeanRow, LegendRow, RankingRow, SlotSummary, SlotSummaryRow, UnitTotal,
    UnitTotalRow,
};
use crate::util::format_mm;

fn parent_label(parent: &Option<String>) -> String {
    parent.clone().unwrap_or_else(|| "-".to_string())
}

/// Every unit with its total and category, in sheet order.
pub fn unit_total_report(totals: &[UnitTotal]) -> Vec<UnitTotalRow> {
    totals
        .iter()
        .map(|u| UnitTotalRow {
            unit: u.unit_name.clone(),
            parent: parent_label(&u.parent_name),
            total_mm: format_mm(u.total_mm),
            category: u.category.to_string(),
        })
        .collect()
}

/// Group means, wettest first. Groups without any reporting unit go last,
/// then by name.
pub fn group_mean_report(groups: &[GroupMean]) -> Vec<GroupMeanRow> {
    let mut sorted: Vec<&GroupMean> = groups.iter().collect();
    sorted.sort_by(|a, b| match (a.mean_mm, b.mean_mm) {
        (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.group.cmp(&b.group)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.group.cmp(&b.group),
    });
    sorted
        .into_iter()
        .map(|g| GroupMeanRow {
            group: g.group.clone(),
            units: g.members,
            reporting: g.reporting,
            mean_mm: format_mm(g.mean_mm),
            category: g.category.to_string(),
        })
        .collect()
}

pub fn ranking_report(totals: &[UnitTotal], n: usize) -> Vec<RankingRow> {
    top_n(totals, Some(n))
        .into_iter()
        .enumerate()
        .map(|(idx, u)| RankingRow {
            rank: idx + 1,
            parent: parent_label(&u.parent_name),
            total_mm: format_mm(u.total_mm),
            category: u.category.to_string(),
            unit: u.unit_name,
        })
        .collect()
}

pub fn slot_report(summaries: &[SlotSummary]) -> Vec<SlotSummaryRow> {
    summaries
        .iter()
        .map(|s| SlotSummaryRow {
            slot: s.slot.label.clone(),
            reporting: s.reporting,
            mean_mm: format_mm(s.mean_mm),
            max_mm: format_mm(s.max_mm),
        })
        .collect()
}

/// Category legend with the number of units currently in each bucket.
pub fn legend_report(totals: &[UnitTotal]) -> Vec<LegendRow> {
    legend()
        .into_iter()
        .zip(category_counts(totals))
        .map(|(entry, (_, units))| LegendRow {
            category: entry.label.to_string(),
            range: entry.range,
            color: entry.color.to_string(),
            units,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{classify, RainfallCategory};

    fn unit(name: &str, total: Option<f64>) -> UnitTotal {
        UnitTotal {
            unit_name: name.to_string(),
            parent_name: None,
            total_mm: total,
            category: classify(total),
        }
    }

    #[test]
    fn ranking_is_numbered_from_one() {
        let totals = vec![unit("A", Some(1.0)), unit("B", Some(70.0)), unit("C", None)];
        let rows = ranking_report(&totals, 5);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].unit, "B");
        assert_eq!(rows[0].total_mm, "70.0");
        assert_eq!(rows[0].category, "Heavy");
        assert_eq!(rows[1].parent, "-");
    }

    #[test]
    fn unit_rows_keep_missing_visible() {
        let rows = unit_total_report(&[unit("C", None)]);
        assert_eq!(rows[0].total_mm, "-");
        assert_eq!(rows[0].category, "No Rain");
    }

    #[test]
    fn groups_without_data_sort_last() {
        let g = |name: &str, mean: Option<f64>| GroupMean {
            group: name.to_string(),
            members: 1,
            reporting: usize::from(mean.is_some()),
            mean_mm: mean,
            category: classify(mean),
        };
        let rows = group_mean_report(&[g("A", None), g("B", Some(3.0)), g("C", Some(40.0))]);
        let names: Vec<&str> = rows.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn legend_counts_units_per_category() {
        let rows = legend_report(&[unit("A", Some(1.0)), unit("B", Some(2.0)), unit("C", None)]);
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[RainfallCategory::VeryLight.index()].units, 2);
        assert_eq!(rows[RainfallCategory::NoRain.index()].units, 1);
        assert_eq!(rows[0].category, "No Rain");
    }
}
