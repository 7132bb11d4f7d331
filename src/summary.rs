use crate::aggregate::{count_above, mean_total, top_group, top_n};
use crate::category::{classify, RainfallCategory};
use crate::types::{GroupMean, UnitTotal};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitHighlight {
    pub unit_name: String,
    pub parent_name: Option<String>,
    pub total_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupHighlight {
    pub group: String,
    pub mean_mm: f64,
}

/// Headline figures for one reporting day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub state_avg_mm: Option<f64>,
    pub state_category: RainfallCategory,
    pub wettest_unit: Option<UnitHighlight>,
    pub wettest_group: Option<GroupHighlight>,
    pub units_above_avg: usize,
    pub reporting_units: usize,
    pub percent_above_avg: f64,
    pub latest_slot: Option<String>,
}

impl DailySummary {
    pub fn from_totals(
        totals: &[UnitTotal],
        groups: &[GroupMean],
        latest_slot: Option<String>,
    ) -> Self {
        let state_avg_mm = mean_total(totals);
        let reporting_units = totals.iter().filter(|u| u.total_mm.is_some()).count();
        let units_above_avg = state_avg_mm.map_or(0, |avg| count_above(totals, avg));
        let percent_above_avg = if reporting_units == 0 {
            0.0
        } else {
            units_above_avg as f64 / reporting_units as f64 * 100.0
        };
        let wettest_unit = top_n(totals, Some(1)).into_iter().next().and_then(|u| {
            Some(UnitHighlight {
                total_mm: u.total_mm?,
                unit_name: u.unit_name,
                parent_name: u.parent_name,
            })
        });
        let wettest_group = top_group(groups).and_then(|g| {
            Some(GroupHighlight {
                group: g.group.clone(),
                mean_mm: g.mean_mm?,
            })
        });
        DailySummary {
            state_avg_mm,
            state_category: classify(state_avg_mm),
            wettest_unit,
            wettest_group,
            units_above_avg,
            reporting_units,
            percent_above_avg,
            latest_slot,
        }
    }

    /// Label for the wettest unit tile, e.g. `"Surat (Surat)"`.
    pub fn wettest_unit_label(&self) -> Option<String> {
        self.wettest_unit.as_ref().map(|u| match &u.parent_name {
            Some(p) => format!("{} ({})", u.unit_name, p),
            None => u.unit_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{group_means, GroupBy};

    fn unit(name: &str, parent: &str, total: Option<f64>) -> UnitTotal {
        UnitTotal {
            unit_name: name.to_string(),
            parent_name: Some(parent.to_string()),
            total_mm: total,
            category: classify(total),
        }
    }

    #[test]
    fn summary_matches_tile_figures() {
        let totals = vec![
            unit("Bhuj", "Kutch", Some(2.0)),
            unit("Mandvi", "Kutch", Some(4.0)),
            unit("Vapi", "Valsad", Some(30.0)),
            unit("Pardi", "Valsad", None),
        ];
        let groups = group_means(&totals, &GroupBy::Parent);
        let s = DailySummary::from_totals(&totals, &groups, Some("04-06".into()));
        assert_eq!(s.state_avg_mm, Some(12.0));
        assert_eq!(s.state_category, RainfallCategory::Moderate);
        assert_eq!(s.reporting_units, 3);
        assert_eq!(s.units_above_avg, 1);
        assert!((s.percent_above_avg - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.wettest_unit_label().as_deref(), Some("Vapi (Valsad)"));
        assert_eq!(s.wettest_group.as_ref().map(|g| g.group.as_str()), Some("Valsad"));
        assert_eq!(s.latest_slot.as_deref(), Some("04-06"));
    }

    #[test]
    fn empty_day_has_no_highlights() {
        let s = DailySummary::from_totals(&[], &[], None);
        assert_eq!(s.state_avg_mm, None);
        assert_eq!(s.state_category, RainfallCategory::NoRain);
        assert_eq!(s.percent_above_avg, 0.0);
        assert!(s.wettest_unit.is_none());
        assert!(s.wettest_group.is_none());
    }
}
