//! Derived views over a parsed reading table: long form, per-unit totals,
//! group means, threshold counts and rankings.
//!
//! Everything here is a pure function of its input. Empty input gives
//! empty or missing results; only [`latest_available_slot`] reports
//! absence of data as an error, since its answer is displayed verbatim.

use crate::category::{classify, RainfallCategory};
use crate::error::RainfallError;
use crate::slots::{SlotSchedule, TimeSlot};
use crate::types::{GroupMean, RainfallTable, SlotSummary, TimeSlotReading, UnitTotal};
use crate::util::mean;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_TOP_N: usize = 10;

/// How units are grouped for [`group_means`].
#[derive(Debug, Clone, Copy)]
pub enum GroupBy<'a> {
    /// The unit's own parent (e.g. district).
    Parent,
    /// A coarser zone looked up from the unit's parent.
    Zone(&'a BTreeMap<String, String>),
}

impl GroupBy<'_> {
    fn key_for<'u>(&'u self, unit: &'u UnitTotal) -> Option<&'u str> {
        let parent = unit.parent_name.as_deref()?;
        match self {
            GroupBy::Parent => Some(parent),
            GroupBy::Zone(zones) => zones.get(parent).map(String::as_str),
        }
    }
}

/// All rows for one unit name, merged.
struct MergedUnit {
    unit_name: String,
    parent_name: Option<String>,
    // slot index -> (slot, summed value); only non-missing values land here
    slot_values: BTreeMap<usize, (TimeSlot, f64)>,
    explicit_totals: Vec<f64>,
}

fn merge_units(table: &RainfallTable) -> Vec<MergedUnit> {
    let mut order: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<MergedUnit> = Vec::new();
    for row in &table.rows {
        let name = row.unit_name.trim();
        let idx = *order.entry(name.to_string()).or_insert_with(|| {
            merged.push(MergedUnit {
                unit_name: name.to_string(),
                parent_name: None,
                slot_values: BTreeMap::new(),
                explicit_totals: Vec::new(),
            });
            merged.len() - 1
        });
        let unit = &mut merged[idx];
        if unit.parent_name.is_none() {
            unit.parent_name = row
                .parent_name
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string);
        }
        if let Some(total) = row.total_mm {
            unit.explicit_totals.push(total);
        }
        for (slot, value) in &row.slots {
            let Some(v) = value else { continue };
            unit.slot_values
                .entry(slot.index)
                .and_modify(|(_, sum)| *sum += v)
                .or_insert_with(|| (slot.clone(), *v));
        }
    }
    merged
}

fn sum_or_missing(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// Melt slot columns into one reading per (unit, slot) with a value.
///
/// Units keep their first-appearance order and slots are chronological.
/// Repeated (unit, slot) pairs are summed into a single reading.
pub fn to_long_form(table: &RainfallTable) -> Vec<TimeSlotReading> {
    merge_units(table)
        .into_iter()
        .flat_map(|unit| {
            let MergedUnit { unit_name, parent_name, slot_values, .. } = unit;
            slot_values.into_values().map(move |(slot, value_mm)| TimeSlotReading {
                unit_name: unit_name.clone(),
                parent_name: parent_name.clone(),
                slot,
                value_mm,
            })
        })
        .collect()
}

/// Total rainfall per unit, one entry per distinct unit name.
///
/// Uses the explicit total column when the table has one, otherwise the
/// sum of the unit's non-missing slot values. A unit with nothing to add
/// up has a missing total.
pub fn unit_totals(table: &RainfallTable) -> Vec<UnitTotal> {
    merge_units(table)
        .into_iter()
        .map(|unit| {
            let total_mm = if table.has_total_column {
                sum_or_missing(unit.explicit_totals.into_iter())
            } else {
                sum_or_missing(unit.slot_values.into_values().map(|(_, v)| v))
            };
            UnitTotal {
                unit_name: unit.unit_name,
                parent_name: unit.parent_name,
                total_mm,
                category: classify(total_mm),
            }
        })
        .collect()
}

/// Total for a single unit, matched on the trimmed name.
pub fn unit_total(table: &RainfallTable, unit_name: &str) -> Option<f64> {
    let wanted = unit_name.trim();
    unit_totals(table)
        .into_iter()
        .find(|u| u.unit_name == wanted)
        .and_then(|u| u.total_mm)
}

fn reporting_values<'a>(totals: impl IntoIterator<Item = &'a UnitTotal>) -> Vec<f64> {
    totals.into_iter().filter_map(|u| u.total_mm).collect()
}

/// Mean of all non-missing unit totals.
pub fn mean_total(totals: &[UnitTotal]) -> Option<f64> {
    mean(&reporting_values(totals))
}

/// Mean unit total per group, groups in first-appearance order.
///
/// Units whose group cannot be determined are left out. A group where no
/// member reported has a missing mean, classified as `NoRain`.
pub fn group_means(totals: &[UnitTotal], group_by: &GroupBy<'_>) -> Vec<GroupMean> {
    let mut order: Vec<&str> = Vec::new();
    let mut members: HashMap<&str, Vec<&UnitTotal>> = HashMap::new();
    for unit in totals {
        let Some(key) = group_by.key_for(unit) else { continue };
        members
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(unit);
    }
    order
        .into_iter()
        .map(|key| {
            let units = &members[key];
            let values = reporting_values(units.iter().copied());
            let mean_mm = mean(&values);
            GroupMean {
                group: key.to_string(),
                members: units.len(),
                reporting: values.len(),
                mean_mm,
                category: classify(mean_mm),
            }
        })
        .collect()
}

/// Number of units whose total is strictly greater than `threshold_mm`.
/// Missing totals never count.
pub fn count_above(totals: &[UnitTotal], threshold_mm: f64) -> usize {
    totals
        .iter()
        .filter(|u| u.total_mm.is_some_and(|v| v > threshold_mm))
        .count()
}

fn by_value_then_name(a: (f64, &str), b: (f64, &str)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1))
}

/// The `n` wettest units (default [`DEFAULT_TOP_N`]), largest first, ties
/// by name. Units without a total are not ranked at all.
pub fn top_n(totals: &[UnitTotal], n: Option<usize>) -> Vec<UnitTotal> {
    let mut ranked: Vec<&UnitTotal> = totals.iter().filter(|u| u.total_mm.is_some()).collect();
    ranked.sort_by(|a, b| {
        by_value_then_name(
            (a.total_mm.unwrap_or_default(), a.unit_name.as_str()),
            (b.total_mm.unwrap_or_default(), b.unit_name.as_str()),
        )
    });
    ranked
        .into_iter()
        .take(n.unwrap_or(DEFAULT_TOP_N))
        .cloned()
        .collect()
}

/// Group with the highest mean, ties by group name.
pub fn top_group(groups: &[GroupMean]) -> Option<&GroupMean> {
    groups
        .iter()
        .filter(|g| g.mean_mm.is_some())
        .min_by(|a, b| {
            by_value_then_name(
                (a.mean_mm.unwrap_or_default(), a.group.as_str()),
                (b.mean_mm.unwrap_or_default(), b.group.as_str()),
            )
        })
}

/// Chronologically last slot with at least one reading.
pub fn latest_available_slot(
    long_form: &[TimeSlotReading],
    schedule: &SlotSchedule,
) -> Result<TimeSlot, RainfallError> {
    schedule
        .slots()
        .into_iter()
        .rev()
        .find(|slot| long_form.iter().any(|r| r.slot.index == slot.index))
        .ok_or(RainfallError::NoDataAvailable)
}

/// Per-slot reporting count, mean and max, in schedule order.
pub fn slot_summaries(long_form: &[TimeSlotReading], schedule: &SlotSchedule) -> Vec<SlotSummary> {
    schedule
        .slots()
        .into_iter()
        .map(|slot| {
            let values: Vec<f64> = long_form
                .iter()
                .filter(|r| r.slot.index == slot.index)
                .map(|r| r.value_mm)
                .collect();
            SlotSummary {
                reporting: values.len(),
                mean_mm: mean(&values),
                max_mm: values.iter().copied().reduce(f64::max),
                slot,
            }
        })
        .collect()
}

/// How many units fall into each category, always all nine in order.
pub fn category_counts(totals: &[UnitTotal]) -> Vec<(RainfallCategory, usize)> {
    let mut counts = [0usize; 9];
    for unit in totals {
        counts[unit.category.index()] += 1;
    }
    RainfallCategory::ALL.into_iter().zip(counts).collect()
}
