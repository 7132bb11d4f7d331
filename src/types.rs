use crate::category::RainfallCategory;
use crate::slots::TimeSlot;
use serde::Serialize;
use tabled::Tabled;

/// One source row after parsing: a unit, its parent, an optional explicit
/// total and the values of every recognised slot column in header order.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRow {
    pub unit_name: String,
    pub parent_name: Option<String>,
    pub total_mm: Option<f64>,
    pub slots: Vec<(TimeSlot, Option<f64>)>,
}

/// A parsed reading table. `has_total_column` records whether the source
/// carried an explicit total; when it did, `UnitRow::total_mm` is used as
/// the unit total instead of summing slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RainfallTable {
    pub has_total_column: bool,
    pub rows: Vec<UnitRow>,
}

impl RainfallTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_slot_columns(&self) -> bool {
        self.rows.iter().any(|r| !r.slots.is_empty())
    }
}

/// A single non-missing reading in long form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSlotReading {
    pub unit_name: String,
    pub parent_name: Option<String>,
    pub slot: TimeSlot,
    pub value_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitTotal {
    pub unit_name: String,
    pub parent_name: Option<String>,
    pub total_mm: Option<f64>,
    pub category: RainfallCategory,
}

/// Mean of unit totals across one group (district, zone). `mean_mm` is
/// `None` when no member reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub group: String,
    pub members: usize,
    pub reporting: usize,
    pub mean_mm: Option<f64>,
    pub category: RainfallCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSummary {
    pub slot: TimeSlot,
    pub reporting: usize,
    pub mean_mm: Option<f64>,
    pub max_mm: Option<f64>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct UnitTotalRow {
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Parent")]
    #[tabled(rename = "Parent")]
    pub parent: String,
    #[serde(rename = "TotalMm")]
    #[tabled(rename = "TotalMm")]
    pub total_mm: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct GroupMeanRow {
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub group: String,
    #[serde(rename = "Units")]
    #[tabled(rename = "Units")]
    pub units: usize,
    #[serde(rename = "Reporting")]
    #[tabled(rename = "Reporting")]
    pub reporting: usize,
    #[serde(rename = "MeanMm")]
    #[tabled(rename = "MeanMm")]
    pub mean_mm: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Parent")]
    #[tabled(rename = "Parent")]
    pub parent: String,
    #[serde(rename = "TotalMm")]
    #[tabled(rename = "TotalMm")]
    pub total_mm: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SlotSummaryRow {
    #[serde(rename = "Slot")]
    #[tabled(rename = "Slot")]
    pub slot: String,
    #[serde(rename = "Reporting")]
    #[tabled(rename = "Reporting")]
    pub reporting: usize,
    #[serde(rename = "MeanMm")]
    #[tabled(rename = "MeanMm")]
    pub mean_mm: String,
    #[serde(rename = "MaxMm")]
    #[tabled(rename = "MaxMm")]
    pub max_mm: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct LegendRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Range")]
    #[tabled(rename = "Range")]
    pub range: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
    #[serde(rename = "Units")]
    #[tabled(rename = "Units")]
    pub units: usize,
}
