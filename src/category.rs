//! Rainfall intensity categories.
//!
//! The boundary table below is the only place the millimetre ranges live;
//! both [`classify`] and the legend shown next to maps read from it.

use serde::Serialize;

/// Nine intensity buckets in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RainfallCategory {
    NoRain,
    VeryLight,
    Light,
    Moderate,
    RatherHeavy,
    Heavy,
    VeryHeavy,
    ExtremelyHeavy,
    Exceptional,
}

/// Inclusive upper bounds, in mm, for every category except the last.
///
/// A value belongs to the first entry whose bound it does not exceed.
/// `NoRain` has bound 0, so only an exact zero lands there.
const UPPER_BOUNDS: [(f64, RainfallCategory); 8] = [
    (0.0, RainfallCategory::NoRain),
    (2.4, RainfallCategory::VeryLight),
    (7.5, RainfallCategory::Light),
    (35.5, RainfallCategory::Moderate),
    (64.4, RainfallCategory::RatherHeavy),
    (124.4, RainfallCategory::Heavy),
    (244.4, RainfallCategory::VeryHeavy),
    (350.0, RainfallCategory::ExtremelyHeavy),
];

impl RainfallCategory {
    pub const ALL: [RainfallCategory; 9] = [
        RainfallCategory::NoRain,
        RainfallCategory::VeryLight,
        RainfallCategory::Light,
        RainfallCategory::Moderate,
        RainfallCategory::RatherHeavy,
        RainfallCategory::Heavy,
        RainfallCategory::VeryHeavy,
        RainfallCategory::ExtremelyHeavy,
        RainfallCategory::Exceptional,
    ];

    /// Position in the ascending order, `NoRain` = 0.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            RainfallCategory::NoRain => "No Rain",
            RainfallCategory::VeryLight => "Very Light",
            RainfallCategory::Light => "Light",
            RainfallCategory::Moderate => "Moderate",
            RainfallCategory::RatherHeavy => "Rather Heavy",
            RainfallCategory::Heavy => "Heavy",
            RainfallCategory::VeryHeavy => "Very Heavy",
            RainfallCategory::ExtremelyHeavy => "Extremely Heavy",
            RainfallCategory::Exceptional => "Exceptional",
        }
    }

    /// Map fill colour as a hex RGB string.
    pub fn color(self) -> &'static str {
        match self {
            RainfallCategory::NoRain => "#f8f8f8",
            RainfallCategory::VeryLight => "#e0fbe0",
            RainfallCategory::Light => "#a5e6a5",
            RainfallCategory::Moderate => "#4cc44c",
            RainfallCategory::RatherHeavy => "#ffff66",
            RainfallCategory::Heavy => "#ffb84d",
            RainfallCategory::VeryHeavy => "#ff6600",
            RainfallCategory::ExtremelyHeavy => "#ff0000",
            RainfallCategory::Exceptional => "#990000",
        }
    }

    /// Exclusive lower and inclusive upper bound. `None` on either side
    /// means open-ended.
    pub fn bounds(self) -> (Option<f64>, Option<f64>) {
        let i = self.index();
        let lower = if i == 0 { None } else { Some(UPPER_BOUNDS[i - 1].0) };
        let upper = UPPER_BOUNDS.get(i).map(|(b, _)| *b);
        (lower, upper)
    }

    /// Human readable range, e.g. `"2.5 - 7.5 mm"`.
    ///
    /// Lower bounds are exclusive, so they are shown one tenth above the
    /// previous category's upper bound, the same way the bulletin tables
    /// print them.
    pub fn range_label(self) -> String {
        match self.bounds() {
            (None, _) => "0 mm".to_string(),
            (Some(lo), Some(hi)) => format!("{:.1} - {:.1} mm", lo + 0.1, hi),
            (Some(lo), None) => format!("> {:.0} mm", lo),
        }
    }
}

impl std::fmt::Display for RainfallCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a reading in millimetres. Missing readings (`None` or NaN) are
/// `NoRain`.
///
/// Callers must not pass negative values; the loader turns them into
/// missing cells before they get here.
pub fn classify(value_mm: Option<f64>) -> RainfallCategory {
    let Some(v) = value_mm.filter(|v| !v.is_nan()) else {
        return RainfallCategory::NoRain;
    };
    debug_assert!(v >= 0.0, "negative rainfall reading {v}");
    UPPER_BOUNDS
        .iter()
        .find(|(upper, _)| v <= *upper)
        .map(|(_, cat)| *cat)
        .unwrap_or(RainfallCategory::Exceptional)
}

/// One row of the category lookup table handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub category: RainfallCategory,
    pub label: &'static str,
    pub range: String,
    pub color: &'static str,
}

pub fn legend() -> Vec<LegendEntry> {
    RainfallCategory::ALL
        .iter()
        .map(|&category| LegendEntry {
            category,
            label: category.label(),
            range: category.range_label(),
            color: category.color(),
        })
        .collect()
}
