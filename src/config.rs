use crate::error::RainfallError;
use crate::loader::AliasTable;
use crate::slots::SlotSchedule;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Which bulletin a day's sheet comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    #[default]
    TwoHourly,
    TwentyFourHourly,
}

impl DataKind {
    pub fn title(self) -> &'static str {
        match self {
            DataKind::TwoHourly => "2 Hourly Rainfall",
            DataKind::TwentyFourHourly => "24 Hourly Rainfall",
        }
    }

    fn hours(self) -> u32 {
        match self {
            DataKind::TwoHourly => 2,
            DataKind::TwentyFourHourly => 24,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub kind: DataKind,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("data"), kind: DataKind::default() }
    }
}

impl DataConfig {
    /// File holding one day's sheet, laid out by month the same way the
    /// bulletin workbooks are: `2HR_Rainfall_July_2025/master2hrs_2025-07-14.csv`.
    pub fn sheet_path(&self, kind: DataKind, date: NaiveDate) -> PathBuf {
        let hours = kind.hours();
        let folder = format!("{}HR_Rainfall_{}", hours, date.format("%B_%Y"));
        let file = format!("master{}hrs_{}.csv", hours, date.format("%Y-%m-%d"));
        self.dir.join(folder).join(file)
    }
}

/// Header names for the columns with a fixed role. Everything else is
/// treated as a candidate time-slot column.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub unit: String,
    pub parent: String,
    pub total: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            unit: "Taluka".to_string(),
            parent: "District".to_string(),
            total: "Rain_Last_24_Hrs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_n: usize,
    pub threshold_mm: f64,
    pub output_dir: PathBuf,
    pub preview_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: crate::aggregate::DEFAULT_TOP_N,
            threshold_mm: 64.4,
            output_dir: PathBuf::from("."),
            preview_rows: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 600 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub columns: ColumnConfig,
    pub slots: SlotSchedule,
    pub report: ReportConfig,
    pub cache: CacheConfig,
    pub aliases: AliasTable,
    /// Parent (district) name -> zone name.
    pub zones: BTreeMap<String, String>,
}

impl AppConfig {
    pub fn from_toml(contents: &str) -> Result<Self, RainfallError> {
        let cfg: AppConfig = toml::from_str(contents)?;
        cfg.slots.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, RainfallError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }
}
