use thiserror::Error;

/// Hard failures surfaced to the caller.
///
/// Bad cells and unknown columns never end up here: the loader recovers
/// them as [`DataIssue`]s and keeps going.
#[derive(Debug, Error)]
pub enum RainfallError {
    /// No slot in the dataset carries a single non-missing reading.
    #[error("no rainfall data available")]
    NoDataAvailable,

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("invalid slot schedule: {0}")]
    InvalidSchedule(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A problem found while parsing a table that was recovered locally.
#[derive(Debug, Clone, PartialEq)]
pub enum DataIssue {
    /// A cell could not be read as a non-negative number and was treated
    /// as missing. `row` is 1-based and does not count the header.
    MalformedValue {
        row: usize,
        column: String,
        raw: String,
    },
    /// A header matched neither a configured column nor a time slot.
    UnknownSlotColumn { column: String },
}

impl std::fmt::Display for DataIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataIssue::MalformedValue { row, column, raw } => {
                write!(f, "row {row}, column '{column}': unparseable value '{raw}'")
            }
            DataIssue::UnknownSlotColumn { column } => {
                write!(f, "column '{column}' is not a known time slot")
            }
        }
    }
}
