//! Rainfall bulletin aggregation: classify readings into intensity
//! categories and derive the per-unit, per-group and per-slot views a
//! dashboard displays.
pub mod aggregate;
pub mod category;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod loader;
pub mod observability;
pub mod output;
pub mod reports;
pub mod slots;
pub mod summary;
pub mod types;
pub mod util;

pub use category::{classify, RainfallCategory};
pub use error::{DataIssue, RainfallError};
