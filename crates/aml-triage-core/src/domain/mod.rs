//! Alert records, analysis options and the result records extracted from
//! service replies.

pub mod alert;
pub mod analysis;
pub mod flags;
pub mod prediction;

pub use alert::{alert_identifier, parse_alert_batch};
pub use analysis::AnalysisItem;
pub use flags::AnalysisFlags;
pub use prediction::{PredictionRecord, Priority};
