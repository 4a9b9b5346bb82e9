mod index;
mod repair;
mod similarity;

pub use index::{EntityIndex, IndexEntry, IndexError, SearchField};
pub use repair::{repair_query, RepairConfig, RepairOutcome};
pub use similarity::{normalize_term, sequence_ratio};
