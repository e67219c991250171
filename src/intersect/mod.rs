//! Precinct → district overlap computation and its persistent cache.

mod batch;
mod cache;
mod engine;
mod overlap;
mod table;

pub use batch::{run_batch, run_units, BatchReport};
pub use cache::{CacheEntry, IntersectionCache};
pub use engine::{IntersectionEngine, IntersectionOutput};
pub use overlap::{Overlap, Tolerance};
pub use table::{IntersectionRecord, IntersectionTable, MissingPrecincts};
pub(crate) use table::ID_COLUMNS;
