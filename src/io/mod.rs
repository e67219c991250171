//! Format-specific reading and writing of tabular data.
//!
//! - `csv` - CSV tables (intersections, summaries) and the tab-separated election result files

pub(crate) mod csv;
