#![doc = "Geometric apportionment of Michigan precinct election results to legislative districts"]
mod common;
mod geom;
mod io;

pub mod apportion;
pub mod cli;
pub mod commands;
pub mod config;
pub mod election;
pub mod intersect;
pub mod loader;
pub mod types;

mod error;

#[doc(inline)]
pub use error::Error;

#[doc(inline)]
pub use config::Config;

#[doc(inline)]
pub use intersect::{IntersectionCache, IntersectionEngine, Tolerance};

#[doc(inline)]
pub use loader::{DistrictSet, GeometryLoader, PrecinctSet};
