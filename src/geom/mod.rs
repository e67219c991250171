mod bbox;
mod geom;

pub(crate) use bbox::BoundingBox;
pub(crate) use geom::{is_well_formed, Geometries};
