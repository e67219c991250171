use geo::{Area, BoundingRect, Coord, MultiPolygon, Rect, Validation};
use rstar::{RTree, AABB};

use crate::geom::BoundingBox;

/// Geometries represents an indexed collection of MultiPolygons.
/// Empty shapes are kept (so indices stay aligned with their owners) but never enter the R-tree.
#[derive(Debug, Clone)]
pub(crate) struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    boxes: Vec<Option<BoundingBox>>,
    rtree: RTree<BoundingBox>,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons
    pub(crate) fn new(shapes: Vec<MultiPolygon<f64>>) -> Self {
        let boxes = shapes.iter().enumerate()
            .map(|(i, shape)| shape.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
            .collect::<Vec<_>>();

        Self {
            rtree: RTree::bulk_load(boxes.iter().flatten().cloned().collect()),
            boxes,
            shapes,
        }
    }

    /// Get a reference to the MultiPolygon at `idx`.
    #[inline] pub(crate) fn shape(&self, idx: usize) -> &MultiPolygon<f64> { &self.shapes[idx] }

    /// Bounding box of the MultiPolygon at `idx` (None for empty shapes).
    #[inline] pub(crate) fn bbox(&self, idx: usize) -> Option<&BoundingBox> { self.boxes[idx].as_ref() }

    /// Indices of shapes whose bounding boxes intersect `rect`, in ascending order.
    pub(crate) fn candidates(&self, rect: &Rect<f64>) -> Vec<usize> {
        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());
        let mut found = self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(BoundingBox::idx)
            .collect::<Vec<_>>();
        found.sort_unstable();
        found
    }

    /// Compute the bounding rectangle of all MultiPolygons.
    pub(crate) fn bounds(&self) -> Option<Rect<f64>> {
        self.boxes.iter().flatten()
            .map(|bbox| *bbox.bbox())
            .reduce(|a, b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))
    }
}

/// A shape is usable when it passes OGC validity (no self-intersections,
/// properly nested holes) and encloses a positive area.
pub(crate) fn is_well_formed(shape: &MultiPolygon<f64>) -> bool {
    !shape.0.is_empty() && shape.is_valid() && shape.unsigned_area() > 0.0
}
