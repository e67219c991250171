use shapefile as shp;

/// Ensure first and last coordinates are the same.
fn ensure_closed(coords: &mut Vec<geo::Coord<f64>>) {
    if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
        if first != last {
            coords.push(first);
        }
    }
}

/// Convert shapefile::Polygon to geo::MultiPolygon<f64>.
/// Shapefiles store each outer ring followed by its holes; an inner ring before any
/// outer ring is kept as an exterior so the geometry fails validation instead of vanishing.
pub(crate) fn shp_to_geo(p: &shp::Polygon) -> geo::MultiPolygon<f64> {
    let mut polys: Vec<geo::Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<geo::LineString<f64>> = None;
    let mut current_holes: Vec<geo::LineString<f64>> = Vec::new();

    for ring in p.rings() {
        let mut coords = ring.points().iter()
            .map(|pt| geo::Coord { x: pt.x, y: pt.y })
            .collect::<Vec<_>>();
        ensure_closed(&mut coords);
        let ls = geo::LineString(coords);

        match (ring, current_exterior.is_some()) {
            (shp::PolygonRing::Inner(_), true) => current_holes.push(ls),
            _ => {
                // flush previous polygon
                if let Some(ext) = current_exterior.take() {
                    polys.push(geo::Polygon::new(ext, std::mem::take(&mut current_holes)));
                }
                current_exterior = Some(ls);
            }
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(geo::Polygon::new(ext, current_holes));
    }

    geo::MultiPolygon(polys)
}

/// Convert geo::MultiPolygon<f64> to shapefile::Polygon
#[cfg(test)]
pub(crate) fn geo_to_shp(mp: &geo::MultiPolygon<f64>) -> shp::Polygon {
    /// Get the signed area of a shapefile::Point list (negative for clockwise)
    fn signed_area(pts: &[shp::Point]) -> f64 {
        pts.windows(2).map(|w| w[0].x * w[1].y - w[1].x * w[0].y).sum::<f64>() / 2.0
    }

    let points = |ls: &geo::LineString<f64>| ls.points()
        .map(|c| shp::Point { x: c.x(), y: c.y() })
        .collect::<Vec<_>>();

    // Shapefile ordering: [ext CW, hole CCW, hole CCW, ..., next ext CW, ...]
    let mut rings: Vec<shp::PolygonRing<shp::Point>> = Vec::new();
    for poly in &mp.0 {
        let mut ext_pts = points(poly.exterior());
        if signed_area(&ext_pts) > 0.0 { ext_pts.reverse() }
        rings.push(shp::PolygonRing::Outer(ext_pts));

        for hole in poly.interiors() {
            let mut hole_pts = points(hole);
            if signed_area(&hole_pts) < 0.0 { hole_pts.reverse() }
            rings.push(shp::PolygonRing::Inner(hole_pts));
        }
    }

    shp::Polygon::with_rings(rings)
}
