//! Ray-casting containment test.
//!
//! The comparisons here are deliberately asymmetric (`>` against the lower
//! vertex, `<=` against the upper) and are kept exactly as the legacy
//! datasets were built against them: a point exactly on an edge or vertex may
//! land on either side depending on float comparisons, and that behavior is
//! part of the contract. Do not "fix" the boundary cases.

use crate::models::Polygon;

/// Return true if `(x, y)` (longitude, latitude) is inside the polygon,
/// counting crossings of a horizontal semi-line from the point.
///
/// The polygon is treated as cyclic, so the closing edge from the last vertex
/// back to the first is always tested. Degenerate polygons (zero or one
/// vertex) contain nothing.
pub fn contains(poly: &Polygon, x: f64, y: f64) -> bool {
    let v = &poly.vertices;
    let n = v.len();
    if n == 0 {
        return false;
    }

    let mut inside = false;
    let (mut p1y, mut p1x) = v[0];
    let mut xint = 0.0;
    for i in 0..=n {
        let (p2y, p2x) = v[i % n];
        if y > p1y.min(p2y) && y <= p1y.max(p2y) && x <= p1x.max(p2x) {
            if p1y != p2y {
                xint = (y - p1y) * (p2x - p1x) / (p2y - p1y) + p1x;
            }
            if p1x == p2x || x <= xint {
                inside = !inside;
            }
        }
        p1x = p2x;
        p1y = p2y;
    }
    inside
}
