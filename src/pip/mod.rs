//! Point-in-Polygon (PIP) region lookup.
//!
//! Resolves a query point to the weighting area containing it and that
//! area's attribute value. [`locate`] is the plain stored-order scan;
//! [`RegionIndex`] wraps it in an R-tree bounding-box pre-filter with
//! identical results.

mod index;
mod raycast;
mod service;

pub use index::RegionIndex;
pub use raycast::contains;
pub use service::{Located, LocatorService};

use crate::models::RegionDataset;

/// Find the first region containing the point `(x, y)` (longitude,
/// latitude), returning its UG key and attribute value.
///
/// Regions are scanned in the dataset's stored order, polygons in stored
/// order within each region, and the first containing polygon wins. The
/// geometry source guarantees (but nothing enforces) that regions are
/// disjoint; when they do overlap, the earlier-stored region is returned. No
/// containing region is a normal `None`, not an error.
///
/// This is a linear scan over every vertex of every region.
pub fn locate<'a>(dataset: &'a RegionDataset, x: f64, y: f64) -> Option<(&'a str, f64)> {
    for region in dataset.regions() {
        for poly in &region.shapes {
            if contains(poly, x, y) {
                return Some((region.ug.as_str(), region.value));
            }
        }
    }
    None
}
