//! Spatial index over a region dataset.
//!
//! Bounding boxes only pre-filter candidates; containment is still decided by
//! the exact ray-cast, and ties between overlapping candidates are broken by
//! stored (region, polygon) order, so results are identical to the linear
//! scan in [`super::locate`].

use rstar::{RTree, RTreeObject, AABB};
use tracing::info;

use super::raycast::contains;
use crate::models::RegionDataset;

/// One polygon's envelope plus its stored position in the dataset.
struct IndexedShape {
    envelope: AABB<[f64; 2]>,
    region_idx: usize,
    shape_idx: usize,
}

impl RTreeObject for IndexedShape {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree accelerated region lookup.
pub struct RegionIndex {
    tree: RTree<IndexedShape>,
    dataset: RegionDataset,
}

impl RegionIndex {
    /// Build the index. Empty polygons have no envelope and are skipped;
    /// they cannot contain a point anyway.
    pub fn build(dataset: RegionDataset) -> Self {
        let mut indexed = Vec::new();
        for (region_idx, region) in dataset.regions().iter().enumerate() {
            for (shape_idx, poly) in region.shapes.iter().enumerate() {
                if let Some((min_lng, min_lat, max_lng, max_lat)) = poly.bbox() {
                    indexed.push(IndexedShape {
                        envelope: AABB::from_corners([min_lng, min_lat], [max_lng, max_lat]),
                        region_idx,
                        shape_idx,
                    });
                }
            }
        }

        let tree = RTree::bulk_load(indexed);
        info!(
            "Spatial index built: {} polygons over {} regions",
            tree.size(),
            dataset.len()
        );

        Self { tree, dataset }
    }

    /// Same contract as [`super::locate`]: first containing region in stored
    /// order, or `None`.
    pub fn locate(&self, x: f64, y: f64) -> Option<(&str, f64)> {
        let query = AABB::from_point([x, y]);
        self.tree
            .locate_in_envelope_intersecting(&query)
            .filter(|s| {
                contains(
                    &self.dataset.regions()[s.region_idx].shapes[s.shape_idx],
                    x,
                    y,
                )
            })
            .min_by_key(|s| (s.region_idx, s.shape_idx))
            .map(|s| {
                let region = &self.dataset.regions()[s.region_idx];
                (region.ug.as_str(), region.value)
            })
    }

    pub fn dataset(&self) -> &RegionDataset {
        &self.dataset
    }

    /// Number of indexed polygons.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Polygon, Region};
    use crate::pip::locate;

    fn square(origin: (f64, f64), side: f64) -> Polygon {
        let (lat, lng) = origin;
        Polygon::new(vec![
            (lat, lng),
            (lat, lng + side),
            (lat + side, lng + side),
            (lat + side, lng),
        ])
    }

    fn region(ug: &str, value: f64, shapes: Vec<Polygon>) -> Region {
        Region {
            ug: ug.into(),
            name: "test".into(),
            value,
            shapes,
        }
    }

    #[test]
    fn test_index_matches_linear_scan() {
        let dataset = RegionDataset::new(vec![
            region("100", 1.0, vec![square((0.0, 0.0), 10.0)]),
            region("200", 2.0, vec![square((20.0, 20.0), 10.0)]),
            region("300", 3.0, vec![Polygon::new(vec![]), square((0.0, 20.0), 10.0)]),
        ]);
        let index = RegionIndex::build(dataset.clone());

        for &(x, y) in &[
            (5.0, 5.0),
            (25.0, 25.0),
            (25.0, 5.0),
            (50.0, 50.0),
            (0.0, 0.0),
            (10.0, 5.0),
            (5.0, 10.0),
        ] {
            assert_eq!(index.locate(x, y), locate(&dataset, x, y), "at ({x}, {y})");
        }
    }

    #[test]
    fn test_index_preserves_first_match_order() {
        let a = region("100", 1.0, vec![square((0.0, 0.0), 10.0)]);
        let b = region("200", 2.0, vec![square((0.0, 0.0), 10.0)]);

        let index = RegionIndex::build(RegionDataset::new(vec![a.clone(), b.clone()]));
        assert_eq!(index.locate(5.0, 5.0), Some(("100", 1.0)));

        let index = RegionIndex::build(RegionDataset::new(vec![b, a]));
        assert_eq!(index.locate(5.0, 5.0), Some(("200", 2.0)));
    }

    #[test]
    fn test_empty_index() {
        let index = RegionIndex::build(RegionDataset::default());
        assert!(index.is_empty());
        assert_eq!(index.locate(0.0, 0.0), None);
    }
}
