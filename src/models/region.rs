//! Region and polygon types shared by the decoder, the merge step and the
//! point lookup.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// One polygon ring as `(lat, lng)` vertex pairs.
///
/// The ring is implicitly closed: the containment test always walks the edge
/// from the last vertex back to the first, whether or not the first vertex is
/// duplicated in storage. The source format permits degenerate rings with a
/// single vertex (and, for empty tokens, none at all); those never contain
/// anything but must not crash a lookup.
///
/// Serializes as `[[lat, lng], ...]`, the layout used by the persisted
/// datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    pub vertices: Vec<(f64, f64)>,
}

impl Polygon {
    pub fn new(vertices: Vec<(f64, f64)>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Axis-aligned bounding box as `(min_lng, min_lat, max_lng, max_lat)`,
    /// or `None` for an empty ring.
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let (first_lat, first_lng) = *self.vertices.first()?;
        let mut bbox = (first_lng, first_lat, first_lng, first_lat);
        for &(lat, lng) in &self.vertices[1..] {
            bbox.0 = bbox.0.min(lng);
            bbox.1 = bbox.1.min(lat);
            bbox.2 = bbox.2.max(lng);
            bbox.3 = bbox.3.max(lat);
        }
        Some(bbox)
    }
}

/// A weighting area: the unit keyed by "UG" in both the geometry and the
/// attribute sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Sub-region (weighting-area) key.
    pub ug: String,
    /// Normalized municipality name key (see [`normalize_name`]).
    pub name: String,
    /// Attribute value attached to this region by the merge step.
    pub value: f64,
    /// One or more polygons; islands and enclaves make this a multi-polygon.
    pub shapes: Vec<Polygon>,
}

/// An ordered, read-only collection of regions.
///
/// Iteration order is the order regions were merged in, and is the order that
/// resolves lookups when regions overlap: the first containing region wins.
#[derive(Debug, Clone, Default)]
pub struct RegionDataset {
    regions: Vec<Region>,
    by_ug: HashMap<String, usize>,
}

impl RegionDataset {
    pub fn new(regions: Vec<Region>) -> Self {
        let by_ug = regions
            .iter()
            .enumerate()
            .map(|(i, r)| (r.ug.clone(), i))
            .collect();
        Self { regions, by_ug }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn get(&self, ug: &str) -> Option<&Region> {
        self.by_ug.get(ug).map(|&i| &self.regions[i])
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Derive the file-safe key for a municipality display name: lowercase,
/// spaces to underscores, diacritics stripped via NFD decomposition.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .replace(' ', "_")
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("São Paulo"), "sao_paulo");
        assert_eq!(normalize_name("Foz do Iguaçu"), "foz_do_iguacu");
        assert_eq!(normalize_name("Brasília"), "brasilia");
        assert_eq!(normalize_name("Maceió"), "maceio");
    }

    #[test]
    fn test_polygon_bbox() {
        let poly = Polygon::new(vec![(1.0, 2.0), (-3.0, 4.0), (0.5, -1.0)]);
        assert_eq!(poly.bbox(), Some((-1.0, -3.0, 4.0, 1.0)));
        assert_eq!(Polygon::new(vec![]).bbox(), None);
    }

    #[test]
    fn test_polygon_serde_shape() {
        let poly = Polygon::new(vec![(0.5, 0.25)]);
        let json = serde_json::to_string(&poly).unwrap();
        assert_eq!(json, "[[0.5,0.25]]");
        let back: Polygon = serde_json::from_str(&json).unwrap();
        assert_eq!(back, poly);
    }

    #[test]
    fn test_dataset_lookup_by_ug() {
        let dataset = RegionDataset::new(vec![Region {
            ug: "3550308001".into(),
            name: "sao_paulo".into(),
            value: 1234.56,
            shapes: vec![],
        }]);
        assert_eq!(dataset.get("3550308001").unwrap().value, 1234.56);
        assert!(dataset.get("0").is_none());
    }
}
