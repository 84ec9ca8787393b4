//! Lookup service wrapping the spatial index for the query server.

use serde::Serialize;

use super::RegionIndex;

/// A resolved lookup: the containing weighting area and its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Located {
    pub ug: String,
    pub name: String,
    pub value: f64,
}

/// Region lookup service over an immutable dataset.
pub struct LocatorService {
    index: RegionIndex,
}

impl LocatorService {
    pub fn new(index: RegionIndex) -> Self {
        Self { index }
    }

    pub fn lookup(&self, lon: f64, lat: f64) -> Option<Located> {
        let (ug, value) = self.index.locate(lon, lat)?;
        let name = self
            .index
            .dataset()
            .get(ug)
            .map(|r| r.name.clone())
            .unwrap_or_default();
        Some(Located {
            ug: ug.to_string(),
            name,
            value,
        })
    }

    pub fn index(&self) -> &RegionIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Polygon, Region, RegionDataset};

    #[test]
    fn test_lookup_no_match() {
        let service = LocatorService::new(RegionIndex::build(RegionDataset::default()));
        assert_eq!(service.lookup(8.5, 47.4), None);
    }

    #[test]
    fn test_lookup_returns_name() {
        let dataset = RegionDataset::new(vec![Region {
            ug: "100".into(),
            name: "alvorada".into(),
            value: 7.0,
            shapes: vec![Polygon::new(vec![
                (0.0, 0.0),
                (0.0, 1.0),
                (1.0, 1.0),
                (1.0, 0.0),
            ])],
        }]);
        let service = LocatorService::new(RegionIndex::build(dataset));
        let hit = service.lookup(0.5, 0.5).unwrap();
        assert_eq!(hit.ug, "100");
        assert_eq!(hit.name, "alvorada");
        assert_eq!(hit.value, 7.0);
    }
}
