//! Shape payload parsing and decoding.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec;
use crate::models::Polygon;

/// Raw shape payload served per municipality: one compressed record per
/// weighting area.
#[derive(Debug, Deserialize)]
struct ShapePayload {
    shapes: BTreeMap<String, String>,
}

/// Decoded per-municipality geometry, persisted to `shapes/<name_key>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedShapes {
    pub shapes: BTreeMap<String, Vec<Polygon>>,
}

impl DecodedShapes {
    /// Parse a raw shape payload and decode every compressed record.
    pub fn from_payload(payload: &str) -> Result<Self> {
        let raw: ShapePayload =
            serde_json::from_str(payload).context("Failed to parse shape payload")?;

        let mut shapes = BTreeMap::new();
        for (ug, record) in raw.shapes {
            let polygons = codec::decode(&record)
                .with_context(|| format!("Failed to decode shapes for UG {ug}"))?;
            debug!("Decoded UG {}: {} polygons", ug, polygons.len());
            shapes.insert(ug, polygons);
        }
        Ok(Self { shapes })
    }
}
