//! On-disk layout and JSON persistence for ingested datasets.
//!
//! ```text
//! <data_dir>/censo_2010/
//!   shapes/<name_key>.json                 decoded geometry per municipality
//!   variables/<code>_<name_key>_<var>.json raw attribute payloads
//!   merged/<var>.json                      region records, in ingest order
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::shapes::DecodedShapes;
use crate::models::{Region, RegionDataset};

pub struct DatasetStore {
    root: PathBuf,
}

impl DatasetStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.join("censo_2010"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn shapes_path(&self, name_key: &str) -> PathBuf {
        self.root.join("shapes").join(format!("{name_key}.json"))
    }

    pub fn variable_path(&self, code: u32, name_key: &str, var_id: u32) -> PathBuf {
        self.root
            .join("variables")
            .join(format!("{code}_{name_key}_{var_id}.json"))
    }

    pub fn merged_path(&self, var_id: u32) -> PathBuf {
        self.root.join("merged").join(format!("{var_id}.json"))
    }

    pub fn save_shapes(&self, name_key: &str, shapes: &DecodedShapes) -> Result<()> {
        write_json(&self.shapes_path(name_key), shapes)
    }

    pub fn load_shapes(&self, name_key: &str) -> Result<DecodedShapes> {
        read_json(&self.shapes_path(name_key))
    }

    /// Persist a raw variable payload as fetched.
    pub fn save_variable_payload(
        &self,
        code: u32,
        name_key: &str,
        var_id: u32,
        payload: &str,
    ) -> Result<()> {
        write_text(&self.variable_path(code, name_key, var_id), payload)
    }

    pub fn load_variable_payload(&self, code: u32, name_key: &str, var_id: u32) -> Result<String> {
        let path = self.variable_path(code, name_key, var_id);
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }

    pub fn save_merged(&self, var_id: u32, regions: &[Region]) -> Result<()> {
        write_json(&self.merged_path(var_id), &regions)
    }

    pub fn load_merged(&self, var_id: u32) -> Result<RegionDataset> {
        let regions: Vec<Region> = read_json(&self.merged_path(var_id))?;
        Ok(RegionDataset::new(regions))
    }
}

/// Serialize to JSON through a temp file and rename, so readers never see a
/// partially written dataset.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string(value).context("Failed to serialize")?;
    write_text(path, &json)
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    let parent = path.parent().context("path has no parent")?;
    fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent).context("create temp file")?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path)
        .with_context(|| format!("rename to {}", path.display()))?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))
}
