//! Core data models for the census lookup system.

pub mod region;

pub use region::{normalize_name, Polygon, Region, RegionDataset};
