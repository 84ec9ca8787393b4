//! Recenso - ingest, decode and spatially index census weighting areas.
//!
//! This library provides shared types and modules for the ingest and query
//! binaries: the compressed-shape decoder, the point-in-polygon region
//! locator, and the dataset plumbing around them.

pub mod codec;
pub mod dataset;
pub mod microdata;
pub mod models;
pub mod pip;

pub use codec::{decode, DecodeError};
pub use models::{Polygon, Region, RegionDataset};
