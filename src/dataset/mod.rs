//! Dataset plumbing: configuration, payload fetching, decode, merge and
//! on-disk storage for the census geodata.

pub mod config;
pub mod fetch;
pub mod merge;
pub mod shapes;
pub mod store;
pub mod variables;

pub use config::{Config, Municipality};
pub use merge::{merge_municipality, MergeError};
pub use shapes::DecodedShapes;
pub use store::DatasetStore;
pub use variables::AttributeTable;

/// Monthly average household income, the default attribute variable.
pub const MONTHLY_AVERAGE_INCOME: u32 = 12786;
