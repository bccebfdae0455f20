//! Filtering and aggregation over the complaint dataset.

pub mod aggregator;
pub mod classifier;
pub mod filter;

pub use aggregator::*;
pub use classifier::*;
pub use filter::*;
