//! Core data models: raw snapshots, the yaku catalog and derived metrics.

mod ids;
mod metrics;
mod snapshot;
mod yaku;

pub use ids::*;
pub use metrics::*;
pub use snapshot::*;
pub use yaku::*;
