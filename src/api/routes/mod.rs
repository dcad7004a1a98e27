pub mod identity;
pub mod stats;
