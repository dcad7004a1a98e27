//! # Tenhou Stats
//!
//! A local viewer for Tenhou mahjong statistics. A log parser reduces a
//! player's game logs to a snapshot of raw counters; this crate turns that
//! snapshot into the ratios and averages shown on four cards.
//!
//! ## Architecture
//!
//! - **models**: Snapshot counters, the yaku catalog and derived metric types
//! - **calculate**: Pure derivation of display metrics from a snapshot
//! - **source**: Where snapshots come from (parser output files, HTTP)
//! - **storage**: Persisted player identifier
//! - **store**: Per-player cache and observable stats state
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod source;
pub mod storage;
pub mod store;

pub use models::*;
