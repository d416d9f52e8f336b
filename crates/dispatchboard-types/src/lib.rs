//! dispatchboard-types - Shared data types for dispatchboard
//!
//! This crate contains pure data structures without heavy dependencies.
//! No tokio, no async runtime - just serde-serializable types.
//!
//! Used by:
//! - dispatchboard-core (cross-filter engine)
//! - dispatchboard (CLI)

pub mod models;

pub use models::{DeliveryStatus, LogisticsRecord, PeriodLabels};
