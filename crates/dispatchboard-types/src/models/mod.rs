//! Data models for dispatchboard

pub mod period;
pub mod record;

pub use period::PeriodLabels;
pub use record::{DeliveryStatus, LogisticsRecord};
