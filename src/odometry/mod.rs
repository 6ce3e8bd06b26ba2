//! Dead-reckoning odometry.
//!
//! [`PositionTracker`] integrates wheel encoder travel into a chassis- or
//! field-frame position estimate, fed once per control cycle.
//! [`PositionHistory`] samples a pose source on a background thread into a
//! fixed-capacity ring buffer for latency-compensated lookups.

pub mod history;
pub mod tracker;

pub use history::{HistoryBuffer, HistoryConfig, PositionHistory};
pub use tracker::{PositionTracker, ReferenceFrame, TrackerConfig};
