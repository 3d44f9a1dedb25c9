//! Device and loop configuration
//!
//! This module contains the settings the node is provisioned and driven with:
//! - Device profile (DevEUI, AppEUI, keys, class, radio parameters)
//! - Loop schedule (active period, tick, join backoff, uplink port)

/// Device profile written to the module at boot
pub mod device;

/// Timing and port settings for the node state loop
pub mod schedule;

pub use device::{DeviceClass, NodeProfile, Param};
pub use schedule::{ConfigError, Schedule, WaitMode};
