//! Temperature/humidity LoRa end node
//!
//! This crate drives a LoRa end-node module whose MAC, join procedure and
//! radio are handled by the vendor firmware. It provisions the module,
//! samples an HDC1510 sensor in the background and periodically publishes
//! the latest reading as a small TLV uplink, reporting downlinks as they
//! arrive.
//!
//! # Features
//! - Provisioning from the module's fused DevEUI
//! - Background sampling decoupled from the uplink cadence
//! - Class-aware low-power waits (short ticks for class C)
//! - Callback events delivered through a bounded SPSC queue
//! - Deterministic `step()` for host-side testing
//! - No unsafe code
//!
//! # Example
//! ```no_run
//! use lora_node::{
//!     config::Schedule,
//!     gateway::{EventQueue, RadioGateway},
//!     node::Node,
//!     sensor::SharedReading,
//! };
//! # fn demo<G: RadioGateway, D: embedded_hal::blocking::delay::DelayMs<u32>, L: core::fmt::Write>(
//! #     gateway: G, delay: D, console: L,
//! # ) {
//! static READINGS: SharedReading = SharedReading::new();
//!
//! let mut queue: EventQueue = EventQueue::new();
//! let (_callbacks, events) = queue.split();
//!
//! let node = Node::new(gateway, delay, console, events, &READINGS, Schedule::default()).unwrap();
//! node.run();
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(test), no_std)]

/// Device profile and loop schedule
pub mod config;

/// Debug console and log helpers
pub mod console;

/// Module bring-up
pub mod device;

/// Vendor module interface and event delivery
pub mod gateway;

/// Node state loop
pub mod node;

/// Sensor driver and shared reading
pub mod sensor;

/// Uplink frame encoding
pub mod telemetry;
