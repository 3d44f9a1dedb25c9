//! Vendor module interface
//!
//! The traits describe what the node needs from the vendor SDK; the event
//! types carry its callbacks back into the node loop.

/// Callback events and their queue
pub mod events;
/// Runtime and provisioning traits
pub mod traits;

pub use events::{Downlink, EventQueue, EventReceiver, EventSender, RadioEvent, TxOutcome};
pub use traits::{NodeConfigApi, RadioGateway};
