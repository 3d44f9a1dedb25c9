use crate::config::device::{DeviceClass, Param, ParamValue};

/// Runtime interface of the vendor LoRa module.
///
/// Join procedure, MAC and radio control stay inside the module; the node
/// only polls join state, hands over payloads and sleeps. Completion of a
/// send and arrival of downlinks are reported through an
/// [`EventSender`](super::EventSender) wired to the module's callbacks.
pub trait RadioGateway {
    /// Error type for module operations
    type Error: core::fmt::Debug;

    /// Install the transmit-complete and receive-complete callbacks
    fn enable_events(&mut self) -> Result<(), Self::Error>;

    /// Whether the node is joined to a network
    fn join_state(&mut self) -> bool;

    /// Class the module is currently operating in
    fn device_class(&mut self) -> Result<DeviceClass, Self::Error>;

    /// Start an uplink on `port`. Completion arrives as a
    /// [`RadioEvent::TxDone`](super::RadioEvent::TxDone).
    fn send(&mut self, port: u8, payload: &[u8]) -> Result<(), Self::Error>;

    /// Sleep until the module RTC wakes the MCU after `secs` seconds
    fn rtc_sleep(&mut self, secs: u32) -> Result<(), Self::Error>;
}

/// Provisioning interface of the vendor LoRa module
pub trait NodeConfigApi {
    /// Error type for configuration operations
    type Error: core::fmt::Debug;

    /// Firmware version string
    fn version(&mut self) -> Result<ParamValue, Self::Error>;

    /// DevEUI burnt into the module fuses, as hex text
    fn fuse_dev_eui(&mut self) -> Result<ParamValue, Self::Error>;

    /// Stage a parameter value
    fn set_param(&mut self, param: Param, value: &str) -> Result<(), Self::Error>;

    /// Read back a parameter value
    fn get_param(&mut self, param: Param) -> Result<ParamValue, Self::Error>;

    /// Apply staged parameters to the module
    fn apply(&mut self) -> Result<(), Self::Error>;

    /// Start the LoRa stack (begins joining)
    fn start_lora(&mut self) -> Result<(), Self::Error>;
}
