//! Module bring-up
//!
//! Writes the node profile to the vendor module, applies it, starts the LoRa
//! stack and dumps the resulting configuration to the log. None of these
//! steps is fatal: the module keeps its previous configuration when a step
//! fails, and the node loop still runs.

use core::fmt::Write;

use heapless::Vec;

use crate::{
    config::device::{parse_hex, DeviceClass, NodeProfile, Param},
    console,
    gateway::NodeConfigApi,
};

/// Bring-up error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError<E> {
    /// Fused DevEUI could not be read
    FuseDevEui(E),
    /// Fused DevEUI is not 16 hex digits
    InvalidDevEui,
    /// Applying staged parameters failed
    Apply(E),
    /// Starting the LoRa stack failed
    StartLora(E),
}

/// Profile actually written during provisioning
#[derive(Debug, Clone)]
pub struct Provisioned {
    /// Profile with DevEUI and DevAddr filled in
    pub profile: NodeProfile,
    /// Number of parameters the module refused
    pub failed_params: u8,
}

/// Outcome of [`bring_up`]
#[derive(Debug)]
pub struct SetupReport<E> {
    /// Provisioning result, `None` if it was aborted
    pub provisioned: Option<Provisioned>,
    /// Errors met along the way
    pub errors: Vec<SetupError<E>, 4>,
    /// Class read back from the module
    pub class: Option<DeviceClass>,
}

impl<E> SetupReport<E> {
    /// Whether every step succeeded
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
            && self
                .provisioned
                .as_ref()
                .map_or(false, |p| p.failed_params == 0)
    }
}

/// Log the module firmware version
pub fn show_version<A, L>(api: &mut A, log: &mut L)
where
    A: NodeConfigApi,
    L: Write,
{
    if let Ok(version) = api.version() {
        console::line(log, format_args!("Version={}", version));
    }
}

/// Write `profile` to the module, using the DevEUI from the module fuses.
/// Parameters the module refuses are logged and counted.
pub fn provision<A, L>(
    api: &mut A,
    profile: &NodeProfile,
    log: &mut L,
) -> Result<Provisioned, SetupError<A::Error>>
where
    A: NodeConfigApi,
    L: Write,
{
    let fused = match api.fuse_dev_eui() {
        Ok(fused) => fused,
        Err(e) => {
            console::line(log, format_args!("Get fuse DevEui failed"));
            return Err(SetupError::FuseDevEui(e));
        }
    };
    let dev_eui = match parse_hex::<8>(&fused) {
        Some(dev_eui) => dev_eui,
        None => {
            console::line(log, format_args!("Invalid fuse DevEui: {}", fused));
            return Err(SetupError::InvalidDevEui);
        }
    };

    let profile = profile.clone().with_dev_eui(dev_eui);
    let mut failed_params = 0;
    for param in Param::ALL {
        let value = match profile.render(param) {
            Some(value) => value,
            None => continue,
        };
        if let Err(e) = api.set_param(param, &value) {
            console::line(log, format_args!("WARN: set {} failed: {:?}", param.name(), e));
            failed_params += 1;
        }
    }

    Ok(Provisioned {
        profile,
        failed_params,
    })
}

/// Log every readable parameter and return the class the module reports
pub fn dump_config<A, L>(api: &mut A, log: &mut L) -> Option<DeviceClass>
where
    A: NodeConfigApi,
    L: Write,
{
    let mut class = None;
    for param in Param::ALL.into_iter().filter(|p| p.is_readable()) {
        if let Ok(value) = api.get_param(param) {
            console::line(
                log,
                format_args!("{}={}{}", param.name(), value, param.unit()),
            );
            if param == Param::Class {
                class = DeviceClass::parse(&value);
            }
        }
    }
    class
}

/// Full boot sequence: version, provisioning, apply, LoRa start, dump
pub fn bring_up<A, L>(api: &mut A, profile: &NodeProfile, log: &mut L) -> SetupReport<A::Error>
where
    A: NodeConfigApi,
    L: Write,
{
    let mut errors = Vec::new();

    show_version(api, log);

    let provisioned = match provision(api, profile, log) {
        Ok(provisioned) => Some(provisioned),
        Err(e) => {
            let _ = errors.push(e);
            None
        }
    };

    if let Err(e) = api.apply() {
        console::line(log, format_args!("WARN: apply config failed: {:?}", e));
        let _ = errors.push(SetupError::Apply(e));
    }

    if let Err(e) = api.start_lora() {
        console::line(log, format_args!("WARN: start LoRa failed: {:?}", e));
        let _ = errors.push(SetupError::StartLora(e));
    }

    let class = dump_config(api, log);

    SetupReport {
        provisioned,
        errors,
        class,
    }
}
