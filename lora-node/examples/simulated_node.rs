//! Host simulation of the temperature/humidity node
//!
//! Runs the whole application against simulated peripherals:
//! - Vendor module that joins after a few polls and answers every third
//!   uplink with a downlink
//! - HDC1510 on a fake I2C bus, sampled on its own thread
//! - Debug console on stdout
//!
//! Time runs 100x faster than on the device.

use std::fmt;
use std::io::Write as _;
use std::thread;
use std::time::Duration;

use embedded_hal::blocking::{delay::DelayMs, i2c};
use lora_node::{
    config::{
        device::{DeviceClass, Param, ParamValue},
        NodeProfile, Schedule,
    },
    device,
    gateway::{EventQueue, EventSender, NodeConfigApi, RadioGateway, TxOutcome},
    node::Node,
    sensor::{sampler, Hdc1510, Sampler, SharedReading},
};

const TIME_SCALE: u32 = 100;

static READINGS: SharedReading = SharedReading::new();

#[derive(Debug)]
struct SimError;

struct FastDelay;

impl DelayMs<u32> for FastDelay {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis((ms / TIME_SCALE) as u64));
    }
}

/// I2C bus with an HDC1510 slowly warming up
struct SimBus {
    raw_temperature: u16,
}

impl i2c::Write for SimBus {
    type Error = SimError;

    fn write(&mut self, _address: u8, _bytes: &[u8]) -> Result<(), SimError> {
        Ok(())
    }
}

impl i2c::Read for SimBus {
    type Error = SimError;

    fn read(&mut self, _address: u8, buffer: &mut [u8]) -> Result<(), SimError> {
        self.raw_temperature = self.raw_temperature.wrapping_add(40);
        let [t_hi, t_lo] = self.raw_temperature.to_be_bytes();
        buffer.copy_from_slice(&[t_hi, t_lo, 0x91, 0x5C]);
        Ok(())
    }
}

/// Vendor module stand-in
struct SimModule {
    callbacks: EventSender<'static>,
    polls: u32,
    uplinks: u32,
    params: Vec<(Param, String)>,
}

impl RadioGateway for SimModule {
    type Error = SimError;

    fn enable_events(&mut self) -> Result<(), SimError> {
        Ok(())
    }

    fn join_state(&mut self) -> bool {
        self.polls += 1;
        self.polls > 3
    }

    fn device_class(&mut self) -> Result<DeviceClass, SimError> {
        Ok(DeviceClass::C)
    }

    fn send(&mut self, port: u8, _payload: &[u8]) -> Result<(), SimError> {
        self.uplinks += 1;
        self.callbacks.tx_done(TxOutcome::Sent);
        if self.uplinks % 3 == 0 {
            self.callbacks.rx_done(port, &[0xC0, 0xFF, 0xEE]);
        }
        Ok(())
    }

    fn rtc_sleep(&mut self, secs: u32) -> Result<(), SimError> {
        FastDelay.delay_ms(secs * 1_000);
        Ok(())
    }
}

fn text(value: &str) -> Result<ParamValue, SimError> {
    let mut out = ParamValue::new();
    out.push_str(value).map_err(|_| SimError)?;
    Ok(out)
}

impl NodeConfigApi for SimModule {
    type Error = SimError;

    fn version(&mut self) -> Result<ParamValue, SimError> {
        text("sim-1.0")
    }

    fn fuse_dev_eui(&mut self) -> Result<ParamValue, SimError> {
        text("70b3d5fffe0a1b2c")
    }

    fn set_param(&mut self, param: Param, value: &str) -> Result<(), SimError> {
        self.params.retain(|(p, _)| *p != param);
        self.params.push((param, value.to_string()));
        Ok(())
    }

    fn get_param(&mut self, param: Param) -> Result<ParamValue, SimError> {
        let (_, value) = self.params.iter().find(|(p, _)| *p == param).ok_or(SimError)?;
        text(value)
    }

    fn apply(&mut self) -> Result<(), SimError> {
        Ok(())
    }

    fn start_lora(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}

/// Debug console on stdout
struct Stdout;

impl fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        std::io::stdout().write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

fn main() {
    let queue: &'static mut EventQueue = Box::leak(Box::new(EventQueue::new()));
    let (producer, events) = queue.split();

    let mut module = SimModule {
        callbacks: EventSender::new(producer),
        polls: 0,
        uplinks: 0,
        params: Vec::new(),
    };

    let report = device::bring_up(&mut module, &NodeProfile::default(), &mut Stdout);
    if !report.is_clean() {
        println!("bring-up errors: {:?}", report.errors);
    }

    let sensor = Hdc1510::new(
        SimBus {
            raw_temperature: 25_000,
        },
        FastDelay,
    );
    let _sampler = sampler::spawn(Sampler::new(sensor, &READINGS), Stdout, 1_000 / TIME_SCALE);

    let mut node = match Node::new(module, FastDelay, Stdout, events, &READINGS, Schedule::default()) {
        Ok(node) => node,
        Err(e) => {
            println!("invalid schedule: {:?}", e);
            return;
        }
    };

    node.start();
    for _ in 0..120 {
        node.step();
    }
}
