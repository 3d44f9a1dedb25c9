//! Temperature and humidity sensing
//!
//! The sampler owns the sensor and refreshes a [`SharedReading`] on its own
//! cadence. The node loop only ever reads the shared cell, so a slow or
//! failing bus never blocks an uplink decision.

use core::sync::atomic::{AtomicU32, Ordering};

/// HDC1510 I2C driver
pub mod hdc1510;

/// Periodic background sampler
pub mod sampler;

pub use hdc1510::{Hdc1510, SensorError};
pub use sampler::Sampler;

/// Highest humidity value, in hundredths of a percent
pub const MAX_HUMIDITY: u16 = 10_000;

/// One environmental reading, in fixed-point hundredths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    temperature: i16,
    humidity: u16,
}

impl Reading {
    /// Build a reading. Humidity is clamped to 100.00 %.
    pub fn new(temperature: i16, humidity: u16) -> Self {
        Self {
            temperature,
            humidity: humidity.min(MAX_HUMIDITY),
        }
    }

    /// Convert raw 16-bit sensor words (`raw * 165/65536 - 40` degC and
    /// `raw * 100/65536` %) to hundredths.
    pub fn from_raw(raw_temperature: u16, raw_humidity: u16) -> Self {
        let temperature = ((raw_temperature as i32 * 16_500) >> 16) - 4_000;
        let humidity = (raw_humidity as u32 * 10_000) >> 16;
        Self::new(temperature as i16, humidity as u16)
    }

    /// Temperature in hundredths of a degree Celsius
    pub fn temperature(&self) -> i16 {
        self.temperature
    }

    /// Relative humidity in hundredths of a percent
    pub fn humidity(&self) -> u16 {
        self.humidity
    }
}

/// Freshness of the shared reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sample {
    /// Nothing has been sampled yet
    Unavailable,
    /// The last sample attempt failed; this is the previous value
    Stale(Reading),
    /// The last sample attempt succeeded
    Fresh(Reading),
}

impl Sample {
    /// The reading, fresh or stale
    pub fn reading(&self) -> Option<Reading> {
        match *self {
            Sample::Unavailable => None,
            Sample::Stale(reading) | Sample::Fresh(reading) => Some(reading),
        }
    }
}

/// Source of environmental readings
pub trait Sensor {
    /// Error type for sensor operations
    type Error;

    /// Take one reading
    fn read(&mut self) -> Result<Reading, Self::Error>;
}

const TEMPERATURE_MASK: u32 = 0xFFFF;
const HUMIDITY_SHIFT: u32 = 16;
const HUMIDITY_MASK: u32 = 0x3FFF;
const STATUS_SHIFT: u32 = 30;

const STATUS_UNAVAILABLE: u32 = 0;
const STATUS_FRESH: u32 = 1;
const STATUS_STALE: u32 = 2;

/// Latest reading shared between the sampler and the node loop.
///
/// The whole reading lives in one 32-bit word so readers never observe a
/// temperature from one sample paired with the humidity of another. There
/// is a single writer; readers may be on any context.
#[derive(Debug)]
pub struct SharedReading {
    word: AtomicU32,
}

impl SharedReading {
    /// Create an empty cell, usable in a `static`
    pub const fn new() -> Self {
        Self {
            word: AtomicU32::new(STATUS_UNAVAILABLE << STATUS_SHIFT),
        }
    }

    /// Publish a fresh reading
    pub fn publish(&self, reading: Reading) {
        self.word
            .store(pack(reading, STATUS_FRESH), Ordering::Release);
    }

    /// Flag the current reading as stale. No-op while unavailable.
    pub fn mark_stale(&self) {
        if let Some(reading) = self.latest().reading() {
            self.word.store(pack(reading, STATUS_STALE), Ordering::Release);
        }
    }

    /// Current value and freshness
    pub fn latest(&self) -> Sample {
        let word = self.word.load(Ordering::Acquire);
        let reading = Reading {
            temperature: (word & TEMPERATURE_MASK) as u16 as i16,
            humidity: ((word >> HUMIDITY_SHIFT) & HUMIDITY_MASK) as u16,
        };
        match word >> STATUS_SHIFT {
            STATUS_FRESH => Sample::Fresh(reading),
            STATUS_STALE => Sample::Stale(reading),
            _ => Sample::Unavailable,
        }
    }

    /// Latest reading regardless of freshness
    pub fn latest_reading(&self) -> Option<Reading> {
        self.latest().reading()
    }
}

impl Default for SharedReading {
    fn default() -> Self {
        Self::new()
    }
}

fn pack(reading: Reading, status: u32) -> u32 {
    (status << STATUS_SHIFT)
        | ((reading.humidity as u32 & HUMIDITY_MASK) << HUMIDITY_SHIFT)
        | (reading.temperature as u16 as u32)
}
