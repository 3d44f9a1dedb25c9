use core::fmt::{Debug, Write};

use embedded_hal::blocking::delay::DelayMs;

use super::{Reading, Sensor, SharedReading};
use crate::console;

/// Default time between two samples
pub const DEFAULT_INTERVAL_MS: u32 = 1_000;

/// Periodic sampler publishing into a [`SharedReading`]
pub struct Sampler<'a, S: Sensor> {
    sensor: S,
    shared: &'a SharedReading,
    failures: u32,
    failing: bool,
}

impl<'a, S: Sensor> Sampler<'a, S> {
    /// Create a sampler for `sensor` publishing into `shared`
    pub fn new(sensor: S, shared: &'a SharedReading) -> Self {
        Self {
            sensor,
            shared,
            failures: 0,
            failing: false,
        }
    }

    /// Take one sample. On failure the previous value is kept but marked stale.
    pub fn sample(&mut self) -> Result<Reading, S::Error> {
        match self.sensor.read() {
            Ok(reading) => {
                self.failing = false;
                self.shared.publish(reading);
                Ok(reading)
            }
            Err(e) => {
                self.failing = true;
                self.failures = self.failures.wrapping_add(1);
                self.shared.mark_stale();
                Err(e)
            }
        }
    }

    /// Number of failed sample attempts so far
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Take one sample, logging the first failure of every failure streak
    pub fn sample_logged<L: Write>(&mut self, log: &mut L) -> Option<Reading>
    where
        S::Error: Debug,
    {
        let was_failing = self.failing;
        match self.sample() {
            Ok(reading) => Some(reading),
            Err(e) => {
                if !was_failing {
                    console::line(log, format_args!("WARN: sensor read failed: {:?}", e));
                }
                None
            }
        }
    }

    /// Sample forever, every `interval_ms`
    pub fn run<D, L>(mut self, delay: &mut D, log: &mut L, interval_ms: u32) -> !
    where
        D: DelayMs<u32>,
        L: Write,
        S::Error: Debug,
    {
        loop {
            delay.delay_ms(interval_ms);
            self.sample_logged(log);
        }
    }
}

#[cfg(feature = "std")]
mod thread {
    extern crate std;

    use core::fmt::{Debug, Write};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use embedded_hal::blocking::delay::DelayMs;

    use super::Sampler;
    use crate::sensor::Sensor;

    struct ThreadDelay;

    impl DelayMs<u32> for ThreadDelay {
        fn delay_ms(&mut self, ms: u32) {
            thread::sleep(Duration::from_millis(ms as u64));
        }
    }

    /// Run the sampler on its own thread, logging failures to `log`
    pub fn spawn<S, L>(sampler: Sampler<'static, S>, mut log: L, interval_ms: u32) -> JoinHandle<()>
    where
        S: Sensor + Send + 'static,
        S::Error: Debug,
        L: Write + Send + 'static,
    {
        thread::spawn(move || {
            sampler.run(&mut ThreadDelay, &mut log, interval_ms);
        })
    }
}

#[cfg(feature = "std")]
pub use thread::spawn;
