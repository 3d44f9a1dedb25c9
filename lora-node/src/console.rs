//! Debug console
//!
//! Log lines are plain `core::fmt` text terminated with `\r\n`, written to
//! whatever [`core::fmt::Write`] sink the node is given. [`Console`] adapts a
//! blocking byte-oriented serial port to that sink. With the `defmt` feature
//! state transitions are mirrored to the defmt logger as well.

use core::fmt;

use embedded_hal::serial;

/// Line-oriented sink over a serial port
pub struct Console<S> {
    serial: S,
}

impl<S> Console<S>
where
    S: serial::Write<u8>,
{
    /// Wrap a serial port
    pub fn new(serial: S) -> Self {
        Self { serial }
    }

    /// Release the serial port
    pub fn release(self) -> S {
        self.serial
    }
}

impl<S> fmt::Write for Console<S>
where
    S: serial::Write<u8>,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            nb::block!(self.serial.write(byte)).map_err(|_| fmt::Error)?;
        }
        nb::block!(self.serial.flush()).map_err(|_| fmt::Error)
    }
}

/// Write one `\r\n`-terminated line. Sink errors are dropped: there is
/// nowhere else to report them.
pub fn line<L: fmt::Write + ?Sized>(log: &mut L, args: fmt::Arguments<'_>) {
    let _ = log.write_fmt(args);
    let _ = log.write_str("\r\n");
}

/// Displays bytes as space-separated lowercase hex pairs
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x} ", byte)?;
        }
        Ok(())
    }
}

/// Mirror a message to defmt when the feature is enabled
macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::info!($($arg)*);
    };
}

pub(crate) use trace;
