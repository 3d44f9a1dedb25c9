use embedded_hal::blocking::{
    delay::DelayMs,
    i2c::{Read, Write},
};

use super::{Reading, Sensor};

/// 7-bit bus address (0x80 in 8-bit notation)
pub const HDC1510_ADDR: u8 = 0x40;

// HDC1510 Register Map
const REG_TEMPERATURE: u8 = 0x00;

/// Conversion time for a combined temperature + humidity measurement
const CONVERSION_TIME_MS: u32 = 50;

/// Possible errors in sensor operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError<E> {
    /// I2C transfer error
    Bus(E),
    /// Bus answered with all-zero bytes (-40.00 degC at 0 %)
    Implausible,
}

/// HDC1510 temperature and humidity sensor
pub struct Hdc1510<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D, E> Hdc1510<I2C, D>
where
    I2C: Write<Error = E> + Read<Error = E>,
    D: DelayMs<u32>,
{
    /// Create a driver on the default address
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, HDC1510_ADDR)
    }

    /// Create a driver on a custom address
    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Self { i2c, delay, address }
    }

    /// Trigger a measurement and read back both channels
    pub fn measure(&mut self) -> Result<Reading, SensorError<E>> {
        // Pointing at the temperature register starts a conversion of both
        // channels; the result is read back in one 4-byte burst.
        self.i2c
            .write(self.address, &[REG_TEMPERATURE])
            .map_err(SensorError::Bus)?;
        self.delay.delay_ms(CONVERSION_TIME_MS);

        let mut raw = [0u8; 4];
        self.i2c
            .read(self.address, &mut raw)
            .map_err(SensorError::Bus)?;

        if raw == [0; 4] {
            return Err(SensorError::Implausible);
        }

        let temperature = u16::from_be_bytes([raw[0], raw[1]]);
        let humidity = u16::from_be_bytes([raw[2], raw[3]]);
        Ok(Reading::from_raw(temperature, humidity))
    }

    /// Release the bus and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C, D, E> Sensor for Hdc1510<I2C, D>
where
    I2C: Write<Error = E> + Read<Error = E>,
    D: DelayMs<u32>,
{
    type Error = SensorError<E>;

    fn read(&mut self) -> Result<Reading, Self::Error> {
        self.measure()
    }
}
