use crate::error::Result;
use crate::mode::{Bme280Reader, PowerMode, POWER_NORMAL};
use crate::{Reading, BME280};
use embedded_hal::blocking::i2c;

/// Continuous conversions where reading returns the last completed one.
/// The interval is set by the sensor's standby time
#[derive(Default, Copy, Clone, Debug)]
pub struct Normal {}

impl Normal {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {}
    }
}

impl PowerMode for Normal {
    fn power_mode(&self) -> u8 {
        POWER_NORMAL
    }
}

impl<I2C> Bme280Reader for BME280<Normal, I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    fn read(&mut self) -> Result<Reading> {
        self.ensure_initialized()?;
        let sample = self.read_raw()?;
        self.process_data(sample)
    }
}
