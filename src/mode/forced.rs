use crate::error::{BMEError, Result};
use crate::mode::single_shot::single_shot_read;
use crate::mode::{Bme280Reader, PowerMode, POWER_SLEEP};
use crate::{Reading, BME280};
use embedded_hal::blocking::i2c;
use log::debug;
use std::thread::sleep;
use std::time::Duration;

/// A simple reading that triggers a conversion and blocks until it is done
#[derive(Copy, Clone, Debug)]
pub struct Forced {
    max_retries: u8,
    ms_delay: u64,
}

impl Default for Forced {
    fn default() -> Self {
        Self::new()
    }
}

impl Forced {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {
            max_retries: 8,
            ms_delay: 10,
        }
    }
    /// Sets the max number of status polls before giving up
    pub fn set_max_retries(&mut self, max_retries: u8) {
        self.max_retries = max_retries
    }
    /// Sets the max number of status polls before giving up
    pub fn with_max_retries(mut self, max_retries: u8) -> Self {
        self.set_max_retries(max_retries);
        self
    }
    /// Sets the millisecond delay between each poll
    pub fn set_delay(&mut self, ms_delay: u64) {
        self.ms_delay = ms_delay
    }
    /// Sets the millisecond delay between each poll
    pub fn with_delay(mut self, ms_delay: u64) -> Self {
        self.set_delay(ms_delay);
        self
    }
}

impl PowerMode for Forced {
    /// The sensor sleeps between forced conversions
    fn power_mode(&self) -> u8 {
        POWER_SLEEP
    }
}

impl<I2C> Bme280Reader for BME280<Forced, I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Triggers a conversion, waits out its worst case duration, then polls until
    /// either it completes or the retries run out
    fn read(&mut self) -> Result<Reading> {
        self.ensure_initialized()?;
        self.start_forced()?;

        // The measuring bit is not set immediately after the trigger
        sleep(self.max_measurement_time());

        for attempt in 0..self.mode.max_retries {
            match single_shot_read(self) {
                Err(BMEError::NotReadyError) => {
                    debug!("Conversion still running after {} polls", attempt + 1);
                    sleep(Duration::from_millis(self.mode.ms_delay))
                }
                reading => return reading,
            }
        }
        Err(BMEError::ReadingTimeoutError)
    }
}
