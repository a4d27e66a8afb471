use crate::error::Result;
use crate::Reading;

mod forced;
pub use forced::Forced;
mod normal;
pub use normal::Normal;
mod single_shot;
pub use single_shot::SingleShot;

pub(crate) const POWER_SLEEP: u8 = 0b00;
pub(crate) const POWER_FORCED: u8 = 0b01;
pub(crate) const POWER_NORMAL: u8 = 0b11;

pub trait Bme280Reader {
    /// Read the sensor readings
    fn read(&mut self) -> Result<Reading>;
}

pub trait Bme280Measure {
    /// Start a conversion without waiting for it
    fn measure(&mut self) -> Result<()>;
}

/// Power state written to ctrl_meas when a mode is configured
pub trait PowerMode {
    fn power_mode(&self) -> u8;
}
