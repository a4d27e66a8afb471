use crate::error::{BMEError, Result};
use crate::mode::{Bme280Measure, Bme280Reader, PowerMode, POWER_SLEEP};
use crate::{Reading, BME280};
use embedded_hal::blocking::i2c;

/// Trigger a conversion with `measure`, then `read` once the sensor is done
#[derive(Default, Copy, Clone, Debug)]
pub struct SingleShot {}

impl SingleShot {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {}
    }
}

impl PowerMode for SingleShot {
    fn power_mode(&self) -> u8 {
        POWER_SLEEP
    }
}

pub(crate) fn single_shot_read<Mode, I2C: i2c::WriteRead + i2c::Write>(
    sensor: &mut BME280<Mode, I2C>,
) -> Result<Reading> {
    if sensor.is_measuring()? {
        return Err(BMEError::NotReadyError);
    }

    let sample = sensor.read_raw()?;
    sensor.process_data(sample)
}

impl<I2C> Bme280Reader for BME280<SingleShot, I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Try reading, if the conversion is not done yet then it will return an error
    fn read(&mut self) -> Result<Reading> {
        self.ensure_initialized()?;
        single_shot_read(self)
    }
}

impl<I2C> Bme280Measure for BME280<SingleShot, I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Commence measuring
    fn measure(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.start_forced()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{init_transactions, ADDRESS, BURST};
    use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    #[test]
    fn not_ready_then_ready() {
        let mut transactions = init_transactions(0x24);
        transactions.extend([
            I2cTransaction::write(ADDRESS, vec![0xF4, 0x25]),
            I2cTransaction::write_read(ADDRESS, vec![0xF3], vec![0x08]),
            I2cTransaction::write_read(ADDRESS, vec![0xF3], vec![0x00]),
            I2cTransaction::write_read(ADDRESS, vec![0xF7], BURST.to_vec()),
        ]);
        let i2c = I2cMock::new(&transactions);

        let mut sensor = BME280::new(i2c).with_mode(SingleShot::new());
        sensor.init().unwrap();
        sensor.measure().unwrap();
        assert_eq!(sensor.read().unwrap_err(), BMEError::NotReadyError);

        let reading = sensor.read().unwrap();
        assert!((reading.humidity.unwrap() - 54.997).abs() < 1e-3);

        let mut i2c = sensor.release();
        i2c.done();
    }

    #[test]
    fn measure_before_init() {
        let expectations: [I2cTransaction; 0] = [];
        let i2c = I2cMock::new(&expectations);

        let mut sensor = BME280::new(i2c).with_mode(SingleShot::new());
        assert_eq!(sensor.measure().unwrap_err(), BMEError::Uninitialized);
        assert_eq!(sensor.read().unwrap_err(), BMEError::Uninitialized);

        let mut i2c = sensor.release();
        i2c.done();
    }
}
