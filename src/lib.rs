pub mod altitude;
pub mod calibration;
pub mod compensation;
pub mod error;
pub mod mode;
pub mod sample;

use crate::calibration::{CalibrationCoefficients, CalibrationImage, CALIB_H_START, CALIB_TP_START};
use crate::compensation::CompensationEngine;
use crate::mode::{Forced, PowerMode};
use crate::sample::{RawSample, DATA_LEN, DATA_START};
use embedded_hal::blocking::i2c;
use error::{BMEError, Result};
use log::{debug, trace, warn};
use std::time::Duration;

pub mod prelude {
    pub use super::{
        mode::Bme280Measure, mode::Bme280Reader, mode::Forced, mode::Normal, mode::SingleShot,
        DeviceAddr, Filter, Oversampling, OversamplingSettings, Reading, StandbyTime,
        TemperatureUnit, BME280,
    };
}

const CHIP_ID: u8 = 0x60;

const REG_CHIP_ID: u8 = 0xD0;
const REG_RESET: u8 = 0xE0;
const REG_CTRL_HUM: u8 = 0xF2;
const REG_STATUS: u8 = 0xF3;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_CONFIG: u8 = 0xF5;

const SOFT_RESET: u8 = 0xB6;
// Status bit set while a conversion is running
const STATUS_MEASURING: u8 = 0x08;

/// The temperature, pressure and humidity sensor
#[derive(Copy, Clone, Debug)]
pub struct BME280<Mode, I2C> {
    mode: Mode,
    i2c: I2C,
    address: u8,
    unit: TemperatureUnit,
    oversampling: OversamplingSettings,
    filter: Filter,
    standby: StandbyTime,
    altitude: Option<f32>,
    engine: Option<CompensationEngine>,
}

/// Represents the reading gotten from the sensor.
/// A channel configured as `Oversampling::Skipped` reads as `None`; pressure and
/// humidity also need the temperature channel
#[derive(Default, Clone, Copy, Debug)]
pub struct Reading {
    pub temperature: Option<f32>,
    /// Station pressure in hPa
    pub pressure: Option<f32>,
    /// Relative humidity in %
    pub humidity: Option<f32>,
    /// Pressure reduced to sea level in hPa, only when an altitude is set
    pub sea_level_pressure: Option<f32>,
}

/// The two supported I2C addresses, selected by the SDO pin
#[allow(dead_code)]
#[derive(Default, Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub enum DeviceAddr {
    #[default]
    AD0 = 0x76,
    AD1 = 0x77,
}

/// Influences what the reading temperature numbers are
#[allow(dead_code)]
#[derive(Default, Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// Oversampling of a single channel, higher is less noisy but slower.
/// A skipped channel is not measured at all and its data registers keep the
/// reset value, so the matching `Reading` field is `None`
#[allow(dead_code)]
#[derive(Default, Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub enum Oversampling {
    Skipped = 0b000,
    #[default]
    X1 = 0b001,
    X2 = 0b010,
    X4 = 0b011,
    X8 = 0b100,
    X16 = 0b101,
}

#[derive(Default, Copy, Clone, Debug, Eq, PartialEq)]
pub struct OversamplingSettings {
    pub temperature: Oversampling,
    pub pressure: Oversampling,
    pub humidity: Oversampling,
}

impl Oversampling {
    /// Number of samples averaged per conversion
    pub fn samples(self) -> u32 {
        match self {
            Oversampling::Skipped => 0,
            Oversampling::X1 => 1,
            Oversampling::X2 => 2,
            Oversampling::X4 => 4,
            Oversampling::X8 => 8,
            Oversampling::X16 => 16,
        }
    }
}

impl OversamplingSettings {
    /// Maximum duration of one conversion in microseconds, datasheet t_measure,max
    pub fn max_measurement_time_us(&self) -> u32 {
        let mut time = 1250 + 2300 * self.temperature.samples();
        // Pressure and humidity each add a fixed 575 us when enabled
        for channel in [self.pressure, self.humidity] {
            if channel != Oversampling::Skipped {
                time += 2300 * channel.samples() + 575;
            }
        }
        time
    }
}

/// IIR filter coefficient
#[allow(dead_code)]
#[derive(Default, Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub enum Filter {
    #[default]
    Off = 0b000,
    X2 = 0b001,
    X4 = 0b010,
    X8 = 0b011,
    X16 = 0b100,
}

/// Inactive time between two conversions in normal mode
#[allow(dead_code)]
#[derive(Default, Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub enum StandbyTime {
    #[default]
    Ms0_5 = 0b000,
    Ms62_5 = 0b001,
    Ms125 = 0b010,
    Ms250 = 0b011,
    Ms500 = 0b100,
    Ms1000 = 0b101,
    Ms10 = 0b110,
    Ms20 = 0b111,
}

impl<Mode, I2C> BME280<Mode, I2C> {
    fn ctrl_meas(&self, power_mode: u8) -> u8 {
        (self.oversampling.temperature as u8) << 5
            | (self.oversampling.pressure as u8) << 2
            | power_mode
    }

    fn config(&self) -> u8 {
        (self.standby as u8) << 5 | (self.filter as u8) << 2
    }

    fn process_data(&mut self, sample: RawSample) -> Result<Reading> {
        let engine = self.engine.as_mut().ok_or(BMEError::Uninitialized)?;
        let measurement = engine.compensate(&sample);

        if measurement.pressure == 0 && self.oversampling.pressure != Oversampling::Skipped {
            warn!("Pressure compensation hit a zero denominator, check the calibration");
        }

        let has_temperature = self.oversampling.temperature != Oversampling::Skipped;
        let has_pressure = has_temperature && self.oversampling.pressure != Oversampling::Skipped;
        let has_humidity = has_temperature && self.oversampling.humidity != Oversampling::Skipped;

        let temperature = has_temperature.then(|| match self.unit {
            TemperatureUnit::Celsius => measurement.celsius(),
            TemperatureUnit::Fahrenheit => measurement.fahrenheit(),
        });
        let pressure = has_pressure.then(|| measurement.hectopascal());
        let sea_level_pressure = pressure.zip(self.altitude).map(|(pressure, altitude)| {
            altitude::sea_level_pressure(pressure, measurement.celsius(), altitude)
        });

        Ok(Reading {
            temperature,
            pressure,
            humidity: has_humidity.then(|| measurement.relative_humidity()),
            sea_level_pressure,
        })
    }
}

#[allow(dead_code)]
impl<I2C> BME280<Forced, I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Create a new sensor, nothing is sent until `init` is called
    pub fn new(i2c: I2C) -> Self {
        Self {
            mode: Forced::new(),
            i2c,
            address: DeviceAddr::default() as u8,
            unit: TemperatureUnit::default(),
            oversampling: OversamplingSettings::default(),
            filter: Filter::default(),
            standby: StandbyTime::default(),
            altitude: None,
            engine: None,
        }
    }
}

#[allow(dead_code)]
impl<Mode, I2C> BME280<Mode, I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Changes the BME280 mode, call `configure` afterwards to apply it
    pub fn with_mode<NewMode>(self, mode: NewMode) -> BME280<NewMode, I2C> {
        BME280 {
            mode,
            i2c: self.i2c,
            address: self.address,
            unit: self.unit,
            oversampling: self.oversampling,
            filter: self.filter,
            standby: self.standby,
            altitude: self.altitude,
            engine: self.engine,
        }
    }

    /// Change the sensor's temperature unit
    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
    }

    /// Change the sensor's temperature unit
    pub fn with_unit(mut self, unit: TemperatureUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Change the oversampling, which also influences how long a conversion takes
    pub fn set_oversampling(&mut self, oversampling: OversamplingSettings) {
        self.oversampling = oversampling;
    }

    /// Change the oversampling, which also influences how long a conversion takes
    pub fn with_oversampling(mut self, oversampling: OversamplingSettings) -> Self {
        self.oversampling = oversampling;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_standby(mut self, standby: StandbyTime) -> Self {
        self.standby = standby;
        self
    }

    /// Station altitude in meters, enables the sea level pressure
    pub fn set_altitude(&mut self, altitude: Option<f32>) {
        self.altitude = altitude;
    }

    /// Station altitude in meters, enables the sea level pressure
    pub fn with_altitude(mut self, altitude: f32) -> Self {
        self.altitude = Some(altitude);
        self
    }

    /// Change the sensor's I2C address
    pub fn with_address(mut self, address: DeviceAddr) -> Self {
        self.address = address as u8;
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Calibration loaded by `init`
    pub fn calibration(&self) -> Option<&CalibrationCoefficients> {
        self.engine.as_ref().map(CompensationEngine::calibration)
    }

    /// Gives the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn i2c_write(&mut self, bytes: &[u8]) -> Result<()> {
        match self.i2c.write(self.address, bytes) {
            Ok(res) => Ok(res),
            Err(_) => Err(BMEError::WriteI2CError),
        }
    }

    fn i2c_read(&mut self, bytes: &[u8], buffer: &mut [u8]) -> Result<()> {
        match self.i2c.write_read(self.address, bytes, buffer) {
            Ok(res) => Ok(res),
            Err(_) => Err(BMEError::WriteReadI2CError),
        }
    }

    fn read_register(&mut self, register: u8) -> Result<u8> {
        let mut buffer = [0; 1];
        self.i2c_read(&[register], &mut buffer)?;
        Ok(buffer[0])
    }

    pub fn chip_id(&mut self) -> Result<u8> {
        self.read_register(REG_CHIP_ID)
    }

    /// Resets every register to its power-on value, `init` has to run again
    pub fn soft_reset(&mut self) -> Result<()> {
        self.i2c_write(&[REG_RESET, SOFT_RESET])?;
        self.engine = None;
        Ok(())
    }

    /// Whether a conversion is currently running
    pub fn is_measuring(&mut self) -> Result<bool> {
        let status = self.read_register(REG_STATUS)?;
        Ok((status & STATUS_MEASURING) != 0)
    }

    /// Reads both calibration blocks and decodes them
    pub fn read_calibration(&mut self) -> Result<CalibrationCoefficients> {
        let mut image = CalibrationImage::default();
        self.i2c_read(&[CALIB_TP_START], &mut image.tp)?;
        self.i2c_read(&[CALIB_H_START], &mut image.h)?;

        let calibration = image.decode();
        debug!("Loaded calibration {:?}", calibration);
        Ok(calibration)
    }

    /// Reads the uncompensated ADC codes of the last conversion
    pub fn read_raw(&mut self) -> Result<RawSample> {
        let mut buffer = [0; DATA_LEN];
        self.i2c_read(&[DATA_START], &mut buffer)?;

        let sample = RawSample::from_burst(buffer);
        trace!("Raw sample {:?}", sample);
        Ok(sample)
    }

    /// Worst case duration of one conversion with the current oversampling
    pub fn max_measurement_time(&self) -> Duration {
        Duration::from_micros(self.oversampling.max_measurement_time_us() as u64)
    }

    fn ensure_initialized(&self) -> Result<()> {
        match self.engine {
            Some(_) => Ok(()),
            None => Err(BMEError::Uninitialized),
        }
    }

    /// Triggers a single conversion, the sensor returns to sleep when done
    fn start_forced(&mut self) -> Result<()> {
        let ctrl_meas = self.ctrl_meas(mode::POWER_FORCED);
        self.i2c_write(&[REG_CTRL_MEAS, ctrl_meas])
    }
}

#[allow(dead_code)]
impl<Mode, I2C> BME280<Mode, I2C>
where
    Mode: PowerMode,
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Checks the chip id, loads the calibration and writes the configuration
    pub fn init(&mut self) -> Result<()> {
        let found = self.chip_id()?;
        if found != CHIP_ID {
            return Err(BMEError::DeviceIdMismatch {
                expected: CHIP_ID,
                found,
            });
        }
        debug!("BME280 found at {:#x}", self.address);

        let calibration = self.read_calibration()?;
        self.engine = Some(CompensationEngine::new(calibration));
        self.configure()
    }

    /// Writes oversampling, filter, standby and the mode's power state.
    /// The sensor is put to sleep first since config writes in normal mode may be
    /// ignored, and ctrl_hum only takes effect after the ctrl_meas write
    pub fn configure(&mut self) -> Result<()> {
        let sleep = self.ctrl_meas(mode::POWER_SLEEP);
        self.i2c_write(&[REG_CTRL_MEAS, sleep])?;
        self.i2c_write(&[REG_CTRL_HUM, self.oversampling.humidity as u8])?;
        self.i2c_write(&[REG_CONFIG, self.config()])?;
        let ctrl_meas = self.ctrl_meas(self.mode.power_mode());
        self.i2c_write(&[REG_CTRL_MEAS, ctrl_meas])
    }
}
