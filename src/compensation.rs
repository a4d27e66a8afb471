//! Fixed-point compensation of raw ADC codes.
//!
//! These are the vendor's integer formulas. Signed right shifts are
//! arithmetic and every intermediate wraps at its declared width, so the
//! results match the reference implementation bit for bit, including for
//! sub-zero temperatures.

use core::num::Wrapping;

use crate::calibration::CalibrationCoefficients;
use crate::sample::{Measurement, RawSample};

/// Upper humidity bound before the final shift, 100 %RH in Q22.10 << 12
const HUMIDITY_MAX: i32 = 419_430_400;

/// Returns the temperature in 0.01 °C together with `t_fine`
pub fn compensate_temperature(adc_t: i32, calib: &CalibrationCoefficients) -> (i32, i32) {
    let adc_t = Wrapping(adc_t);
    let t1 = Wrapping(calib.dig_t1 as i32);
    let t2 = Wrapping(calib.dig_t2 as i32);
    let t3 = Wrapping(calib.dig_t3 as i32);

    let var1 = (((adc_t >> 3) - (t1 << 1)) * t2) >> 11;
    let delta = (adc_t >> 4) - t1;
    let var2 = (((delta * delta) >> 12) * t3) >> 14;

    let t_fine = var1 + var2;
    let temperature = (t_fine * Wrapping(5) + Wrapping(128)) >> 8;

    (temperature.0, t_fine.0)
}

/// Returns the pressure in Pa as Q24.8, e.g. 24674867 is 96386.2 Pa
///
/// `t_fine` must come from the temperature compensation of the same sample.
/// A calibration that zeroes the denominator yields 0.
pub fn compensate_pressure(adc_p: i32, calib: &CalibrationCoefficients, t_fine: i32) -> u32 {
    let p1 = Wrapping(calib.dig_p1 as i64);
    let p2 = Wrapping(calib.dig_p2 as i64);
    let p3 = Wrapping(calib.dig_p3 as i64);
    let p4 = Wrapping(calib.dig_p4 as i64);
    let p5 = Wrapping(calib.dig_p5 as i64);
    let p6 = Wrapping(calib.dig_p6 as i64);
    let p7 = Wrapping(calib.dig_p7 as i64);
    let p8 = Wrapping(calib.dig_p8 as i64);
    let p9 = Wrapping(calib.dig_p9 as i64);

    let mut var1 = Wrapping(t_fine as i64) - Wrapping(128_000);
    let mut var2 = var1 * var1 * p6;
    var2 += (var1 * p5) << 17;
    var2 += p4 << 35;
    var1 = ((var1 * var1 * p3) >> 8) + ((var1 * p2) << 12);
    var1 = ((Wrapping(1i64 << 47) + var1) * p1) >> 33;

    if var1.0 == 0 {
        return 0;
    }

    let mut p = Wrapping(1_048_576) - Wrapping(adc_p as i64);
    p = (((p << 31) - var2) * Wrapping(3125)) / var1;
    var1 = (p9 * (p >> 13) * (p >> 13)) >> 25;
    var2 = (p8 * p) >> 19;
    p = ((p + var1 + var2) >> 8) + (p7 << 4);

    p.0 as u32
}

/// Returns the relative humidity in %RH as Q22.10, e.g. 47445 is 46.333 %RH
///
/// `t_fine` must come from the temperature compensation of the same sample.
/// The result never exceeds 102400 (100 %RH).
pub fn compensate_humidity(adc_h: i32, calib: &CalibrationCoefficients, t_fine: i32) -> u32 {
    let adc_h = Wrapping(adc_h);
    let h1 = Wrapping(calib.dig_h1 as i32);
    let h2 = Wrapping(calib.dig_h2 as i32);
    let h3 = Wrapping(calib.dig_h3 as i32);
    let h4 = Wrapping(calib.dig_h4 as i32);
    let h5 = Wrapping(calib.dig_h5 as i32);
    let h6 = Wrapping(calib.dig_h6 as i32);

    let mut v = Wrapping(t_fine) - Wrapping(76_800);

    let offset = ((adc_h << 14) - (h4 << 20) - (h5 * v) + Wrapping(16_384)) >> 15;
    let scale = ((((((v * h6) >> 10) * (((v * h3) >> 11) + Wrapping(32_768))) >> 10)
        + Wrapping(2_097_152))
        * h2
        + Wrapping(8_192))
        >> 14;
    v = offset * scale;
    v -= ((((v >> 15) * (v >> 15)) >> 7) * h1) >> 4;

    let v = v.0.clamp(0, HUMIDITY_MAX);
    (v >> 12) as u32
}

/// Compensation state for one measurement session.
///
/// Owns the device's coefficients and the `t_fine` produced by the last
/// temperature compensation. Pressure and humidity read that value, so per
/// sample the calls must run as temperature, pressure, humidity. Before the
/// first temperature call `t_fine` is 0 and the other two return defined but
/// physically meaningless values.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CompensationEngine {
    calibration: CalibrationCoefficients,
    t_fine: i32,
}

impl CompensationEngine {
    pub fn new(calibration: CalibrationCoefficients) -> Self {
        Self {
            calibration,
            t_fine: 0,
        }
    }

    pub fn calibration(&self) -> &CalibrationCoefficients {
        &self.calibration
    }

    pub fn t_fine(&self) -> i32 {
        self.t_fine
    }

    /// Temperature in 0.01 °C, updates `t_fine`
    pub fn temperature(&mut self, adc_t: i32) -> i32 {
        let (temperature, t_fine) = compensate_temperature(adc_t, &self.calibration);
        self.t_fine = t_fine;
        temperature
    }

    /// Pressure in Q24.8 Pa
    pub fn pressure(&self, adc_p: i32) -> u32 {
        compensate_pressure(adc_p, &self.calibration, self.t_fine)
    }

    /// Relative humidity in Q22.10 %RH
    pub fn humidity(&self, adc_h: i32) -> u32 {
        compensate_humidity(adc_h, &self.calibration, self.t_fine)
    }

    /// Compensates a whole sample in the required order
    pub fn compensate(&mut self, sample: &RawSample) -> Measurement {
        let temperature = self.temperature(sample.adc_t as i32);
        Measurement {
            temperature,
            pressure: self.pressure(sample.adc_p as i32),
            humidity: self.humidity(sample.adc_h as i32),
        }
    }
}
