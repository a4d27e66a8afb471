// Standard atmosphere temperature lapse rate, K/m
const LAPSE_RATE: f32 = 0.0065;
// g * M / R, K/m
const BAROMETRIC_EXPONENT_NUMERATOR: f32 = 0.03416;
const KELVIN_OFFSET: f32 = 273.15;

/// Reduces station pressure to sea level with the hypsometric formula.
///
/// `temperature` is the station temperature in °C and `altitude` the station
/// height above sea level in meters. The result has the unit of `pressure`.
pub fn sea_level_pressure(pressure: f32, temperature: f32, altitude: f32) -> f32 {
    let lapse = LAPSE_RATE * altitude;
    let ratio = 1f32 - lapse / (temperature + lapse + KELVIN_OFFSET);
    pressure / ratio.powf(BAROMETRIC_EXPONENT_NUMERATOR / LAPSE_RATE)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sea_level_is_identity() {
        assert_eq!(sea_level_pressure(1006.53, 25.08, 0f32), 1006.53);
    }

    #[test]
    fn correction_raises_pressure() {
        let corrected = sea_level_pressure(980.0, 15.0, 309.0);
        // ~36.5 hPa for 309 m at 15 °C
        assert!(corrected > 1015.0 && corrected < 1018.0, "{}", corrected);
    }

    #[test]
    fn below_sea_level_lowers_pressure() {
        assert!(sea_level_pressure(1013.25, 20.0, -50.0) < 1013.25);
    }
}
