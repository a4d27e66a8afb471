/// First register of the 8-byte data burst (press_msb)
pub const DATA_START: u8 = 0xF7;
pub const DATA_LEN: usize = 8;

/// Uncompensated ADC codes of one conversion
#[derive(Default, Copy, Clone, Debug, Eq, PartialEq)]
pub struct RawSample {
    /// 20-bit temperature code
    pub adc_t: u32,
    /// 20-bit pressure code
    pub adc_p: u32,
    /// 16-bit humidity code
    pub adc_h: u32,
}

/// Joins msb, lsb and the top nibble of xlsb into a 20-bit code
fn merge_20bit(msb: u8, lsb: u8, xlsb: u8) -> u32 {
    (msb as u32) << 12 | (lsb as u32) << 4 | (xlsb as u32) >> 4
}

fn merge_bytes(msb: u8, lsb: u8) -> u32 {
    (msb as u32) << 8 | lsb as u32
}

impl RawSample {
    /// Decodes the burst read of 0xF7..=0xFE
    pub fn from_burst(buffer: [u8; DATA_LEN]) -> Self {
        Self {
            adc_p: merge_20bit(buffer[0], buffer[1], buffer[2]),
            adc_t: merge_20bit(buffer[3], buffer[4], buffer[5]),
            adc_h: merge_bytes(buffer[6], buffer[7]),
        }
    }
}

/// Compensated values in the sensor's fixed-point units
#[derive(Default, Copy, Clone, Debug, Eq, PartialEq)]
pub struct Measurement {
    /// 0.01 °C
    pub temperature: i32,
    /// Q24.8 Pa
    pub pressure: u32,
    /// Q22.10 %RH
    pub humidity: u32,
}

impl Measurement {
    pub fn celsius(&self) -> f32 {
        self.temperature as f32 / 100f32
    }

    pub fn fahrenheit(&self) -> f32 {
        self.celsius() * 9f32 / 5f32 + 32f32
    }

    pub fn pascal(&self) -> f32 {
        self.pressure as f32 / 256f32
    }

    pub fn hectopascal(&self) -> f32 {
        self.pascal() / 100f32
    }

    pub fn relative_humidity(&self) -> f32 {
        self.humidity as f32 / 1024f32
    }
}
