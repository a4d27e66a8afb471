//! Factory calibration coefficients and their register layout.
//!
//! The coefficients live in two non-volatile blocks, 0x88..=0xA1 and
//! 0xE1..=0xE7. Decoding is infallible: whatever bytes the bus delivered are
//! turned into coefficients as-is.

/// First register of the temperature/pressure block (dig_T1 LSB)
pub const CALIB_TP_START: u8 = 0x88;
/// Length of the 0x88..=0xA1 block, dig_H1 included
pub const CALIB_TP_LEN: usize = 26;
/// First register of the humidity block (dig_H2 LSB)
pub const CALIB_H_START: u8 = 0xE1;
pub const CALIB_H_LEN: usize = 7;

const DIG_T1: u8 = 0x88;
const DIG_T2: u8 = 0x8A;
const DIG_T3: u8 = 0x8C;
const DIG_P1: u8 = 0x8E;
const DIG_H1: u8 = 0xA1;
const DIG_H2: u8 = 0xE1;
const DIG_H3: u8 = 0xE3;
const DIG_E4: u8 = 0xE4;
const DIG_E5: u8 = 0xE5;
const DIG_E6: u8 = 0xE6;
const DIG_H6: u8 = 0xE7;

/// Capability to read sensor registers by address.
pub trait ByteReader {
    fn read_byte(&mut self, register: u8) -> u8;

    /// Reads two consecutive registers as a little-endian word
    fn read_word(&mut self, register: u8) -> u16 {
        let lsb = self.read_byte(register);
        let msb = self.read_byte(register.wrapping_add(1));
        u16::from_le_bytes([lsb, msb])
    }
}

impl<F> ByteReader for F
where
    F: FnMut(u8) -> u8,
{
    fn read_byte(&mut self, register: u8) -> u8 {
        self(register)
    }
}

/// The sensor's factory trimming parameters
#[derive(Default, Copy, Clone, Debug, Eq, PartialEq)]
pub struct CalibrationCoefficients {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,

    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,

    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

/// Packs dig_H4 from 0xE4 (bits 11:4) and the low nibble of 0xE5
pub fn pack_h4(e4: u8, e5: u8) -> i16 {
    ((e4 as i8 as i16) << 4) | (e5 & 0x0F) as i16
}

/// Packs dig_H5 from the high nibble of 0xE5 and 0xE6 (bits 11:4)
pub fn pack_h5(e5: u8, e6: u8) -> i16 {
    ((e5 >> 4) as i16) | ((e6 as i8 as i16) << 4)
}

/// Decodes the full coefficient set from the calibration registers
pub fn decode<R: ByteReader + ?Sized>(reader: &mut R) -> CalibrationCoefficients {
    // dig_P1..dig_P9 are consecutive words starting at 0x8E
    let mut pressure = [0u16; 9];
    for (i, word) in pressure.iter_mut().enumerate() {
        *word = reader.read_word(DIG_P1 + 2 * i as u8);
    }

    let e4 = reader.read_byte(DIG_E4);
    let e5 = reader.read_byte(DIG_E5);
    let e6 = reader.read_byte(DIG_E6);

    CalibrationCoefficients {
        dig_t1: reader.read_word(DIG_T1),
        dig_t2: reader.read_word(DIG_T2) as i16,
        dig_t3: reader.read_word(DIG_T3) as i16,

        dig_p1: pressure[0],
        dig_p2: pressure[1] as i16,
        dig_p3: pressure[2] as i16,
        dig_p4: pressure[3] as i16,
        dig_p5: pressure[4] as i16,
        dig_p6: pressure[5] as i16,
        dig_p7: pressure[6] as i16,
        dig_p8: pressure[7] as i16,
        dig_p9: pressure[8] as i16,

        dig_h1: reader.read_byte(DIG_H1),
        dig_h2: reader.read_word(DIG_H2) as i16,
        dig_h3: reader.read_byte(DIG_H3),
        dig_h4: pack_h4(e4, e5),
        dig_h5: pack_h5(e5, e6),
        dig_h6: reader.read_byte(DIG_H6) as i8,
    }
}

/// Raw copy of both calibration blocks as read off the bus
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CalibrationImage {
    pub tp: [u8; CALIB_TP_LEN],
    pub h: [u8; CALIB_H_LEN],
}

impl Default for CalibrationImage {
    fn default() -> Self {
        Self {
            tp: [0; CALIB_TP_LEN],
            h: [0; CALIB_H_LEN],
        }
    }
}

impl CalibrationImage {
    pub fn decode(&self) -> CalibrationCoefficients {
        let mut image = *self;
        decode(&mut image)
    }
}

impl ByteReader for CalibrationImage {
    /// Registers outside the two blocks read as zero
    fn read_byte(&mut self, register: u8) -> u8 {
        let tp_offset = register.wrapping_sub(CALIB_TP_START) as usize;
        let h_offset = register.wrapping_sub(CALIB_H_START) as usize;

        if tp_offset < CALIB_TP_LEN {
            self.tp[tp_offset]
        } else if h_offset < CALIB_H_LEN {
            self.h[h_offset]
        } else {
            0
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use rstest::rstest;

    /// Worked example from the Bosch datasheet, humidity from a typical part
    pub(crate) fn datasheet_coefficients() -> CalibrationCoefficients {
        CalibrationCoefficients {
            dig_t1: 27504,
            dig_t2: 26435,
            dig_t3: -1000,
            dig_p1: 36477,
            dig_p2: -10685,
            dig_p3: 3024,
            dig_p4: 2855,
            dig_p5: 140,
            dig_p6: -7,
            dig_p7: 15500,
            dig_p8: -14600,
            dig_p9: 6000,
            dig_h1: 75,
            dig_h2: 362,
            dig_h3: 0,
            dig_h4: 313,
            dig_h5: 50,
            dig_h6: 30,
        }
    }

    /// Register image that decodes to `datasheet_coefficients`
    pub(crate) fn datasheet_image() -> CalibrationImage {
        let words: [u16; 12] = [
            27504,
            26435,
            -1000i16 as u16,
            36477,
            -10685i16 as u16,
            3024,
            2855,
            140,
            -7i16 as u16,
            15500,
            -14600i16 as u16,
            6000,
        ];
        let mut image = CalibrationImage::default();
        for (i, word) in words.iter().enumerate() {
            let [lsb, msb] = word.to_le_bytes();
            image.tp[2 * i] = lsb;
            image.tp[2 * i + 1] = msb;
        }
        // 0xA0 is reserved, 0xA1 is dig_H1
        image.tp[25] = 75;

        // dig_H4 = 313 = 0x139, dig_H5 = 50 = 0x032
        image.h = [0x6A, 0x01, 0x00, 0x13, 0x29, 0x03, 30];
        image
    }

    #[test]
    fn humidity_packing() {
        assert_eq!(pack_h4(0x12, 0x3A), 0x12A);
        assert_eq!(pack_h5(0x3A, 0x04), 0x43);
    }

    #[rstest]
    #[case(0x00, 0x00, 0)]
    #[case(0x7F, 0x0F, 0x7FF)]
    #[case(0xFF, 0x0F, -1)]
    #[case(0xF0, 0x05, -251)]
    fn h4_sign_extends(#[case] e4: u8, #[case] e5: u8, #[case] expected: i16) {
        assert_eq!(pack_h4(e4, e5), expected);
    }

    #[rstest]
    #[case(0x30, 0x03, 0x33)]
    #[case(0xF0, 0x7F, 0x7FF)]
    #[case(0x00, 0x80, -2048)]
    fn h5_sign_extends(#[case] e5: u8, #[case] e6: u8, #[case] expected: i16) {
        assert_eq!(pack_h5(e5, e6), expected);
    }

    #[test]
    fn shared_nibble_register() {
        // 0xE5 feeds both coefficients, low nibble to H4 and high nibble to H5
        let mut registers = |register: u8| match register {
            0xE4 => 0x12,
            0xE5 => 0x3A,
            0xE6 => 0x04,
            _ => 0,
        };
        let calib = decode(&mut registers);
        assert_eq!(calib.dig_h4, 0x12A);
        assert_eq!(calib.dig_h5, 0x43);
    }

    #[test]
    fn little_endian_words() {
        let mut registers = |register: u8| match register {
            0x88 => 0x70,
            0x89 => 0x6B,
            0x8A => 0x43,
            0x8B => 0x67,
            0x8C => 0x18,
            0x8D => 0xFC,
            _ => 0,
        };
        let calib = decode(&mut registers);
        assert_eq!(calib.dig_t1, 27504);
        assert_eq!(calib.dig_t2, 26435);
        assert_eq!(calib.dig_t3, -1000);
    }

    #[test]
    fn decode_image() {
        assert_eq!(datasheet_image().decode(), datasheet_coefficients());
    }

    #[test]
    fn image_out_of_range_reads_zero() {
        let mut image = CalibrationImage {
            tp: [0xAA; CALIB_TP_LEN],
            h: [0xBB; CALIB_H_LEN],
        };
        assert_eq!(image.read_byte(0x87), 0);
        assert_eq!(image.read_byte(0x88), 0xAA);
        assert_eq!(image.read_byte(0xA1), 0xAA);
        assert_eq!(image.read_byte(0xA2), 0);
        assert_eq!(image.read_byte(0xE1), 0xBB);
        assert_eq!(image.read_byte(0xE7), 0xBB);
        assert_eq!(image.read_byte(0xE8), 0);
    }
}
