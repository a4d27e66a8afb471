use thiserror::Error;

pub type Result<T> = core::result::Result<T, BMEError>;
#[derive(Error, Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub enum BMEError {
    #[error("Write Read I2C Error")]
    WriteReadI2CError,
    #[error("Write I2C Error")]
    WriteI2CError,
    #[error("Device id {found:#x} does not match the expected id {expected:#x}")]
    DeviceIdMismatch { expected: u8, found: u8 },
    #[error("Sensor was read before being initialized")]
    Uninitialized,
    #[error("Measurement is still in progress")]
    NotReadyError,
    #[error("Forced measurement timeout")]
    ReadingTimeoutError,
}
