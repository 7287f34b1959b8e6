use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RampError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("device driver unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("device connection error: {0}")]
    DeviceConnection(String),
    #[error("device command error: {0}")]
    DeviceCommand(String),
    #[error("sensor read error: {0}")]
    SensorRead(String),
    #[error("ramp log write error: {0}")]
    LogWrite(String),
    #[error("ramp cancelled")]
    Cancelled,
}

impl RampError {
    /// Device-side failures that a bounded retry may clear.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RampError::DeviceConnection(_) | RampError::DeviceCommand(_) | RampError::SensorRead(_)
        )
    }
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing ramp configuration")]
    MissingRamp,
    #[error("missing ramp log path")]
    MissingLog,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
