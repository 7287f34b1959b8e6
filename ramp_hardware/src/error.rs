use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("serial error: {0}")]
    Serial(String),
    #[error("device not connected")]
    NotConnected,
    #[error("device read timeout")]
    Timeout,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "hardware")]
impl From<serialport::Error> for HwError {
    fn from(e: serialport::Error) -> Self {
        HwError::Serial(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HwError>;
