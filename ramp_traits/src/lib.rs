pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Error type crossing the device boundary.
pub type DeviceError = Box<dyn std::error::Error + Send + Sync>;

/// A heating magnetic stirrer driven through a vendor protocol.
///
/// Implementations own the connection. Temperatures are whole degrees Celsius
/// on the way in; the sensor reading comes back as the raw device string
/// (e.g. `"25.3 2"`) and is parsed by the caller.
pub trait Hotplate {
    fn read_sensor(&mut self) -> Result<String, DeviceError>;
    fn set_target_temperature(&mut self, celsius: i32) -> Result<(), DeviceError>;
    fn set_stir_rate(&mut self, rpm: u32) -> Result<(), DeviceError>;
    fn start_heating(&mut self) -> Result<(), DeviceError>;
    fn stop_heating(&mut self) -> Result<(), DeviceError>;
    fn start_stirring(&mut self) -> Result<(), DeviceError>;
    fn stop_stirring(&mut self) -> Result<(), DeviceError>;
    fn disconnect(&mut self) -> Result<(), DeviceError>;
}

impl<H: Hotplate + ?Sized> Hotplate for Box<H> {
    fn read_sensor(&mut self) -> Result<String, DeviceError> {
        (**self).read_sensor()
    }
    fn set_target_temperature(&mut self, celsius: i32) -> Result<(), DeviceError> {
        (**self).set_target_temperature(celsius)
    }
    fn set_stir_rate(&mut self, rpm: u32) -> Result<(), DeviceError> {
        (**self).set_stir_rate(rpm)
    }
    fn start_heating(&mut self) -> Result<(), DeviceError> {
        (**self).start_heating()
    }
    fn stop_heating(&mut self) -> Result<(), DeviceError> {
        (**self).stop_heating()
    }
    fn start_stirring(&mut self) -> Result<(), DeviceError> {
        (**self).start_stirring()
    }
    fn stop_stirring(&mut self) -> Result<(), DeviceError> {
        (**self).stop_stirring()
    }
    fn disconnect(&mut self) -> Result<(), DeviceError> {
        (**self).disconnect()
    }
}
