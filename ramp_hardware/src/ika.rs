//! IKA hotplate/stirrer over the NAMUR serial protocol.
//!
//! Commands are ASCII lines terminated by CR LF; the port runs at 9600 baud,
//! 7 data bits, even parity, 1 stop bit.

use std::io::Write;
use std::time::Duration;

use ramp_traits::{DeviceError, Hotplate};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info, trace, warn};

use crate::error::{HwError, Result};
use crate::util::read_response_with_timeout;

const READ_EXTERNAL_SENSOR: &str = "IN_PV_2";
const SET_TEMPERATURE: &str = "OUT_SP_1";
const SET_STIR_RATE: &str = "OUT_SP_4";
const START_HEATING: &str = "START_1";
const STOP_HEATING: &str = "STOP_1";
const START_STIRRING: &str = "START_4";
const STOP_STIRRING: &str = "STOP_4";
const RESET: &str = "RESET";

pub struct IkaHotplate {
    port: Option<Box<dyn SerialPort>>,
    port_name: String,
    read_timeout: Duration,
}

impl IkaHotplate {
    pub fn open(port_name: &str, baud_rate: u32, read_timeout: Duration) -> Result<Self> {
        info!(port = port_name, baud_rate, "opening IKA hotplate");
        let port = serialport::new(port_name, baud_rate)
            .data_bits(DataBits::Seven)
            .parity(Parity::Even)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(50))
            .open()
            .map_err(|e| HwError::Serial(format!("open {port_name}: {e}")))?;
        Ok(Self {
            port: Some(port),
            port_name: port_name.to_string(),
            read_timeout,
        })
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(HwError::NotConnected)
    }

    fn send(&mut self, command: &str) -> Result<()> {
        trace!(port = %self.port_name, command, "namur send");
        let line = format!("{command}\r\n");
        self.port()?.write_all(line.as_bytes())?;
        Ok(())
    }

    fn query(&mut self, command: &str) -> Result<String> {
        self.send(command)?;
        let timeout = self.read_timeout;
        let port = self.port()?;
        let response =
            read_response_with_timeout(port, b'\n', timeout, Duration::from_millis(10))?;
        trace!(command, response = %response, "namur reply");
        Ok(response)
    }
}

impl Hotplate for IkaHotplate {
    fn read_sensor(&mut self) -> std::result::Result<String, DeviceError> {
        Ok(self.query(READ_EXTERNAL_SENSOR)?)
    }

    fn set_target_temperature(&mut self, celsius: i32) -> std::result::Result<(), DeviceError> {
        debug!(celsius, "set target temperature");
        Ok(self.send(&format!("{SET_TEMPERATURE} {celsius}"))?)
    }

    fn set_stir_rate(&mut self, rpm: u32) -> std::result::Result<(), DeviceError> {
        debug!(rpm, "set stir rate");
        Ok(self.send(&format!("{SET_STIR_RATE} {rpm}"))?)
    }

    fn start_heating(&mut self) -> std::result::Result<(), DeviceError> {
        Ok(self.send(START_HEATING)?)
    }

    fn stop_heating(&mut self) -> std::result::Result<(), DeviceError> {
        Ok(self.send(STOP_HEATING)?)
    }

    fn start_stirring(&mut self) -> std::result::Result<(), DeviceError> {
        Ok(self.send(START_STIRRING)?)
    }

    fn stop_stirring(&mut self) -> std::result::Result<(), DeviceError> {
        Ok(self.send(STOP_STIRRING)?)
    }

    fn disconnect(&mut self) -> std::result::Result<(), DeviceError> {
        if self.port.is_none() {
            return Ok(());
        }
        // Return the front panel to local control before closing.
        if let Err(e) = self.send(RESET) {
            warn!(error = %e, "reset before disconnect failed");
        }
        self.port = None;
        info!(port = %self.port_name, "IKA hotplate disconnected");
        Ok(())
    }
}
