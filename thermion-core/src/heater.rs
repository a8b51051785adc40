//! Heater controller
//!
//! The PCB heater is driven by the MSP430 payload controller, which
//! exposes it as a small register block: mode, PID setpoint, PWM power
//! level and a reset command. No heater state is cached here; every
//! query and command round-trips to the hardware.
//!
//! All heater writes are best-effort: a bus failure is logged and
//! swallowed, so the off-on-exit guarantee of a heating session cannot
//! itself fail. Reads collapse failures to `Unknown` / `None` / NaN.

use std::fmt;

use log::{debug, info, warn};

use thermion_hal::{BusAddr, BusReg, ByteOrder, RegisterBus};

use crate::convert::{adc_val_to_temp, temp_to_adc_val, ADC_RESOLUTION};
use crate::sensor::MSP430_I2C_ADDR;

const REG_READ_HEATER_MODE: BusReg = BusReg(0x20);
const REG_READ_TARGET_TEMP: BusReg = BusReg(0x21);
const REG_READ_PWM_LEVEL: BusReg = BusReg(0x23);
const REG_WRITE_HEATER_MODE: BusReg = BusReg(0x40);
const REG_WRITE_TARGET_TEMP: BusReg = BusReg(0x41);
const REG_WRITE_TARGET_SENSOR: BusReg = BusReg(0x42);
const REG_WRITE_PWM_LEVEL: BusReg = BusReg(0x43);
const REG_RESET: BusReg = BusReg(0x50);

/// Logical heater state
///
/// `Unknown` is a read-side diagnostic only: it is returned for an
/// unreadable or unrecognised device state and never written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum HeaterMode {
    Off = 0x00,
    /// Hardware closed-loop to the target setpoint
    Pid = 0x01,
    /// Fixed duty open-loop
    Pwm = 0x02,
    Unknown = 0xFF,
}

impl HeaterMode {
    /// Map a raw mode register value, collapsing anything unrecognised
    /// to `Unknown`
    pub fn from_raw(raw: u16) -> HeaterMode {
        match raw {
            0x00 => HeaterMode::Off,
            0x01 => HeaterMode::Pid,
            0x02 => HeaterMode::Pwm,
            _ => HeaterMode::Unknown,
        }
    }
}

impl fmt::Display for HeaterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaterMode::Off => write!(f, "OFF"),
            HeaterMode::Pid => write!(f, "PID"),
            HeaterMode::Pwm => write!(f, "PWM"),
            HeaterMode::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// View over the heater register block of one controller
///
/// Borrow it from the board for the duration of an operation; it holds
/// no state of its own.
pub struct Heater<'b, B> {
    bus: &'b B,
}

impl<'b, B: RegisterBus> Heater<'b, B> {
    pub fn new(bus: &'b B) -> Self {
        Heater { bus }
    }

    /// Current heater mode; `Unknown` when unreadable or unrecognised
    pub fn mode(&self) -> HeaterMode {
        debug!("Reading heater mode");
        match self
            .bus
            .read_u16(MSP430_I2C_ADDR, REG_READ_HEATER_MODE, ByteOrder::LittleEndian)
        {
            Ok(raw) => HeaterMode::from_raw(raw),
            Err(e) => {
                warn!("Could not read heater mode: {}", e);
                HeaterMode::Unknown
            }
        }
    }

    /// Set the heater mode; `Unknown` is refused
    pub fn set_mode(&self, mode: HeaterMode) {
        if mode == HeaterMode::Unknown {
            warn!("Refusing to write UNKNOWN heater mode");
            return;
        }
        info!("Setting heater mode to {} ({:#04x})", mode, mode as u16);
        if let Err(e) = self.bus.write_u16(
            MSP430_I2C_ADDR,
            REG_WRITE_HEATER_MODE,
            mode as u16,
            ByteOrder::LittleEndian,
        ) {
            warn!("Could not set heater mode: {}", e);
        }
    }

    /// Current PWM power level; `None` when unreadable (distinct from a
    /// legitimate 0)
    pub fn power_level(&self) -> Option<u16> {
        debug!("Reading heater power level");
        match self
            .bus
            .read_u16(MSP430_I2C_ADDR, REG_READ_PWM_LEVEL, ByteOrder::LittleEndian)
        {
            Ok(level) => Some(level),
            Err(e) => {
                warn!("Could not read heater power level: {}", e);
                None
            }
        }
    }

    /// Set the PWM power level (0-255); no client-side clamping, the
    /// hardware ignores out-of-range values
    pub fn set_power_level(&self, level: u8) {
        info!("Setting heater power level to {}", level);
        if let Err(e) = self.bus.write_u16(
            MSP430_I2C_ADDR,
            REG_WRITE_PWM_LEVEL,
            u16::from(level),
            ByteOrder::LittleEndian,
        ) {
            warn!("Could not set heater power level: {}", e);
        }
    }

    /// Current PID setpoint in degrees Celsius; NaN when unreadable or
    /// no valid setpoint is armed
    pub fn target_temp(&self) -> f32 {
        match self
            .bus
            .read_u16(MSP430_I2C_ADDR, REG_READ_TARGET_TEMP, ByteOrder::LittleEndian)
        {
            Ok(adc_val) => adc_val_to_temp(adc_val, ADC_RESOLUTION),
            Err(e) => {
                warn!("Could not read heater target temperature: {}", e);
                f32::NAN
            }
        }
    }

    /// Arm the PID setpoint
    ///
    /// A temperature outside the thermistor's rated band encodes to the
    /// 0 sentinel and is not written.
    pub fn set_target_temp(&self, temp: f32) {
        let adc_val = temp_to_adc_val(temp);
        if adc_val == 0 {
            warn!("Target temperature {:.2} outside rated band, not arming", temp);
            return;
        }
        info!("Setting heater setpoint to {:.2} (ADC value: {})", temp, adc_val);
        if let Err(e) = self.bus.write_u16(
            MSP430_I2C_ADDR,
            REG_WRITE_TARGET_TEMP,
            adc_val,
            ByteOrder::LittleEndian,
        ) {
            warn!("Could not set heater target temperature: {}", e);
        }
    }

    /// Select which MSP430 ADC input the PID loop reads
    pub fn set_target_sensor(&self, input: u8) {
        info!("Setting heater target sensor to input {}", input);
        if let Err(e) = self.bus.write_u16(
            MSP430_I2C_ADDR,
            REG_WRITE_TARGET_SENSOR,
            u16::from(input),
            ByteOrder::LittleEndian,
        ) {
            warn!("Could not set heater target sensor: {}", e);
        }
    }

    /// Reset the payload controller; fire-and-forget
    pub fn reset(&self) {
        info!("Sending reset command");
        if let Err(e) =
            self.bus
                .write_u16(MSP430_I2C_ADDR, REG_RESET, 0, ByteOrder::LittleEndian)
        {
            warn!("Could not send reset command: {}", e);
        }
    }
}
