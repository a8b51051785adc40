//! Sensor model
//!
//! One `Sensor` descriptor covers three unrelated wire protocols plus a
//! raw passthrough; the interface tag selects the decode path. All
//! reads collapse bus and conversion failures to NaN here, at the
//! boundary, so callers batch-reading a roster never see an error type.

use std::fmt;

use log::{debug, warn};

use thermion_hal::{BusAddr, BusReg, ByteOrder, RegisterBus};

use crate::convert::{adc_val_to_temp, round_reading, ADC_RESOLUTION};

/// MSP430 payload controller: ADC thermistor inputs and heater block
pub(crate) const MSP430_I2C_ADDR: BusAddr = BusAddr(0x08);

/// ADS7828 mux ADC (board v2 strap; v1 strapped to 0x48)
const ADS7828_I2C_ADDR: BusAddr = BusAddr(0x4A);

const MAX31725_REG_TEMP: BusReg = BusReg(0x00);
const MAX31725_CF_LSB: f32 = 0.003_906_25;

/// Wire protocol behind a sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SensorInterface {
    /// Thermistor on the MSP430's own 12-bit ADC
    Msp430,
    /// Thermistor on the external 8-channel 12-bit mux ADC
    Ads7828,
    /// Self-contained digital sensor IC, native Celsius output
    Max31725,
    /// Raw register passthrough, no temperature conversion
    Raw,
}

impl fmt::Display for SensorInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorInterface::Msp430 => write!(f, "MSP430"),
            SensorInterface::Ads7828 => write!(f, "ADS7828"),
            SensorInterface::Max31725 => write!(f, "MAX31725"),
            SensorInterface::Raw => write!(f, "RAW"),
        }
    }
}

/// Immutable sensor descriptor
///
/// `addr` is the device address for MAX31725 sensors and the logical
/// channel for the two ADC front-ends. Position is PCB-layout metadata
/// only.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Sensor {
    pub id: &'static str,
    pub iface: SensorInterface,
    pub addr: BusAddr,
    pub label: &'static str,
    pub pos_x: f32,
    pub pos_y: f32,
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Sensor {
    pub const fn new(
        id: &'static str,
        iface: SensorInterface,
        addr: u8,
        label: &'static str,
        pos_x: f32,
        pos_y: f32,
    ) -> Sensor {
        Sensor {
            id,
            iface,
            addr: BusAddr(addr),
            label,
            pos_x,
            pos_y,
        }
    }

    /// Mounted connector inputs have no position and a location of "Mounted"
    pub const fn mounted(id: &'static str, iface: SensorInterface, addr: u8) -> Sensor {
        Sensor {
            id,
            iface,
            addr: BusAddr(addr),
            label: "Mounted",
            pos_x: 0.0,
            pos_y: 0.0,
        }
    }

    /// Read this sensor in degrees Celsius, rounded to 4 decimal places
    ///
    /// Returns NaN on any bus or conversion failure. RAW sensors return
    /// the unconverted register value.
    pub fn read_temp<B: RegisterBus>(&self, bus: &B) -> f32 {
        let temp = match self.iface {
            SensorInterface::Msp430 => self.read_msp430_temp(bus),
            SensorInterface::Ads7828 => self.read_ads7828_temp(bus),
            SensorInterface::Max31725 => self.read_max31725_temp(bus),
            SensorInterface::Raw => self.read_raw(bus),
        };
        round_reading(temp)
    }

    fn read_msp430_temp<B: RegisterBus>(&self, bus: &B) -> f32 {
        match bus.read_u16(MSP430_I2C_ADDR, BusReg::from(self.addr), ByteOrder::LittleEndian) {
            Ok(adc_val) => {
                debug!("Read value <{}> from MSP430, input {}", adc_val, self.addr);
                adc_val_to_temp(adc_val, ADC_RESOLUTION)
            }
            Err(e) => {
                warn!("Could not read MSP430 input {}: {}", self.addr, e);
                f32::NAN
            }
        }
    }

    fn read_ads7828_temp<B: RegisterBus>(&self, bus: &B) -> f32 {
        let adc_cmd = ads7828_command(self.addr.0);
        debug!(
            "Converted channel {} to ADS7828 command: {:#010b}",
            self.addr, adc_cmd
        );
        match bus.read_u16(ADS7828_I2C_ADDR, BusReg(adc_cmd), ByteOrder::BigEndian) {
            Ok(adc_val) => {
                debug!("Read value <{}> from ADS7828, channel {}", adc_val, self.addr);
                adc_val_to_temp(adc_val, ADC_RESOLUTION)
            }
            Err(e) => {
                warn!("Could not read ADS7828 channel {}: {}", self.addr, e);
                f32::NAN
            }
        }
    }

    fn read_max31725_temp<B: RegisterBus>(&self, bus: &B) -> f32 {
        match bus.read_i16(self.addr, MAX31725_REG_TEMP, ByteOrder::BigEndian) {
            Ok(raw) => {
                debug!("Read value <{}> from MAX31725, addr {}", raw, self.addr);
                f32::from(raw) * MAX31725_CF_LSB
            }
            Err(e) => {
                warn!("Could not read MAX31725 sensor {}: {}", self.addr, e);
                f32::NAN
            }
        }
    }

    fn read_raw<B: RegisterBus>(&self, bus: &B) -> f32 {
        match bus.read_u16(MSP430_I2C_ADDR, BusReg::from(self.addr), ByteOrder::LittleEndian) {
            Ok(raw) => f32::from(raw),
            Err(e) => {
                warn!("Could not read raw input {}: {}", self.addr, e);
                f32::NAN
            }
        }
    }
}

/// ADS7828 channel select: top bit is odd/even, low bits are addr/2
/// (see ADS7828 datasheet)
pub(crate) fn ads7828_channel_select(addr: u8) -> u8 {
    ((addr & 0x01) << 2) | (addr >> 1)
}

/// ADS7828 command byte: SD = 1, PD0 = 1 (single-ended, power down
/// between conversions), channel select in bits 6-4
pub(crate) fn ads7828_command(addr: u8) -> u8 {
    0x84 | (ads7828_channel_select(addr) << 4)
}
