//! Board-agnostic core logic for the Thermion payload
//!
//! This crate contains all board logic that does not depend on a
//! specific bus implementation:
//!
//! - Sensor model: one calibrated Celsius reading over three wire
//!   protocols (MSP430 ADC thermistors, ADS7828 mux ADC, MAX31725)
//! - Beta-thermistor conversion math and its inverse
//! - Heater controller over the MSP430 register block
//! - Board facade with the fixed sensor catalog and disable-list filter
//! - In-memory stub board for hosts without hardware
//!
//! Everything runs single-threaded over a blocking [`RegisterBus`];
//! per-device failures collapse to NaN / `Unknown` / `None` at the
//! boundary where they occur so one failing device never aborts a
//! batch read.
//!
//! [`RegisterBus`]: thermion_hal::RegisterBus

#![deny(unsafe_code)]

pub mod board;
pub mod config;
pub mod convert;
pub mod heater;
pub mod sensor;
pub mod stub;

#[cfg(test)]
pub(crate) mod testbus;

pub use board::{Board, BoardControl, HeatingSession};
pub use config::{BoardConfig, ConfigError, SENSOR_CATALOG, SENSOR_DISABLE_ENV};
pub use heater::{Heater, HeaterMode};
pub use sensor::{Sensor, SensorInterface};
pub use stub::StubBoard;
