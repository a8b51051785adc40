//! Board configuration
//!
//! The sensor roster is a static catalog fixed at build time; the only
//! runtime configuration is an environment-driven disable list applied
//! once at startup. Filtering is a pure transform over the catalog, and
//! a configuration that loses the mandatory center sensor refuses to
//! start.

use std::env;
use std::fmt;

use log::info;

use crate::sensor::{Sensor, SensorInterface};

/// Comma-separated, case-insensitive sensor ids to exclude at startup
pub const SENSOR_DISABLE_ENV: &str = "THERMION_SENSOR_DISABLE";

const TH1: Sensor = Sensor::new("TH1", SensorInterface::Msp430, 0x01,
                                "Centre", -42.0135, 43.18);
const TH2: Sensor = Sensor::new("TH2", SensorInterface::Msp430, 0x02,
                                "Top-left of heater", -35.7124, 54.61);
const TH3: Sensor = Sensor::new("TH3", SensorInterface::Msp430, 0x03,
                                "Bottom-right of heater", -53.88, 33.496);

const U4: Sensor = Sensor::new("U4", SensorInterface::Max31725, 0x48,
                               "Top-left", -15.976, 75.225);
const U5: Sensor = Sensor::new("U5", SensorInterface::Max31725, 0x4F,
                               "Top-right", 81.788, 75.692);
const U6: Sensor = Sensor::new("U6", SensorInterface::Max31725, 0x49,
                               "Bottom-right", -82.296, 12.8535);
const U7: Sensor = Sensor::new("U7", SensorInterface::Max31725, 0x4B,
                               "Centre", 46.228, 47.752);

const TH4: Sensor = Sensor::new("TH4", SensorInterface::Ads7828, 0x00,
                                "Centre", -45.8705, 43.18);
const TH5: Sensor = Sensor::new("TH5", SensorInterface::Ads7828, 0x01,
                                "Top-right", -77.9814, 75.0769);
const TH6: Sensor = Sensor::new("TH6", SensorInterface::Ads7828, 0x02,
                                "Bottom-left of heater", 33.274, 30.226);

// mounted connector inputs, raw ADC counts only
const J7: Sensor = Sensor::mounted("J7", SensorInterface::Raw, 0x04);
const J8: Sensor = Sensor::mounted("J8", SensorInterface::Raw, 0x05);
const J9: Sensor = Sensor::mounted("J9", SensorInterface::Raw, 0x06);
const J10: Sensor = Sensor::mounted("J10", SensorInterface::Raw, 0x07);
const J11: Sensor = Sensor::mounted("J11", SensorInterface::Raw, 0x08);

const J12: Sensor = Sensor::mounted("J12", SensorInterface::Ads7828, 0x03);
const J13: Sensor = Sensor::mounted("J13", SensorInterface::Ads7828, 0x04);
const J14: Sensor = Sensor::mounted("J14", SensorInterface::Ads7828, 0x05);
const J15: Sensor = Sensor::mounted("J15", SensorInterface::Ads7828, 0x06);
const J16: Sensor = Sensor::mounted("J16", SensorInterface::Ads7828, 0x07);

/// Full sensor roster in definition order
pub static SENSOR_CATALOG: &[Sensor] = &[
    TH1, TH2, TH3,
    U4, U5, U6, U7,
    TH4, TH5, TH6,
    J7, J8, J9, J10, J11,
    J12, J13, J14, J15, J16,
];

/// Startup-fatal configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The catalog contains no MSP430 sensor to designate as center
    NoCenterSensor,
    /// The disable list removed the designated center sensor
    CenterSensorDisabled(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoCenterSensor => {
                write!(f, "sensor roster has no MSP430 sensor to use as center")
            }
            ConfigError::CenterSensorDisabled(id) => {
                write!(f, "disable list removes the center sensor {id}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Resolved roster: the filtered sensor list plus the designated center
#[derive(Debug, Clone)]
pub struct Roster {
    pub sensors: Vec<Sensor>,
    pub center: Sensor,
}

/// Sensor roster plus the startup disable list
#[derive(Debug, Clone)]
pub struct BoardConfig {
    sensors: Vec<Sensor>,
    disabled: Vec<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardConfig {
    /// The built-in catalog with no exclusions
    pub fn new() -> Self {
        BoardConfig {
            sensors: SENSOR_CATALOG.to_vec(),
            disabled: Vec::new(),
        }
    }

    /// The built-in catalog filtered by [`SENSOR_DISABLE_ENV`]
    pub fn from_env() -> Self {
        match env::var(SENSOR_DISABLE_ENV) {
            Ok(list) => {
                let disabled: Vec<&str> =
                    list.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
                info!("Disabling sensors per configuration: {:?}", disabled);
                Self::new().with_disabled(&disabled)
            }
            Err(_) => Self::new(),
        }
    }

    /// Exclude sensors by id, case-insensitively
    pub fn with_disabled(mut self, disabled: &[&str]) -> Self {
        self.disabled
            .extend(disabled.iter().map(|id| id.to_lowercase()));
        self
    }

    /// Replace the catalog (test rigs and board revisions)
    pub fn with_sensors(mut self, sensors: Vec<Sensor>) -> Self {
        self.sensors = sensors;
        self
    }

    /// Apply the disable list and designate the center sensor
    ///
    /// The center is the first MSP430 sensor in catalog order; it must
    /// survive filtering.
    pub fn resolve(&self) -> Result<Roster, ConfigError> {
        let center = self
            .sensors
            .iter()
            .find(|s| s.iface == SensorInterface::Msp430)
            .copied()
            .ok_or(ConfigError::NoCenterSensor)?;

        let sensors: Vec<Sensor> = self
            .sensors
            .iter()
            .filter(|s| !self.disabled.contains(&s.id.to_lowercase()))
            .copied()
            .collect();

        if !sensors.iter().any(|s| s.id == center.id) {
            return Err(ConfigError::CenterSensorDisabled(center.id));
        }

        Ok(Roster { sensors, center })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        for (i, a) in SENSOR_CATALOG.iter().enumerate() {
            for b in &SENSOR_CATALOG[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_default_center_is_first_msp430() {
        let roster = BoardConfig::new().resolve().unwrap();
        assert_eq!(roster.center.id, "TH1");
        assert_eq!(roster.sensors.len(), SENSOR_CATALOG.len());
    }

    #[test]
    fn test_disable_filter_case_insensitive() {
        let roster = BoardConfig::new()
            .with_disabled(&["th2", "J16"])
            .resolve()
            .unwrap();
        assert!(!roster.sensors.iter().any(|s| s.id == "TH2"));
        assert!(!roster.sensors.iter().any(|s| s.id == "J16"));
        assert_eq!(roster.sensors.len(), SENSOR_CATALOG.len() - 2);
        // order of the survivors is unchanged
        assert_eq!(roster.sensors[0].id, "TH1");
        assert_eq!(roster.sensors[1].id, "TH3");
    }

    #[test]
    fn test_disabling_center_is_fatal() {
        let err = BoardConfig::new()
            .with_disabled(&["tH1"])
            .resolve()
            .unwrap_err();
        assert_eq!(err, ConfigError::CenterSensorDisabled("TH1"));
    }

    #[test]
    fn test_catalog_without_msp430_is_fatal() {
        const U4_ONLY: &[Sensor] = &[Sensor::new(
            "U4",
            SensorInterface::Max31725,
            0x48,
            "Top-left",
            0.0,
            0.0,
        )];
        let err = BoardConfig::new()
            .with_sensors(U4_ONLY.to_vec())
            .resolve()
            .unwrap_err();
        assert_eq!(err, ConfigError::NoCenterSensor);
    }
}
