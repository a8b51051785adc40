//! Board facade
//!
//! Aggregates the sensor roster and the heater controller behind one
//! contract, [`BoardControl`], shared by the hardware board and the
//! in-memory stub. All temperature and heater state lives in hardware;
//! the facade holds only the resolved roster.

use log::debug;

use thermion_hal::RegisterBus;

use crate::config::{BoardConfig, ConfigError};
use crate::heater::{Heater, HeaterMode};
use crate::sensor::Sensor;

/// Common contract of the hardware board and the stub board
///
/// Readings are degrees Celsius with NaN for anything unreadable; one
/// failing sensor never blocks the rest of a batch read.
pub trait BoardControl {
    /// Roster metadata, in definition order
    fn sensors(&self) -> &[Sensor];

    /// Read every sensor in roster order
    fn read_all_sensors(&self) -> Vec<(Sensor, f32)>;

    /// Read the designated center sensor
    fn read_center_temp(&self) -> f32;

    fn heater_mode(&self) -> HeaterMode;
    fn set_heater_mode(&self, mode: HeaterMode);

    /// `None` when the power level register is unreadable
    fn heater_power_level(&self) -> Option<u16>;
    fn set_heater_power_level(&self, level: u8);

    fn set_target_temp(&self, temp: f32);

    /// Reset the payload controller; fire-and-forget
    fn reset(&self);

    fn is_heater_enabled(&self) -> bool {
        matches!(self.heater_mode(), HeaterMode::Pid | HeaterMode::Pwm)
    }

    /// Start a bounded heating session at the given power level
    ///
    /// Sets the power level, switches to PWM mode, and returns a guard
    /// that forces the mode back to OFF when dropped - on every exit
    /// path, including a panic in the caller.
    fn heating(&self, power_level: u8) -> HeatingSession<'_, Self>
    where
        Self: Sized,
    {
        self.set_heater_power_level(power_level);
        self.set_heater_mode(HeaterMode::Pwm);
        HeatingSession { board: self }
    }
}

/// Scope guard for a heating session
///
/// Holds the heater in PWM mode for its lifetime; dropping it restores
/// OFF unconditionally. Heater writes are best-effort, so the release
/// itself cannot fail or panic.
pub struct HeatingSession<'a, T: BoardControl + ?Sized> {
    board: &'a T,
}

impl<T: BoardControl + ?Sized> Drop for HeatingSession<'_, T> {
    fn drop(&mut self) {
        self.board.set_heater_mode(HeaterMode::Off);
    }
}

/// The payload board over a real register bus
pub struct Board<B: RegisterBus> {
    bus: B,
    sensors: Vec<Sensor>,
    center: Sensor,
}

impl<B: RegisterBus> Board<B> {
    /// Resolve the configuration and bind it to a bus
    ///
    /// Fails when the roster cannot designate a center sensor; that is
    /// a startup error, not a runtime one.
    pub fn new(bus: B, config: &BoardConfig) -> Result<Self, ConfigError> {
        let roster = config.resolve()?;
        debug!(
            "Board roster: {} sensors, center {}",
            roster.sensors.len(),
            roster.center
        );
        Ok(Board {
            bus,
            sensors: roster.sensors,
            center: roster.center,
        })
    }

    fn heater(&self) -> Heater<'_, B> {
        Heater::new(&self.bus)
    }
}

impl<B: RegisterBus> BoardControl for Board<B> {
    fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    fn read_all_sensors(&self) -> Vec<(Sensor, f32)> {
        self.sensors
            .iter()
            .map(|s| (*s, s.read_temp(&self.bus)))
            .collect()
    }

    fn read_center_temp(&self) -> f32 {
        self.center.read_temp(&self.bus)
    }

    fn heater_mode(&self) -> HeaterMode {
        self.heater().mode()
    }

    fn set_heater_mode(&self, mode: HeaterMode) {
        self.heater().set_mode(mode);
    }

    fn heater_power_level(&self) -> Option<u16> {
        self.heater().power_level()
    }

    fn set_heater_power_level(&self, level: u8) {
        self.heater().set_power_level(level);
    }

    fn set_target_temp(&self, temp: f32) {
        self.heater().set_target_temp(temp);
    }

    fn reset(&self) {
        self.heater().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testbus::MockBus;

    fn populated_bus() -> MockBus {
        let bus = MockBus::new();
        // MSP430 thermistor inputs
        for reg in 0x01..=0x03 {
            bus.set(0x08, reg, 2048);
        }
        // mounted raw inputs
        for reg in 0x04..=0x08 {
            bus.set(0x08, reg, 1000 + u16::from(reg));
        }
        // MAX31725 sensors
        for addr in [0x48, 0x49, 0x4B, 0x4F] {
            bus.set(addr, 0x00, 25 << 8);
        }
        // ADS7828 channels 0-7 via their command bytes
        for ch in 0..8u8 {
            bus.set(0x4A, crate::sensor::ads7828_command(ch), 2048);
        }
        // heater block
        bus.set(0x08, 0x20, 0);
        bus.set(0x08, 0x23, 50);
        bus
    }

    #[test]
    fn test_read_all_sensors_roster_order() {
        let board = Board::new(populated_bus(), &BoardConfig::new()).unwrap();
        let readings = board.read_all_sensors();
        let ids: Vec<&str> = readings.iter().map(|(s, _)| s.id).collect();
        let expected: Vec<&str> = board.sensors().iter().map(|s| s.id).collect();
        assert_eq!(ids, expected);
        assert!(readings.iter().all(|(_, t)| !t.is_nan()));
    }

    #[test]
    fn test_center_temp() {
        let board = Board::new(populated_bus(), &BoardConfig::new()).unwrap();
        assert_eq!(board.read_center_temp(), 25.0);
    }

    #[test]
    fn test_one_failing_device_isolated() {
        let bus = populated_bus();
        bus.fail(0x4A); // the whole mux ADC drops off the bus
        let board = Board::new(bus, &BoardConfig::new()).unwrap();
        for (sensor, temp) in board.read_all_sensors() {
            if sensor.iface == crate::sensor::SensorInterface::Ads7828 {
                assert!(temp.is_nan(), "{} should be NaN", sensor.id);
            } else {
                assert!(!temp.is_nan(), "{} should still read", sensor.id);
            }
        }
    }

    #[test]
    fn test_disabled_sensor_absent_from_readings() {
        let config = BoardConfig::new().with_disabled(&["u5"]);
        let board = Board::new(populated_bus(), &config).unwrap();
        assert!(!board.sensors().iter().any(|s| s.id == "U5"));
        assert!(!board.read_all_sensors().iter().any(|(s, _)| s.id == "U5"));
    }

    #[test]
    fn test_heater_delegation() {
        let board = Board::new(populated_bus(), &BoardConfig::new()).unwrap();
        assert_eq!(board.heater_mode(), HeaterMode::Off);
        assert_eq!(board.heater_power_level(), Some(50));
        assert!(!board.is_heater_enabled());
    }

    #[test]
    fn test_heating_session_restores_off() {
        let board = Board::new(populated_bus(), &BoardConfig::new()).unwrap();
        {
            let _session = board.heating(128);
            assert_eq!(board.bus.last_write(0x08, 0x43), Some(128));
            assert_eq!(board.bus.last_write(0x08, 0x40), Some(2));
        }
        assert_eq!(board.bus.last_write(0x08, 0x40), Some(0));
    }

    #[test]
    fn test_heating_session_restores_off_on_panic() {
        let board = Board::new(populated_bus(), &BoardConfig::new()).unwrap();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _session = board.heating(255);
            panic!("caller failure mid-session");
        }));
        assert!(result.is_err());
        assert_eq!(board.bus.last_write(0x08, 0x40), Some(0));
    }

    #[test]
    fn test_reset_writes_command() {
        let board = Board::new(populated_bus(), &BoardConfig::new()).unwrap();
        board.reset();
        assert_eq!(board.bus.last_write(0x08, 0x50), Some(0));
    }
}
