//! In-memory stub board
//!
//! Simulates the board contract for hosts without hardware (local web
//! and CLI development). Base readings per sensor id are perturbed with
//! uniform jitter; while the simulated heater runs, readings climb
//! linearly with elapsed time up to a power-dependent ceiling.

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use log::info;
use rand::Rng;

use crate::board::BoardControl;
use crate::config::{BoardConfig, ConfigError};
use crate::convert::round_reading;
use crate::heater::HeaterMode;
use crate::sensor::Sensor;

/// Uniform jitter applied to every stub reading, °C
const JITTER: f32 = 2.5;

/// Heating rate divisor: power/50 °C gained per second of heating
const HEAT_RATE_DIVISOR: f32 = 50.0;

fn base_value(sensor_id: &str) -> f32 {
    match sensor_id {
        "TH1" => 24.64,
        "TH2" => 23.62,
        "TH3" => 23.86,
        "U4" => 25.10,
        "U5" => 24.87,
        "U6" => 24.75,
        "U7" => 26.32,
        // ADS7828 channels and mounted connectors read disconnected
        _ => f32::NAN,
    }
}

struct StubState {
    mode: HeaterMode,
    power_level: u16,
    heat_started: Option<Instant>,
}

/// Test double for [`crate::Board`] with no bus underneath
///
/// Heater state sits behind a mutex so the `&self` contract of
/// [`BoardControl`] holds here too.
pub struct StubBoard {
    sensors: Vec<Sensor>,
    center: Sensor,
    state: Mutex<StubState>,
}

impl StubBoard {
    pub fn new(config: &BoardConfig) -> Result<Self, ConfigError> {
        let roster = config.resolve()?;
        Ok(StubBoard {
            sensors: roster.sensors,
            center: roster.center,
            state: Mutex::new(StubState {
                mode: HeaterMode::Off,
                power_level: 50,
                heat_started: None,
            }),
        })
    }

    fn read_sensor(&self, sensor_id: &str) -> f32 {
        let base = base_value(sensor_id);
        if base.is_nan() {
            return f32::NAN;
        }
        let noisy = base + rand::thread_rng().gen_range(-JITTER..JITTER);
        let state = self.lock();
        let temp = match (state.mode, state.heat_started) {
            (HeaterMode::Off, _) | (_, None) => noisy,
            (_, Some(started)) => {
                let power = state.power_level as f32;
                let heating = power / HEAT_RATE_DIVISOR * started.elapsed().as_secs_f32();
                let ceiling = 50.0 + power / 4.0;
                (noisy + heating).min(ceiling)
            }
        };
        round_reading(temp)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BoardControl for StubBoard {
    fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    fn read_all_sensors(&self) -> Vec<(Sensor, f32)> {
        self.sensors
            .iter()
            .map(|s| (*s, self.read_sensor(s.id)))
            .collect()
    }

    fn read_center_temp(&self) -> f32 {
        self.read_sensor(self.center.id)
    }

    fn heater_mode(&self) -> HeaterMode {
        self.lock().mode
    }

    fn set_heater_mode(&self, mode: HeaterMode) {
        if mode == HeaterMode::Unknown {
            return;
        }
        let mut state = self.lock();
        state.mode = mode;
        state.heat_started = if mode == HeaterMode::Off {
            None
        } else {
            Some(Instant::now())
        };
    }

    fn heater_power_level(&self) -> Option<u16> {
        Some(self.lock().power_level)
    }

    fn set_heater_power_level(&self, level: u8) {
        self.lock().power_level = u16::from(level);
    }

    fn set_target_temp(&self, temp: f32) {
        info!("Stub board ignoring setpoint {:.2}", temp);
    }

    fn reset(&self) {
        info!("Stub board reset");
        let mut state = self.lock();
        state.mode = HeaterMode::Off;
        state.power_level = 50;
        state.heat_started = None;
    }
}
