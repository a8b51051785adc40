//! Thermion CSV logging daemon
//!
//! Samples every sensor on the payload board at a fixed interval and
//! appends one CSV row per cycle to a per-calendar-day log file. Runs
//! against real hardware when the configured I2C bus exists, otherwise
//! against the in-memory stub board so the rest of the stack can be
//! developed without a payload attached.
//!
//! Configuration is environment-driven:
//! - `THERMION_LOG_PATH` - directory for CSV files (required)
//! - `THERMION_I2C_BUS` - bus number (default 1)
//! - `THERMION_SENSOR_DISABLE` - sensor ids to exclude

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use log::{info, warn};

use thermion_core::{Board, BoardConfig, BoardControl, StubBoard};
use thermion_hal_linux::LinuxI2cBus;

mod logfile;

const LOG_PATH_ENV: &str = "THERMION_LOG_PATH";
const I2C_BUS_ENV: &str = "THERMION_I2C_BUS";

/// Nominal sampling interval
const SAMPLE_INTERVAL: Duration = Duration::from_secs(5);

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

fn main() -> Result<()> {
    env_logger::init();

    let log_path = get_or_create_log_path()?;
    let board = open_board()?;

    // loops once per calendar day
    loop {
        log_one_day(board.as_ref(), &log_path)?;
    }
}

fn get_or_create_log_path() -> Result<PathBuf> {
    let path = env::var(LOG_PATH_ENV)
        .with_context(|| format!("{LOG_PATH_ENV} environment variable not set"))?;
    let path = PathBuf::from(path);
    if !path.exists() {
        fs::create_dir_all(&path)
            .with_context(|| format!("could not create log path {}", path.display()))?;
    }
    Ok(path)
}

fn open_board() -> Result<Box<dyn BoardControl>> {
    let config = BoardConfig::from_env();
    let bus_id: u8 = match env::var(I2C_BUS_ENV) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("invalid {I2C_BUS_ENV} value: {value}"))?,
        Err(_) => 1,
    };

    let bus = LinuxI2cBus::new(bus_id);
    if bus.exists() {
        info!("Using payload board on {}", bus.path());
        Ok(Box::new(Board::new(bus, &config)?))
    } else {
        warn!("{} not present, using stub board", bus.path());
        Ok(Box::new(StubBoard::new(&config)?))
    }
}

/// Log until the local calendar day ticks over, then return so the
/// caller starts a fresh file
fn log_one_day(board: &dyn BoardControl, log_path: &Path) -> Result<()> {
    let start_date = Local::now().date_naive();
    let file_path = log_path.join(logfile::log_file_name(start_date));
    let write_header = !file_path.exists();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&file_path)
        .with_context(|| format!("could not open {}", file_path.display()))?;
    let mut writer = BufWriter::new(file);

    info!("Logging sensor data to {}", file_path.display());

    if write_header {
        writeln!(writer, "{}", logfile::format_header(board.sensors()))?;
        writer.flush()?;
    }

    loop {
        log_one_cycle(board, &mut writer)?;
        thread::sleep(SAMPLE_INTERVAL);
        if Local::now().date_naive() != start_date {
            return Ok(());
        }
    }
}

/// Read the roster once and append a row
///
/// A cycle where every sensor is unreadable writes nothing; the loop
/// carries on regardless, per-cycle failures must never kill the
/// daemon.
fn log_one_cycle(board: &dyn BoardControl, writer: &mut BufWriter<File>) -> Result<()> {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let values: Vec<f32> = board
        .read_all_sensors()
        .into_iter()
        .map(|(_, temp)| temp)
        .collect();
    let heater_level = if board.is_heater_enabled() {
        board.heater_power_level().unwrap_or(0)
    } else {
        0
    };

    if values.iter().all(|v| v.is_nan()) {
        warn!("No sensor readable this cycle, skipping row");
        return Ok(());
    }

    writeln!(writer, "{}", logfile::format_row(&timestamp, &values, heater_level))?;
    writer.flush()?;
    Ok(())
}
