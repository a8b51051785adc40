//! CSV log file naming and formatting
//!
//! One header-tagged CSV per local calendar day. Filenames encode the
//! date, so sorting descending by name is sorting descending by day.
//! Unreadable values are blank fields, not "NaN", so downstream tools
//! can parse the numeric columns directly.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use thermion_core::Sensor;

const FILE_PREFIX: &str = "thermion-data-";

/// Log file name for a calendar day, e.g. `thermion-data-2026-08-25.csv`
pub fn log_file_name(date: NaiveDate) -> String {
    format!("{}{}.csv", FILE_PREFIX, date.format("%Y-%m-%d"))
}

/// Log files under `dir`, most recent first
///
/// Lexicographic descending by filename equals chronological descending
/// because the names are date-encoded.
pub fn list_log_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(FILE_PREFIX) && n.ends_with(".csv"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files.reverse();
    files
}

/// Header row: `"timestamp","<id>",...,"heater"`
pub fn format_header(sensors: &[Sensor]) -> String {
    let mut fields = vec!["\"timestamp\"".to_string()];
    fields.extend(sensors.iter().map(|s| format!("\"{}\"", s.id)));
    fields.push("\"heater\"".to_string());
    fields.join(",")
}

/// Data row in roster order; NaN renders as an empty field
pub fn format_row(timestamp: &str, values: &[f32], heater_level: u16) -> String {
    let mut fields = vec![timestamp.to_string()];
    fields.extend(values.iter().map(|v| {
        if v.is_nan() {
            String::new()
        } else {
            format!("{v:.4}")
        }
    }));
    fields.push(heater_level.to_string());
    fields.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermion_core::{Sensor, SensorInterface};

    #[test]
    fn test_log_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert_eq!(log_file_name(date), "thermion-data-2026-08-25.csv");
    }

    #[test]
    fn test_format_header() {
        let sensors = [
            Sensor::new("TH1", SensorInterface::Msp430, 0x01, "Centre", 0.0, 0.0),
            Sensor::mounted("J7", SensorInterface::Raw, 0x04),
        ];
        assert_eq!(
            format_header(&sensors),
            "\"timestamp\",\"TH1\",\"J7\",\"heater\""
        );
    }

    #[test]
    fn test_format_row_blank_for_nan() {
        let row = format_row(
            "2026-08-25 10:15:30.123456",
            &[24.64, f32::NAN, 25.1],
            0,
        );
        assert_eq!(row, "2026-08-25 10:15:30.123456,24.6400,,25.1000,0");
    }

    #[test]
    fn test_format_row_heater_level() {
        let row = format_row("t", &[], 255);
        assert_eq!(row, "t,255");
    }

    #[test]
    fn test_list_log_files_descending() {
        let dir = std::env::temp_dir().join(format!("thermion-logfile-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for name in [
            "thermion-data-2026-08-23.csv",
            "thermion-data-2026-08-25.csv",
            "thermion-data-2026-08-24.csv",
            "unrelated.txt",
        ] {
            fs::write(dir.join(name), "").unwrap();
        }

        let files: Vec<String> = list_log_files(&dir)
            .into_iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        assert_eq!(
            files,
            [
                "thermion-data-2026-08-25.csv",
                "thermion-data-2026-08-24.csv",
                "thermion-data-2026-08-23.csv",
            ]
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_list_log_files_missing_dir() {
        assert!(list_log_files(Path::new("/nonexistent/thermion")).is_empty());
    }
}
