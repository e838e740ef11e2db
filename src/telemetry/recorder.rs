//! # Telemetry Recorder
//!
//! Writes emitted samples to JSON Lines files in a log directory.
//!
//! A new file is started every `max_records_per_file` records and only the
//! newest `max_files_to_keep` files are retained. File names sort in creation
//! order: `telemetry_<YYYYmmdd_HHMMSS>_<seq>.jsonl`.

use chrono::Utc;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::emitter::TelemetrySample;
use crate::error::Result;

const FILE_PREFIX: &str = "telemetry_";
const FILE_EXTENSION: &str = "jsonl";

/// One JSONL line.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    /// RFC 3339 wall-clock time
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub rssi_dbm: i32,
}

impl TelemetryRecord {
    pub fn from_sample(sample: &TelemetrySample) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            uptime_seconds: sample.uptime_seconds,
            rssi_dbm: sample.signal_strength_dbm,
        }
    }
}

/// Rotating JSONL writer.
#[derive(Debug)]
pub struct TelemetryRecorder {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    sequence: u64,
}

impl TelemetryRecorder {
    /// Creates the log directory if needed. No file is opened until the first record.
    pub fn new<P: AsRef<Path>>(
        dir: P,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer: None,
            records_in_file: 0,
            sequence: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends one sample, rotating first if the current file is full.
    pub fn record(&mut self, sample: &TelemetrySample) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.open_next_file()?;
        }

        let record = TelemetryRecord::from_sample(sample);
        if let Some(writer) = self.writer.as_mut() {
            serde_json::to_writer(&mut *writer, &record).map_err(std::io::Error::from)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            self.records_in_file += 1;
        }

        Ok(())
    }

    fn open_next_file(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        let name = format!(
            "{}{}_{:04}.{}",
            FILE_PREFIX,
            Utc::now().format("%Y%m%d_%H%M%S"),
            self.sequence,
            FILE_EXTENSION
        );
        self.sequence += 1;

        let path = self.dir.join(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!("Recording telemetry to {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;
        self.prune()
    }

    /// Deletes the oldest telemetry files beyond the retention limit.
    fn prune(&self) -> Result<()> {
        let mut files = self.telemetry_files()?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            debug!("Removing old telemetry file {}", path.display());
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Telemetry files currently in the log directory, unsorted.
    pub fn telemetry_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_telemetry = path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with(FILE_PREFIX))
                .unwrap_or(false)
                && path.extension().map(|e| e == FILE_EXTENSION).unwrap_or(false);
            if is_telemetry {
                files.push(path);
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample(uptime_seconds: u64) -> TelemetrySample {
        TelemetrySample {
            uptime_seconds,
            signal_strength_dbm: -50,
        }
    }

    fn read_lines(recorder: &TelemetryRecorder) -> Vec<String> {
        let mut files = recorder.telemetry_files().unwrap();
        files.sort();
        files
            .iter()
            .flat_map(|p| {
                fs::read_to_string(p)
                    .unwrap()
                    .lines()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_no_file_until_first_record() {
        let dir = TempDir::new().unwrap();
        let recorder = TelemetryRecorder::new(dir.path(), 10, 3).unwrap();
        assert!(recorder.telemetry_files().unwrap().is_empty());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("logs").join("telemetry");
        let recorder = TelemetryRecorder::new(&nested, 10, 3).unwrap();
        assert!(nested.is_dir());
        assert_eq!(recorder.dir(), nested.as_path());
    }

    #[test]
    fn test_records_are_json_lines() {
        let dir = TempDir::new().unwrap();
        let mut recorder = TelemetryRecorder::new(dir.path(), 10, 3).unwrap();
        recorder.record(&sample(1)).unwrap();
        recorder.record(&sample(2)).unwrap();

        let lines = read_lines(&recorder);
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(value["uptime_seconds"], 2);
        assert_eq!(value["rssi_dbm"], -50);
        assert!(value["timestamp"].as_str().is_some());
    }

    #[test]
    fn test_rotates_after_max_records() {
        let dir = TempDir::new().unwrap();
        let mut recorder = TelemetryRecorder::new(dir.path(), 2, 10).unwrap();
        for i in 0..5 {
            recorder.record(&sample(i)).unwrap();
        }

        assert_eq!(recorder.telemetry_files().unwrap().len(), 3);
        assert_eq!(read_lines(&recorder).len(), 5);
    }

    #[test]
    fn test_keeps_only_newest_files() {
        let dir = TempDir::new().unwrap();
        let mut recorder = TelemetryRecorder::new(dir.path(), 1, 2).unwrap();
        for i in 0..5 {
            recorder.record(&sample(i)).unwrap();
        }

        assert_eq!(recorder.telemetry_files().unwrap().len(), 2);
        let uptimes: Vec<u64> = read_lines(&recorder)
            .iter()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["uptime_seconds"]
                .as_u64()
                .unwrap())
            .collect();
        assert_eq!(uptimes, vec![3, 4]);
    }

    #[test]
    fn test_ignores_unrelated_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();
        let mut recorder = TelemetryRecorder::new(dir.path(), 1, 1).unwrap();
        recorder.record(&sample(0)).unwrap();
        recorder.record(&sample(1)).unwrap();

        assert!(dir.path().join("notes.txt").exists());
        assert_eq!(recorder.telemetry_files().unwrap().len(), 1);
    }
}
