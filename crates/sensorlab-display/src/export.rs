//! Demo data export and run metadata
//!
//! The dashboard's "Save Data" writes a fixed demo CSV: two comment lines
//! carrying the sample ID and export time, a header, then 300 rows of the
//! demo waveform for all eight channels.

use crate::display::SLOT_COUNT;
use crate::waveform::demo_sample;
use chrono::{DateTime, SecondsFormat, Utc};
use sensorlab_core::{ExportError, Result};
use sensorlab_settings::{LogFormat, SettingKey, Snapshot, TimestampFormat};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Rows in a demo export
pub const DEMO_ROWS: usize = 300;

/// File name used when no target is chosen
pub const DEFAULT_EXPORT_FILE: &str = "sensor_run.csv";

/// Run length selected on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunDuration {
    #[default]
    Unlimited,
    Seconds30,
    Minutes1,
    Minutes5,
    Minutes10,
}

impl RunDuration {
    pub const LABELS: &'static [&'static str] = &["∞", "30s", "1m", "5m", "10m"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unlimited => "∞",
            Self::Seconds30 => "30s",
            Self::Minutes1 => "1m",
            Self::Minutes5 => "5m",
            Self::Minutes10 => "10m",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "∞" => Some(Self::Unlimited),
            "30s" => Some(Self::Seconds30),
            "1m" => Some(Self::Minutes1),
            "5m" => Some(Self::Minutes5),
            "10m" => Some(Self::Minutes10),
            _ => None,
        }
    }

    /// Length of the run, `None` when unlimited
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Unlimited => None,
            Self::Seconds30 => Some(Duration::from_secs(30)),
            Self::Minutes1 => Some(Duration::from_secs(60)),
            Self::Minutes5 => Some(Duration::from_secs(300)),
            Self::Minutes10 => Some(Duration::from_secs(600)),
        }
    }
}

/// Metadata entered on the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetadata {
    pub sample_id: String,
    pub operator: String,
    pub notes: String,
    /// "Logging ON" checkbox
    pub logging: bool,
    pub duration: RunDuration,
}

impl Default for RunMetadata {
    fn default() -> Self {
        Self {
            sample_id: String::new(),
            operator: String::new(),
            notes: String::new(),
            logging: true,
            duration: RunDuration::default(),
        }
    }
}

/// Result of a finished export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub rows: usize,
    /// HDF5 was selected but CSV was written
    pub csv_fallback: bool,
}

/// Default export target: `<log.path>/sensor_run.csv`
pub fn default_export_path(snapshot: &Snapshot) -> PathBuf {
    snapshot.path(SettingKey::LogPath).join(DEFAULT_EXPORT_FILE)
}

/// Format an export time per the `acq/ts` setting
pub fn format_timestamp(at: DateTime<Utc>, format: TimestampFormat) -> String {
    match format {
        TimestampFormat::EpochMs => at.timestamp_millis().to_string(),
        TimestampFormat::Iso8601 => at.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Write the demo CSV to `out`, returning the number of data rows
pub fn write_demo_csv<W: Write>(
    out: &mut W,
    metadata: &RunMetadata,
    exported: &str,
) -> std::io::Result<usize> {
    writeln!(out, "# SensorLab demo export")?;
    writeln!(out, "# Sample: {}", metadata.sample_id)?;
    writeln!(out, "# Exported: {}", exported)?;

    let header: Vec<String> = (1..=SLOT_COUNT).map(|c| format!("ch{}", c)).collect();
    writeln!(out, "ts,{}", header.join(","))?;

    for i in 0..DEMO_ROWS {
        let t = i as f64 * 0.1;
        write!(out, "{:.3}", t)?;
        for c in 0..SLOT_COUNT {
            write!(out, ",{:.6}", demo_sample(t, c))?;
        }
        writeln!(out)?;
    }
    Ok(DEMO_ROWS)
}

/// Export the demo data set to `path`.
///
/// The target directory must already exist. When the log format is HDF5 the
/// file is still written as CSV.
pub fn export_demo(
    path: &Path,
    snapshot: &Snapshot,
    metadata: &RunMetadata,
    now: DateTime<Utc>,
) -> Result<ExportReport> {
    if path.file_name().is_none() {
        return Err(ExportError::InvalidTarget {
            path: path.display().to_string(),
        }
        .into());
    }
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.is_dir() {
            return Err(ExportError::MissingDirectory {
                path: dir.display().to_string(),
            }
            .into());
        }
    }

    let config = snapshot.config();
    let csv_fallback = config.log.format == LogFormat::Hdf5;
    if csv_fallback {
        warn!("HDF5 export is not available, writing CSV to {}", path.display());
    }

    let exported = format_timestamp(now, config.acq.timestamp_format);
    let mut out = BufWriter::new(File::create(path)?);
    let rows = write_demo_csv(&mut out, metadata, &exported)?;
    out.flush()?;

    info!(rows, "Demo data exported to {}", path.display());
    Ok(ExportReport {
        path: path.to_path_buf(),
        rows,
        csv_fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sensorlab_settings::{SettingValue, SettingsStore};

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let metadata = RunMetadata {
            sample_id: "S-17".to_string(),
            ..Default::default()
        };
        let mut out = Vec::new();
        let rows = write_demo_csv(&mut out, &metadata, "1709649000000").unwrap();
        assert_eq!(rows, DEMO_ROWS);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4 + DEMO_ROWS);
        assert_eq!(lines[0], "# SensorLab demo export");
        assert_eq!(lines[1], "# Sample: S-17");
        assert_eq!(lines[2], "# Exported: 1709649000000");
        assert_eq!(lines[3], "ts,ch1,ch2,ch3,ch4,ch5,ch6,ch7,ch8");
        assert!(lines[4].starts_with("0.000,0.000000,0.395520,"));
        assert!(lines[5].starts_with("0.100,"));
        assert_eq!(lines[4].split(',').count(), 1 + SLOT_COUNT);
        assert!(lines.last().unwrap().starts_with("29.900,"));
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(
            format_timestamp(fixed_time(), TimestampFormat::EpochMs),
            "1709649000000"
        );
        assert_eq!(
            format_timestamp(fixed_time(), TimestampFormat::Iso8601),
            "2024-03-05T14:30:00.000Z"
        );
    }

    #[test]
    fn test_default_path_uses_log_directory() {
        let mut store = SettingsStore::in_memory();
        store
            .set(SettingKey::LogPath, SettingValue::Path("/data/runs".into()))
            .unwrap();
        assert_eq!(
            default_export_path(&store.all()),
            PathBuf::from("/data/runs/sensor_run.csv")
        );
    }

    #[test]
    fn test_export_demo_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        let report = export_demo(
            &path,
            &Snapshot::defaults(),
            &RunMetadata::default(),
            fixed_time(),
        )
        .unwrap();

        assert_eq!(report.rows, DEMO_ROWS);
        assert!(!report.csv_fallback);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("# Exported: 1709649000000\n"));
    }

    #[test]
    fn test_hdf5_falls_back_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::in_memory();
        store.set(SettingKey::LogFormat, "HDF5".into()).unwrap();

        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        let report = export_demo(&path, &store.all(), &RunMetadata::default(), fixed_time()).unwrap();
        assert!(report.csv_fallback);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .starts_with("# SensorLab demo export\n"));
    }

    #[test]
    fn test_missing_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("run.csv");
        let err = export_demo(&path, &Snapshot::defaults(), &RunMetadata::default(), fixed_time())
            .unwrap_err();
        assert!(err.is_export_error());
        assert!(!path.exists());
    }

    #[test]
    fn test_run_duration_labels() {
        for label in RunDuration::LABELS {
            let duration = RunDuration::from_label(label).unwrap();
            assert_eq!(duration.label(), *label);
        }
        assert_eq!(RunDuration::default().as_duration(), None);
        assert_eq!(
            RunDuration::Minutes1.as_duration(),
            Some(Duration::from_secs(60))
        );
        assert!(RunMetadata::default().logging);
    }
}
