//! Append-only text log of a ramp run.
//!
//! Format: `# `-prefixed comment lines (header and lifecycle events) and
//! tab-separated data lines `<elapsed_minutes>\t<target_c>\t<sensor_c>`.
//! The file is opened, appended to and closed on every write so a crash never
//! loses more than the line being written.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::RampError;

/// Column-order comment written in every header.
pub const FORMAT_COMMENT: &str = "Log format: minutes    target_T    sensor_T";

/// One data line.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LogEntry {
    pub elapsed_min: f64,
    pub target_c: f64,
    pub sensor_c: f64,
}

impl LogEntry {
    /// Render without the trailing newline.
    pub fn to_line(&self) -> String {
        format!("{}\t{}\t{}", self.elapsed_min, self.target_c, self.sensor_c)
    }

    pub fn parse_line(line: &str) -> eyre::Result<Self> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() != 3 {
            eyre::bail!("expected 3 tab-separated fields, got {}: {line:?}", fields.len());
        }
        let num = |i: usize, name: &str| -> eyre::Result<f64> {
            fields[i]
                .trim()
                .parse::<f64>()
                .map_err(|e| eyre::eyre!("{name} field {:?}: {e}", fields[i]))
        };
        Ok(Self {
            elapsed_min: num(0, "elapsed")?,
            target_c: num(1, "target")?,
            sensor_c: num(2, "sensor")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RampLog {
    path: PathBuf,
}

impl RampLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the header comment lines, starting a new file when `truncate` is set.
    pub fn write_header(&self, lines: &[String], truncate: bool) -> Result<(), RampError> {
        let mut text = String::new();
        for l in lines {
            text.push_str("# ");
            text.push_str(l);
            text.push('\n');
        }
        self.write(&text, truncate)
    }

    pub fn append_entry(&self, entry: &LogEntry) -> Result<(), RampError> {
        let mut line = entry.to_line();
        line.push('\n');
        self.write(&line, false)
    }

    pub fn append_comment(&self, message: &str) -> Result<(), RampError> {
        self.write(&format!("# {message}\n"), false)
    }

    fn write(&self, text: &str, truncate: bool) -> Result<(), RampError> {
        let mut opts = OpenOptions::new();
        opts.create(true);
        if truncate {
            opts.write(true).truncate(true);
        } else {
            opts.append(true);
        }
        let mut file = opts
            .open(&self.path)
            .map_err(|e| RampError::LogWrite(format!("open {}: {e}", self.path.display())))?;
        file.write_all(text.as_bytes())
            .map_err(|e| RampError::LogWrite(format!("write {}: {e}", self.path.display())))
    }
}

/// Read back all data lines of a ramp log, skipping comments.
pub fn read_entries(path: &Path) -> eyre::Result<Vec<LogEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|e| eyre::eyre!("open ramp log {:?}: {}", path, e))?;

    let mut entries = Vec::new();
    for (idx, rec) in rdr.deserialize::<LogEntry>().enumerate() {
        match rec {
            Ok(e) => entries.push(e),
            Err(e) => eyre::bail!("invalid ramp log data line {}: {}", idx + 1, e),
        }
    }
    Ok(entries)
}
