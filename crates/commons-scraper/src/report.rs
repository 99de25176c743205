//! Append-only census report.
//!
//! Every row is written with its own open/write/close so a crash mid-run
//! leaves all previously recorded rows intact.

use anyhow::{Context, Result};
use shared::ReportRow;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Header line written once at the start of a run
pub const REPORT_HEADER: &str = "LICENSE TYPE,File Count, Page Count";

/// Writer for a single report file
#[derive(Debug)]
pub struct ReportWriter {
    path: PathBuf,
    rows_written: usize,
}

impl ReportWriter {
    /// Create (or truncate) the report file and write the header
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
        }

        let mut file = File::create(&path)
            .with_context(|| format!("Failed to create report file: {}", path.display()))?;
        file.write_all(format!("{}\n", REPORT_HEADER).as_bytes())
            .and_then(|_| file.flush())
            .with_context(|| format!("Failed to write report header: {}", path.display()))?;

        info!(path = %path.display(), "Report initialized");

        Ok(Self {
            path,
            rows_written: 0,
        })
    }

    /// Append one row
    pub fn append_row(&mut self, row: &ReportRow) -> Result<()> {
        if row.alias.contains(',') {
            warn!(alias = %row.alias, "Alias contains a comma, report row will be ambiguous");
        }

        let line = format!("{}\n", row);
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open report file: {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .with_context(|| format!("Failed to append to report file: {}", self.path.display()))?;

        self.rows_written += 1;
        debug!(alias = %row.alias, rows = self.rows_written, "Report row appended");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}
