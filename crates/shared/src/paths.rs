//! File path utilities for census output.

use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};

/// Output path manager
#[derive(Debug, Clone)]
pub struct DataPaths {
    report_dir: PathBuf,
    log_dir: PathBuf,
}

impl DataPaths {
    pub fn new(report_dir: impl AsRef<Path>, log_dir: impl AsRef<Path>) -> Self {
        Self {
            report_dir: report_dir.as_ref().to_path_buf(),
            log_dir: log_dir.as_ref().to_path_buf(),
        }
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Get the report file for a run on the given date
    pub fn report_file(&self, date: NaiveDate) -> PathBuf {
        self.report_dir.join(report_file_name(date))
    }

    /// Create all necessary directories
    pub fn create_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.report_dir, &self.log_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Report file name, e.g. `data_wikicommons_2024_3_7.txt` (month and day unpadded)
pub fn report_file_name(date: NaiveDate) -> String {
    format!(
        "data_wikicommons_{}_{}_{}.txt",
        date.year(),
        date.month(),
        date.day()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_report_file_name_is_unpadded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(report_file_name(date), "data_wikicommons_2024_3_7.txt");

        let date = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
        assert_eq!(report_file_name(date), "data_wikicommons_2023_12_25.txt");
    }

    #[test]
    fn test_paths() {
        let paths = DataPaths::new("/data/reports", "/data/logs");
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();

        assert_eq!(
            paths.report_file(date),
            PathBuf::from("/data/reports/data_wikicommons_2025_1_2.txt")
        );
        assert_eq!(paths.log_dir(), Path::new("/data/logs"));
    }

    #[test]
    fn test_create_dirs() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let paths = DataPaths::new(
            temp_dir.path().join("out/reports"),
            temp_dir.path().join("out/logs"),
        );

        paths.create_dirs()?;

        assert!(paths.report_dir().is_dir());
        assert!(paths.log_dir().is_dir());
        Ok(())
    }
}
