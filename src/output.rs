//! CSV persistence and keyword loading.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::record::{Record, RunSummary};

/// Where per-session results go once the pipeline is done with them.
pub trait RecordSink {
    fn persist(&mut self, keyword: &str, records: &[Record]) -> color_eyre::Result<()>;
}

/// Writes one `<keyword>.csv` per session into the output directory.
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RecordSink for CsvSink {
    fn persist(&mut self, keyword: &str, records: &[Record]) -> color_eyre::Result<()> {
        if records.is_empty() {
            info!("no data to save for keyword: {keyword}");
            return Ok(());
        }
        let path = self.dir.join(format!("{}.csv", safe_filename(keyword)));
        let mut writer = csv::Writer::from_path(&path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        info!("saved {} records to {}", records.len(), path.display());
        Ok(())
    }
}

/// Keep alphanumerics, spaces, underscores and dashes; everything else
/// becomes an underscore so keywords are safe as filenames.
pub fn safe_filename(keyword: &str) -> String {
    keyword
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Write the timestamped run summary next to the per-keyword files.
pub fn write_summary(dir: &Path, summary: &RunSummary) -> color_eyre::Result<PathBuf> {
    let path = dir.join(format!(
        "scraping_summary_{}.csv",
        Utc::now().format("%Y%m%d_%H%M%S")
    ));
    let mut writer = csv::Writer::from_path(&path)?;
    for outcome in &summary.sessions {
        writer.serialize(outcome)?;
    }
    writer.flush()?;
    info!("summary report saved to {}", path.display());
    Ok(path)
}

/// Load keywords from the first column of a CSV file, skipping blank cells.
pub fn load_keywords(path: &Path) -> color_eyre::Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut keywords = Vec::new();
    for row in reader.records() {
        let row = row?;
        if let Some(cell) = row.get(0) {
            let cell = cell.trim();
            if !cell.is_empty() {
                keywords.push(cell.to_string());
            }
        }
    }
    Ok(keywords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(
            safe_filename("cafe near Bakersfield, CA"),
            "cafe near Bakersfield_ CA"
        );
        assert_eq!(safe_filename("gym/spa: 24h"), "gym_spa_ 24h");
    }

    #[test]
    fn keywords_load_from_first_column() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("mapharvest_keywords_{}.csv", std::process::id()));
        std::fs::write(&path, "restaurant in Jakarta,extra\n\ncoffee shop in Bali\n  \n").unwrap();

        let keywords = load_keywords(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(keywords, ["restaurant in Jakarta", "coffee shop in Bali"]);
    }
}
