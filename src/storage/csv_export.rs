use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::ScrapeError;
use crate::models::{ListingRecord, CSV_COLUMNS};
use crate::storage::ListingSink;

/// CSV exporter. The header row is written up front so even a run that finds
/// nothing leaves a well-formed file behind.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Creates or truncates `path`.
    pub fn create(path: &Path) -> Result<Self, ScrapeError> {
        let file = File::create(path)?;
        info!("Writing listings to {}", path.display());
        Self::from_writer(file)
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(inner: W) -> Result<Self, ScrapeError> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
        writer.write_record(CSV_COLUMNS)?;
        Ok(Self { writer })
    }

    #[cfg(test)]
    fn into_inner(self) -> Result<W, ScrapeError> {
        self.writer
            .into_inner()
            .map_err(|e| ScrapeError::Io(std::io::Error::new(e.error().kind(), e.to_string())))
    }
}

impl<W: Write> ListingSink for CsvSink<W> {
    fn write(&mut self, record: &ListingRecord) -> Result<(), ScrapeError> {
        self.writer.serialize(record)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ScrapeError> {
        self.writer.flush()?;
        Ok(())
    }
}
