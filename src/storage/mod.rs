use crate::error::ScrapeError;
use crate::models::ListingRecord;

mod csv_export;
pub use csv_export::CsvSink;

/// Destination for normalized records, fed one record at a time as pages
/// are processed.
pub trait ListingSink {
    fn write(&mut self, record: &ListingRecord) -> Result<(), ScrapeError>;

    /// Called once when the crawl reaches its end.
    fn finish(&mut self) -> Result<(), ScrapeError> {
        Ok(())
    }
}

#[cfg(test)]
impl ListingSink for Vec<ListingRecord> {
    fn write(&mut self, record: &ListingRecord) -> Result<(), ScrapeError> {
        self.push(record.clone());
        Ok(())
    }
}
