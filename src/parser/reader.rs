//! Low-level CSV row reader

use std::io::Read;

use csv::{ReaderBuilder, StringRecordsIntoIter};

use crate::config::CodecConfig;
use crate::error::Result;
use crate::model::Row;

/// Reads raw rows. Does not treat the first row specially, tolerates rows of
/// different lengths and skips empty lines.
pub struct CsvReader<R: Read> {
    records: StringRecordsIntoIter<R>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R, config: &CodecConfig) -> Self {
        let records = ReaderBuilder::new()
            .delimiter(b',')
            .quote(config.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_records();
        Self { records }
    }

    /// Read the next row, or `None` at end of input
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        match self.records.next() {
            None => Ok(None),
            Some(Err(error)) => Err(error.into()),
            Some(Ok(record)) => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                let cells = record.iter().map(str::to_string).collect();
                Ok(Some(Row::new(cells, line)))
            }
        }
    }
}

impl<R: Read> Iterator for CsvReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_row().transpose()
    }
}
