//! Low-level CSV row writer

use std::io::Write;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::config::CodecConfig;
use crate::error::{CsvError, Result};

/// Writes rows of already-encoded cells, quoting fields only when they
/// contain the delimiter, the quote character or a line break.
pub struct CsvWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W, config: &CodecConfig) -> Self {
        let inner = WriterBuilder::new()
            .delimiter(b',')
            .quote(config.quote)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(writer);
        Self { inner }
    }

    /// Write one row
    pub fn write_row<I, T>(&mut self, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.inner.write_record(cells)?;
        Ok(())
    }

    /// Flush buffered rows to the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|error| CsvError::Io(error.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(rows: &[&[&str]], config: &CodecConfig) -> String {
        let mut writer = CsvWriter::new(Vec::new(), config);
        for row in rows {
            writer.write_row(row.iter()).unwrap();
        }
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_plain_rows() {
        let out = write(&[&["name", "age"], &["John", "30"]], &CodecConfig::default());
        assert_eq!(out, "name,age\nJohn,30\n");
    }

    #[test]
    fn test_quotes_only_when_needed() {
        let out = write(
            &[&["{a:1;b:2}", "x,y", r#"{b:"x;y"}"#]],
            &CodecConfig::default(),
        );
        assert_eq!(out, "{a:1;b:2},\"x,y\",\"{b:\"\"x;y\"\"}\"\n");
    }

    #[test]
    fn test_custom_quote_character() {
        let out = write(&[&["a,b", "c"]], &CodecConfig::default().with_quote(b'\''));
        assert_eq!(out, "'a,b',c\n");
    }
}
