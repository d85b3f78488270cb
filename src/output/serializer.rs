//! Row serializer: writes a header row followed by one row per item

use std::borrow::Cow;
use std::io::Write;

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::config::CodecConfig;
use crate::error::{CsvError, Result};
use crate::model::Value;

use super::cell::{escape_leaf, CellSerializer, PrepareInline};
use super::writer::CsvWriter;

/// Column name used when rows are not maps
pub const VALUE_COLUMN: &str = "value";

/// Serializes values as CSV documents, encoding each cell with a
/// [`CellSerializer`]
#[derive(Debug, Clone, Default)]
pub struct CsvSerializer {
    cell: CellSerializer,
}

impl CsvSerializer {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            cell: CellSerializer::new(config),
        }
    }

    /// Install the hook used for [`Value::Object`] values
    pub fn with_prepare(mut self, prepare: impl PrepareInline + 'static) -> Self {
        self.cell = self.cell.with_prepare(prepare);
        self
    }

    /// The cell encoder in use
    pub fn cell_serializer(&self) -> &CellSerializer {
        &self.cell
    }

    /// Serialize a value and return the CSV text
    pub fn to_string(&self, value: &Value) -> Result<String> {
        let mut buf = Vec::new();
        self.serialize(value, &mut buf)?;
        String::from_utf8(buf)
            .map_err(|e| CsvError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// Serialize a value to a writer.
    ///
    /// A sequence of maps becomes one row per map under the union of their
    /// keys; a single map becomes one row; any other sequence or array becomes
    /// one row per element under a `value` header. `Null`, empty sequences and
    /// empty arrays write nothing.
    pub fn serialize<W: Write>(&self, value: &Value, writer: W) -> Result<()> {
        let mut out = CsvWriter::new(writer, self.cell.config());
        let value = self.cell.resolve(value);

        let rows = match &*value {
            Value::Null => {
                debug!("Nothing to serialize for null value");
                return Ok(());
            }
            Value::Seq(items) if items.is_empty() => {
                debug!("Nothing to serialize for empty sequence");
                return Ok(());
            }
            Value::Seq(items) => {
                let resolved: Vec<Cow<'_, Value>> =
                    items.iter().map(|item| self.cell.resolve(item)).collect();
                if resolved.iter().all(|r| matches!(&**r, Value::Map(_))) {
                    self.write_map_rows(&mut out, &resolved)?
                } else {
                    self.write_value_rows(&mut out, resolved.iter().map(|r| &**r))?
                }
            }
            Value::Map(_) => self.write_map_rows(&mut out, std::slice::from_ref(&value))?,
            Value::Array(array) if array.is_empty() => {
                debug!("Nothing to serialize for empty {} array", array.kind().name());
                return Ok(());
            }
            Value::Array(array) => {
                out.write_row([VALUE_COLUMN])?;
                for text in array.texts() {
                    out.write_row([escape_leaf(&text).into_owned()])?;
                }
                array.len()
            }
            other => self.write_value_rows(&mut out, std::iter::once(other))?,
        };

        out.flush()?;
        debug!("Serialized {} data rows", rows);
        Ok(())
    }

    fn write_map_rows<W: Write>(
        &self,
        out: &mut CsvWriter<W>,
        rows: &[Cow<'_, Value>],
    ) -> Result<usize> {
        let maps: Vec<&IndexMap<String, Value>> =
            rows.iter().filter_map(|r| r.as_map()).collect();

        let mut header: IndexSet<&str> = IndexSet::new();
        for map in &maps {
            header.extend(map.keys().map(String::as_str));
        }
        if header.is_empty() {
            // No columns means no header row, so the row count is not kept
            debug!("Skipping {} rows without keys", maps.len());
            return Ok(0);
        }
        out.write_row(header.iter())?;

        let null = Value::Null;
        for map in &maps {
            let cells = header
                .iter()
                .map(|key| self.cell.serialize(map.get(*key).unwrap_or(&null)));
            out.write_row(cells)?;
        }
        Ok(maps.len())
    }

    fn write_value_rows<'v, W: Write>(
        &self,
        out: &mut CsvWriter<W>,
        items: impl Iterator<Item = &'v Value>,
    ) -> Result<usize> {
        out.write_row([VALUE_COLUMN])?;
        let mut count = 0;
        for item in items {
            out.write_row([self.cell.serialize(item)])?;
            count += 1;
        }
        Ok(count)
    }
}
