//! Encoding: values to cell text and CSV documents

mod cell;
mod serializer;
mod writer;

use crate::error::Result;
use crate::model::Value;

pub use cell::{escape_leaf, needs_quoting, CellSerializer, NoPrepare, PrepareInline, DELIMITERS};
pub use serializer::{CsvSerializer, VALUE_COLUMN};
pub use writer::CsvWriter;

/// Encode a single cell with the default configuration
pub fn encode_cell(value: &Value) -> String {
    CellSerializer::default().serialize(value)
}

/// Serialize a value as a CSV document with the default configuration
pub fn to_string(value: &Value) -> Result<String> {
    CsvSerializer::default().to_string(value)
}
