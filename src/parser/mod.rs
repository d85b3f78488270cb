//! Decoding: CSV documents and inline cells back to values

mod convert;
mod inline;
mod reader;
mod session;

use std::io::Read;

use serde::de::DeserializeOwned;

use crate::config::CodecConfig;
use crate::error::Result;
use crate::model::{TargetType, Value};

pub use self::convert::{Converter, DefaultConverter};
pub use self::inline::{is_structured, parse_inline, Inline};
pub use self::reader::CsvReader;
pub use self::session::ParserSession;

/// Decode CSV text with the default configuration
pub fn parse_str(input: &str, target: &TargetType) -> Result<Value> {
    parse_reader(input.as_bytes(), target)
}

/// Decode CSV from a reader with the default configuration
pub fn parse_reader<R: Read>(reader: R, target: &TargetType) -> Result<Value> {
    ParserSession::new(CodecConfig::default()).parse(reader, target)
}

/// Decode CSV text and deserialize the result into a serde type
pub fn from_str<T: DeserializeOwned>(input: &str, target: &TargetType) -> Result<T> {
    parse_str(input, target)?.deserialize_into()
}

/// Decode a single cell with the default converter
pub fn decode_cell(raw: &str, target: &TargetType) -> Result<Value> {
    DefaultConverter::default().convert(raw, target)
}
