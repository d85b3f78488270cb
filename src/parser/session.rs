//! Header-driven row decoder

use std::io::Read;

use indexmap::IndexMap;
use log::{debug, trace, warn};

use crate::config::CodecConfig;
use crate::error::{CsvError, Result};
use crate::model::{BeanSchema, PrimitiveArray, PrimitiveKind, Row, TargetType, Value};
use crate::output::VALUE_COLUMN;

use super::convert::{pack_array, Converter, DefaultConverter};
use super::reader::CsvReader;

/// One decode of one CSV document.
///
/// The first row is read as the header; every later row becomes a value
/// shaped by the target type. [`parse`](Self::parse) consumes the session,
/// so each session performs exactly one parse.
pub struct ParserSession<C = DefaultConverter> {
    config: CodecConfig,
    converter: C,
}

impl Default for ParserSession {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl ParserSession {
    /// Create a session using the [`DefaultConverter`]
    pub fn new(config: CodecConfig) -> Self {
        let converter = DefaultConverter::new(config.clone());
        Self { config, converter }
    }
}

impl<C: Converter> ParserSession<C> {
    /// Replace the string-to-type conversion hook
    pub fn with_converter<D: Converter>(self, converter: D) -> ParserSession<D> {
        ParserSession {
            config: self.config,
            converter,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decode a CSV document.
    ///
    /// * a sequence of beans, maps or dynamic values yields one element per
    ///   data row, holding every column;
    /// * a bean or map consumes exactly one data row (`Null` if there is none);
    /// * a sequence of scalars or a primitive array takes each row's `value`
    ///   column, or its first column;
    /// * `Dynamic` yields a sequence of maps, or the lone map when there is
    ///   exactly one data row and `collapse_single_row` is set.
    ///
    /// A missing or blank header yields an empty result. Any conversion
    /// failure aborts the whole parse.
    pub fn parse<R: Read>(self, reader: R, target: &TargetType) -> Result<Value> {
        let mut rows = CsvReader::new(reader, &self.config);

        let headers: Vec<String> = match rows.read_row()? {
            Some(row) if !row.is_empty() && !row.is_blank() => {
                row.cells.iter().map(|h| h.trim().to_string()).collect()
            }
            _ => {
                debug!("No header row found, returning empty result");
                return Ok(empty_result(target));
            }
        };
        debug!("Read header with {} columns: {:?}", headers.len(), headers);

        let value = match target {
            TargetType::Seq(element) if element.is_row_shaped() => {
                let mut items = Vec::new();
                while let Some(row) = rows.read_row()? {
                    items.push(self.row_value(&headers, &row, element)?);
                }
                Value::Seq(items)
            }
            TargetType::Seq(element) => {
                let column = value_column(&headers);
                let mut items = Vec::new();
                while let Some(row) = rows.read_row()? {
                    items.push(self.column_value(&row, column, element)?);
                }
                Value::Seq(items)
            }
            TargetType::Array(kind) => {
                let column = value_column(&headers);
                let element = TargetType::Scalar((*kind).into());
                let mut items = Vec::new();
                while let Some(row) = rows.read_row()? {
                    items.push(self.column_value(&row, column, &element)?);
                }
                Value::Array(pack_array(*kind, items, target)?)
            }
            TargetType::Map(_) | TargetType::Bean(_) => match rows.read_row()? {
                Some(row) => self.row_value(&headers, &row, target)?,
                None => Value::Null,
            },
            TargetType::Scalar(_) => match rows.read_row()? {
                Some(row) => self.column_value(&row, value_column(&headers), target)?,
                None => Value::Null,
            },
            TargetType::Dynamic => {
                let mut items = Vec::new();
                while let Some(row) = rows.read_row()? {
                    items.push(self.row_value(&headers, &row, target)?);
                }
                if items.len() == 1 && self.config.collapse_single_row {
                    items.swap_remove(0)
                } else {
                    Value::Seq(items)
                }
            }
        };

        debug!("Decoded {} as {}", summarize(&value), target);
        Ok(value)
    }

    /// Build one map or bean from a data row, pairing cells with headers
    fn row_value(&self, headers: &[String], row: &Row, target: &TargetType) -> Result<Value> {
        if row.len() > headers.len() {
            return Err(CsvError::Parse {
                line: row.line,
                message: format!(
                    "row has {} cells but the header has {} columns",
                    row.len(),
                    headers.len()
                ),
            });
        }

        match target {
            TargetType::Bean(schema) => self.bean_row(schema, headers, row),
            TargetType::Map(value_type) => self.map_row(headers, row, value_type),
            _ => self.map_row(headers, row, &TargetType::Dynamic),
        }
    }

    fn map_row(&self, headers: &[String], row: &Row, value_type: &TargetType) -> Result<Value> {
        let mut map = IndexMap::with_capacity(row.len());
        for (header, raw) in headers.iter().zip(&row.cells) {
            map.insert(header.clone(), self.convert_cell(raw, value_type)?);
        }
        Ok(Value::Map(map))
    }

    fn bean_row(&self, schema: &BeanSchema, headers: &[String], row: &Row) -> Result<Value> {
        let mut bean = IndexMap::with_capacity(row.len());
        for (header, raw) in headers.iter().zip(&row.cells) {
            let Some(property_type) = schema.property(header) else {
                if self.config.ignore_unknown_properties {
                    warn!(
                        "Ignoring column '{}' on line {}: no such property on bean '{}'",
                        header,
                        row.line,
                        schema.name()
                    );
                    continue;
                }
                return Err(CsvError::UnknownProperty {
                    property: header.clone(),
                    bean: schema.name().to_string(),
                });
            };
            let value = self.convert_cell(raw, property_type)?;
            schema.set(&mut bean, header, value)?;
        }
        Ok(Value::Map(bean))
    }

    fn column_value(&self, row: &Row, column: usize, target: &TargetType) -> Result<Value> {
        match row.get(column) {
            Some(raw) => self.convert_cell(raw, target),
            None => Ok(Value::Null),
        }
    }

    fn convert_cell(&self, raw: &str, target: &TargetType) -> Result<Value> {
        let text = if self.config.trim_strings {
            raw.trim()
        } else {
            raw
        };
        trace!("Converting '{}' to {}", text, target);
        self.converter.convert(text, target)
    }
}

/// Index of the `value` column, defaulting to the first column
fn value_column(headers: &[String]) -> usize {
    headers
        .iter()
        .position(|h| h == VALUE_COLUMN)
        .unwrap_or(0)
}

fn empty_result(target: &TargetType) -> Value {
    match target {
        TargetType::Seq(_) | TargetType::Dynamic => Value::Seq(Vec::new()),
        TargetType::Array(kind) => Value::Array(match kind {
            PrimitiveKind::Int => PrimitiveArray::Int(Vec::new()),
            PrimitiveKind::Long => PrimitiveArray::Long(Vec::new()),
            PrimitiveKind::Double => PrimitiveArray::Double(Vec::new()),
            PrimitiveKind::Float => PrimitiveArray::Float(Vec::new()),
            PrimitiveKind::Short => PrimitiveArray::Short(Vec::new()),
            PrimitiveKind::Boolean => PrimitiveArray::Boolean(Vec::new()),
            PrimitiveKind::Char => PrimitiveArray::Char(Vec::new()),
            PrimitiveKind::Byte => PrimitiveArray::Byte(Vec::new()),
        }),
        TargetType::Map(_) | TargetType::Bean(_) | TargetType::Scalar(_) => Value::Null,
    }
}

fn summarize(value: &Value) -> String {
    match value {
        Value::Seq(items) => format!("{} rows", items.len()),
        Value::Array(array) => format!("{} elements", array.len()),
        Value::Null => "no rows".to_string(),
        _ => "1 row".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Scalar;

    fn parse(input: &str, target: &TargetType) -> Result<Value> {
        ParserSession::new(CodecConfig::default()).parse(input.as_bytes(), target)
    }

    fn person() -> TargetType {
        TargetType::bean(
            BeanSchema::new("Person")
                .with_property("name", TargetType::string())
                .with_property("age", TargetType::int()),
        )
    }

    #[test]
    fn test_single_bean() {
        let value = parse("name,age\nJohn,30\n", &person()).unwrap();
        assert_eq!(value.get("name"), Some(&Value::from("John")));
        assert_eq!(value.get("age"), Some(&Value::from(30i64)));
    }

    #[test]
    fn test_single_bean_consumes_one_row() {
        let value = parse("name,age\nJohn,30\nJane,x\n", &person()).unwrap();
        assert_eq!(value.get("name"), Some(&Value::from("John")));
    }

    #[test]
    fn test_sequence_of_beans() {
        let value = parse(
            "name,age\nJohn,30\nJane,25\n",
            &TargetType::seq_of(person()),
        )
        .unwrap();
        let items = value.as_seq().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].get("age"), Some(&Value::from(25i64)));
    }

    #[test]
    fn test_dynamic_rows() {
        let value = parse("a,b\n1,2\n3,4\n", &TargetType::Dynamic).unwrap();
        assert_eq!(
            value.to_json(),
            serde_json::json!([{"a": 1, "b": 2}, {"a": 3, "b": 4}])
        );
    }

    #[test]
    fn test_dynamic_single_row_collapses() {
        let value = parse("a,b\n1,2\n", &TargetType::Dynamic).unwrap();
        assert_eq!(value.to_json(), serde_json::json!({"a": 1, "b": 2}));

        let value = ParserSession::new(CodecConfig::default().with_collapse_single_row(false))
            .parse("a,b\n1,2\n".as_bytes(), &TargetType::Dynamic)
            .unwrap();
        assert_eq!(value.to_json(), serde_json::json!([{"a": 1, "b": 2}]));
    }

    #[test]
    fn test_scalar_sequence_uses_value_column() {
        let value = parse("id,value\n1,x\n2,y\n", &TargetType::seq_of(TargetType::string())).unwrap();
        assert_eq!(value, Value::from(vec!["x", "y"]));

        let value = parse("n\n1\n2\n", &TargetType::seq_of(TargetType::int())).unwrap();
        assert_eq!(value, Value::from(vec![1i64, 2]));
    }

    #[test]
    fn test_sequence_of_dynamic_keeps_every_column() {
        let value = parse("a,b\n1,2\n", &TargetType::seq_of(TargetType::Dynamic)).unwrap();
        assert_eq!(value.to_json(), serde_json::json!([{"a": 1, "b": 2}]));

        let value = parse(
            "a,b\n1,{x:y}\n3,[4]\n",
            &TargetType::seq_of(TargetType::Dynamic),
        )
        .unwrap();
        assert_eq!(
            value.to_json(),
            serde_json::json!([{"a": 1, "b": {"x": "y"}}, {"a": 3, "b": [4]}])
        );
    }

    #[test]
    fn test_scalar_target() {
        assert_eq!(parse("value\n42\n", &TargetType::int()).unwrap(), Value::from(42i64));
        assert_eq!(
            parse("id,value\n7,x\n8,y\n", &TargetType::string()).unwrap(),
            Value::from("x")
        );
        assert_eq!(parse("n,m\n5,6\n", &TargetType::int()).unwrap(), Value::from(5i64));
        assert_eq!(parse("value\n", &TargetType::int()).unwrap(), Value::Null);
        assert_eq!(parse("", &TargetType::int()).unwrap(), Value::Null);
    }

    #[test]
    fn test_primitive_array_target() {
        let value = parse("value\n1\n2\n", &TargetType::Array(PrimitiveKind::Long)).unwrap();
        assert_eq!(value, Value::Array(PrimitiveArray::Long(vec![1, 2])));
    }

    #[test]
    fn test_missing_header_gives_empty_result() {
        assert_eq!(parse("", &TargetType::Dynamic).unwrap(), Value::Seq(vec![]));
        assert_eq!(parse("", &person()).unwrap(), Value::Null);
        assert_eq!(
            parse(" , \n1,2\n", &TargetType::seq_of(person())).unwrap(),
            Value::Seq(vec![])
        );
    }

    #[test]
    fn test_null_cell() {
        let value = parse("name,age\nnull,30\n", &person()).unwrap();
        assert_eq!(value.get("name"), Some(&Value::Null));

        let value = parse("name,age\n\"\"\"null\"\"\",30\n", &person()).unwrap();
        assert_eq!(value.get("name"), Some(&Value::from("null")));
    }

    #[test]
    fn test_trim_strings() {
        let target = TargetType::seq_of(person());
        let err = parse("name,age\nJohn, 30\n", &target).unwrap_err();
        assert!(err.is_conversion());

        let value = ParserSession::new(CodecConfig::default().with_trim_strings(true))
            .parse("name,age\n John , 30\n".as_bytes(), &target)
            .unwrap();
        assert_eq!(value.as_seq().unwrap()[0].get("name"), Some(&Value::from("John")));
    }

    #[test]
    fn test_conversion_failure_aborts_parse() {
        let err = parse(
            "name,age\nJohn,30\nJane,old\n",
            &TargetType::seq_of(person()),
        )
        .unwrap_err();
        match err {
            CsvError::Conversion {
                value, type_name, ..
            } => {
                assert_eq!(value, "old");
                assert_eq!(type_name, "Int");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unknown_column() {
        let input = "name,email\nJohn,j@example.com\n";
        let err = parse(input, &person()).unwrap_err();
        assert!(matches!(err, CsvError::UnknownProperty { .. }));

        let value = ParserSession::new(CodecConfig::default().with_ignore_unknown_properties(true))
            .parse(input.as_bytes(), &person())
            .unwrap();
        assert_eq!(value.as_map().map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_too_many_cells() {
        let err = parse("a\n1,2\n", &TargetType::Dynamic).unwrap_err();
        match err {
            CsvError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_short_rows_leave_fields_absent() {
        let value = parse("a,b\n1\n", &TargetType::map_of(TargetType::int())).unwrap();
        assert_eq!(value.as_map().map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_custom_converter() {
        let session = ParserSession::new(CodecConfig::default()).with_converter(|raw: &str, _: &TargetType| -> Result<Value> {
            Ok(Value::Scalar(Scalar::String(raw.to_lowercase())))
        });
        let value = session
            .parse("A\nHELLO\n".as_bytes(), &TargetType::Dynamic)
            .unwrap();
        assert_eq!(value.get("A"), Some(&Value::from("hello")));
    }
}
