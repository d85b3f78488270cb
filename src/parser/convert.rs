//! String-to-type conversion hook

use std::borrow::Cow;
use std::fmt::Display;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indexmap::IndexMap;
use log::warn;

use crate::config::{ByteArrayFormat, CodecConfig};
use crate::error::{CsvError, Result};
use crate::model::{PrimitiveArray, PrimitiveKind, Scalar, ScalarKind, TargetType, Value};

use super::inline::{is_structured, parse_inline, Inline};

/// Converts one cell's raw text to a value of the requested type
pub trait Converter {
    fn convert(&self, raw: &str, target: &TargetType) -> Result<Value>;
}

impl<F> Converter for F
where
    F: Fn(&str, &TargetType) -> Result<Value>,
{
    fn convert(&self, raw: &str, target: &TargetType) -> Result<Value> {
        self(raw, target)
    }
}

/// Converter that understands the inline notation written by
/// [`CellSerializer`](crate::output::CellSerializer)
#[derive(Debug, Clone, Default)]
pub struct DefaultConverter {
    config: CodecConfig,
}

impl Converter for DefaultConverter {
    fn convert(&self, raw: &str, target: &TargetType) -> Result<Value> {
        if raw == self.config.null_marker {
            return Ok(Value::Null);
        }
        match target {
            TargetType::Scalar(kind) => {
                let text = self.unquote(raw);
                scalar(&text, *kind, target)
            }
            TargetType::Array(kind @ (PrimitiveKind::Byte | PrimitiveKind::Char))
                if !raw.starts_with('[') =>
            {
                let text = self.unquote(raw);
                self.flat_array(&text, *kind, target)
            }
            TargetType::Dynamic if !is_structured(raw) => Ok(infer(raw)),
            TargetType::Dynamic => match parse_inline(raw, &self.config.null_marker) {
                Ok(tree) => self.from_inline(&tree, target),
                // Arbitrary text that merely starts like a structure
                Err(_) => Ok(infer(raw)),
            },
            _ => {
                let tree = parse_inline(raw, &self.config.null_marker)
                    .map_err(|e| CsvError::conversion(raw, target.type_name(), e.to_string()))?;
                self.from_inline(&tree, target)
            }
        }
    }
}

impl DefaultConverter {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Strip inline quoting from a whole-cell leaf, leaving other text alone
    fn unquote<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            if let Ok(Inline::Text { text, quoted: true }) =
                parse_inline(raw, &self.config.null_marker)
            {
                return Cow::Owned(text);
            }
        }
        Cow::Borrowed(raw)
    }

    /// Type an inline tree against a target
    pub fn from_inline(&self, tree: &Inline, target: &TargetType) -> Result<Value> {
        match (tree, target) {
            (Inline::Null, _) => Ok(Value::Null),
            (Inline::Text { text, quoted }, TargetType::Dynamic) => {
                if *quoted {
                    Ok(Value::from(text.as_str()))
                } else {
                    Ok(infer(text))
                }
            }
            (Inline::Text { text, .. }, TargetType::Scalar(kind)) => scalar(text, *kind, target),
            (Inline::Text { text, .. }, TargetType::Array(kind)) => {
                self.flat_array(text, *kind, target)
            }
            (Inline::Seq(items), TargetType::Array(kind)) => {
                let values = items
                    .iter()
                    .map(|item| self.from_inline(item, &TargetType::Scalar((*kind).into())))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Array(pack_array(*kind, values, target)?))
            }
            (Inline::Seq(items), TargetType::Seq(element)) => Ok(Value::Seq(
                items
                    .iter()
                    .map(|item| self.from_inline(item, element))
                    .collect::<Result<_>>()?,
            )),
            (Inline::Seq(items), TargetType::Dynamic) => Ok(Value::Seq(
                items
                    .iter()
                    .map(|item| self.from_inline(item, target))
                    .collect::<Result<_>>()?,
            )),
            (Inline::Map(entries), TargetType::Map(value_type)) => {
                let mut map = IndexMap::with_capacity(entries.len());
                for (key, item) in entries {
                    map.insert(key.clone(), self.from_inline(item, value_type)?);
                }
                Ok(Value::Map(map))
            }
            (Inline::Map(entries), TargetType::Dynamic) => {
                let mut map = IndexMap::with_capacity(entries.len());
                for (key, item) in entries {
                    map.insert(key.clone(), self.from_inline(item, target)?);
                }
                Ok(Value::Map(map))
            }
            (Inline::Map(entries), TargetType::Bean(schema)) => {
                let mut bean = IndexMap::with_capacity(entries.len());
                for (key, item) in entries {
                    let Some(property_type) = schema.property(key) else {
                        if self.config.ignore_unknown_properties {
                            warn!("Ignoring unknown property '{}' on bean '{}'", key, schema.name());
                            continue;
                        }
                        return Err(CsvError::UnknownProperty {
                            property: key.clone(),
                            bean: schema.name().to_string(),
                        });
                    };
                    let value = self.from_inline(item, property_type)?;
                    schema.set(&mut bean, key, value)?;
                }
                Ok(Value::Map(bean))
            }
            (other, _) => Err(CsvError::conversion(
                render(other),
                target.type_name(),
                format!("cannot build from a {}", other.kind()),
            )),
        }
    }

    /// Byte and char arrays written without brackets
    fn flat_array(&self, text: &str, kind: PrimitiveKind, target: &TargetType) -> Result<Value> {
        let array = match kind {
            PrimitiveKind::Byte => match self.config.byte_array_format {
                ByteArrayFormat::Base64 => PrimitiveArray::Byte(
                    STANDARD
                        .decode(text)
                        .map_err(|e| CsvError::conversion(text, target.type_name(), e.to_string()))?,
                ),
                ByteArrayFormat::SemicolonDelimited => {
                    PrimitiveArray::Byte(split_parse::<u8>(text, target)?)
                }
            },
            PrimitiveKind::Char => PrimitiveArray::Char(
                split_parse::<u32>(text, target)?
                    .into_iter()
                    .map(|code| {
                        char::from_u32(code).ok_or_else(|| {
                            CsvError::conversion(
                                code.to_string(),
                                target.type_name(),
                                "not a valid code point",
                            )
                        })
                    })
                    .collect::<Result<_>>()?,
            ),
            _ => {
                return Err(CsvError::conversion(
                    text,
                    target.type_name(),
                    "expected a bracketed sequence",
                ))
            }
        };
        Ok(Value::Array(array))
    }
}

fn split_parse<T>(text: &str, target: &TargetType) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: Display,
{
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split(';')
        .map(|part| {
            part.parse::<T>()
                .map_err(|e| CsvError::conversion(part, target.type_name(), e.to_string()))
        })
        .collect()
}

/// Parse a leaf as the given scalar kind
pub(crate) fn scalar(text: &str, kind: ScalarKind, target: &TargetType) -> Result<Value> {
    let fail = |reason: String| CsvError::conversion(text, target.type_name(), reason);
    let value = match kind {
        ScalarKind::String => Scalar::String(text.to_string()),
        ScalarKind::Int => Scalar::Int(text.parse::<i64>().map_err(|e| fail(format!("{}", e)))?),
        ScalarKind::Float => Scalar::Float(text.parse::<f64>().map_err(|e| fail(format!("{}", e)))?),
        ScalarKind::Bool => {
            if text.eq_ignore_ascii_case("true") {
                Scalar::Bool(true)
            } else if text.eq_ignore_ascii_case("false") {
                Scalar::Bool(false)
            } else {
                return Err(fail("expected true or false".to_string()));
            }
        }
        ScalarKind::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Scalar::Char(c),
                _ => return Err(fail("expected exactly one character".to_string())),
            }
        }
    };
    Ok(Value::Scalar(value))
}

/// Guess a leaf's type: boolean, integer, float, else string
pub(crate) fn infer(text: &str) -> Value {
    if text.eq_ignore_ascii_case("true") {
        return Value::from(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::from(false);
    }
    if let Ok(i) = text.parse::<i64>() {
        return Value::from(i);
    }
    // Keeps words like "inf" and "NaN" as strings
    if text.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(f) = text.parse::<f64>() {
            return Value::from(f);
        }
    }
    Value::from(text)
}

/// Narrow scalar values into a primitive array of the given kind
pub(crate) fn pack_array(
    kind: PrimitiveKind,
    values: Vec<Value>,
    target: &TargetType,
) -> Result<PrimitiveArray> {
    fn narrow<T: TryFrom<i64>>(value: &Value, target: &TargetType) -> Result<T> {
        match value {
            Value::Scalar(Scalar::Int(i)) => T::try_from(*i).map_err(|_| {
                CsvError::conversion(i.to_string(), target.type_name(), "out of range")
            }),
            other => Err(element_error(other, target)),
        }
    }

    let float = |value: &Value| match value {
        Value::Scalar(Scalar::Float(f)) => Ok(*f),
        Value::Scalar(Scalar::Int(i)) => Ok(*i as f64),
        other => Err(element_error(other, target)),
    };

    let array = match kind {
        PrimitiveKind::Int => PrimitiveArray::Int(
            values.iter().map(|v| narrow(v, target)).collect::<Result<_>>()?,
        ),
        PrimitiveKind::Long => PrimitiveArray::Long(
            values.iter().map(|v| narrow(v, target)).collect::<Result<_>>()?,
        ),
        PrimitiveKind::Short => PrimitiveArray::Short(
            values.iter().map(|v| narrow(v, target)).collect::<Result<_>>()?,
        ),
        PrimitiveKind::Byte => PrimitiveArray::Byte(
            values.iter().map(|v| narrow(v, target)).collect::<Result<_>>()?,
        ),
        PrimitiveKind::Double => {
            PrimitiveArray::Double(values.iter().map(float).collect::<Result<_>>()?)
        }
        PrimitiveKind::Float => PrimitiveArray::Float(
            values
                .iter()
                .map(|v| float(v).map(|f| f as f32))
                .collect::<Result<_>>()?,
        ),
        PrimitiveKind::Boolean => PrimitiveArray::Boolean(
            values
                .iter()
                .map(|v| match v {
                    Value::Scalar(Scalar::Bool(b)) => Ok(*b),
                    other => Err(element_error(other, target)),
                })
                .collect::<Result<_>>()?,
        ),
        PrimitiveKind::Char => PrimitiveArray::Char(
            values
                .iter()
                .map(|v| match v {
                    Value::Scalar(Scalar::Char(c)) => Ok(*c),
                    other => Err(element_error(other, target)),
                })
                .collect::<Result<_>>()?,
        ),
    };
    Ok(array)
}

fn element_error(value: &Value, target: &TargetType) -> CsvError {
    let reason = if value.is_null() {
        "primitive arrays cannot hold null"
    } else {
        "wrong element type"
    };
    CsvError::conversion(value.to_string(), target.type_name(), reason)
}

fn render(tree: &Inline) -> String {
    match tree {
        Inline::Null => "null".to_string(),
        Inline::Text { text, .. } => text.clone(),
        Inline::Map(entries) => format!("{{{} entries}}", entries.len()),
        Inline::Seq(items) => format!("[{} items]", items.len()),
    }
}
