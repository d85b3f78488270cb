//! Inline cell encoder
//!
//! Packs a [`Value`] into the text of one CSV cell: maps become
//! `{k:v;k2:v2}`, sequences and most primitive arrays become `[a;b]`, and
//! leaves containing any delimiter are double-quoted with `"` and `\`
//! backslash-escaped.

use std::borrow::Cow;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::{ByteArrayFormat, CodecConfig};
use crate::model::{InlineObject, PrimitiveArray, Scalar, Value};

/// Characters that force a leaf to be quoted
pub const DELIMITERS: &[char] = &[';', ':', '{', '}', '[', ']', '"', '\\'];

/// Hook that turns host objects into encodable values.
///
/// Returning `None` makes the encoder fall back to the object's `Display`
/// text.
pub trait PrepareInline: Send + Sync {
    fn prepare(&self, object: &dyn InlineObject) -> Option<Value>;
}

impl<F> PrepareInline for F
where
    F: Fn(&dyn InlineObject) -> Option<Value> + Send + Sync,
{
    fn prepare(&self, object: &dyn InlineObject) -> Option<Value> {
        self(object)
    }
}

/// Prepare hook that never converts anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrepare;

impl PrepareInline for NoPrepare {
    fn prepare(&self, _object: &dyn InlineObject) -> Option<Value> {
        None
    }
}

/// Whether a leaf must be quoted
pub fn needs_quoting(leaf: &str) -> bool {
    leaf.contains(DELIMITERS)
}

/// Quote and escape a leaf if it contains a delimiter
pub fn escape_leaf(leaf: &str) -> Cow<'_, str> {
    if !needs_quoting(leaf) {
        return Cow::Borrowed(leaf);
    }
    let mut out = String::with_capacity(leaf.len() + 2);
    push_quoted(&mut out, leaf);
    Cow::Owned(out)
}

fn push_quoted(out: &mut String, leaf: &str) {
    out.push('"');
    for c in leaf.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

/// Encoder for single cells. Holds only immutable configuration, so one
/// instance can be shared across threads.
#[derive(Clone)]
pub struct CellSerializer {
    config: CodecConfig,
    prepare: Arc<dyn PrepareInline>,
}

impl Default for CellSerializer {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl std::fmt::Debug for CellSerializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellSerializer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CellSerializer {
    /// Create a serializer with no prepare hook
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            prepare: Arc::new(NoPrepare),
        }
    }

    /// Install the hook used for [`Value::Object`] values
    pub fn with_prepare(mut self, prepare: impl PrepareInline + 'static) -> Self {
        self.prepare = Arc::new(prepare);
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode a value as cell text
    pub fn serialize(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, 0);
        out
    }

    /// Run objects through the prepare hook, leaving other values untouched
    pub(crate) fn resolve<'a>(&self, value: &'a Value) -> Cow<'a, Value> {
        match value {
            Value::Object(object) => match self.prepare.prepare(object.as_ref()) {
                Some(prepared) => Cow::Owned(prepared),
                None => Cow::Borrowed(value),
            },
            _ => Cow::Borrowed(value),
        }
    }

    fn write_value(&self, out: &mut String, value: &Value, depth: usize) {
        match value {
            Value::Null => out.push_str(&self.config.null_marker),
            Value::Map(map) => {
                out.push('{');
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(';');
                    }
                    out.push_str(&escape_leaf(key));
                    out.push(':');
                    self.write_value(out, item, depth + 1);
                }
                out.push('}');
            }
            Value::Seq(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(';');
                    }
                    self.write_value(out, item, depth + 1);
                }
                out.push(']');
            }
            Value::Array(array) => self.write_array(out, array, depth),
            Value::Scalar(Scalar::String(s)) => out.push_str(&escape_leaf(s)),
            Value::Scalar(scalar) => out.push_str(&escape_leaf(&scalar.to_string())),
            Value::Object(object) => match self.prepare.prepare(object.as_ref()) {
                // A hook handing back another object would recurse forever
                Some(Value::Object(inner)) => out.push_str(&escape_leaf(&inner.to_string())),
                Some(prepared) => self.write_value(out, &prepared, depth),
                None => out.push_str(&escape_leaf(&object.to_string())),
            },
        }
    }

    fn write_array(&self, out: &mut String, array: &PrimitiveArray, depth: usize) {
        let flat = match array {
            PrimitiveArray::Byte(bytes) => match self.config.byte_array_format {
                ByteArrayFormat::Base64 => STANDARD.encode(bytes),
                ByteArrayFormat::SemicolonDelimited => join_semicolons(bytes.iter()),
            },
            PrimitiveArray::Char(chars) => join_semicolons(chars.iter().map(|&c| u32::from(c))),
            other => {
                out.push('[');
                for (i, text) in other.texts().iter().enumerate() {
                    if i > 0 {
                        out.push(';');
                    }
                    out.push_str(&escape_leaf(text));
                }
                out.push(']');
                return;
            }
        };
        // Semicolon lists are only unambiguous as the whole cell
        if depth == 0 {
            out.push_str(&flat);
        } else {
            out.push_str(&escape_leaf(&flat));
        }
    }
}

fn join_semicolons<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(";")
}
