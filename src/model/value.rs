//! Cell values: the closed set of shapes the codec understands

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::output::CellSerializer;

/// A scalar leaf value
#[derive(Debug, Clone)]
pub enum Scalar {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::String(a), Scalar::String(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Char(a), Scalar::Char(b)) => a == b,
            // Cross-type numeric comparison
            (Scalar::Int(a), Scalar::Float(b)) => (*a as f64) == *b,
            (Scalar::Float(a), Scalar::Int(b)) => *a == (*b as f64),
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Char(c) => write!(f, "{}", c),
        }
    }
}

/// Element kind of a primitive array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    Long,
    Double,
    Float,
    Short,
    Boolean,
    Char,
    Byte,
}

impl PrimitiveKind {
    /// Element type name as used in `int[]`-style type names
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Byte => "byte",
        }
    }
}

/// A homogeneous array of primitives
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveArray {
    Int(Vec<i32>),
    Long(Vec<i64>),
    Double(Vec<f64>),
    Float(Vec<f32>),
    Short(Vec<i16>),
    Boolean(Vec<bool>),
    Char(Vec<char>),
    Byte(Vec<u8>),
}

impl PrimitiveArray {
    /// The element kind
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            PrimitiveArray::Int(_) => PrimitiveKind::Int,
            PrimitiveArray::Long(_) => PrimitiveKind::Long,
            PrimitiveArray::Double(_) => PrimitiveKind::Double,
            PrimitiveArray::Float(_) => PrimitiveKind::Float,
            PrimitiveArray::Short(_) => PrimitiveKind::Short,
            PrimitiveArray::Boolean(_) => PrimitiveKind::Boolean,
            PrimitiveArray::Char(_) => PrimitiveKind::Char,
            PrimitiveArray::Byte(_) => PrimitiveKind::Byte,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            PrimitiveArray::Int(v) => v.len(),
            PrimitiveArray::Long(v) => v.len(),
            PrimitiveArray::Double(v) => v.len(),
            PrimitiveArray::Float(v) => v.len(),
            PrimitiveArray::Short(v) => v.len(),
            PrimitiveArray::Boolean(v) => v.len(),
            PrimitiveArray::Char(v) => v.len(),
            PrimitiveArray::Byte(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements widened to scalars
    pub fn scalars(&self) -> Vec<Scalar> {
        match self {
            PrimitiveArray::Int(v) => v.iter().map(|&i| Scalar::Int(i64::from(i))).collect(),
            PrimitiveArray::Long(v) => v.iter().map(|&i| Scalar::Int(i)).collect(),
            PrimitiveArray::Double(v) => v.iter().map(|&d| Scalar::Float(d)).collect(),
            PrimitiveArray::Float(v) => v.iter().map(|&d| Scalar::Float(f64::from(d))).collect(),
            PrimitiveArray::Short(v) => v.iter().map(|&i| Scalar::Int(i64::from(i))).collect(),
            PrimitiveArray::Boolean(v) => v.iter().map(|&b| Scalar::Bool(b)).collect(),
            PrimitiveArray::Char(v) => v.iter().map(|&c| Scalar::Char(c)).collect(),
            PrimitiveArray::Byte(v) => v.iter().map(|&b| Scalar::Int(i64::from(b))).collect(),
        }
    }

    /// Elements as text. `f32` keeps its own shortest form rather than the
    /// digits of its `f64` widening.
    pub fn texts(&self) -> Vec<String> {
        match self {
            PrimitiveArray::Float(v) => v.iter().map(f32::to_string).collect(),
            other => other.scalars().iter().map(Scalar::to_string).collect(),
        }
    }
}

/// A host value the codec has no native shape for.
///
/// Objects are offered to the [`PrepareInline`](crate::output::PrepareInline)
/// hook when encoded; if the hook declines, their `Display` text is written.
pub trait InlineObject: fmt::Debug + fmt::Display + Send + Sync {
    /// Name of the host type, used by prepare hooks to pick a conversion
    fn type_name(&self) -> &str;

    /// Downcasting access for prepare hooks
    fn as_any(&self) -> &dyn Any;
}

/// A structured value that can be packed into a single CSV cell
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Map(IndexMap<String, Value>),
    Seq(Vec<Value>),
    Array(PrimitiveArray),
    Scalar(Scalar),
    Object(Arc<dyn InlineObject>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.type_name() == b.type_name() && a.to_string() == b.to_string())
            }
            _ => false,
        }
    }
}

impl Value {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Wrap a host object
    pub fn object(obj: impl InlineObject + 'static) -> Self {
        Value::Object(Arc::new(obj))
    }

    /// A byte array value
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Array(PrimitiveArray::Byte(bytes.into()))
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Look up a map entry by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Build a value from anything serde can serialize.
    ///
    /// Goes through `serde_json::Value`, so struct field order is kept and
    /// byte vectors arrive as sequences of integers.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(serde_json::to_value(value)?.into())
    }

    /// Deserialize this value into any serde type
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }

    /// Convert to a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Map(m) => serde_json::Value::Object(
                m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Seq(s) => serde_json::Value::Array(s.iter().map(Value::to_json).collect()),
            Value::Array(a) => {
                serde_json::Value::Array(a.scalars().iter().map(scalar_to_json).collect())
            }
            Value::Scalar(s) => scalar_to_json(s),
            Value::Object(o) => serde_json::Value::String(o.to_string()),
        }
    }
}

fn scalar_to_json(scalar: &Scalar) -> serde_json::Value {
    match scalar {
        Scalar::String(s) => serde_json::Value::String(s.clone()),
        Scalar::Int(i) => serde_json::json!(*i),
        // NaN and infinities have no JSON form
        Scalar::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Scalar::Bool(b) => serde_json::Value::Bool(*b),
        Scalar::Char(c) => serde_json::Value::String(c.to_string()),
    }
}

/// Renders the value in inline notation with the default configuration
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&CellSerializer::default().serialize(self))
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Scalar(Scalar::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Scalar(Scalar::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Value::Scalar(Scalar::Float(f))
                } else {
                    Value::Scalar(Scalar::String(n.to_string()))
                }
            }
            serde_json::Value::String(s) => Value::Scalar(Scalar::String(s)),
            serde_json::Value::Array(arr) => Value::Seq(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Map(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<PrimitiveArray> for Value {
    fn from(a: PrimitiveArray) -> Self {
        Value::Array(a)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(Scalar::String(s))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Scalar(Scalar::Int(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Scalar(Scalar::Int(i64::from(i)))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Scalar(Scalar::Float(f))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Scalar(Scalar::Char(c))
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(m: IndexMap<String, Value>) -> Self {
        Value::Map(m)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Vec<T>) -> Self {
        Value::Seq(v.into_iter().map(Into::into).collect())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
