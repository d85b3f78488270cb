//! Target type descriptors that steer decoding

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{CsvError, Result};

use super::value::{PrimitiveKind, Value};

/// Scalar leaf type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Bool,
    Char,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::String => write!(f, "String"),
            ScalarKind::Int => write!(f, "Int"),
            ScalarKind::Float => write!(f, "Float"),
            ScalarKind::Bool => write!(f, "Bool"),
            ScalarKind::Char => write!(f, "Char"),
        }
    }
}

impl From<PrimitiveKind> for ScalarKind {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Int | PrimitiveKind::Long | PrimitiveKind::Short | PrimitiveKind::Byte => {
                ScalarKind::Int
            }
            PrimitiveKind::Double | PrimitiveKind::Float => ScalarKind::Float,
            PrimitiveKind::Boolean => ScalarKind::Bool,
            PrimitiveKind::Char => ScalarKind::Char,
        }
    }
}

/// The shape a decoded value should take
#[derive(Debug, Clone, PartialEq)]
pub enum TargetType {
    /// No constraint: structures are rebuilt as maps and sequences,
    /// leaves are inferred
    Dynamic,
    Scalar(ScalarKind),
    /// String-keyed map with the given value type
    Map(Box<TargetType>),
    Seq(Box<TargetType>),
    Array(PrimitiveKind),
    Bean(Arc<BeanSchema>),
}

impl TargetType {
    pub fn string() -> Self {
        TargetType::Scalar(ScalarKind::String)
    }

    pub fn int() -> Self {
        TargetType::Scalar(ScalarKind::Int)
    }

    pub fn float() -> Self {
        TargetType::Scalar(ScalarKind::Float)
    }

    pub fn bool() -> Self {
        TargetType::Scalar(ScalarKind::Bool)
    }

    pub fn map_of(value: TargetType) -> Self {
        TargetType::Map(Box::new(value))
    }

    pub fn seq_of(element: TargetType) -> Self {
        TargetType::Seq(Box::new(element))
    }

    pub fn bean(schema: BeanSchema) -> Self {
        TargetType::Bean(Arc::new(schema))
    }

    /// Whether each decoded row is a structure with named fields.
    /// Unconstrained rows are maps of every column.
    pub fn is_row_shaped(&self) -> bool {
        matches!(
            self,
            TargetType::Map(_) | TargetType::Bean(_) | TargetType::Dynamic
        )
    }

    /// Human-readable name used in error messages
    pub fn type_name(&self) -> String {
        match self {
            TargetType::Dynamic => "Object".to_string(),
            TargetType::Scalar(kind) => kind.to_string(),
            TargetType::Map(value) => format!("Map<String,{}>", value.type_name()),
            TargetType::Seq(element) => format!("Seq<{}>", element.type_name()),
            TargetType::Array(kind) => format!("{}[]", kind.name()),
            TargetType::Bean(schema) => schema.name().to_string(),
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

/// Named, ordered property list describing a bean.
///
/// Decoded beans are maps keyed by property name; use
/// [`Value::deserialize_into`] to turn them into concrete structs.
#[derive(Debug, Clone, PartialEq)]
pub struct BeanSchema {
    name: String,
    properties: IndexMap<String, TargetType>,
}

impl BeanSchema {
    /// Create a schema with no properties
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    /// Add a property
    pub fn with_property(mut self, name: impl Into<String>, ty: TargetType) -> Self {
        self.properties.insert(name.into(), ty);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type of a property, if the bean has it
    pub fn property(&self, name: &str) -> Option<&TargetType> {
        self.properties.get(name)
    }

    /// Property names and types in declaration order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &TargetType)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Store a property value on a bean under construction
    pub fn set(&self, bean: &mut IndexMap<String, Value>, name: &str, value: Value) -> Result<()> {
        if !self.properties.contains_key(name) {
            return Err(CsvError::UnknownProperty {
                property: name.to_string(),
                bean: self.name.clone(),
            });
        }
        bean.insert(name.to_string(), value);
        Ok(())
    }
}
