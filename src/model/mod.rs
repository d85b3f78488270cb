//! Data model for cell values, rows and decode targets

mod row;
mod target;
mod value;

pub use row::Row;
pub use target::{BeanSchema, ScalarKind, TargetType};
pub use value::{InlineObject, PrimitiveArray, PrimitiveKind, Scalar, Value};
