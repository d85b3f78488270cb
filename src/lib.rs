//! csvnest - CSV with nested cells
//!
//! A CSV codec whose cells can hold maps, sequences and primitive arrays
//! written in a compact inline notation (`{k:v;k2:v2}`, `[a;b]`), with a
//! header-driven decoder that rebuilds beans, maps, sequences or dynamic
//! values from the rows.

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;

pub use config::{ByteArrayFormat, CodecConfig};
pub use error::{CsvError, Result};
pub use model::{BeanSchema, PrimitiveArray, PrimitiveKind, Scalar, ScalarKind, TargetType, Value};
pub use output::{CellSerializer, CsvSerializer};
pub use parser::ParserSession;
