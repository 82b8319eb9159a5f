//! # bytecraft
//!
//! A byte-exact binary codec for records described by an explicit schema.
//!
//! A record is an ordered list of typed fields. Each field carries an optional
//! tag with its byte width, endianness, and a size-of relationship: a size-of
//! field holds the combined byte width of a named set of sibling fields. On
//! encode size-of fields are patched in after the buffer is assembled; on
//! decode their values are used to solve the width of the one
//! variable-length field before any other field is read.
//!
//! ## Example
//!
//! ```
//! use bytecraft::field::{Field, FieldKind, ScalarKind};
//! use bytecraft::schema::Schema;
//! use bytecraft::value::{Record, Value};
//!
//! let fields = vec![
//!     Field::new("len", FieldKind::Scalar(ScalarKind::U16)).with_tag("big,sizeof=payload"),
//!     Field::new("payload", FieldKind::Bytes),
//! ];
//! let schema = Schema::compile(&fields).unwrap();
//!
//! let record = Record::new()
//!     .with("len", Value::U16(3))
//!     .with("payload", Value::Bytes(vec![1, 2, 3]));
//! let bytes = schema.encode(&record).unwrap();
//! assert_eq!(bytes, vec![0, 3, 1, 2, 3]);
//! assert_eq!(schema.decode(&bytes).unwrap(), record);
//! ```

pub mod bytes;
pub mod equation;
pub mod errors;
pub mod field;
pub mod layout;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod tag;
pub mod value;

pub use errors::Error;
pub use schema::{Options, Schema};

use field::FieldKind;
use value::{Record, Value};

/// Encodes `value` according to the record `shape`.
///
/// Both must be records; anything else fails with `NotStruct`.
pub fn encode(value: &Value, shape: &FieldKind) -> Result<Vec<u8>, Error> {
    let schema = Schema::from_shape(shape)?;
    Ok(schema.encode_value(value)?)
}

/// Decodes `data` into a record of the given `shape`.
pub fn decode(data: &[u8], shape: &FieldKind) -> Result<Record, Error> {
    let schema = Schema::from_shape(shape)?;
    Ok(schema.decode(data)?)
}
