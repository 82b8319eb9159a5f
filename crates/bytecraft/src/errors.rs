//! Error types for tag parsing, schema compilation, encoding and decoding.

use thiserror::Error;

/// A field tag directive that does not match the tag grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tag directive `{token}`")]
pub struct TagError {
    /// The offending directive, whitespace-trimmed.
    pub token: String,
}

impl TagError {
    pub(crate) fn new(token: &str) -> Self {
        TagError {
            token: token.to_string(),
        }
    }
}

/// Errors produced when compiling a list of [crate::field::Field]s into a [crate::Schema].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The top-level shape is not a record.
    #[error("top-level shape is not a record")]
    NotStruct,
    /// The field kind has no binary representation (e.g. a nested record with fields).
    #[error("field `{field}`: unsupported field kind ({kind})")]
    UnsupportedFieldKind { field: String, kind: String },
    /// The field tag could not be parsed.
    #[error("field `{field}`: {source}")]
    InvalidTagSyntax {
        field: String,
        #[source]
        source: TagError,
    },
    /// Two fields share the same name.
    #[error("duplicate field `{0}`")]
    DuplicateField(String),
    /// A size-of group names a field that does not exist.
    #[error("field `{field}`: size-of target `{target}` does not exist")]
    UnknownSizeofTarget { field: String, target: String },
    /// A size-of directive sits on a field that cannot hold the sum.
    #[error("field `{field}`: invalid size-of field, {reason}")]
    InvalidSizeofField { field: String, reason: String },
    /// The fixed widths add up to more than `usize::MAX`.
    #[error("record layout exceeds the addressable size")]
    LayoutOverflow,
}

/// Errors produced by [crate::Schema::encode].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The value passed in is not a [crate::value::Record].
    #[error("value is not a record")]
    NotStruct,
    /// A field required for encoding has no value in the record.
    #[error("missing value for field `{0}`")]
    MissingField(String),
    /// The value does not match the field's declared kind.
    #[error("field `{field}`: expected a value of kind {expected}")]
    ValueMismatch { field: String, expected: String },
    /// A fixed array value has the wrong number of elements.
    #[error("field `{field}`: expected {expected} array elements, got {actual}")]
    ArrayLength {
        field: String,
        expected: usize,
        actual: usize,
    },
    /// The summed width of a size-of group does not fit the size-of field.
    #[error("field `{field}`: size-of value {value} does not fit in {width} bytes")]
    SizeofOverflow {
        field: String,
        value: usize,
        width: usize,
    },
    /// The field widths add up to more than `usize::MAX`.
    #[error("record layout exceeds the addressable size")]
    LayoutOverflow,
    /// The output buffer for the record could not be allocated.
    #[error("cannot allocate {0} bytes for the encoded record")]
    BufferTooLarge(usize),
}

/// Errors produced by [crate::Schema::decode].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// More than one sibling of a size-of group has an unresolved width.
    #[error("field `{field}`: size equation has more than one unknown ({})", .unknowns.join(", "))]
    AmbiguousSizeEquation { field: String, unknowns: Vec<String> },
    /// A size-of value is negative, or solves to a negative width.
    #[error("field `{field}`: negative size-of value {value}")]
    NegativeOrZeroSizeofValue { field: String, value: i128 },
    /// The resolved layout does not cover the input exactly.
    #[error("expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    /// A variable-length field is not covered by any size-of group.
    #[error("width of field `{field}` cannot be resolved")]
    UnresolvedWidth { field: String },
    /// A fully-known size-of group disagrees with the decoded value.
    #[error("field `{field}`: declared size {declared}, fields occupy {actual}")]
    SizeofMismatch {
        field: String,
        declared: u64,
        actual: usize,
    },
}

/// Umbrella error for the one-shot [crate::encode] and [crate::decode] functions.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[cfg(feature = "serde")]
    #[error("invalid schema json: {0}")]
    Json(#[from] serde_json::Error),
}
