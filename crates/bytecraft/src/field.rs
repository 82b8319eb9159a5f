//! Definition of the fields used to build a [crate::Schema].

/// A single named field of a record, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Name used in the encoded and decoded [crate::value::Record].
    pub name: String,
    /// Value kind, which fixes the natural width.
    pub kind: FieldKind,
    /// Tag directives, see [crate::tag].
    pub tag: String,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Field {
            name: name.into(),
            kind,
            tag: String::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::FieldDef> for Field {
    fn from(value: crate::serde::FieldDef) -> Self {
        Field {
            name: value.name,
            kind: value.kind.into(),
            tag: value.tag,
        }
    }
}

/// Value kind of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Fixed-width scalar.
    Scalar(ScalarKind),
    /// Fixed-length array of scalars.
    Array(ArraySpec),
    /// Byte sequence whose length is only known from the value, or on decode
    /// from a size-of relationship.
    Bytes,
    /// Nested record. Only the empty record is supported, as a padding marker
    /// whose width comes from the tag.
    Struct(Vec<Field>),
}

impl FieldKind {
    /// Shorthand for a zero-field padding marker.
    pub fn padding() -> Self {
        FieldKind::Struct(Vec::new())
    }

    /// Natural width in bytes, `None` for kinds without one.
    pub fn natural_width(&self) -> Option<usize> {
        match self {
            FieldKind::Scalar(scalar) => Some(scalar.width()),
            FieldKind::Array(spec) => spec.element.width().checked_mul(spec.count),
            FieldKind::Bytes | FieldKind::Struct(_) => None,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            FieldKind::Scalar(scalar) => format!("{scalar:?}"),
            FieldKind::Array(spec) => format!("[{:?}; {}]", spec.element, spec.count),
            FieldKind::Bytes => "Bytes".to_string(),
            FieldKind::Struct(fields) => format!("record with {} fields", fields.len()),
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::FieldKindDef> for FieldKind {
    fn from(value: crate::serde::FieldKindDef) -> Self {
        match value {
            crate::serde::FieldKindDef::Scalar { scalar } => FieldKind::Scalar(scalar.into()),
            crate::serde::FieldKindDef::Array { element, count } => FieldKind::Array(ArraySpec {
                element: element.into(),
                count,
            }),
            crate::serde::FieldKindDef::Bytes => FieldKind::Bytes,
            crate::serde::FieldKindDef::Padding => FieldKind::padding(),
            crate::serde::FieldKindDef::Struct { fields } => {
                FieldKind::Struct(fields.into_iter().map(Into::into).collect())
            }
        }
    }
}

/// Fixed-width scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl ScalarKind {
    /// Natural width in bytes.
    pub fn width(self) -> usize {
        match self {
            ScalarKind::Bool | ScalarKind::U8 | ScalarKind::I8 => 1,
            ScalarKind::U16 | ScalarKind::I16 => 2,
            ScalarKind::U32 | ScalarKind::I32 | ScalarKind::F32 => 4,
            ScalarKind::U64 | ScalarKind::I64 | ScalarKind::F64 => 8,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, ScalarKind::Bool | ScalarKind::F32 | ScalarKind::F64)
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            ScalarKind::I8 | ScalarKind::I16 | ScalarKind::I32 | ScalarKind::I64
        )
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::ScalarDef> for ScalarKind {
    fn from(value: crate::serde::ScalarDef) -> Self {
        match value {
            crate::serde::ScalarDef::Bool => ScalarKind::Bool,
            crate::serde::ScalarDef::U8 => ScalarKind::U8,
            crate::serde::ScalarDef::U16 => ScalarKind::U16,
            crate::serde::ScalarDef::U32 => ScalarKind::U32,
            crate::serde::ScalarDef::U64 => ScalarKind::U64,
            crate::serde::ScalarDef::I8 => ScalarKind::I8,
            crate::serde::ScalarDef::I16 => ScalarKind::I16,
            crate::serde::ScalarDef::I32 => ScalarKind::I32,
            crate::serde::ScalarDef::I64 => ScalarKind::I64,
            crate::serde::ScalarDef::F32 => ScalarKind::F32,
            crate::serde::ScalarDef::F64 => ScalarKind::F64,
        }
    }
}

/// Parameters for an array field: element kind and element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArraySpec {
    pub element: ScalarKind,
    pub count: usize,
}
