//! Schema: a resolved field layout used to encode records into bytes and decode them back.

use tracing::{debug, trace, warn};

use crate::{
    bytes::{
        decode_scalar, encode_scalar, fit_width, max_value, read_uint, sign_extend, unfit_width,
        write_uint,
    },
    equation::{Ambiguous, solve_sum},
    errors::{CompileError, DecodeError, EncodeError},
    field::{Field, FieldKind},
    layout::{FieldInfo, InfoKind, Layout},
    tag::Endian,
    value::{Record, Value},
};

/// Schema-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Byte order for fields without a `big`/`little` directive.
    pub default_endian: Endian,
    /// Fail decoding when a size-of group with no unknown widths disagrees
    /// with the decoded size-of value, instead of only logging it.
    pub verify_sizeof: bool,
}

#[cfg(feature = "serde")]
impl From<crate::serde::OptionsDef> for Options {
    fn from(value: crate::serde::OptionsDef) -> Self {
        Options {
            default_endian: match value.default_endian {
                crate::serde::EndianDef::Big => Endian::Big,
                crate::serde::EndianDef::Little => Endian::Little,
            },
            verify_sizeof: value.verify_sizeof,
        }
    }
}

/// A compiled schema. Use [Schema::compile] to build from [Field]s, then
/// [Schema::encode] and [Schema::decode].
#[derive(Debug, Clone)]
pub struct Schema {
    layout: Layout,
    options: Options,
}

impl Schema {
    /// Compiles `fields` with default [Options].
    pub fn compile(fields: &[Field]) -> Result<Self, CompileError> {
        Self::compile_with(fields, Options::default())
    }

    pub fn compile_with(fields: &[Field], options: Options) -> Result<Self, CompileError> {
        let layout = Layout::resolve(fields, options.default_endian)?;

        debug!(
            fields = fields.len(),
            static_width = ?layout.total_width(),
            "compiled schema"
        );

        Ok(Self { layout, options })
    }

    /// Compiles a record shape. Fails with [CompileError::NotStruct] for any
    /// other kind.
    pub fn from_shape(shape: &FieldKind) -> Result<Self, CompileError> {
        match shape {
            FieldKind::Struct(fields) => Self::compile(fields),
            _ => Err(CompileError::NotStruct),
        }
    }

    /// Loads a schema from its JSON definition, see [crate::serde::SchemaDef].
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, crate::errors::Error> {
        let def: crate::serde::SchemaDef = serde_json::from_str(json)?;
        Ok(Self::try_from(def)?)
    }

    /// Provisional layout: the width of a variable-length field and the
    /// offsets after it are unresolved.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Encoded length of every record, if the schema has no variable-length field.
    pub fn static_width(&self) -> Option<usize> {
        self.layout.total_width()
    }

    /// Encodes a [Value::Record].
    pub fn encode_value(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        match value {
            Value::Record(record) => self.encode(record),
            _ => Err(EncodeError::NotStruct),
        }
    }

    /// Encodes `record`. Size-of fields are written last, over the bytes they
    /// occupy in the assembled buffer; their values in `record` are ignored.
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>, EncodeError> {
        let mut layout = self.layout.clone();

        for index in 0..layout.fields().len() {
            let info = &layout.fields()[index];
            if info.kind != InfoKind::Bytes {
                continue;
            }

            let len = match field_value(record, info)? {
                Value::Bytes(bytes) => bytes.len(),
                _ => return Err(mismatch(info, "Bytes")),
            };
            layout.set_width(index, len);
        }
        layout.reflow();

        let total = layout.total_width().ok_or(EncodeError::LayoutOverflow)?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(total)
            .map_err(|_| EncodeError::BufferTooLarge(total))?;

        for info in layout.fields() {
            let width = info.width.ok_or(EncodeError::LayoutOverflow)?;

            if info.size_of.is_some() || info.kind == InfoKind::Padding {
                buf.resize(buf.len() + width, 0);
                continue;
            }

            match (info.kind, field_value(record, info)?) {
                (InfoKind::Bytes, Value::Bytes(bytes)) => buf.extend_from_slice(bytes),
                (InfoKind::Scalar(kind), value) => {
                    let natural = encode_scalar(kind, value, info.endian)
                        .ok_or_else(|| mismatch(info, &format!("{kind:?}")))?;
                    buf.extend(fit_width(natural, width, info.endian));
                }
                (InfoKind::Array(spec), Value::Array(items)) => {
                    if items.len() != spec.count {
                        return Err(EncodeError::ArrayLength {
                            field: info.name.clone(),
                            expected: spec.count,
                            actual: items.len(),
                        });
                    }

                    let mut natural = Vec::with_capacity(spec.element.width() * spec.count);
                    for item in items {
                        let bytes = encode_scalar(spec.element, item, info.endian)
                            .ok_or_else(|| mismatch(info, &format!("{:?}", spec.element)))?;
                        natural.extend(bytes);
                    }
                    buf.extend(fit_width(natural, width, info.endian));
                }
                (InfoKind::Array(spec), _) => {
                    return Err(mismatch(
                        info,
                        &format!("[{:?}; {}]", spec.element, spec.count),
                    ));
                }
                (InfoKind::Bytes, _) => return Err(mismatch(info, "Bytes")),
                (InfoKind::Padding, _) => {}
            }

            debug_assert_eq!(Some(buf.len()), info.byte_end);
        }

        for info in layout.fields() {
            let Some(group) = &info.size_of else {
                continue;
            };
            let (Some(range), Some(width)) = (info.range(), info.width) else {
                return Err(EncodeError::LayoutOverflow);
            };

            let sum = layout
                .group_widths(group)
                .iter()
                .try_fold(0usize, |acc, (_, w)| acc.checked_add((*w)?))
                .ok_or(EncodeError::LayoutOverflow)?;

            if sum as u64 > max_value(width, info.is_signed()) {
                return Err(EncodeError::SizeofOverflow {
                    field: info.name.clone(),
                    value: sum,
                    width,
                });
            }

            write_uint(&mut buf[range], sum as u64, info.endian);
            trace!(field = %info.name, value = sum, "patched size-of field");
        }

        debug!(len = buf.len(), "encoded record");
        Ok(buf)
    }

    /// Decodes `data` into a fresh [Record] with fields in schema order.
    /// Padding fields decode to an empty record.
    pub fn decode(&self, data: &[u8]) -> Result<Record, DecodeError> {
        let layout = self.resolve_widths(data)?;

        let total = layout.total_width().ok_or(DecodeError::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;
        if total != data.len() {
            return Err(DecodeError::SizeMismatch {
                expected: total,
                actual: data.len(),
            });
        }

        let mut record = Record::new();

        for info in layout.fields() {
            let Some(raw) = info.range().and_then(|range| data.get(range)) else {
                return Err(DecodeError::SizeMismatch {
                    expected: total,
                    actual: data.len(),
                });
            };

            let value = match info.kind {
                InfoKind::Padding => Value::Record(Record::new()),
                InfoKind::Bytes => Value::Bytes(raw.to_vec()),
                InfoKind::Scalar(kind) => {
                    let natural = unfit_width(raw, kind.width(), info.endian, kind.is_signed());
                    decode_scalar(kind, &natural, info.endian)
                }
                InfoKind::Array(spec) => {
                    let element = spec.element.width();
                    let natural = unfit_width(raw, element * spec.count, info.endian, false);
                    Value::Array(
                        natural
                            .chunks_exact(element)
                            .map(|chunk| decode_scalar(spec.element, chunk, info.endian))
                            .collect(),
                    )
                }
            };

            record.insert(info.name.clone(), value);
        }

        debug!(len = data.len(), fields = record.len(), "decoded record");
        Ok(record)
    }

    /// Decodes `data` and writes the fields into `target`. On error `target`
    /// is left untouched.
    pub fn decode_into(&self, data: &[u8], target: &mut Record) -> Result<(), DecodeError> {
        let decoded = self.decode(data)?;
        for (name, value) in decoded.iter() {
            target.insert(name, value.clone());
        }

        Ok(())
    }

    /// Solves every size-of equation in declaration order and returns the
    /// layout with all widths and offsets resolved.
    fn resolve_widths(&self, data: &[u8]) -> Result<Layout, DecodeError> {
        let mut layout = self.layout.clone();

        for index in 0..layout.fields().len() {
            let info = &layout.fields()[index];
            let Some(group) = info.size_of.clone() else {
                continue;
            };
            let field = info.name.clone();

            let Some(range) = info.range() else {
                return Err(unresolved(&layout));
            };
            let Some(raw) = data.get(range.clone()) else {
                return Err(DecodeError::SizeMismatch {
                    expected: range.end,
                    actual: data.len(),
                });
            };

            let declared = read_uint(raw, info.endian);
            let declared = if info.is_signed() {
                let signed = sign_extend(declared, raw.len() * 8);
                if signed < 0 {
                    return Err(DecodeError::NegativeOrZeroSizeofValue {
                        field,
                        value: signed as i128,
                    });
                }
                signed as u64
            } else {
                declared
            };

            let terms = layout.group_widths(&group);
            match solve_sum(&terms, declared) {
                Ok(Some(unknown)) => {
                    let width = usize::try_from(unknown.width).map_err(|_| {
                        DecodeError::NegativeOrZeroSizeofValue {
                            field: field.clone(),
                            value: unknown.width,
                        }
                    })?;
                    let Some(target) = layout.position(unknown.name) else {
                        return Err(DecodeError::UnresolvedWidth {
                            field: unknown.name.to_string(),
                        });
                    };

                    layout.set_width(target, width);
                    layout.reflow();
                    debug!(field = %field, solved = unknown.name, width, "solved size equation");
                }
                Ok(None) => {
                    let actual: usize = terms.iter().filter_map(|(_, w)| *w).sum();
                    if actual as u64 != declared {
                        if self.options.verify_sizeof {
                            return Err(DecodeError::SizeofMismatch {
                                field,
                                declared,
                                actual,
                            });
                        }
                        warn!(field = %field, declared, actual, "size-of value disagrees with field widths");
                    }
                }
                Err(Ambiguous { unknowns }) => {
                    return Err(DecodeError::AmbiguousSizeEquation { field, unknowns });
                }
            }
        }

        if layout.first_unresolved().is_some() {
            return Err(unresolved(&layout));
        }

        Ok(layout)
    }
}

fn field_value<'r>(record: &'r Record, info: &FieldInfo) -> Result<&'r Value, EncodeError> {
    record
        .get(&info.name)
        .ok_or_else(|| EncodeError::MissingField(info.name.clone()))
}

fn mismatch(info: &FieldInfo, expected: &str) -> EncodeError {
    EncodeError::ValueMismatch {
        field: info.name.clone(),
        expected: expected.to_string(),
    }
}

fn unresolved(layout: &Layout) -> DecodeError {
    DecodeError::UnresolvedWidth {
        field: layout
            .first_unresolved()
            .map(|info| info.name.clone())
            .unwrap_or_default(),
    }
}

#[cfg(feature = "serde")]
impl TryFrom<crate::serde::SchemaDef> for Schema {
    type Error = CompileError;

    fn try_from(value: crate::serde::SchemaDef) -> Result<Self, Self::Error> {
        let fields: Vec<Field> = value.fields.into_iter().map(Into::into).collect();
        let options = value.options.map(Into::into).unwrap_or_default();
        Schema::compile_with(&fields, options)
    }
}
