//! Layout resolution: turns [Field]s into a table of [FieldInfo]s with
//! resolved widths and byte offsets.

use std::ops::Range;

use crate::{
    errors::CompileError,
    field::{ArraySpec, Field, FieldKind, ScalarKind},
    tag::{Endian, FieldSpec},
};

/// Resolved kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoKind {
    Scalar(ScalarKind),
    Array(ArraySpec),
    /// Variable-length byte sequence.
    Bytes,
    /// Zero bytes with no decodable value.
    Padding,
}

/// A field with its resolved width and position in the encoded buffer.
///
/// `width`, `byte_start` and `byte_end` are `None` while they depend on the
/// length of a variable-length field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub kind: InfoKind,
    pub endian: Endian,
    pub width: Option<usize>,
    pub size_of: Option<Vec<String>>,
    pub byte_start: Option<usize>,
    pub byte_end: Option<usize>,
}

impl FieldInfo {
    fn resolve(field: &Field, default_endian: Endian) -> Result<Self, CompileError> {
        let spec = FieldSpec::parse(&field.tag).map_err(|source| CompileError::InvalidTagSyntax {
            field: field.name.clone(),
            source,
        })?;

        let unsupported = |kind: String| CompileError::UnsupportedFieldKind {
            field: field.name.clone(),
            kind,
        };

        let (kind, width) = match &field.kind {
            FieldKind::Scalar(scalar) => {
                (InfoKind::Scalar(*scalar), Some(spec.width.unwrap_or(scalar.width())))
            }
            FieldKind::Array(array) => {
                let natural = field
                    .kind
                    .natural_width()
                    .ok_or_else(|| unsupported(field.kind.describe()))?;
                (InfoKind::Array(*array), Some(spec.width.unwrap_or(natural)))
            }
            FieldKind::Bytes => {
                if spec.width.is_some() {
                    return Err(unsupported("Bytes with an explicit width".to_string()));
                }
                (InfoKind::Bytes, None)
            }
            FieldKind::Struct(fields) if fields.is_empty() => {
                (InfoKind::Padding, Some(spec.width.unwrap_or(0)))
            }
            FieldKind::Struct(_) => return Err(unsupported(field.kind.describe())),
        };

        if spec.size_of.is_some() {
            check_size_of_holder(&field.name, kind, width)?;
        }

        Ok(FieldInfo {
            name: field.name.clone(),
            kind,
            endian: spec.endian.unwrap_or(default_endian),
            width,
            size_of: spec.size_of,
            byte_start: None,
            byte_end: None,
        })
    }

    /// Byte range in the encoded buffer, once known.
    pub fn range(&self) -> Option<Range<usize>> {
        Some(self.byte_start?..self.byte_end?)
    }

    pub fn is_signed(&self) -> bool {
        matches!(self.kind, InfoKind::Scalar(scalar) if scalar.is_signed())
    }
}

fn check_size_of_holder(
    name: &str,
    kind: InfoKind,
    width: Option<usize>,
) -> Result<(), CompileError> {
    let invalid = |reason: &str| CompileError::InvalidSizeofField {
        field: name.to_string(),
        reason: reason.to_string(),
    };

    let InfoKind::Scalar(scalar) = kind else {
        return Err(invalid("not an integer field"));
    };
    if !scalar.is_integer() {
        return Err(invalid("not an integer field"));
    }

    match width {
        Some(w @ (1 | 2 | 4 | 8)) if w <= scalar.width() => Ok(()),
        _ => Err(invalid("width must be 1, 2, 4 or 8 bytes and fit the field kind")),
    }
}

/// Ordered table of [FieldInfo]s for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    fields: Vec<FieldInfo>,
}

impl Layout {
    /// Resolves `fields` in declaration order. Offsets following a
    /// variable-length field stay unresolved.
    pub fn resolve(fields: &[Field], default_endian: Endian) -> Result<Self, CompileError> {
        let mut infos: Vec<FieldInfo> = Vec::with_capacity(fields.len());
        let mut static_width: usize = 0;

        for field in fields {
            if infos.iter().any(|info| info.name == field.name) {
                return Err(CompileError::DuplicateField(field.name.clone()));
            }

            let info = FieldInfo::resolve(field, default_endian)?;
            if let Some(width) = info.width {
                static_width = static_width
                    .checked_add(width)
                    .ok_or(CompileError::LayoutOverflow)?;
            }

            infos.push(info);
        }

        for info in &infos {
            let Some(group) = &info.size_of else {
                continue;
            };

            for (i, target) in group.iter().enumerate() {
                if *target == info.name {
                    return Err(CompileError::InvalidSizeofField {
                        field: info.name.clone(),
                        reason: "field names itself".to_string(),
                    });
                }
                if group[..i].contains(target) {
                    return Err(CompileError::InvalidSizeofField {
                        field: info.name.clone(),
                        reason: format!("`{target}` is named twice"),
                    });
                }
                if !infos.iter().any(|other| other.name == *target) {
                    return Err(CompileError::UnknownSizeofTarget {
                        field: info.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        let mut layout = Layout { fields: infos };
        layout.reflow();

        Ok(layout)
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|info| info.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|info| info.name == name)
    }

    /// Sets the width of the field at `index`. Call [Layout::reflow] afterwards.
    pub fn set_width(&mut self, index: usize, width: usize) {
        self.fields[index].width = Some(width);
    }

    /// Recomputes offsets with a single forward cumulative pass.
    pub fn reflow(&mut self) {
        let mut cursor = Some(0usize);

        for info in &mut self.fields {
            let end = match (cursor, info.width) {
                (Some(start), Some(width)) => start.checked_add(width),
                _ => None,
            };

            info.byte_start = cursor;
            info.byte_end = end;
            cursor = end;
        }
    }

    /// Sum of all widths, `None` while any width is unresolved.
    pub fn total_width(&self) -> Option<usize> {
        self.fields
            .iter()
            .try_fold(0usize, |acc, info| acc.checked_add(info.width?))
    }

    /// First field whose width is still unknown.
    pub fn first_unresolved(&self) -> Option<&FieldInfo> {
        self.fields.iter().find(|info| info.width.is_none())
    }

    /// Width of every member of a size-of group.
    pub fn group_widths<'a>(&self, group: &'a [String]) -> Vec<(&'a str, Option<usize>)> {
        group
            .iter()
            .map(|name| (name.as_str(), self.get(name).and_then(|info| info.width)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet_fields() -> Vec<Field> {
        vec![
            Field::new("Protocol", FieldKind::Scalar(ScalarKind::U16)),
            Field::new("Version", FieldKind::Scalar(ScalarKind::I8)),
            Field::new("Length", FieldKind::Scalar(ScalarKind::U16))
                .with_tag("big,sizeof=Cmd+Data+Padding+CRC"),
            Field::new("Cmd", FieldKind::Scalar(ScalarKind::U8)),
            Field::new("Data", FieldKind::Bytes),
            Field::new("Padding", FieldKind::padding()).with_tag("2B"),
            Field::new("CRC", FieldKind::Scalar(ScalarKind::U16)),
        ]
    }

    #[test]
    fn test_resolve_offsets() {
        let layout = Layout::resolve(&packet_fields(), Endian::Big).unwrap();
        let ranges: Vec<_> = layout.fields().iter().map(FieldInfo::range).collect();

        assert_eq!(
            ranges,
            vec![Some(0..2), Some(2..3), Some(3..5), Some(5..6), None, None, None]
        );
        assert_eq!(layout.fields()[4].byte_start, Some(6));
        assert_eq!(layout.fields()[5].width, Some(2));
        assert_eq!(layout.total_width(), None);
        assert_eq!(layout.first_unresolved().map(|f| f.name.as_str()), Some("Data"));
    }

    #[test]
    fn test_reflow_after_set_width() {
        let mut layout = Layout::resolve(&packet_fields(), Endian::Big).unwrap();
        let data = layout.position("Data").unwrap();
        layout.set_width(data, 3);
        layout.reflow();

        assert_eq!(layout.get("Data").unwrap().range(), Some(6..9));
        assert_eq!(layout.get("CRC").unwrap().range(), Some(11..13));
        assert_eq!(layout.total_width(), Some(13));

        for info in layout.fields() {
            let range = info.range().unwrap();
            assert_eq!(range.end - range.start, info.width.unwrap());
        }
    }

    #[test]
    fn test_explicit_width_and_endian() {
        let fields = vec![
            Field::new("a", FieldKind::Scalar(ScalarKind::U32)).with_tag("1W"),
            Field::new("b", FieldKind::Scalar(ScalarKind::U8)).with_tag("little,1DW"),
            Field::new(
                "c",
                FieldKind::Array(ArraySpec {
                    element: ScalarKind::U16,
                    count: 3,
                }),
            ),
        ];
        let layout = Layout::resolve(&fields, Endian::Little).unwrap();

        assert_eq!(layout.get("a").unwrap().width, Some(2));
        assert_eq!(layout.get("a").unwrap().endian, Endian::Little);
        assert_eq!(layout.get("b").unwrap().width, Some(4));
        assert_eq!(layout.get("c").unwrap().width, Some(6));
        assert_eq!(layout.total_width(), Some(12));
    }

    #[test]
    fn test_group_widths() {
        let layout = Layout::resolve(&packet_fields(), Endian::Big).unwrap();
        let group = layout.get("Length").unwrap().size_of.clone().unwrap();

        assert_eq!(
            layout.group_widths(&group),
            vec![
                ("Cmd", Some(1)),
                ("Data", None),
                ("Padding", Some(2)),
                ("CRC", Some(2))
            ]
        );
    }

    #[test]
    fn test_nested_record_unsupported() {
        let fields = vec![Field::new(
            "inner",
            FieldKind::Struct(vec![Field::new("x", FieldKind::Scalar(ScalarKind::U8))]),
        )];
        assert!(matches!(
            Layout::resolve(&fields, Endian::Big),
            Err(CompileError::UnsupportedFieldKind { .. })
        ));
    }

    #[test]
    fn test_duplicate_field() {
        let fields = vec![
            Field::new("a", FieldKind::Scalar(ScalarKind::U8)),
            Field::new("a", FieldKind::Scalar(ScalarKind::U16)),
        ];
        assert_eq!(
            Layout::resolve(&fields, Endian::Big),
            Err(CompileError::DuplicateField("a".to_string()))
        );
    }

    #[test]
    fn test_invalid_tag() {
        let fields = vec![Field::new("a", FieldKind::Scalar(ScalarKind::U8)).with_tag("huge")];
        match Layout::resolve(&fields, Endian::Big) {
            Err(CompileError::InvalidTagSyntax { field, source }) => {
                assert_eq!(field, "a");
                assert_eq!(source.token, "huge");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_size_of_holder_validation() {
        let bad = [
            Field::new("len", FieldKind::Scalar(ScalarKind::F32)).with_tag("sizeof=data"),
            Field::new("len", FieldKind::Scalar(ScalarKind::U32)).with_tag("3B,sizeof=data"),
            Field::new("len", FieldKind::Scalar(ScalarKind::U8)).with_tag("1W,sizeof=data"),
            Field::new("len", FieldKind::padding()).with_tag("2B,sizeof=data"),
            Field::new("len", FieldKind::Scalar(ScalarKind::U8)).with_tag("sizeof=len"),
            Field::new("len", FieldKind::Scalar(ScalarKind::U8)).with_tag("sizeof=data+data"),
        ];

        for holder in bad {
            let fields = vec![holder.clone(), Field::new("data", FieldKind::Bytes)];
            assert!(
                matches!(
                    Layout::resolve(&fields, Endian::Big),
                    Err(CompileError::InvalidSizeofField { .. })
                ),
                "{holder:?}"
            );
        }
    }

    #[test]
    fn test_unknown_size_of_target() {
        let fields = vec![
            Field::new("len", FieldKind::Scalar(ScalarKind::U8)).with_tag("sizeof=missing"),
        ];
        assert_eq!(
            Layout::resolve(&fields, Endian::Big),
            Err(CompileError::UnknownSizeofTarget {
                field: "len".to_string(),
                target: "missing".to_string()
            })
        );
    }

    #[test]
    fn test_bytes_with_width_unsupported() {
        let fields = vec![Field::new("data", FieldKind::Bytes).with_tag("4B")];
        assert!(matches!(
            Layout::resolve(&fields, Endian::Big),
            Err(CompileError::UnsupportedFieldKind { .. })
        ));
    }
}
