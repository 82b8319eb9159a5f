//! Per-field tag directives.
//!
//! A tag is a comma-separated list of directives, each whitespace-trimmed,
//! in any order:
//!
//! ```text
//! directive := endian | width | sizeof
//! endian    := "big" | "little"
//! width     := <non-negative integer> ("B" | "W" | "DW" | "QW")
//! sizeof    := "sizeof=" fieldname ("+" fieldname)*
//! ```
//!
//! Empty directives are ignored. When a directive kind repeats, the last one wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::TagError;

static WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)(B|W|DW|QW)$").expect("width pattern is valid"));

static SIZE_OF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^sizeof=\s*(\w+(?:\s*\+\s*\w+)*)$").expect("sizeof pattern is valid")
});

/// Byte order used to encode a multi-byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

/// Parsed form of a field tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldSpec {
    /// Endianness override. `None` falls back to the schema default.
    pub endian: Option<Endian>,
    /// Explicit width in bytes.
    pub width: Option<usize>,
    /// Sibling fields whose combined width this field encodes.
    pub size_of: Option<Vec<String>>,
}

impl FieldSpec {
    /// Parses a tag string such as `"little,2W,sizeof=Cmd+Data"`.
    pub fn parse(tag: &str) -> Result<Self, TagError> {
        let mut spec = FieldSpec::default();

        for directive in tag.split(',').map(str::trim) {
            match directive {
                "" => continue,
                "big" => spec.endian = Some(Endian::Big),
                "little" => spec.endian = Some(Endian::Little),
                _ => {
                    if let Some(caps) = SIZE_OF.captures(directive) {
                        spec.size_of = Some(
                            caps[1]
                                .split('+')
                                .map(|name| name.trim().to_string())
                                .collect(),
                        );
                    } else {
                        spec.width = Some(parse_width(directive)?);
                    }
                }
            }
        }

        Ok(spec)
    }
}

/// Parses `<count><unit>` into a byte count.
fn parse_width(directive: &str) -> Result<usize, TagError> {
    let caps = WIDTH
        .captures(directive)
        .ok_or_else(|| TagError::new(directive))?;

    let unit_bytes = match &caps[2] {
        "B" => 1,
        "W" => 2,
        "DW" => 4,
        _ => 8,
    };

    caps[1]
        .parse::<usize>()
        .ok()
        .and_then(|count| count.checked_mul(unit_bytes))
        .ok_or_else(|| TagError::new(directive))
}
