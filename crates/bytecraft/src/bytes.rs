//! Endian-aware byte conversions for scalar values.
//!
//! A value's natural encoding is fitted to an explicit width by keeping its
//! low-order bytes, or by prepending zero bytes. The pad always goes before
//! the natural encoding, whatever the byte order.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::{field::ScalarKind, tag::Endian, value::Value};

/// Natural encoding of `value`, or `None` if it is not a `kind` value.
pub fn encode_scalar(kind: ScalarKind, value: &Value, endian: Endian) -> Option<Vec<u8>> {
    match endian {
        Endian::Big => put::<BigEndian>(kind, value),
        Endian::Little => put::<LittleEndian>(kind, value),
    }
}

/// Decodes a natural-width encoding of `kind`. `data` must be `kind.width()` bytes long.
pub fn decode_scalar(kind: ScalarKind, data: &[u8], endian: Endian) -> Value {
    match endian {
        Endian::Big => get::<BigEndian>(kind, data),
        Endian::Little => get::<LittleEndian>(kind, data),
    }
}

fn put<E: ByteOrder>(kind: ScalarKind, value: &Value) -> Option<Vec<u8>> {
    let mut buf = vec![0u8; kind.width()];

    match (kind, value) {
        (ScalarKind::Bool, Value::Bool(v)) => buf[0] = u8::from(*v),
        (ScalarKind::U8, Value::U8(v)) => buf[0] = *v,
        (ScalarKind::I8, Value::I8(v)) => buf[0] = *v as u8,
        (ScalarKind::U16, Value::U16(v)) => E::write_u16(&mut buf, *v),
        (ScalarKind::I16, Value::I16(v)) => E::write_i16(&mut buf, *v),
        (ScalarKind::U32, Value::U32(v)) => E::write_u32(&mut buf, *v),
        (ScalarKind::I32, Value::I32(v)) => E::write_i32(&mut buf, *v),
        (ScalarKind::U64, Value::U64(v)) => E::write_u64(&mut buf, *v),
        (ScalarKind::I64, Value::I64(v)) => E::write_i64(&mut buf, *v),
        (ScalarKind::F32, Value::F32(v)) => E::write_f32(&mut buf, *v),
        (ScalarKind::F64, Value::F64(v)) => E::write_f64(&mut buf, *v),
        _ => return None,
    }

    Some(buf)
}

fn get<E: ByteOrder>(kind: ScalarKind, data: &[u8]) -> Value {
    match kind {
        ScalarKind::Bool => Value::Bool(data[0] != 0),
        ScalarKind::U8 => Value::U8(data[0]),
        ScalarKind::I8 => Value::I8(data[0] as i8),
        ScalarKind::U16 => Value::U16(E::read_u16(data)),
        ScalarKind::I16 => Value::I16(E::read_i16(data)),
        ScalarKind::U32 => Value::U32(E::read_u32(data)),
        ScalarKind::I32 => Value::I32(E::read_i32(data)),
        ScalarKind::U64 => Value::U64(E::read_u64(data)),
        ScalarKind::I64 => Value::I64(E::read_i64(data)),
        ScalarKind::F32 => Value::F32(E::read_f32(data)),
        ScalarKind::F64 => Value::F64(E::read_f64(data)),
    }
}

/// Fits a natural encoding to `width` bytes: narrower keeps the low-order
/// bytes, wider prepends zeros.
pub fn fit_width(natural: Vec<u8>, width: usize, endian: Endian) -> Vec<u8> {
    let len = natural.len();
    if width == len {
        return natural;
    }

    if width > len {
        let mut out = vec![0u8; width - len];
        out.extend_from_slice(&natural);
        return out;
    }

    match endian {
        Endian::Big => natural[len - width..].to_vec(),
        Endian::Little => natural[..width].to_vec(),
    }
}

/// Inverse of [fit_width]: widens or narrows `raw` back to `natural` bytes.
/// When widening a signed value the pad bytes carry its sign.
pub fn unfit_width(raw: &[u8], natural: usize, endian: Endian, signed: bool) -> Vec<u8> {
    let width = raw.len();
    if width == natural {
        return raw.to_vec();
    }
    if width > natural {
        return raw[width - natural..].to_vec();
    }

    let high = match endian {
        Endian::Big => raw.first(),
        Endian::Little => raw.last(),
    };
    let fill = match high {
        Some(byte) if signed && byte & 0x80 != 0 => 0xFF,
        _ => 0x00,
    };

    match endian {
        Endian::Big => {
            let mut out = vec![fill; natural - width];
            out.extend_from_slice(raw);
            out
        }
        Endian::Little => {
            let mut out = raw.to_vec();
            out.resize(natural, fill);
            out
        }
    }
}

/// Reads an unsigned integer of `data.len()` bytes (1 to 8).
pub fn read_uint(data: &[u8], endian: Endian) -> u64 {
    match endian {
        Endian::Big => BigEndian::read_uint(data, data.len()),
        Endian::Little => LittleEndian::read_uint(data, data.len()),
    }
}

/// Writes `value` as an unsigned integer filling `buf` (1 to 8 bytes).
pub fn write_uint(buf: &mut [u8], value: u64, endian: Endian) {
    let n = buf.len();
    match endian {
        Endian::Big => BigEndian::write_uint(buf, value, n),
        Endian::Little => LittleEndian::write_uint(buf, value, n),
    }
}

/// Largest value representable in `bytes` bytes, unsigned or signed.
pub fn max_value(bytes: usize, signed: bool) -> u64 {
    let bits = (bytes * 8).min(64) as u32;
    let bits = if signed { bits - 1 } else { bits };

    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}
