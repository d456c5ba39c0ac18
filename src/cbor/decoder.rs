//! CBOR decoder: bytes → `Value`, the inverse of [`super::encoder`].

use crate::error::{AceError, Position, Result};
use crate::registry::{LiteralType, ObjectType, ACE_CBOR_TAG};
use crate::value::{ExecSet, Ident, Label, ObjRef, RptEntry, RptSet, Table, TimeValue, Value};

use super::reader::{
    CborReader, SimpleOrFloat, MAJOR_ARRAY, MAJOR_BYTES, MAJOR_NEGINT, MAJOR_SIMPLE, MAJOR_TEXT, MAJOR_UINT,
    SIMPLE_FALSE, SIMPLE_NULL, SIMPLE_TRUE,
};

/// Decodes one complete top-level ARI item and confirms no trailing bytes
/// remain.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    let mut r = CborReader::new(bytes);
    // The bare `undefined` simple value (0xF7) is the one top-level form
    // that never carries the ARI tag.
    let value = if r.peek_major()? == MAJOR_SIMPLE {
        match r.read_simple_or_float()? {
            SimpleOrFloat::Undefined => Value::Undefined,
            _ => return Err(AceError::decode(r.position(), "bare simple/float value is not valid at top level")),
        }
    } else {
        let tag = r.read_tag()?;
        if tag != ACE_CBOR_TAG {
            return Err(AceError::decode(r.position(), format!("unexpected CBOR tag {tag}")));
        }
        decode_ref_or_literal(&mut r)?
    };
    if !r.at_end() {
        return Err(AceError::decode(r.position(), "trailing bytes after CBOR item"));
    }
    Ok(value)
}

/// Dispatches on array length: 3/4 is always an object reference, 2 is
/// always a `[literal_type_code, payload]` typed literal.
fn decode_ref_or_literal(r: &mut CborReader) -> Result<Value> {
    let pos = r.position();
    let len = r.read_array_header()?;
    match len {
        2 => {
            let code_pos = r.position();
            let code = r.read_uint()?;
            let code = u8::try_from(code)
                .ok()
                .and_then(|c| LiteralType::try_from(c).ok())
                .ok_or_else(|| AceError::decode(code_pos, format!("unknown literal-type code {code}")))?;
            decode_typed_literal(r, code, pos)
        }
        3 | 4 => decode_obj_ref_body(r, len),
        other => Err(AceError::decode(pos, format!("unexpected array length {other} for ARI content"))),
    }
}

fn decode_obj_ref_body(r: &mut CborReader, len: u64) -> Result<Value> {
    let pos = r.position();
    let ns = r.read_uint()?;
    let type_pos = r.position();
    let object_type = ObjectType::try_from(u8::try_from(r.read_uint()?).map_err(|_| {
        AceError::decode(type_pos, "object-type code out of range")
    })?)
    .map_err(|_| AceError::decode(type_pos, "unknown object-type code"))?;
    let name = r.read_uint()?;
    let params = if len == 4 {
        let n = r.read_array_header()?;
        let mut v = Vec::with_capacity(n as usize);
        for _ in 0..n {
            v.push(decode_element(r)?);
        }
        v
    } else {
        Vec::new()
    };
    let _ = pos;
    Ok(Value::ObjRef(ObjRef::new(Ident::Enum(ns), object_type, Ident::Enum(name), params)))
}

fn decode_typed_literal(r: &mut CborReader, code: LiteralType, pos: Position) -> Result<Value> {
    use LiteralType::*;
    match code {
        Undefined => Ok(Value::Undefined),
        Null => {
            expect_simple(r, SIMPLE_NULL)?;
            Ok(Value::Null)
        }
        Bool => Ok(Value::Bool(decode_bool(r)?)),
        Int8 => Value::signed(8, r.read_int()?, pos),
        Uint8 => Value::unsigned(8, r.read_uint()?, pos),
        Int16 => Value::signed(16, r.read_int()?, pos),
        Uint16 => Value::unsigned(16, r.read_uint()?, pos),
        Int => Value::signed(32, r.read_int()?, pos),
        Uint => Value::unsigned(32, r.read_uint()?, pos),
        Int64 => Ok(Value::Int64(r.read_int()?)),
        Uint64 => Ok(Value::Uint64(r.read_uint()?)),
        Vast => Ok(Value::Vast(r.read_int()?)),
        Uvast => Ok(Value::Uvast(r.read_uint()?)),
        Real32 => Ok(Value::Real32(r.read_f32()?)),
        Real64 => Ok(Value::Real64(r.read_f64()?)),
        Textstr => Ok(Value::Text(r.read_text()?)),
        Bytestr => Ok(Value::Bytes(r.read_byte_string()?)),
        Tp => Ok(Value::Tp(decode_time(r)?)),
        Td => Ok(Value::Td(decode_time(r)?)),
        Label => decode_label(r),
        Cbor => decode_embedded_cbor(r),
        Ac => decode_ac(r),
        Am => decode_am(r),
        Tbl => decode_tbl(r, pos),
        Execset => decode_execset(r),
        Rptset => decode_rptset(r),
    }
}

fn expect_simple(r: &mut CborReader, code: u8) -> Result<()> {
    let pos = r.position();
    let got = r.read_simple()?;
    if got != code {
        return Err(AceError::decode(pos, format!("expected simple value {code}, found {got}")));
    }
    Ok(())
}

fn decode_bool(r: &mut CborReader) -> Result<bool> {
    let pos = r.position();
    match r.read_simple()? {
        SIMPLE_FALSE => Ok(false),
        SIMPLE_TRUE => Ok(true),
        other => Err(AceError::decode(pos, format!("expected boolean simple value, found {other}"))),
    }
}

fn decode_time(r: &mut CborReader) -> Result<TimeValue> {
    let pos = r.position();
    match r.peek_major()? {
        MAJOR_UINT | MAJOR_NEGINT => Ok(TimeValue::integer(r.read_int()?)),
        MAJOR_SIMPLE => {
            let f = r.read_f64()?;
            let seconds = f.trunc() as i64;
            let frac_nanos = (f.fract().abs() * 1_000_000_000.0).round() as u32;
            Ok(TimeValue { seconds, frac_nanos })
        }
        other => Err(AceError::decode(pos, format!("unexpected major type {other} for time value"))),
    }
}

fn decode_label(r: &mut CborReader) -> Result<Value> {
    let pos = r.position();
    match r.peek_major()? {
        MAJOR_UINT => Ok(Value::Label(Label::Int(r.read_uint()?))),
        MAJOR_TEXT => Ok(Value::Label(Label::Text(r.read_text()?))),
        other => Err(AceError::decode(pos, format!("unexpected major type {other} for LABEL"))),
    }
}

/// `CBOR`-embedded items are preserved bit-exactly: re-read the same bytes
/// this reader already has without reinterpreting them.
fn decode_embedded_cbor(r: &mut CborReader) -> Result<Value> {
    let start = r.position().offset;
    skip_item(r)?;
    let end = r.position().offset;
    // `skip_item` only advances; the bytes themselves come back out of the
    // original buffer via the positions recorded above.
    Ok(Value::Cbor(r.slice_between(start, end)))
}

fn decode_ac(r: &mut CborReader) -> Result<Value> {
    let n = r.read_array_header()?;
    let mut items = Vec::with_capacity(n as usize);
    for _ in 0..n {
        items.push(decode_element(r)?);
    }
    Ok(Value::Ac(items))
}

fn decode_am(r: &mut CborReader) -> Result<Value> {
    let n = r.read_map_header()?;
    let mut entries = Vec::with_capacity(n as usize);
    for _ in 0..n {
        let k = decode_element(r)?;
        let v = decode_element(r)?;
        entries.push((k, v));
    }
    Ok(Value::Am(entries))
}

fn decode_tbl(r: &mut CborReader, pos: Position) -> Result<Value> {
    let n = r.read_array_header()?;
    if n == 0 {
        return Err(AceError::decode(pos, "TBL item missing column count"));
    }
    let cols = r.read_uint()?;
    let mut elements = Vec::with_capacity((n - 1) as usize);
    for _ in 0..n - 1 {
        elements.push(decode_element(r)?);
    }
    Table::new(cols, elements, pos).map(Value::Tbl)
}

fn decode_execset(r: &mut CborReader) -> Result<Value> {
    let target = decode_element(r)?;
    let n = r.read_array_header()?;
    let mut items = Vec::with_capacity(n as usize);
    for _ in 0..n {
        items.push(decode_element(r)?);
    }
    Ok(Value::Execset(ExecSet { target: Box::new(target), items }))
}

fn decode_rptset(r: &mut CborReader) -> Result<Value> {
    let nonce = decode_element(r)?;
    let reference_time = decode_element(r)?;
    let mut entries = Vec::new();
    while r.peek_major().map(|m| m == MAJOR_ARRAY).unwrap_or(false) {
        let n = r.read_array_header()?;
        if n != 3 {
            return Err(AceError::decode(r.position(), "RPTSET entry must have 3 fields"));
        }
        let time = decode_element(r)?;
        let source = decode_element(r)?;
        let items_len = r.read_array_header()?;
        let mut items = Vec::with_capacity(items_len as usize);
        for _ in 0..items_len {
            items.push(decode_element(r)?);
        }
        entries.push(RptEntry { time, source: Box::new(source), items });
    }
    Ok(Value::Rptset(RptSet { nonce: Box::new(nonce), reference_time: Box::new(reference_time), entries }))
}

/// Decodes one value in "nested" position: an array of length 3/4 is an
/// object reference, a length-2 array is a typed container literal, and
/// anything else is a bare scalar (width/signedness is not recoverable
/// here; callers rely on the declared ADM signature for that).
fn decode_element(r: &mut CborReader) -> Result<Value> {
    let pos = r.position();
    match r.peek_major()? {
        MAJOR_ARRAY => decode_ref_or_literal(r),
        MAJOR_UINT => Ok(Value::Int64(r.read_int()?)),
        MAJOR_NEGINT => Ok(Value::Int64(r.read_int()?)),
        MAJOR_BYTES => Ok(Value::Bytes(r.read_byte_string()?)),
        MAJOR_TEXT => Ok(Value::Text(r.read_text()?)),
        MAJOR_SIMPLE => {
            let save = r.position();
            let h_pos = save;
            match r.read_simple_or_float()? {
                super::reader::SimpleOrFloat::False => Ok(Value::Bool(false)),
                super::reader::SimpleOrFloat::True => Ok(Value::Bool(true)),
                super::reader::SimpleOrFloat::Null => Ok(Value::Null),
                super::reader::SimpleOrFloat::Undefined => Ok(Value::Undefined),
                super::reader::SimpleOrFloat::Float(f) => Ok(Value::Real64(f)),
                super::reader::SimpleOrFloat::Other(_) => {
                    Err(AceError::decode(h_pos, "unsupported simple value in nested position"))
                }
            }
        }
        other => Err(AceError::decode(pos, format!("unsupported major type {other} in nested position"))),
    }
}

fn skip_item(r: &mut CborReader) -> Result<()> {
    let pos = r.position();
    match r.peek_major()? {
        MAJOR_UINT | MAJOR_NEGINT => {
            r.read_int()?;
        }
        MAJOR_BYTES => {
            r.read_byte_string()?;
        }
        MAJOR_TEXT => {
            r.read_text()?;
        }
        MAJOR_ARRAY => {
            let n = r.read_array_header()?;
            for _ in 0..n {
                skip_item(r)?;
            }
        }
        5 => {
            let n = r.read_map_header()?;
            for _ in 0..2 * n {
                skip_item(r)?;
            }
        }
        6 => {
            r.read_tag()?;
            skip_item(r)?;
        }
        MAJOR_SIMPLE => {
            r.read_simple_or_float()?;
        }
        other => return Err(AceError::decode(pos, format!("cannot skip unknown major type {other}"))),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::encoder::encode;
    use super::*;

    #[test]
    fn decodes_undefined_bare() {
        assert_eq!(decode(&[0xF7]).unwrap(), Value::Undefined);
    }

    #[test]
    fn decodes_empty_ac() {
        let v = Value::Ac(vec![]);
        let bytes = encode(&v).unwrap();
        assert_eq!(decode(&bytes).unwrap(), v);
    }

    #[test]
    fn rejects_truncated_input() {
        let bytes = encode(&Value::Ac(vec![Value::Int(1)])).unwrap();
        let truncated = &bytes[..bytes.len() - 1];
        assert!(decode(truncated).is_err());
    }

    #[test]
    fn round_trips_tbl() {
        // Elements are `Int64` because nested scalars decode back bare,
        // regardless of the width they were encoded with.
        let pos = Position::at_offset(0);
        let t =
            Table::new(2, vec![Value::Int64(1), Value::Int64(2), Value::Int64(3), Value::Int64(4)], pos).unwrap();
        let v = Value::Tbl(t);
        let bytes = encode(&v).unwrap();
        assert_eq!(decode(&bytes).unwrap(), v);
    }

    #[test]
    fn round_trips_container_nested_inside_container() {
        // A TBL nested inside an AC still carries its `[code, payload]`
        // wrapper, so the decoder can tell it apart from an object
        // reference or a bare array of scalars.
        let pos = Position::at_offset(0);
        let t =
            Table::new(2, vec![Value::Int64(1), Value::Int64(2), Value::Int64(3), Value::Int64(4)], pos).unwrap();
        let v = Value::Ac(vec![Value::Tbl(t)]);
        let bytes = encode(&v).unwrap();
        assert_eq!(decode(&bytes).unwrap(), v);
    }

    #[test]
    fn round_trips_tp_nested_inside_rptset_entry() {
        let v = Value::Rptset(RptSet {
            nonce: Box::new(Value::Int64(1)),
            reference_time: Box::new(Value::Tp(TimeValue::integer(1000))),
            entries: vec![RptEntry {
                time: Value::Tp(TimeValue::integer(1001)),
                source: Box::new(Value::Int64(7)),
                items: vec![Value::Int64(9)],
            }],
        });
        let bytes = encode(&v).unwrap();
        assert_eq!(decode(&bytes).unwrap(), v);
    }
}
