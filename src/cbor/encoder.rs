//! CBOR encoder: `Value` → bytes.
//!
//! Two representations exist depending on position:
//! - **top-level**: every non-`Undefined` value is wrapped in the ARI tag
//!   ([`ACE_CBOR_TAG`]); scalars additionally carry their literal-type code
//!   so the decoder can reconstruct the exact declared width. `Undefined`
//!   is the one documented exception — it is the bare CBOR `undefined`
//!   simple value with no tag at all.
//! - **nested** (container elements, object-reference parameters): object
//!   references keep their self-describing shape (always a 3- or 4-element
//!   array). A container literal (`AC`/`AM`/`TBL`/`EXECSET`/`RPTSET`), `TP`,
//!   `TD`, `LABEL`, and embedded `CBOR` always carry their `[code, payload]`
//!   wrapper too, nested or not, since an unwrapped array of one of their
//!   lengths would be ambiguous with an object reference or a different
//!   typed literal. Bare primitive scalars (`bool`, `null`, integers, reals,
//!   text, bytes) lose their width/signedness when nested — the declared
//!   ADM signature is expected to supply that context.

use crate::error::{AceError, Position, Result};
use crate::registry::{LiteralType, ACE_CBOR_TAG};
use crate::value::{ExecSet, Ident, ObjRef, RptSet, Table, TimeValue, Value};

use super::writer::CborWriter;

pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut w = CborWriter::new();
    if matches!(value, Value::Undefined) {
        w.write_undefined();
        return Ok(w.into_bytes());
    }
    w.write_tag(ACE_CBOR_TAG);
    encode_top_level(&mut w, value)?;
    Ok(w.into_bytes())
}

fn encode_top_level(w: &mut CborWriter, value: &Value) -> Result<()> {
    match value {
        Value::ObjRef(r) => encode_obj_ref(w, r),
        _ => encode_wrapped(w, value),
    }
}

/// Writes `[literal_type_code, payload]`, the form every non-`ObjRef` value
/// takes at the top level, and that container/`TP`/`TD`/`LABEL`/`CBOR`
/// values keep even when nested.
fn encode_wrapped(w: &mut CborWriter, value: &Value) -> Result<()> {
    let lit = value.literal_type().expect("non-ObjRef values always carry a literal type");
    w.write_array_header(2);
    w.write_uint(u8::from(lit) as u64);
    encode_payload(w, value)
}

fn ident_enumerator(id: &Ident, pos: Position) -> Result<u64> {
    id.enumerator()
        .ok_or_else(|| AceError::resolution(pos, "binary encoding requires a resolved numeric enumerator"))
}

fn encode_obj_ref(w: &mut CborWriter, r: &ObjRef) -> Result<()> {
    let pos = Position::at_offset(0);
    let ns = ident_enumerator(&r.namespace, pos)?;
    let name = ident_enumerator(&r.name, pos)?;
    if r.params.is_empty() {
        w.write_array_header(3);
    } else {
        w.write_array_header(4);
    }
    w.write_uint(ns);
    w.write_uint(u8::from(r.object_type) as u64);
    w.write_uint(name);
    if !r.params.is_empty() {
        w.write_array_header(r.params.len() as u64);
        for p in &r.params {
            encode_element(w, p)?;
        }
    }
    Ok(())
}

fn encode_time(w: &mut CborWriter, t: &TimeValue) {
    if t.is_whole() {
        w.write_int(t.seconds);
    } else {
        let frac = t.frac_nanos as f64 / 1_000_000_000.0;
        w.write_f64(t.seconds as f64 + frac.copysign(1.0));
    }
}

fn encode_table(w: &mut CborWriter, t: &Table) -> Result<()> {
    w.write_array_header(1 + t.elements().len() as u64);
    w.write_uint(t.cols());
    for e in t.elements() {
        encode_element(w, e)?;
    }
    Ok(())
}

fn encode_execset(w: &mut CborWriter, e: &ExecSet) -> Result<()> {
    w.write_array_header(2);
    encode_element(w, &e.target)?;
    w.write_array_header(e.items.len() as u64);
    for item in &e.items {
        encode_element(w, item)?;
    }
    Ok(())
}

fn encode_rptset(w: &mut CborWriter, r: &RptSet) -> Result<()> {
    w.write_array_header(2 + r.entries.len() as u64);
    encode_element(w, &r.nonce)?;
    encode_element(w, &r.reference_time)?;
    for entry in &r.entries {
        w.write_array_header(3);
        encode_element(w, &entry.time)?;
        encode_element(w, &entry.source)?;
        w.write_array_header(entry.items.len() as u64);
        for item in &entry.items {
            encode_element(w, item)?;
        }
    }
    Ok(())
}

/// Encodes one value in "nested" position: self-describing for object
/// references, `[code, payload]`-wrapped for container literals and
/// `TP`/`TD`/`LABEL`/`CBOR`, bare for other scalars.
fn encode_element(w: &mut CborWriter, value: &Value) -> Result<()> {
    match value {
        Value::ObjRef(r) => encode_obj_ref(w, r),
        Value::Undefined
        | Value::Null
        | Value::Bool(_)
        | Value::Int8(_)
        | Value::Uint8(_)
        | Value::Int16(_)
        | Value::Uint16(_)
        | Value::Int(_)
        | Value::Uint(_)
        | Value::Int64(_)
        | Value::Uint64(_)
        | Value::Vast(_)
        | Value::Uvast(_)
        | Value::Real32(_)
        | Value::Real64(_)
        | Value::Text(_)
        | Value::Bytes(_) => encode_payload(w, value),
        _ => encode_wrapped(w, value),
    }
}

/// Writes the bare payload for `value`, with no `[code, ...]` wrapper and
/// no tag. Called directly for scalars (nested or top-level, where the
/// wrapper if any was already written by the caller) and for the inside of
/// an [`encode_wrapped`] call.
fn encode_payload(w: &mut CborWriter, value: &Value) -> Result<()> {
    match value {
        Value::Undefined => w.write_undefined(),
        Value::Null => w.write_null(),
        Value::Bool(b) => w.write_bool(*b),
        Value::Int8(n) => w.write_int(*n as i64),
        Value::Uint8(n) => w.write_uint(*n as u64),
        Value::Int16(n) => w.write_int(*n as i64),
        Value::Uint16(n) => w.write_uint(*n as u64),
        Value::Int(n) => w.write_int(*n as i64),
        Value::Uint(n) => w.write_uint(*n as u64),
        Value::Int64(n) => w.write_int(*n),
        Value::Uint64(n) => w.write_uint(*n),
        Value::Vast(n) => w.write_int(*n),
        Value::Uvast(n) => w.write_uint(*n),
        Value::Real32(f) => w.write_f32(*f),
        Value::Real64(f) => w.write_f64(*f),
        Value::Text(s) => w.write_text(s),
        Value::Bytes(b) => w.write_bytes(b),
        Value::Tp(t) | Value::Td(t) => encode_time(w, t),
        Value::Label(crate::value::Label::Int(n)) => w.write_uint(*n),
        Value::Label(crate::value::Label::Text(s)) => w.write_text(s),
        Value::Cbor(bytes) => w.write_raw(bytes),
        Value::Ac(items) => {
            w.write_array_header(items.len() as u64);
            for i in items {
                encode_element(w, i)?;
            }
        }
        Value::Am(entries) => {
            w.write_map_header(entries.len() as u64);
            for (k, v) in entries {
                encode_element(w, k)?;
                encode_element(w, v)?;
            }
        }
        Value::Tbl(t) => encode_table(w, t)?,
        Value::Execset(e) => encode_execset(w, e)?,
        Value::Rptset(r) => encode_rptset(w, r)?,
        Value::ObjRef(r) => encode_obj_ref(w, r)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_undefined_bare() {
        assert_eq!(encode(&Value::Undefined).unwrap(), vec![0xF7]);
    }

    #[test]
    fn encodes_empty_ac_with_tag_and_code() {
        let bytes = encode(&Value::Ac(vec![])).unwrap();
        // tag(1), [code=21 (AC), []]
        assert_eq!(bytes, vec![0xC1, 0x82, 0x15, 0x80]);
    }
}
