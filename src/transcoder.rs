//! The transcoder facade: drives decode → resolve → encode pipelines
//! across the text/binary/catalog seam.

use crate::catalog::Catalog;
use crate::error::{AceError, Position, Result};
use crate::registry::ObjectType;
use crate::value::{ExecSet, Ident, ObjRef, RptSet, Table, Value};
use crate::{cbor, text};

/// The three wire forms a transcode can read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Text,
    Cbor,
    CborHex,
}

impl Form {
    fn is_binary(self) -> bool {
        matches!(self, Form::Cbor | Form::CborHex)
    }
}

/// Raw input to a transcode, tagged by shape rather than by form: `CborHex`
/// is textual on the wire but decodes through the binary codec.
pub enum Input<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

/// The rendered result of a transcode.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Text(String),
    Binary(Vec<u8>),
}

impl Rendered {
    pub fn into_text(self) -> Option<String> {
        match self {
            Rendered::Text(s) => Some(s),
            Rendered::Binary(_) => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Rendered::Binary(b) => Some(b),
            Rendered::Text(_) => None,
        }
    }
}

/// Drives one pipeline (decode, resolve, encode) against a shared [`Catalog`]
/// handle. The catalog is immutable once built, so one `Transcoder` may be
/// reused across many invocations.
pub struct Transcoder<'c> {
    catalog: &'c Catalog,
}

impl<'c> Transcoder<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    pub fn decode(&self, form: Form, input: Input) -> Result<Value> {
        match (form, input) {
            (Form::Text, Input::Text(s)) => text::parse(s),
            (Form::Cbor, Input::Bytes(b)) => cbor::decode(b),
            (Form::CborHex, Input::Text(s)) => cbor::decode(&decode_hex_line(s)?),
            _ => Err(AceError::decode(Position::at_offset(0), "input shape does not match declared form")),
        }
    }

    pub fn encode(&self, form: Form, value: &Value) -> Result<Rendered> {
        match form {
            Form::Text => Ok(Rendered::Text(text::unparse(value))),
            Form::Cbor => Ok(Rendered::Binary(cbor::encode(value)?)),
            Form::CborHex => Ok(Rendered::Text(encode_hex_line(&cbor::encode(value)?))),
        }
    }

    /// Fills in the missing half of every object reference against the
    /// catalog. `must_nickname` requires every reference to end up with a
    /// numeric enumerator (needed to emit binary); `must_lookup` requires
    /// every reference to end up with a symbolic name (needed to emit text).
    /// Outside of those requirements, resolution is best-effort: a reference
    /// the catalog can't resolve is left as-is rather than rejected.
    pub fn resolve(&self, value: Value, must_nickname: bool, must_lookup: bool) -> Result<Value> {
        resolve_value(self.catalog, value, must_nickname, must_lookup)
    }

    /// The full decode → resolve → encode pipeline. Resolution is mandatory
    /// when the output form belongs to a different family than the input
    /// form (text vs. binary); within the same family it follows the
    /// caller's `must_nickname`/`must_lookup` flags.
    pub fn transcode(
        &self,
        form_in: Form,
        input: Input,
        form_out: Form,
        must_nickname: bool,
        must_lookup: bool,
    ) -> Result<Rendered> {
        let value = self.decode(form_in, input)?;
        let changing_family = form_in.is_binary() != form_out.is_binary();
        let (nickname, lookup) = if changing_family {
            if form_out.is_binary() {
                (true, must_lookup)
            } else {
                (must_nickname, true)
            }
        } else {
            (must_nickname, must_lookup)
        };
        let resolved = self.resolve(value, nickname, lookup)?;
        self.encode(form_out, &resolved)
    }
}

fn resolve_value(cat: &Catalog, value: Value, must_nickname: bool, must_lookup: bool) -> Result<Value> {
    Ok(match value {
        Value::ObjRef(r) => Value::ObjRef(resolve_obj_ref(cat, r, must_nickname, must_lookup)?),
        Value::Ac(items) => Value::Ac(resolve_all(cat, items, must_nickname, must_lookup)?),
        Value::Am(entries) => {
            let mut out = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                out.push((
                    resolve_value(cat, k, must_nickname, must_lookup)?,
                    resolve_value(cat, v, must_nickname, must_lookup)?,
                ));
            }
            Value::Am(out)
        }
        Value::Tbl(t) => {
            let pos = Position::at_offset(0);
            let (cols, elements) = t.into_parts();
            Value::Tbl(Table::new(cols, resolve_all(cat, elements, must_nickname, must_lookup)?, pos)?)
        }
        Value::Execset(e) => Value::Execset(ExecSet {
            target: Box::new(resolve_value(cat, *e.target, must_nickname, must_lookup)?),
            items: resolve_all(cat, e.items, must_nickname, must_lookup)?,
        }),
        Value::Rptset(r) => {
            let mut entries = Vec::with_capacity(r.entries.len());
            for entry in r.entries {
                entries.push(crate::value::RptEntry {
                    time: resolve_value(cat, entry.time, must_nickname, must_lookup)?,
                    source: Box::new(resolve_value(cat, *entry.source, must_nickname, must_lookup)?),
                    items: resolve_all(cat, entry.items, must_nickname, must_lookup)?,
                });
            }
            Value::Rptset(RptSet {
                nonce: Box::new(resolve_value(cat, *r.nonce, must_nickname, must_lookup)?),
                reference_time: Box::new(resolve_value(cat, *r.reference_time, must_nickname, must_lookup)?),
                entries,
            })
        }
        other => other,
    })
}

fn resolve_all(cat: &Catalog, items: Vec<Value>, must_nickname: bool, must_lookup: bool) -> Result<Vec<Value>> {
    items.into_iter().map(|v| resolve_value(cat, v, must_nickname, must_lookup)).collect()
}

fn resolve_obj_ref(cat: &Catalog, r: ObjRef, must_nickname: bool, must_lookup: bool) -> Result<ObjRef> {
    let pos = Position::at_offset(0);
    let adm = match &r.namespace {
        Ident::Symbolic(s) => cat.resolve_namespace_symbol(s),
        Ident::Enum(e) => cat.resolve_namespace_enum(*e),
        Ident::Resolved { symbol, .. } => cat.resolve_namespace_symbol(symbol),
    };
    let Some(adm) = adm else {
        if must_nickname || must_lookup {
            let shown = r.namespace.symbol().map(str::to_string).unwrap_or_else(|| "?".into());
            return Err(AceError::resolution(pos, format!("unknown namespace '{shown}'")));
        }
        return Ok(ObjRef { params: resolve_all(cat, r.params, must_nickname, must_lookup)?, ..r });
    };
    let namespace = Ident::Resolved { symbol: adm.namespace.clone(), enumerator: adm.enumerator };

    let desc = match &r.name {
        Ident::Symbolic(s) => adm.objects.by_name(s),
        Ident::Enum(e) => adm.objects.by_code(r.object_type, *e),
        Ident::Resolved { symbol, .. } => adm.objects.by_name(symbol),
    };
    let Some(desc) = desc else {
        if must_nickname || must_lookup {
            let shown = r.name.symbol().map(str::to_string).unwrap_or_else(|| "?".into());
            return Err(AceError::resolution(pos, format!("unknown object '{}/{shown}'", adm.namespace)));
        }
        return Ok(ObjRef {
            namespace,
            params: resolve_all(cat, r.params, must_nickname, must_lookup)?,
            ..r
        });
    };
    if desc.object_type != r.object_type {
        return Err(AceError::resolution(
            pos,
            format!("'{}/{}' is declared as {:?}, not {:?}", adm.namespace, desc.name, desc.object_type, r.object_type),
        ));
    }
    cat.check_arity(&desc.signature, &r.params, pos)?;
    let name = Ident::Resolved { symbol: desc.name.clone(), enumerator: desc.enumerator };
    Ok(ObjRef {
        namespace,
        object_type: r.object_type,
        name,
        params: resolve_all(cat, r.params, must_nickname, must_lookup)?,
    })
}

fn decode_hex_line(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if s.len() % 2 != 0 {
        return Err(AceError::decode(Position::at_offset(0), "hex input has odd length"));
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    let bytes = s.as_bytes();
    for chunk in bytes.chunks(2) {
        let hi = hex_nibble(chunk[0])?;
        let lo = hex_nibble(chunk[1])?;
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

fn hex_nibble(b: u8) -> Result<u8> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(AceError::decode(Position::at_offset(0), "invalid hex digit")),
    }
}

fn encode_hex_line(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{b:02X}"));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Adm;

    fn sample_catalog() -> Catalog {
        let mut adm = Adm::new("example", 42);
        adm.define(1, "num_tx", ObjectType::Edd, vec![]);
        let mut cat = Catalog::new();
        cat.add_adm(adm).unwrap();
        cat
    }

    #[test]
    fn transcodes_undefined_text_to_hex() {
        let cat = Catalog::new();
        let tc = Transcoder::new(&cat);
        let out = tc
            .transcode(Form::Text, Input::Text("ari:/undefined"), Form::CborHex, false, false)
            .unwrap();
        assert_eq!(out.into_text().unwrap(), "F7");
    }

    #[test]
    fn mandatory_resolution_on_form_change_rejects_unknown_namespace() {
        let cat = Catalog::new();
        let tc = Transcoder::new(&cat);
        let err = tc.transcode(Form::Text, Input::Text("ari:/nope/EDD.thing"), Form::Cbor, false, false);
        assert!(err.is_err());
    }

    #[test]
    fn resolves_known_namespace_and_object() {
        let cat = sample_catalog();
        let tc = Transcoder::new(&cat);
        let bytes = tc
            .transcode(Form::Text, Input::Text("ari:/example/EDD.num_tx"), Form::Cbor, false, false)
            .unwrap()
            .into_bytes()
            .unwrap();
        let back = tc.transcode(Form::Cbor, Input::Bytes(&bytes), Form::Text, false, false).unwrap();
        assert_eq!(back.into_text().unwrap(), "ari:/example/EDD.num_tx");
    }

    #[test]
    fn advisory_resolution_on_same_family_pass_does_not_error() {
        let cat = Catalog::new();
        let tc = Transcoder::new(&cat);
        let out = tc.transcode(Form::Text, Input::Text("ari:/nope/EDD.thing"), Form::Text, false, false);
        assert!(out.is_ok());
    }
}
