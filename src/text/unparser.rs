//! Canonical unparser: deterministic text emission from a [`Value`],
//! satisfying the round-trip law `parse(unparse(x)) = x`.

use crate::value::{Ident, Label, TimeValue, Value};

/// Minimum RFC 3986 unreserved set plus the ARI grammar's own punctuation,
/// which pass through unescaped; everything else is percent-encoded.
fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '/' | ':' | '(' | ')' | '=' | ',' | '!')
}

fn percent_encode(s: &str, out: &mut String) {
    for b in s.bytes() {
        let c = b as char;
        if is_safe(c) {
            out.push(c);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
}

fn push_ident(s: &str, out: &mut String) {
    percent_encode(s, out);
}

fn push_quoted(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

fn push_hex(bytes: &[u8], out: &mut String) {
    out.push_str("h'");
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out.push('\'');
}

fn push_ident_ref(id: &Ident, out: &mut String) {
    match id {
        Ident::Symbolic(s) | Ident::Resolved { symbol: s, .. } => push_ident(s, out),
        Ident::Enum(e) => {
            out.push('!');
            out.push_str(&e.to_string());
        }
    }
}

fn push_real(f: f64, out: &mut String) {
    if f == f.trunc() && f.is_finite() && f.abs() < 1e15 {
        out.push_str(&format!("{:.1}", f));
    } else {
        out.push_str(&format!("{}", f));
    }
}

fn push_time(t: &TimeValue, out: &mut String) {
    if t.is_whole() {
        out.push_str(&t.seconds.to_string());
    } else {
        let frac = t.frac_nanos as f64 / 1_000_000_000.0;
        let value = t.seconds as f64 + frac.copysign(1.0);
        out.push_str(&format!("{value}"));
    }
}

/// Unparses a [`Value`] into its canonical `ari:/...` text form.
pub fn unparse(value: &Value) -> String {
    let mut out = String::from("ari:/");
    write_value(value, &mut out);
    out
}

/// Writes a value's body without the `ari:/` scheme prefix, for use both
/// at the top level and recursively for parameters/container elements.
fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Undefined => out.push_str("undefined"),
        Value::Null => out.push_str("NULL"),
        Value::Bool(b) => out.push_str(if *b { "BOOL.true" } else { "BOOL.false" }),
        Value::Int8(n) => out.push_str(&format!("INT8.{n}")),
        Value::Uint8(n) => out.push_str(&format!("UINT8.{n}")),
        Value::Int16(n) => out.push_str(&format!("INT16.{n}")),
        Value::Uint16(n) => out.push_str(&format!("UINT16.{n}")),
        // INT is the default bare-numeric shorthand: emitted without a
        // type prefix, matching the untyped `TBL` row form in the grammar.
        Value::Int(n) => out.push_str(&n.to_string()),
        Value::Uint(n) => out.push_str(&format!("UINT.{n}")),
        Value::Int64(n) => out.push_str(&format!("INT64.{n}")),
        Value::Uint64(n) => out.push_str(&format!("UINT64.{n}")),
        Value::Vast(n) => out.push_str(&format!("VAST.{n}")),
        Value::Uvast(n) => out.push_str(&format!("UVAST.{n}")),
        Value::Real32(f) => {
            out.push_str("REAL32.");
            push_real(*f as f64, out);
        }
        // REAL64 is the default bare-decimal shorthand.
        Value::Real64(f) => push_real(*f, out),
        // TEXTSTR is the default bare-string shorthand.
        Value::Text(s) => push_quoted(s, out),
        // BYTESTR is the default bare-byte-string shorthand.
        Value::Bytes(b) => push_hex(b, out),
        Value::Tp(t) => {
            out.push_str("TP.");
            push_time(t, out);
        }
        Value::Td(t) => {
            out.push_str("TD.");
            push_time(t, out);
        }
        Value::Label(Label::Int(n)) => out.push_str(&format!("LABEL.!{n}")),
        Value::Label(Label::Text(s)) => {
            out.push_str("LABEL.");
            push_ident(s, out);
        }
        Value::Cbor(b) => {
            out.push_str("CBOR.");
            push_hex(b, out);
        }
        Value::Ac(items) => {
            out.push_str("AC(");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(')');
        }
        Value::Am(entries) => {
            out.push_str("AM(");
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(k, out);
                out.push('=');
                write_value(v, out);
            }
            out.push(')');
        }
        Value::Tbl(t) => {
            out.push_str("TBL(c=");
            out.push_str(&t.cols().to_string());
            let rows = t.elements().chunks(t.cols().max(1) as usize);
            for row in rows {
                out.push(';');
                for (i, cell) in row.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_value(cell, out);
                }
            }
            out.push(')');
        }
        Value::Execset(e) => {
            out.push_str("EXECSET(");
            write_value(&e.target, out);
            out.push(';');
            for (i, item) in e.items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(')');
        }
        Value::Rptset(r) => {
            out.push_str("RPTSET(");
            write_value(&r.nonce, out);
            out.push(',');
            write_value(&r.reference_time, out);
            for entry in &r.entries {
                out.push(';');
                write_value(&entry.time, out);
                out.push(',');
                write_value(&entry.source, out);
                for item in &entry.items {
                    out.push(',');
                    write_value(item, out);
                }
            }
            out.push(')');
        }
        Value::ObjRef(r) => {
            push_ident_ref(&r.namespace, out);
            out.push('/');
            out.push_str(r.object_type.canonical_name());
            out.push('.');
            push_ident_ref(&r.name, out);
            if !r.params.is_empty() {
                out.push('(');
                for (i, p) in r.params.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_value(p, out);
                }
                out.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::parser::parse;

    #[test]
    fn round_trips_undefined() {
        let v = parse("ari:/undefined").unwrap();
        assert_eq!(unparse(&v), "ari:/undefined");
    }

    #[test]
    fn round_trips_empty_ac() {
        let v = parse("ari:/AC()").unwrap();
        assert_eq!(unparse(&v), "ari:/AC()");
    }

    #[test]
    fn round_trips_tbl() {
        let v = parse("ari:/TBL(c=2;1,2;3,4)").unwrap();
        assert_eq!(unparse(&v), "ari:/TBL(c=2;1,2;3,4)");
    }

    #[test]
    fn canonicalizes_case() {
        let v = parse("ari:/uvast.5").unwrap();
        assert_eq!(unparse(&v), "ari:/UVAST.5");
    }
}
