//! The AMM value / ARI AST: a recursively-typed algebraic structure
//! covering every AMM literal and container shape plus object references.
//! Parent nodes own their children; the AST is acyclic and immutable once
//! built, matching a tagged enum with exhaustive matching rather than a
//! subclass tree.

use crate::error::{AceError, Position, Result};
use crate::registry::{LiteralType, ObjectType};

/// The DTN epoch: 2000-01-01T00:00:00Z, expressed as a Unix offset in
/// seconds, used to interpret/emit integer TP forms.
pub const DTN_EPOCH_UNIX_OFFSET: i64 = 946_684_800;

/// A timepoint or timedelta payload: whole seconds plus an optional
/// fractional part in nanoseconds. `frac_nanos == 0` is the integer-seconds
/// form; anything else requires the decimal-seconds text/CBOR form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeValue {
    pub seconds: i64,
    pub frac_nanos: u32,
}

impl TimeValue {
    pub fn integer(seconds: i64) -> Self {
        Self { seconds, frac_nanos: 0 }
    }

    pub fn is_whole(&self) -> bool {
        self.frac_nanos == 0
    }
}

/// A label carried as either an integer enumerator or interned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Int(u64),
    Text(String),
}

/// A TBL literal: column count plus a row-major, flat sequence of values.
/// Row count is `elements.len() / cols`; constructed only through
/// [`Table::new`], which enforces divisibility.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    cols: u64,
    elements: Vec<Value>,
}

impl Table {
    pub fn new(cols: u64, elements: Vec<Value>, pos: Position) -> Result<Self> {
        if cols == 0 {
            return Err(AceError::type_error(pos, "TBL column count must be nonzero"));
        }
        if elements.len() as u64 % cols != 0 {
            return Err(AceError::decode(
                pos,
                format!(
                    "TBL flat length {} is not divisible by column count {cols}",
                    elements.len()
                ),
            ));
        }
        Ok(Self { cols, elements })
    }

    pub fn cols(&self) -> u64 {
        self.cols
    }

    pub fn rows(&self) -> u64 {
        self.elements.len() as u64 / self.cols
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn into_parts(self) -> (u64, Vec<Value>) {
        (self.cols, self.elements)
    }
}

/// `EXECSET`: an identifier plus an ordered sequence of ARIs to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecSet {
    pub target: Box<Value>,
    pub items: Vec<Value>,
}

/// One row of an `RPTSET`: a timestamp, a reporting source reference, and
/// the values it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RptEntry {
    pub time: Value,
    pub source: Box<Value>,
    pub items: Vec<Value>,
}

/// `RPTSET`: a nonce, a reference time, and the report entries collected
/// against it.
#[derive(Debug, Clone, PartialEq)]
pub struct RptSet {
    pub nonce: Box<Value>,
    pub reference_time: Box<Value>,
    pub entries: Vec<RptEntry>,
}

/// Either half of a namespace or object-name token: the symbolic form, the
/// numeric enumerator, or both once resolved against a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ident {
    Symbolic(String),
    Enum(u64),
    Resolved { symbol: String, enumerator: u64 },
}

impl Ident {
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Ident::Symbolic(s) | Ident::Resolved { symbol: s, .. } => Some(s),
            Ident::Enum(_) => None,
        }
    }

    pub fn enumerator(&self) -> Option<u64> {
        match self {
            Ident::Enum(e) | Ident::Resolved { enumerator: e, .. } => Some(*e),
            Ident::Symbolic(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Ident::Resolved { .. })
    }
}

/// A reference to an ADM-defined object: `(namespace, object-type,
/// object-name, parameter-list)`. A reference is "fully resolved" when both
/// `namespace` and `name` carry both symbolic and numeric forms; parameter
/// type-checking against a signature is deferred until then.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjRef {
    pub namespace: Ident,
    pub object_type: ObjectType,
    pub name: Ident,
    pub params: Vec<Value>,
}

impl ObjRef {
    pub fn new(namespace: Ident, object_type: ObjectType, name: Ident, params: Vec<Value>) -> Self {
        Self { namespace, object_type, name, params }
    }

    pub fn is_resolved(&self) -> bool {
        self.namespace.is_resolved() && self.name.is_resolved()
    }
}

/// The AMM value AST: every variant carries its own type code implicitly
/// via the enum discriminant (see [`Value::literal_type`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int(i32),
    Uint(u32),
    Int64(i64),
    Uint64(u64),
    Vast(i64),
    Uvast(u64),
    Real32(f32),
    Real64(f64),
    Text(String),
    Bytes(Vec<u8>),
    Tp(TimeValue),
    Td(TimeValue),
    Label(Label),
    /// A nested, opaque CBOR item, preserved bit-exactly as its raw
    /// encoding.
    Cbor(Vec<u8>),
    Ac(Vec<Value>),
    /// Key order is preserved; not a `HashMap` because AMM values (e.g.
    /// floats) aren't `Hash` and insertion order is semantically
    /// significant.
    Am(Vec<(Value, Value)>),
    Tbl(Table),
    Execset(ExecSet),
    Rptset(RptSet),
    ObjRef(ObjRef),
}

impl Value {
    pub fn literal_type(&self) -> Option<LiteralType> {
        use Value::*;
        Some(match self {
            Undefined => LiteralType::Undefined,
            Null => LiteralType::Null,
            Bool(_) => LiteralType::Bool,
            Int8(_) => LiteralType::Int8,
            Uint8(_) => LiteralType::Uint8,
            Int16(_) => LiteralType::Int16,
            Uint16(_) => LiteralType::Uint16,
            Int(_) => LiteralType::Int,
            Uint(_) => LiteralType::Uint,
            Int64(_) => LiteralType::Int64,
            Uint64(_) => LiteralType::Uint64,
            Vast(_) => LiteralType::Vast,
            Uvast(_) => LiteralType::Uvast,
            Real32(_) => LiteralType::Real32,
            Real64(_) => LiteralType::Real64,
            Text(_) => LiteralType::Textstr,
            Bytes(_) => LiteralType::Bytestr,
            Tp(_) => LiteralType::Tp,
            Td(_) => LiteralType::Td,
            Label(_) => LiteralType::Label,
            Cbor(_) => LiteralType::Cbor,
            Ac(_) => LiteralType::Ac,
            Am(_) => LiteralType::Am,
            Tbl(_) => LiteralType::Tbl,
            Execset(_) => LiteralType::Execset,
            Rptset(_) => LiteralType::Rptset,
            ObjRef(_) => return None,
        })
    }

    pub fn is_object_ref(&self) -> bool {
        matches!(self, Value::ObjRef(_))
    }

    /// Construct a signed integer of the given width, checking range.
    pub fn signed(width: u8, raw: i64, pos: Position) -> Result<Self> {
        Ok(match width {
            8 => Value::Int8(check_range(raw, i8::MIN as i64, i8::MAX as i64, "INT8", pos)? as i8),
            16 => Value::Int16(
                check_range(raw, i16::MIN as i64, i16::MAX as i64, "INT16", pos)? as i16,
            ),
            32 => Value::Int(check_range(raw, i32::MIN as i64, i32::MAX as i64, "INT", pos)? as i32),
            64 => Value::Int64(raw),
            other => {
                return Err(AceError::type_error(pos, format!("unsupported signed width {other}")))
            }
        })
    }

    /// Construct an unsigned integer of the given width, checking range.
    pub fn unsigned(width: u8, raw: u64, pos: Position) -> Result<Self> {
        Ok(match width {
            8 => Value::Uint8(check_range_u(raw, u8::MAX as u64, "UINT8", pos)? as u8),
            16 => Value::Uint16(check_range_u(raw, u16::MAX as u64, "UINT16", pos)? as u16),
            32 => Value::Uint(check_range_u(raw, u32::MAX as u64, "UINT", pos)? as u32),
            64 => Value::Uint64(raw),
            other => {
                return Err(AceError::type_error(pos, format!("unsupported unsigned width {other}")))
            }
        })
    }
}

fn check_range(raw: i64, lo: i64, hi: i64, name: &str, pos: Position) -> Result<i64> {
    if raw < lo || raw > hi {
        return Err(AceError::type_error(
            pos,
            format!("value {raw} out of range for {name} ({lo}..={hi})"),
        ));
    }
    Ok(raw)
}

fn check_range_u(raw: u64, hi: u64, name: &str, pos: Position) -> Result<u64> {
    if raw > hi {
        return Err(AceError::type_error(pos, format!("value {raw} out of range for {name} (0..={hi})")));
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_distinguishes_equal_numeric_value() {
        let pos = Position::at_offset(0);
        let u = Value::unsigned(32, 1, pos).unwrap();
        let i = Value::signed(32, 1, pos).unwrap();
        let v = Value::Vast(1);
        assert_ne!(u, i);
        assert_ne!(i, v);
        assert_ne!(u, v);
    }

    #[test]
    fn int16_range_is_checked() {
        let pos = Position::at_offset(0);
        assert!(Value::signed(16, 32767, pos).is_ok());
        assert!(Value::signed(16, 32768, pos).is_err());
    }

    #[test]
    fn table_rejects_non_divisible_length() {
        let pos = Position::at_offset(0);
        let elems = vec![Value::Int(1), Value::Int(2), Value::Int(3)];
        assert!(Table::new(2, elems, pos).is_err());
    }

    #[test]
    fn table_computes_rows() {
        let pos = Position::at_offset(0);
        let elems = (1..=4).map(Value::Int).collect();
        let t = Table::new(2, elems, pos).unwrap();
        assert_eq!(t.rows(), 2);
    }
}
