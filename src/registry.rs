//! The AMM type registry: a fixed, build-time enumeration of
//! the literal-type and object-type code spaces, with case-insensitive name
//! lookup and canonical upper-case emission. Dispatch elsewhere in the crate
//! is always by these codes, never by inheritance or `dyn` polymorphism.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Literal-type codes: the primitive and container AMM value shapes.
///
/// Numeric assignments are internal to this crate (see DESIGN.md for why
/// the real draft-birrane-dtn-adm-03 assignments could not be recovered);
/// what matters is that the mapping is bijective and stable for the
/// lifetime of a process, which `TryFromPrimitive`/`IntoPrimitive` give us
/// for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum LiteralType {
    Undefined = 0,
    Null = 1,
    Bool = 2,
    Int8 = 3,
    Uint8 = 4,
    Int16 = 5,
    Uint16 = 6,
    /// 32-bit signed integer; canonical text name `INT`.
    Int = 7,
    /// 32-bit unsigned integer; canonical text name `UINT`.
    Uint = 8,
    Int64 = 9,
    Uint64 = 10,
    /// 64-bit signed "very large" integer, distinct from [`Self::Int64`].
    Vast = 11,
    /// 64-bit unsigned "very large" integer, distinct from [`Self::Uint64`].
    Uvast = 12,
    Real32 = 13,
    Real64 = 14,
    Textstr = 15,
    Bytestr = 16,
    Tp = 17,
    Td = 18,
    Label = 19,
    Cbor = 20,
    Ac = 21,
    Am = 22,
    Tbl = 23,
    Execset = 24,
    Rptset = 25,
}

/// Object-type codes: kinds of ADM-defined objects a reference can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ObjectType {
    Const = 0,
    Ctrl = 1,
    Edd = 2,
    Var = 3,
    Oper = 4,
    Rptt = 5,
    Tblt = 6,
    Ident = 7,
    Mac = 8,
    Sbr = 9,
    Tbr = 10,
}

macro_rules! name_table {
    ($ty:ty, $( $variant:ident => $name:literal ),+ $(,)?) => {
        impl $ty {
            /// Canonical, upper-case name for this code.
            pub const fn canonical_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Look up a code by name, matched ASCII case-insensitively.
            pub fn by_name(name: &str) -> Option<Self> {
                $(if name.eq_ignore_ascii_case($name) {
                    return Some(Self::$variant);
                })+
                None
            }
        }
    };
}

name_table!(LiteralType,
    Undefined => "UNDEFINED",
    Null => "NULL",
    Bool => "BOOL",
    Int8 => "INT8",
    Uint8 => "UINT8",
    Int16 => "INT16",
    Uint16 => "UINT16",
    Int => "INT",
    Uint => "UINT",
    Int64 => "INT64",
    Uint64 => "UINT64",
    Vast => "VAST",
    Uvast => "UVAST",
    Real32 => "REAL32",
    Real64 => "REAL64",
    Textstr => "TEXTSTR",
    Bytestr => "BYTESTR",
    Tp => "TP",
    Td => "TD",
    Label => "LABEL",
    Cbor => "CBOR",
    Ac => "AC",
    Am => "AM",
    Tbl => "TBL",
    Execset => "EXECSET",
    Rptset => "RPTSET",
);

name_table!(ObjectType,
    Const => "CONST",
    Ctrl => "CTRL",
    Edd => "EDD",
    Var => "VAR",
    Oper => "OPER",
    Rptt => "RPTT",
    Tblt => "TBLT",
    Ident => "IDENT",
    Mac => "MAC",
    Sbr => "SBR",
    Tbr => "TBR",
);

impl LiteralType {
    pub fn code_for_name(name: &str) -> Option<Self> {
        Self::by_name(name)
    }

    pub fn name_for_code(code: u8) -> Option<&'static str> {
        Self::try_from(code).ok().map(Self::canonical_name)
    }

    pub const fn is_container(self) -> bool {
        matches!(self, Self::Ac | Self::Am | Self::Tbl | Self::Execset | Self::Rptset)
    }

    pub const fn is_primitive(self) -> bool {
        !self.is_container()
    }
}

impl ObjectType {
    pub fn code_for_name(name: &str) -> Option<Self> {
        Self::by_name(name)
    }

    pub fn name_for_code(code: u8) -> Option<&'static str> {
        Self::try_from(code).ok().map(Self::canonical_name)
    }
}

/// Reports whether `code` falls in the object-type code space, as opposed
/// to the literal-type code space `LiteralType::is_container`/
/// `is_primitive` classify.
pub fn is_object_type(code: u8) -> bool {
    ObjectType::try_from(code).is_ok()
}

/// The CBOR tag that marks the outermost item of an encoded ARI.
pub const ACE_CBOR_TAG: u64 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_type_name_roundtrip() {
        for code in 0u8..=25 {
            let ty = LiteralType::try_from(code).unwrap();
            let name = ty.canonical_name();
            assert_eq!(LiteralType::by_name(name), Some(ty));
            assert_eq!(LiteralType::by_name(&name.to_ascii_lowercase()), Some(ty));
        }
    }

    #[test]
    fn object_type_name_roundtrip() {
        for code in 0u8..=10 {
            let ty = ObjectType::try_from(code).unwrap();
            let name = ty.canonical_name();
            assert_eq!(ObjectType::by_name(name), Some(ty));
        }
    }

    #[test]
    fn unknown_literal_name_is_closed_set() {
        assert_eq!(LiteralType::by_name("FROB"), None);
    }

    #[test]
    fn is_container_partition() {
        assert!(LiteralType::Ac.is_container());
        assert!(LiteralType::Tbl.is_container());
        assert!(LiteralType::Int.is_primitive());
        assert!(!LiteralType::Am.is_primitive());
    }

    #[test]
    fn is_object_type_checks_code_space() {
        assert!(is_object_type(ObjectType::Ctrl.into()));
        assert!(is_object_type(ObjectType::Tbr.into()));
        assert!(!is_object_type(11));
        assert!(!is_object_type(255));
    }
}
