//! Minimal positional CBOR (RFC 8949) byte reader: a thin cursor over a
//! byte slice with typed `read_*` helpers that each advance the cursor and
//! report a precise [`Position`] on failure, hand-rolled rather than built
//! on a general-purpose CBOR crate whose value model cannot distinguish
//! `null` from `undefined` the way the wire format here requires.

use crate::error::{AceError, Position, Result};

pub const MAJOR_UINT: u8 = 0;
pub const MAJOR_NEGINT: u8 = 1;
pub const MAJOR_BYTES: u8 = 2;
pub const MAJOR_TEXT: u8 = 3;
pub const MAJOR_ARRAY: u8 = 4;
pub const MAJOR_MAP: u8 = 5;
pub const MAJOR_TAG: u8 = 6;
pub const MAJOR_SIMPLE: u8 = 7;

pub const SIMPLE_FALSE: u8 = 20;
pub const SIMPLE_TRUE: u8 = 21;
pub const SIMPLE_NULL: u8 = 22;
pub const SIMPLE_UNDEFINED: u8 = 23;

pub struct CborReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

/// The initial-byte header of a CBOR item: major type plus its decoded
/// argument (length, tag number, small uint, or simple-value code).
pub struct Header {
    pub major: u8,
    pub arg: u64,
}

impl<'a> CborReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> Position {
        Position::at_offset(self.pos)
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn eof(&self) -> AceError {
        AceError::decode(self.position(), "unexpected end of CBOR input")
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let b = *self.buf.get(self.pos).ok_or_else(|| self.eof())?;
        self.pos += 1;
        Ok(b)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.buf.len() {
            return Err(self.eof());
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn peek_major(&self) -> Result<u8> {
        let b = *self.buf.get(self.pos).ok_or_else(|| self.eof())?;
        Ok(b >> 5)
    }

    /// Reads an initial byte and, if the low 5 bits call for it, the
    /// following 1/2/4/8-byte argument. Indefinite-length items (additional
    /// info 31) are rejected — ACE always emits definite-length items and
    /// never needs to decode the streaming form.
    pub fn read_header(&mut self) -> Result<Header> {
        let start = self.position();
        let first = self.read_u8()?;
        let major = first >> 5;
        let info = first & 0x1f;
        let arg = match info {
            0..=23 => info as u64,
            24 => self.read_u8()? as u64,
            25 => {
                let b = self.read_bytes(2)?;
                u16::from_be_bytes([b[0], b[1]]) as u64
            }
            26 => {
                let b = self.read_bytes(4)?;
                u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as u64
            }
            27 => {
                let b = self.read_bytes(8)?;
                u64::from_be_bytes(b.try_into().unwrap())
            }
            31 => {
                return Err(AceError::decode(start, "indefinite-length CBOR items are not supported"))
            }
            _ => return Err(AceError::decode(start, format!("reserved additional info {info}"))),
        };
        Ok(Header { major, arg })
    }

    pub fn expect_major(&mut self, major: u8) -> Result<Header> {
        let pos = self.position();
        let h = self.read_header()?;
        if h.major != major {
            return Err(AceError::decode(
                pos,
                format!("expected CBOR major type {major}, found {}", h.major),
            ));
        }
        Ok(h)
    }

    pub fn read_uint(&mut self) -> Result<u64> {
        Ok(self.expect_major(MAJOR_UINT)?.arg)
    }

    /// Reads a signed integer of either CBOR sign major type.
    pub fn read_int(&mut self) -> Result<i64> {
        let pos = self.position();
        let h = self.read_header()?;
        match h.major {
            MAJOR_UINT => i64::try_from(h.arg).map_err(|_| AceError::decode(pos, "integer too large")),
            MAJOR_NEGINT => {
                let v = h.arg as i128;
                i64::try_from(-1 - v).map_err(|_| AceError::decode(pos, "integer too negative"))
            }
            other => Err(AceError::decode(pos, format!("expected integer, found major type {other}"))),
        }
    }

    pub fn read_text(&mut self) -> Result<String> {
        let pos = self.position();
        let h = self.expect_major(MAJOR_TEXT)?;
        let bytes = self.read_bytes(h.arg as usize)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| AceError::decode(pos, "invalid UTF-8 in text item"))
    }

    pub fn read_byte_string(&mut self) -> Result<Vec<u8>> {
        let h = self.expect_major(MAJOR_BYTES)?;
        Ok(self.read_bytes(h.arg as usize)?.to_vec())
    }

    pub fn read_array_header(&mut self) -> Result<u64> {
        Ok(self.expect_major(MAJOR_ARRAY)?.arg)
    }

    pub fn read_map_header(&mut self) -> Result<u64> {
        Ok(self.expect_major(MAJOR_MAP)?.arg)
    }

    pub fn read_tag(&mut self) -> Result<u64> {
        Ok(self.expect_major(MAJOR_TAG)?.arg)
    }

    /// Reads a binary32 float item. The additional-info-26 argument
    /// decoded by [`Self::read_header`] already holds the raw IEEE-754 bit
    /// pattern, zero-extended to `u64`.
    pub fn read_f32(&mut self) -> Result<f32> {
        let pos = self.position();
        let h = self.read_header()?;
        if h.major != MAJOR_SIMPLE || h.arg > u32::MAX as u64 {
            return Err(AceError::decode(pos, "expected IEEE-754 binary32"));
        }
        // additional info 26 is verified by construction: only it yields an
        // arg that fits u32 while major == MAJOR_SIMPLE for a float header.
        Ok(f32::from_bits(h.arg as u32))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let pos = self.position();
        let h = self.read_header()?;
        if h.major != MAJOR_SIMPLE {
            return Err(AceError::decode(pos, "expected floating-point item"));
        }
        Ok(f64::from_bits(h.arg))
    }

    pub fn read_simple(&mut self) -> Result<u8> {
        let h = self.expect_major(MAJOR_SIMPLE)?;
        Ok(h.arg as u8)
    }

    /// Reads one major-7 item, distinguishing simple values from floats by
    /// the raw additional-info nibble rather than the already-decoded
    /// [`Header::arg`] — a float's bit pattern can coincide numerically
    /// with a simple-value code (e.g. `+0.0f32` and simple-value 0), so the
    /// generic header path alone cannot tell them apart.
    pub fn read_simple_or_float(&mut self) -> Result<SimpleOrFloat> {
        let pos = self.position();
        let first = self.read_u8()?;
        let major = first >> 5;
        if major != MAJOR_SIMPLE {
            return Err(AceError::decode(pos, format!("expected major type 7, found {major}")));
        }
        let info = first & 0x1f;
        match info {
            SIMPLE_FALSE => Ok(SimpleOrFloat::False),
            SIMPLE_TRUE => Ok(SimpleOrFloat::True),
            SIMPLE_NULL => Ok(SimpleOrFloat::Null),
            SIMPLE_UNDEFINED => Ok(SimpleOrFloat::Undefined),
            0..=19 => Ok(SimpleOrFloat::Other(info)),
            24 => {
                let b = self.read_u8()?;
                Ok(SimpleOrFloat::Other(b))
            }
            25 => Err(AceError::decode(pos, "half-precision floats are not supported")),
            26 => {
                let b = self.read_bytes(4)?;
                Ok(SimpleOrFloat::Float(f32::from_be_bytes(b.try_into().unwrap()) as f64))
            }
            27 => {
                let b = self.read_bytes(8)?;
                Ok(SimpleOrFloat::Float(f64::from_be_bytes(b.try_into().unwrap())))
            }
            _ => Err(AceError::decode(pos, format!("reserved simple-value encoding {info}"))),
        }
    }

    /// Returns the bytes this reader has already consumed between two
    /// offsets, for re-emitting opaque embedded CBOR items bit-exactly.
    pub fn slice_between(&self, start: usize, end: usize) -> Vec<u8> {
        self.buf[start..end].to_vec()
    }
}

/// The classification of one major-7 (simple/float) CBOR item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimpleOrFloat {
    False,
    True,
    Null,
    Undefined,
    Float(f64),
    /// Any other simple-value code (reserved for future use by the wire
    /// format; ACE never emits these).
    Other(u8),
}
