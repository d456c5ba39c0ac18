//! Minimal CBOR (RFC 8949) byte writer, the encode-side counterpart of
//! [`super::reader::CborReader`]. Always emits definite-length items in the
//! narrowest header form that represents the argument, matching the
//! encoder's determinism requirement.

use super::reader::{MAJOR_ARRAY, MAJOR_BYTES, MAJOR_MAP, MAJOR_NEGINT, MAJOR_SIMPLE, MAJOR_TAG, MAJOR_TEXT, MAJOR_UINT};

pub struct CborWriter {
    buf: Vec<u8>,
}

impl CborWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn write_header(&mut self, major: u8, arg: u64) {
        let prefix = major << 5;
        if arg <= 23 {
            self.buf.push(prefix | arg as u8);
        } else if arg <= u8::MAX as u64 {
            self.buf.push(prefix | 24);
            self.buf.push(arg as u8);
        } else if arg <= u16::MAX as u64 {
            self.buf.push(prefix | 25);
            self.buf.extend_from_slice(&(arg as u16).to_be_bytes());
        } else if arg <= u32::MAX as u64 {
            self.buf.push(prefix | 26);
            self.buf.extend_from_slice(&(arg as u32).to_be_bytes());
        } else {
            self.buf.push(prefix | 27);
            self.buf.extend_from_slice(&arg.to_be_bytes());
        }
    }

    pub fn write_uint(&mut self, v: u64) {
        self.write_header(MAJOR_UINT, v);
    }

    pub fn write_int(&mut self, v: i64) {
        if v >= 0 {
            self.write_uint(v as u64);
        } else {
            self.write_header(MAJOR_NEGINT, (-1 - v) as u64);
        }
    }

    pub fn write_bytes(&mut self, b: &[u8]) {
        self.write_header(MAJOR_BYTES, b.len() as u64);
        self.buf.extend_from_slice(b);
    }

    pub fn write_text(&mut self, s: &str) {
        self.write_header(MAJOR_TEXT, s.len() as u64);
        self.buf.extend_from_slice(s.as_bytes());
    }

    pub fn write_array_header(&mut self, len: u64) {
        self.write_header(MAJOR_ARRAY, len);
    }

    pub fn write_map_header(&mut self, len: u64) {
        self.write_header(MAJOR_MAP, len);
    }

    pub fn write_tag(&mut self, tag: u64) {
        self.write_header(MAJOR_TAG, tag);
    }

    pub fn write_bool(&mut self, b: bool) {
        self.buf.push((MAJOR_SIMPLE << 5) | if b { 21 } else { 20 });
    }

    pub fn write_null(&mut self) {
        self.buf.push((MAJOR_SIMPLE << 5) | 22);
    }

    pub fn write_undefined(&mut self) {
        self.buf.push((MAJOR_SIMPLE << 5) | 23);
    }

    pub fn write_f32(&mut self, f: f32) {
        self.buf.push((MAJOR_SIMPLE << 5) | 26);
        self.buf.extend_from_slice(&f.to_bits().to_be_bytes());
    }

    pub fn write_f64(&mut self, f: f64) {
        self.buf.push((MAJOR_SIMPLE << 5) | 27);
        self.buf.extend_from_slice(&f.to_bits().to_be_bytes());
    }

    /// Appends already-encoded CBOR bytes verbatim, used to re-emit
    /// `CBOR`-embedded items bit-exactly.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }
}

impl Default for CborWriter {
    fn default() -> Self {
        Self::new()
    }
}
