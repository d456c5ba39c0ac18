//! Tokenizer for the URI-style ARI text grammar. Recognizes IDENT, INT,
//! REAL, STRING, BSTRING, and single-character punctuation, percent-decoding
//! identifier-like segments as it scans per RFC 3986.

use crate::error::{AceError, Position, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Int(i128),
    Real(f64),
    Str(String),
    /// Decoded byte string payload, tagged with the wrapper that produced
    /// it (`h`, `b32`, or `b64`) purely for diagnostics; the AST only ever
    /// keeps the decoded bytes.
    Bstr(Vec<u8>, char),
    Punct(char),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Position,
}

pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    offset: usize,
    line: usize,
    column: usize,
}

// `:` is not grammar punctuation: it never appears as a separator in
// `parser.rs`, only inside namespace names like `IANA:ion_admin`. The
// scheme's own `:` (`ari:`) is stripped textually before the lexer ever
// runs, so it's safe to treat `:` as an ordinary identifier character here.
const PUNCT: &[char] = &['/', '.', '(', ')', ',', '=', ';', '!'];

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, bytes: src.as_bytes(), offset: 0, line: 1, column: 1 }
    }

    fn pos(&self) -> Position {
        Position::at(self.offset, self.line, self.column)
    }

    /// Source text starting at a previously recorded byte offset, for the
    /// TP/TD raw re-scan (`Parser::parse_time_value`): ISO-8601 timestamps
    /// and durations don't fit the single-token-lookahead grammar, so the
    /// parser reads them directly off the source instead of through
    /// `next_token`.
    pub(crate) fn raw_from(&self, offset: usize) -> &'a str {
        &self.src[offset..]
    }

    /// Resumes normal lexing right after a raw scan consumed `len` bytes
    /// starting at `offset`.
    pub(crate) fn seek_past(&mut self, offset: usize, len: usize) {
        let end = offset + len;
        let consumed = &self.src[..end];
        self.line = 1 + consumed.matches('\n').count();
        self.column = match consumed.rfind('\n') {
            Some(nl) => consumed[nl + 1..].chars().count() + 1,
            None => consumed.chars().count() + 1,
        };
        self.offset = end;
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.offset..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Reads a percent-decodable run: letters, digits, `_`, `-`, `~`, and
    /// `%XX` escapes, stopping at whitespace, EOF, or any grammar
    /// punctuation character (`'`, `"` included as they open other token
    /// kinds).
    fn read_escaped_run(&mut self) -> Result<String> {
        let start = self.pos();
        // Decoded `%XX` bytes and directly-scanned chars (re-encoded as
        // UTF-8) share one byte buffer, so a multi-byte sequence split
        // across several `%XX` escapes is joined before being interpreted
        // as text, instead of each decoded byte standing alone as its own
        // Latin-1 code point.
        let mut out = Vec::new();
        loop {
            match self.peek_char() {
                Some('%') => {
                    let hex_pos = self.pos();
                    self.bump();
                    let hi = self.bump().ok_or_else(|| {
                        AceError::lexical(hex_pos, "truncated percent-encoding")
                    })?;
                    let lo = self.bump().ok_or_else(|| {
                        AceError::lexical(hex_pos, "truncated percent-encoding")
                    })?;
                    let byte = u8::from_str_radix(&format!("{hi}{lo}"), 16)
                        .map_err(|_| AceError::lexical(hex_pos, "invalid percent-encoding"))?;
                    out.push(byte);
                }
                Some(c) if !PUNCT.contains(&c) && !c.is_whitespace() && c != '\'' && c != '"' => {
                    out.extend_from_slice(c.encode_utf8(&mut [0u8; 4]).as_bytes());
                    self.bump();
                }
                _ => break,
            }
        }
        if out.is_empty() {
            return Err(AceError::lexical(start, "expected identifier"));
        }
        String::from_utf8(out).map_err(|_| AceError::lexical(start, "percent-decoded identifier is not valid UTF-8"))
    }

    fn read_quoted(&mut self) -> Result<String> {
        let start = self.pos();
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(AceError::lexical(start, "unterminated string literal")),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some(c) => out.push(c),
                    None => return Err(AceError::lexical(start, "unterminated escape in string")),
                },
                Some(c) => out.push(c),
            }
        }
        Ok(out)
    }

    fn read_bstr(&mut self, kind: char) -> Result<Vec<u8>> {
        let start = self.pos();
        self.bump(); // opening quote
        let mut raw = String::new();
        loop {
            match self.bump() {
                None => return Err(AceError::lexical(start, "unterminated byte string literal")),
                Some('\'') => break,
                Some(c) => raw.push(c),
            }
        }
        match kind {
            'h' => decode_hex(&raw).map_err(|e| AceError::lexical(start, e)),
            '3' => decode_base32(&raw).map_err(|e| AceError::lexical(start, e)),
            '6' => decode_base64(&raw).map_err(|e| AceError::lexical(start, e)),
            _ => unreachable!(),
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_ws();
        let pos = self.pos();
        let Some(c) = self.peek_char() else {
            return Ok(Token { kind: TokenKind::Eof, pos });
        };

        if PUNCT.contains(&c) {
            self.bump();
            return Ok(Token { kind: TokenKind::Punct(c), pos });
        }
        if c == '"' {
            let s = self.read_quoted()?;
            return Ok(Token { kind: TokenKind::Str(s), pos });
        }
        if c.is_ascii_digit() || c == '-' {
            return self.read_number(pos);
        }
        if c.is_alphabetic() || c == '%' {
            // Peek ahead to see whether this identifier is a byte-string
            // wrapper prefix (h'..', b32'..', b64'..').
            let save = (self.offset, self.line, self.column);
            let word = self.read_escaped_run()?;
            if self.peek_char() == Some('\'') {
                match word.as_str() {
                    "h" => return Ok(Token { kind: TokenKind::Bstr(self.read_bstr('h')?, 'h'), pos }),
                    "b32" => return Ok(Token { kind: TokenKind::Bstr(self.read_bstr('3')?, '3'), pos }),
                    "b64" => return Ok(Token { kind: TokenKind::Bstr(self.read_bstr('6')?, '6'), pos }),
                    _ => {
                        // Not a recognized wrapper; rewind and treat as a
                        // plain identifier followed by punctuation.
                        (self.offset, self.line, self.column) = save;
                        let word = self.read_escaped_run()?;
                        return Ok(Token { kind: TokenKind::Ident(word), pos });
                    }
                }
            }
            return Ok(Token { kind: TokenKind::Ident(word), pos });
        }

        Err(AceError::lexical(pos, format!("unexpected character '{c}'")))
    }

    fn read_number(&mut self, pos: Position) -> Result<Token> {
        let start_off = self.offset;
        if self.peek_char() == Some('-') {
            self.bump();
        }
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        let mut is_real = false;
        if self.peek_char() == Some('.') {
            // Only consume as a decimal point if followed by a digit;
            // otherwise `.` is the literal-type/name separator.
            let save = (self.offset, self.line, self.column);
            self.bump();
            if matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                is_real = true;
                while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                    self.bump();
                }
            } else {
                (self.offset, self.line, self.column) = save;
            }
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let save = (self.offset, self.line, self.column);
            self.bump();
            if matches!(self.peek_char(), Some('+') | Some('-')) {
                self.bump();
            }
            if matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                is_real = true;
                while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                    self.bump();
                }
            } else {
                (self.offset, self.line, self.column) = save;
            }
        }
        let text = &self.src[start_off..self.offset];
        if is_real {
            let v: f64 = text.parse().map_err(|_| AceError::lexical(pos, "invalid real literal"))?;
            Ok(Token { kind: TokenKind::Real(v), pos })
        } else {
            let v: i128 = text.parse().map_err(|_| AceError::lexical(pos, "invalid integer literal"))?;
            Ok(Token { kind: TokenKind::Int(v), pos })
        }
    }
}

fn decode_hex(s: &str) -> std::result::Result<Vec<u8>, String> {
    if s.len() % 2 != 0 {
        return Err("odd-length hex byte string".into());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| "invalid hex digit".to_string()))
        .collect()
}

fn decode_base32(s: &str) -> std::result::Result<Vec<u8>, String> {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
    let s = s.trim_end_matches('=');
    let mut bits: u64 = 0;
    let mut nbits: u32 = 0;
    let mut out = Vec::new();
    for c in s.bytes() {
        let v = ALPHABET
            .iter()
            .position(|&b| b == c.to_ascii_uppercase())
            .ok_or_else(|| "invalid base32 character".to_string())? as u64;
        bits = (bits << 5) | v;
        nbits += 5;
        if nbits >= 8 {
            nbits -= 8;
            out.push((bits >> nbits) as u8);
        }
    }
    Ok(out)
}

fn decode_base64(s: &str) -> std::result::Result<Vec<u8>, String> {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let s = s.trim_end_matches('=');
    let mut bits: u64 = 0;
    let mut nbits: u32 = 0;
    let mut out = Vec::new();
    for c in s.bytes() {
        let v = ALPHABET
            .iter()
            .position(|&b| b == c)
            .ok_or_else(|| "invalid base64 character".to_string())? as u64;
        bits = (bits << 6) | v;
        nbits += 6;
        if nbits >= 8 {
            nbits -= 8;
            out.push((bits >> nbits) as u8);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lex = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let t = lex.next_token().unwrap();
            if t.kind == TokenKind::Eof {
                break;
            }
            out.push(t.kind);
        }
        out
    }

    #[test]
    fn lexes_object_reference_skeleton() {
        let toks = kinds("IANA:ion_admin/CTRL.node_contact_add(UVAST.1)");
        assert!(matches!(toks[0], TokenKind::Ident(ref s) if s == "IANA:ion_admin"));
    }

    #[test]
    fn lexes_hex_byte_string() {
        let toks = kinds("h'deadbeef'");
        assert_eq!(toks, vec![TokenKind::Bstr(vec![0xde, 0xad, 0xbe, 0xef], 'h')]);
    }

    #[test]
    fn lexes_negative_and_real() {
        let toks = kinds("-5 3.25");
        assert_eq!(toks, vec![TokenKind::Int(-5), TokenKind::Real(3.25)]);
    }

    #[test]
    fn percent_decodes_segment() {
        let toks = kinds("fo%2fo");
        assert_eq!(toks, vec![TokenKind::Ident("fo/o".to_string())]);
    }

    #[test]
    fn percent_decodes_multibyte_utf8_sequence() {
        let toks = kinds("caf%C3%A9");
        assert_eq!(toks, vec![TokenKind::Ident("café".to_string())]);
    }
}
