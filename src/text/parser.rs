//! Recursive-descent parser: turns a token stream from [`super::lexer`]
//! into a [`Value`]. Identifiers are matched case-insensitively against the
//! type registry and normalized to canonical casing in the resulting AST;
//! unknown literal-type names are a hard (closed-set) error, while unknown
//! namespaces/object names are accepted and left unresolved for the
//! transcoder facade to resolve later.

use crate::error::{AceError, Position, Result};
use crate::registry::{LiteralType, ObjectType};
use crate::value::{ExecSet, Ident, Label, ObjRef, RptEntry, RptSet, Table, TimeValue, Value, DTN_EPOCH_UNIX_OFFSET};

use super::lexer::{Lexer, Token, TokenKind};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Token,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(src);
        let lookahead = lexer.next_token()?;
        Ok(Self { lexer, lookahead })
    }

    fn pos(&self) -> Position {
        self.lookahead.pos
    }

    fn bump(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.lookahead, next))
    }

    fn expect_punct(&mut self, c: char) -> Result<()> {
        match &self.lookahead.kind {
            TokenKind::Punct(p) if *p == c => {
                self.bump()?;
                Ok(())
            }
            other => Err(AceError::syntax(self.pos(), format!("expected '{c}', found {other:?}"))),
        }
    }

    fn at_punct(&self, c: char) -> bool {
        matches!(&self.lookahead.kind, TokenKind::Punct(p) if *p == c)
    }

    fn at_eof(&self) -> bool {
        matches!(self.lookahead.kind, TokenKind::Eof)
    }

    fn expect_ident(&mut self) -> Result<(String, Position)> {
        let pos = self.pos();
        match self.bump()?.kind {
            TokenKind::Ident(s) => Ok((s, pos)),
            other => Err(AceError::syntax(pos, format!("expected identifier, found {other:?}"))),
        }
    }

    /// Parses the full `ari:/...` form: strips the scheme and delegates to
    /// [`Self::parse_value`].
    pub fn parse_ari(src: &str) -> Result<Value> {
        let rest = strip_scheme(src)?;
        let mut parser = Parser::new(rest)?;
        let v = parser.parse_value()?;
        if !parser.at_eof() {
            return Err(AceError::syntax(parser.pos(), "trailing input after ARI"));
        }
        Ok(v)
    }

    /// Parses one value, whether at the top level or nested as a
    /// parameter/container element.
    ///
    /// A bare number/string/byte-string token (no type prefix) is a
    /// shorthand for the commonly-used default type (`INT`, `REAL64`,
    /// `TEXTSTR`, `BYTESTR` respectively) — this is what lets `TBL` rows
    /// like `1,2;3,4` stay untyped. Otherwise the next identifier is read
    /// once and then the following punctuation decides the shape: a `/`
    /// means the identifier was a namespace (object reference), anything
    /// else means it was a literal-type name.
    pub fn parse_value(&mut self) -> Result<Value> {
        let pos = self.pos();

        match &self.lookahead.kind {
            TokenKind::Int(n) => {
                let n = *n;
                self.bump()?;
                return Ok(Value::signed(32, n as i64, pos)?);
            }
            TokenKind::Real(f) => {
                let f = *f;
                self.bump()?;
                return Ok(Value::Real64(f));
            }
            TokenKind::Str(_) => {
                let s = match self.bump()?.kind {
                    TokenKind::Str(s) => s,
                    _ => unreachable!(),
                };
                return Ok(Value::Text(s));
            }
            TokenKind::Bstr(..) => {
                let b = match self.bump()?.kind {
                    TokenKind::Bstr(b, _) => b,
                    _ => unreachable!(),
                };
                return Ok(Value::Bytes(b));
            }
            _ => {}
        }

        if self.at_punct('!') {
            let namespace = self.parse_namespace_ident()?;
            self.expect_punct('/')?;
            return self.parse_object_ref_body(namespace, pos);
        }

        let (word, word_pos) = self.expect_ident()?;
        if word.eq_ignore_ascii_case("undefined") {
            return Ok(Value::Undefined);
        }
        if word.eq_ignore_ascii_case("null") {
            return Ok(Value::Null);
        }
        if self.at_punct('/') {
            self.bump()?;
            return self.parse_object_ref_body(Ident::Symbolic(word), pos);
        }
        self.parse_literal_body(word, word_pos, pos)
    }

    fn parse_namespace_ident(&mut self) -> Result<Ident> {
        if self.at_punct('!') {
            let pos = self.pos();
            self.bump()?;
            match self.bump()?.kind {
                TokenKind::Int(n) if n >= 0 => Ok(Ident::Enum(n as u64)),
                _ => Err(AceError::syntax(pos, "expected enumerator after '!'")),
            }
        } else {
            let (name, _) = self.expect_ident()?;
            Ok(Ident::Symbolic(name))
        }
    }

    fn parse_object_ref_body(&mut self, namespace: Ident, pos: Position) -> Result<Value> {
        let (type_name, type_pos) = self.expect_ident()?;
        let object_type = ObjectType::by_name(&type_name)
            .ok_or_else(|| AceError::syntax(type_pos, format!("unknown object type '{type_name}'")))?;

        self.expect_punct('.')?;
        let name = self.parse_namespace_ident()?;

        let params = if self.at_punct('(') {
            self.parse_paren_list()?
        } else {
            Vec::new()
        };

        let _ = pos;
        Ok(Value::ObjRef(ObjRef::new(namespace, object_type, name, params)))
    }

    fn parse_paren_list(&mut self) -> Result<Vec<Value>> {
        self.expect_punct('(')?;
        let mut items = Vec::new();
        if !self.at_punct(')') {
            loop {
                items.push(self.parse_value()?);
                if self.at_punct(',') {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        self.expect_punct(')')?;
        Ok(items)
    }

    fn parse_literal_body(&mut self, type_name: String, type_pos: Position, pos: Position) -> Result<Value> {
        let lit = LiteralType::by_name(&type_name)
            .ok_or_else(|| AceError::syntax(type_pos, format!("unknown literal type '{type_name}'")))?;

        use LiteralType::*;
        match lit {
            Ac => self.parse_ac(),
            Am => self.parse_am(),
            Tbl => self.parse_tbl(pos),
            Execset => self.parse_execset(),
            Rptset => self.parse_rptset(),
            _ => {
                self.expect_punct('.')?;
                self.parse_scalar(lit, pos)
            }
        }
    }

    fn parse_ac(&mut self) -> Result<Value> {
        Ok(Value::Ac(self.parse_paren_list()?))
    }

    fn parse_am(&mut self) -> Result<Value> {
        self.expect_punct('(')?;
        let mut entries = Vec::new();
        if !self.at_punct(')') {
            loop {
                let k = self.parse_value()?;
                self.expect_punct('=')?;
                let v = self.parse_value()?;
                entries.push((k, v));
                if self.at_punct(',') {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        self.expect_punct(')')?;
        Ok(Value::Am(entries))
    }

    fn parse_tbl(&mut self, pos: Position) -> Result<Value> {
        self.expect_punct('(')?;
        let (c_name, c_pos) = self.expect_ident()?;
        if !c_name.eq_ignore_ascii_case("c") {
            return Err(AceError::syntax(c_pos, "expected 'c=<cols>' at start of TBL"));
        }
        self.expect_punct('=')?;
        let cols_pos = self.pos();
        let cols = match self.bump()?.kind {
            TokenKind::Int(n) if n >= 0 => n as u64,
            _ => return Err(AceError::syntax(cols_pos, "expected non-negative column count")),
        };
        let mut elements = Vec::new();
        while self.at_punct(';') {
            self.bump()?;
            loop {
                elements.push(self.parse_value()?);
                if self.at_punct(',') {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        self.expect_punct(')')?;
        let table = Table::new(cols, elements, pos)?;
        Ok(Value::Tbl(table))
    }

    fn parse_execset(&mut self) -> Result<Value> {
        self.expect_punct('(')?;
        let target = self.parse_value()?;
        self.expect_punct(';')?;
        let mut items = Vec::new();
        if !self.at_punct(')') {
            loop {
                items.push(self.parse_value()?);
                if self.at_punct(',') {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        self.expect_punct(')')?;
        Ok(Value::Execset(ExecSet { target: Box::new(target), items }))
    }

    fn parse_rptset(&mut self) -> Result<Value> {
        self.expect_punct('(')?;
        let nonce = self.parse_value()?;
        self.expect_punct(',')?;
        let reference_time = self.parse_value()?;
        let mut entries = Vec::new();
        while self.at_punct(';') {
            self.bump()?;
            let time = self.parse_value()?;
            self.expect_punct(',')?;
            let source = self.parse_value()?;
            let mut items = Vec::new();
            if self.at_punct(',') {
                self.bump()?;
                loop {
                    items.push(self.parse_value()?);
                    if self.at_punct(',') {
                        self.bump()?;
                        continue;
                    }
                    break;
                }
            }
            entries.push(RptEntry { time, source: Box::new(source), items });
        }
        self.expect_punct(')')?;
        Ok(Value::Rptset(RptSet { nonce: Box::new(nonce), reference_time: Box::new(reference_time), entries }))
    }

    fn parse_scalar(&mut self, lit: LiteralType, pos: Position) -> Result<Value> {
        use LiteralType::*;
        match lit {
            Undefined => Ok(Value::Undefined),
            Null => Ok(Value::Null),
            Bool => {
                let (word, word_pos) = self.expect_ident()?;
                match word.to_ascii_lowercase().as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(AceError::syntax(word_pos, "expected 'true' or 'false'")),
                }
            }
            Int8 => Ok(Value::signed(8, self.expect_int()?, pos)?),
            Uint8 => Ok(Value::unsigned(8, self.expect_uint()?, pos)?),
            Int16 => Ok(Value::signed(16, self.expect_int()?, pos)?),
            Uint16 => Ok(Value::unsigned(16, self.expect_uint()?, pos)?),
            Int => Ok(Value::signed(32, self.expect_int()?, pos)?),
            Uint => Ok(Value::unsigned(32, self.expect_uint()?, pos)?),
            Int64 => Ok(Value::Int64(self.expect_int()?)),
            Uint64 => Ok(Value::Uint64(self.expect_uint()?)),
            Vast => Ok(Value::Vast(self.expect_int()?)),
            Uvast => Ok(Value::Uvast(self.expect_uint()?)),
            Real32 => Ok(Value::Real32(self.expect_real()? as f32)),
            Real64 => Ok(Value::Real64(self.expect_real()?)),
            Textstr => {
                let text_pos = self.pos();
                match self.bump()?.kind {
                    TokenKind::Str(s) => Ok(Value::Text(s)),
                    _ => Err(AceError::syntax(text_pos, "expected quoted text string")),
                }
            }
            Bytestr => {
                let text_pos = self.pos();
                match self.bump()?.kind {
                    TokenKind::Bstr(b, _) => Ok(Value::Bytes(b)),
                    _ => Err(AceError::syntax(text_pos, "expected byte string literal")),
                }
            }
            Tp => Ok(Value::Tp(self.parse_time_value()?)),
            Td => Ok(Value::Td(self.parse_time_value()?)),
            Label => self.parse_label(),
            Cbor => {
                let text_pos = self.pos();
                match self.bump()?.kind {
                    TokenKind::Bstr(b, _) => Ok(Value::Cbor(b)),
                    _ => Err(AceError::syntax(text_pos, "expected h'...' payload for CBOR literal")),
                }
            }
            Ac | Am | Tbl | Execset | Rptset => unreachable!("handled by parse_literal"),
        }
    }

    /// Parses a TP/TD payload: integer seconds, decimal seconds, an
    /// ISO-8601 timestamp (`TP` only), or an ISO-8601 duration (`TD` only).
    /// The first three forms already tokenize fine through `next_token`,
    /// but a calendar timestamp like `2023-06-02T12:34:56Z` doesn't — the
    /// lexer's number reader treats each embedded `-` as the start of a new
    /// negative integer — so this reads the literal's raw source text
    /// directly and re-syncs the lexer afterward instead of consuming
    /// pre-built tokens.
    fn parse_time_value(&mut self) -> Result<TimeValue> {
        let pos = self.lookahead.pos;
        let start = pos.offset;
        let raw = self.lexer.raw_from(start);
        let len = raw.char_indices().find(|&(_, c)| ends_time_literal(c)).map(|(i, _)| i).unwrap_or(raw.len());
        let text = &raw[..len];
        if text.is_empty() {
            return Err(AceError::syntax(pos, "expected time value"));
        }
        let value = parse_time_literal(text).map_err(|msg| AceError::syntax(pos, msg))?;
        self.lexer.seek_past(start, len);
        self.lookahead = self.lexer.next_token()?;
        Ok(value)
    }

    fn parse_label(&mut self) -> Result<Value> {
        if self.at_punct('!') {
            self.bump()?;
            let pos = self.pos();
            match self.bump()?.kind {
                TokenKind::Int(n) if n >= 0 => Ok(Value::Label(Label::Int(n as u64))),
                _ => Err(AceError::syntax(pos, "expected enumerator after '!'")),
            }
        } else {
            let pos = self.pos();
            match self.bump()?.kind {
                TokenKind::Str(s) => Ok(Value::Label(Label::Text(s))),
                TokenKind::Ident(s) => Ok(Value::Label(Label::Text(s))),
                _ => Err(AceError::syntax(pos, "expected label text")),
            }
        }
    }

    fn expect_int(&mut self) -> Result<i64> {
        let pos = self.pos();
        match self.bump()?.kind {
            TokenKind::Int(n) => Ok(n as i64),
            _ => Err(AceError::syntax(pos, "expected integer literal")),
        }
    }

    fn expect_uint(&mut self) -> Result<u64> {
        let pos = self.pos();
        match self.bump()?.kind {
            TokenKind::Int(n) if n >= 0 && n <= u64::MAX as i128 => Ok(n as u64),
            _ => Err(AceError::syntax(pos, "expected non-negative integer literal")),
        }
    }

    fn expect_real(&mut self) -> Result<f64> {
        let pos = self.pos();
        match self.bump()?.kind {
            TokenKind::Real(f) => Ok(f),
            TokenKind::Int(n) => Ok(n as f64),
            _ => Err(AceError::syntax(pos, "expected real literal")),
        }
    }
}

fn strip_scheme(src: &str) -> Result<&str> {
    let rest = src
        .strip_prefix("ari:")
        .ok_or_else(|| AceError::syntax(Position::at_offset(0), "missing 'ari:' scheme"))?;
    let rest = rest
        .strip_prefix('/')
        .ok_or_else(|| AceError::syntax(Position::at_offset(4), "expected '/' after scheme"))?;
    Ok(rest)
}

/// Parses a complete `ari:/...` text ARI into a [`Value`].
pub fn parse(src: &str) -> Result<Value> {
    Parser::parse_ari(src)
}

fn ends_time_literal(c: char) -> bool {
    matches!(c, ',' | ')' | ';' | '=') || c.is_whitespace()
}

/// Parses one TP/TD payload: a plain integer, a decimal, an ISO-8601
/// timestamp (`2023-06-02T12:34:56Z`), or an ISO-8601 duration
/// (`P1DT2H`, `-P1D`).
fn parse_time_literal(text: &str) -> std::result::Result<TimeValue, String> {
    if let Some(rest) = text.strip_prefix("-P") {
        let (seconds, frac_nanos) = parse_iso8601_duration(rest)?;
        return Ok(TimeValue { seconds: -seconds, frac_nanos });
    }
    if let Some(rest) = text.strip_prefix('P') {
        let (seconds, frac_nanos) = parse_iso8601_duration(rest)?;
        return Ok(TimeValue { seconds, frac_nanos });
    }
    if text.ends_with('Z') && text.contains('T') && text.contains('-') {
        let (unix_seconds, frac_nanos) = parse_iso8601_timestamp(text)?;
        return Ok(TimeValue { seconds: unix_seconds - DTN_EPOCH_UNIX_OFFSET, frac_nanos });
    }
    if let Ok(n) = text.parse::<i64>() {
        return Ok(TimeValue::integer(n));
    }
    if let Ok(f) = text.parse::<f64>() {
        let seconds = f.trunc() as i64;
        let frac_nanos = (f.fract().abs() * 1_000_000_000.0).round() as u32;
        return Ok(TimeValue { seconds, frac_nanos });
    }
    Err(format!("'{text}' is not a valid TP/TD literal"))
}

/// Parses `YYYY-MM-DDTHH:MM:SS[.fff...]Z` into (seconds, nanoseconds) since
/// the Unix epoch.
fn parse_iso8601_timestamp(text: &str) -> std::result::Result<(i64, u32), String> {
    let body = text.strip_suffix('Z').ok_or("timestamp must end in 'Z'")?;
    let (date, time) = body.split_once('T').ok_or("timestamp must contain 'T'")?;

    let mut date_fields = date.split('-');
    let mut next_field = |name: &str| -> std::result::Result<i64, String> {
        date_fields.next().ok_or_else(|| format!("timestamp is missing {name}"))?.parse().map_err(|_| format!("invalid {name} in timestamp"))
    };
    let year = next_field("year")?;
    let month = next_field("month")?;
    let day = next_field("day")?;
    if date_fields.next().is_some() {
        return Err("timestamp date has too many '-'-separated fields".into());
    }
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err("timestamp date is out of range".into());
    }

    let mut time_fields = time.split(':');
    let hour: i64 =
        time_fields.next().ok_or("timestamp is missing hour")?.parse().map_err(|_| "invalid hour in timestamp")?;
    let minute: i64 = time_fields
        .next()
        .ok_or("timestamp is missing minute")?
        .parse()
        .map_err(|_| "invalid minute in timestamp")?;
    let sec_field = time_fields.next().ok_or("timestamp is missing seconds")?;
    if time_fields.next().is_some() {
        return Err("timestamp time has too many ':'-separated fields".into());
    }
    let (second, frac_nanos) = parse_seconds_field(sec_field)?;

    let days = days_from_civil_epoch(year, month, day);
    let unix_seconds = days * 86_400 + hour * 3600 + minute * 60 + second;
    Ok((unix_seconds, frac_nanos))
}

/// Howard Hinnant's `days_from_civil`: days since the Unix epoch
/// (1970-01-01) for a proleptic-Gregorian (year, month, day).
fn days_from_civil_epoch(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn parse_seconds_field(field: &str) -> std::result::Result<(i64, u32), String> {
    match field.split_once('.') {
        Some((whole, frac)) => {
            let whole: i64 = whole.parse().map_err(|_| "invalid seconds in timestamp")?;
            let mut digits: String = frac.chars().take(9).collect();
            while digits.len() < 9 {
                digits.push('0');
            }
            let nanos: u32 = digits.parse().map_err(|_| "invalid fractional seconds in timestamp")?;
            Ok((whole, nanos))
        }
        None => Ok((field.parse().map_err(|_| "invalid seconds in timestamp")?, 0)),
    }
}

/// Parses the body of an ISO-8601 duration after the leading `P`: whole
/// weeks/days before an optional `T`, then hours/minutes/seconds after it.
/// Calendar years and months are rejected since they have no fixed length
/// in seconds.
fn parse_iso8601_duration(body: &str) -> std::result::Result<(i64, u32), String> {
    let mut seconds: i64 = 0;
    let mut frac_nanos: u32 = 0;
    let mut in_time = false;
    let mut num = String::new();
    let mut saw_field = false;
    for c in body.chars() {
        if c == 'T' {
            if in_time {
                return Err("duration has more than one 'T'".into());
            }
            in_time = true;
            continue;
        }
        if c.is_ascii_digit() || c == '.' {
            num.push(c);
            continue;
        }
        if num.is_empty() {
            return Err(format!("duration field '{c}' has no numeric value"));
        }
        saw_field = true;
        match (in_time, c) {
            (false, 'W') => seconds += parse_duration_int(&num)? * 7 * 86_400,
            (false, 'D') => seconds += parse_duration_int(&num)? * 86_400,
            (true, 'H') => seconds += parse_duration_int(&num)? * 3600,
            (true, 'M') => seconds += parse_duration_int(&num)? * 60,
            (true, 'S') => {
                let (whole, frac) = parse_seconds_field(&num)?;
                seconds += whole;
                frac_nanos = frac;
            }
            (false, 'Y' | 'M') => {
                return Err("calendar years/months have no fixed length and are not supported in a duration".into())
            }
            (_, other) => return Err(format!("unknown duration field unit '{other}'")),
        }
        num.clear();
    }
    if !num.is_empty() {
        return Err("duration has a trailing numeric field with no unit".into());
    }
    if !saw_field {
        return Err("duration has no fields".into());
    }
    Ok((seconds, frac_nanos))
}

fn parse_duration_int(s: &str) -> std::result::Result<i64, String> {
    s.parse::<i64>().map_err(|_| format!("invalid duration field value '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_undefined() {
        assert_eq!(parse("ari:/undefined").unwrap(), Value::Undefined);
    }

    #[test]
    fn parses_empty_ac() {
        assert_eq!(parse("ari:/AC()").unwrap(), Value::Ac(vec![]));
    }

    #[test]
    fn parses_tbl_two_by_two() {
        let v = parse("ari:/TBL(c=2;1,2;3,4)").unwrap();
        match v {
            Value::Tbl(t) => {
                assert_eq!(t.cols(), 2);
                assert_eq!(t.rows(), 2);
            }
            _ => panic!("expected TBL"),
        }
    }

    #[test]
    fn parses_object_reference_with_params() {
        let v = parse(
            "ari:/IANA:ion_admin/CTRL.node_contact_add(UVAST.1685728970,UVAST.1685729269,UINT.2,UINT.2,UVAST.25000,UVAST.1)",
        )
        .unwrap();
        match v {
            Value::ObjRef(r) => {
                assert_eq!(r.namespace.symbol(), Some("IANA:ion_admin"));
                assert_eq!(r.name.symbol(), Some("node_contact_add"));
                assert_eq!(r.params.len(), 6);
            }
            _ => panic!("expected ObjRef"),
        }
    }

    #[test]
    fn rejects_unknown_literal_type() {
        assert!(parse("ari:/FROB.1").is_err());
    }

    #[test]
    fn parses_enumerator_namespace() {
        let v = parse("ari:/!7/CTRL.!3()").unwrap();
        match v {
            Value::ObjRef(r) => {
                assert_eq!(r.namespace.enumerator(), Some(7));
                assert_eq!(r.name.enumerator(), Some(3));
            }
            _ => panic!("expected ObjRef"),
        }
    }

    #[test]
    fn parses_tp_integer_seconds() {
        assert_eq!(parse("ari:/TP.1000").unwrap(), Value::Tp(TimeValue::integer(1000)));
    }

    #[test]
    fn parses_tp_iso8601_timestamp() {
        // 2023-06-02T12:34:56Z is 1685709296 Unix seconds.
        let v = parse("ari:/TP.2023-06-02T12:34:56Z").unwrap();
        let expected = TimeValue::integer(1_685_709_296 - DTN_EPOCH_UNIX_OFFSET);
        assert_eq!(v, Value::Tp(expected));
    }

    #[test]
    fn parses_tp_iso8601_timestamp_with_fraction() {
        let v = parse("ari:/TP.2023-06-02T12:34:56.25Z").unwrap();
        match v {
            Value::Tp(t) => {
                assert_eq!(t.seconds, 1_685_709_296 - DTN_EPOCH_UNIX_OFFSET);
                assert_eq!(t.frac_nanos, 250_000_000);
            }
            _ => panic!("expected Tp"),
        }
    }

    #[test]
    fn tp_timestamp_round_trips_inside_object_reference_params() {
        let v = parse("ari:/!7/CTRL.!3(TP.2023-06-02T12:34:56Z,UINT.2)").unwrap();
        match v {
            Value::ObjRef(r) => assert_eq!(r.params[0], Value::Tp(TimeValue::integer(1_685_709_296 - DTN_EPOCH_UNIX_OFFSET))),
            _ => panic!("expected ObjRef"),
        }
    }

    #[test]
    fn parses_td_decimal_seconds() {
        match parse("ari:/TD.3.5").unwrap() {
            Value::Td(t) => {
                assert_eq!(t.seconds, 3);
                assert_eq!(t.frac_nanos, 500_000_000);
            }
            _ => panic!("expected Td"),
        }
    }

    #[test]
    fn parses_td_iso8601_duration() {
        // P1DT2H = 1 day + 2 hours = 93600 seconds.
        assert_eq!(parse("ari:/TD.P1DT2H").unwrap(), Value::Td(TimeValue::integer(93_600)));
    }

    #[test]
    fn parses_td_negative_iso8601_duration() {
        assert_eq!(parse("ari:/TD.-P1D").unwrap(), Value::Td(TimeValue::integer(-86_400)));
    }

    #[test]
    fn rejects_iso8601_duration_with_calendar_months() {
        assert!(parse("ari:/TD.P1M").is_err());
    }

    #[test]
    fn rejects_malformed_iso8601_timestamp() {
        assert!(parse("ari:/TP.2023-06-02T12:34:56").is_err());
    }
}
