//! Safe literal parsing.
//!
//! Recognizes numbers, strings, bytes, booleans, `None`, `...` and the
//! container displays (tuples, lists, dicts, sets) built from them. Nothing
//! is ever evaluated: any name other than the literal keywords is rejected.
//!
//! Integers are limited to `i64`. A wider integer is an error here, so a
//! default such as `= 100000000000000000000` does not resolve as a literal.

use crate::value::Value;
use std::num::IntErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid literal at offset {offset}: {message}")]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

/// Parse `text` as a single literal. A bare comma-separated sequence is a
/// tuple, as in `1, 2`.
pub fn parse(text: &str) -> Result<Value, LiteralError> {
    let mut p = Parser {
        chars: text.char_indices().collect(),
        pos: 0,
        len: text.len(),
    };
    p.skip_ws();
    let value = p.sequence_or_value(None)?;
    p.skip_ws();
    if let Some(c) = p.peek() {
        return Err(p.error(format!("unexpected `{c}`")));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
    len: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map_or(self.len, |&(i, _)| i)
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.offset(),
            message: message.into(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// A value, or a tuple when a top-level comma follows it. `close` is the
    /// bracket that ends the enclosing display, if any.
    fn sequence_or_value(&mut self, close: Option<char>) -> Result<Value, LiteralError> {
        let first = self.value()?;
        self.skip_ws();
        if self.peek() != Some(',') {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(',') {
            self.skip_ws();
            if self.peek().is_none() || self.peek() == close {
                break;
            }
            items.push(self.value()?);
            self.skip_ws();
        }
        Ok(Value::Tuple(items))
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("expected a literal")),
            Some('(') => self.tuple(),
            Some('[') => {
                self.bump();
                Ok(Value::List(self.items(']')?))
            }
            Some('{') => self.brace(),
            Some('\'' | '"') => self.strings(),
            Some('.') if self.peek_at(1) == Some('.') => {
                for _ in 0..3 {
                    if !self.eat('.') {
                        return Err(self.error("expected `...`"));
                    }
                }
                Ok(Value::Ellipsis)
            }
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.word(),
            Some(c) => Err(self.error(format!("unexpected `{c}`"))),
        }
    }

    fn tuple(&mut self) -> Result<Value, LiteralError> {
        self.bump();
        self.skip_ws();
        if self.eat(')') {
            return Ok(Value::Tuple(Vec::new()));
        }
        let inner = self.sequence_or_value(Some(')'))?;
        self.skip_ws();
        if !self.eat(')') {
            return Err(self.error("expected `)`"));
        }
        Ok(inner)
    }

    /// Comma-separated values up to `close`, trailing comma allowed.
    fn items(&mut self, close: char) -> Result<Vec<Value>, LiteralError> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_ws();
            if !self.eat(',') {
                self.skip_ws();
                if self.eat(close) {
                    return Ok(items);
                }
                return Err(self.error(format!("expected `,` or `{close}`")));
            }
        }
    }

    fn brace(&mut self) -> Result<Value, LiteralError> {
        self.bump();
        self.skip_ws();
        if self.eat('}') {
            return Ok(Value::Dict(Vec::new()));
        }
        let first = self.value()?;
        self.skip_ws();
        if !self.eat(':') {
            // set display
            let mut items = vec![first];
            if self.eat(',') {
                items.extend(self.items('}')?);
            } else if !self.eat('}') {
                return Err(self.error("expected `,` or `}`"));
            }
            return Ok(Value::Set(dedup(items)));
        }

        let mut pairs: Vec<(Value, Value)> = Vec::new();
        let mut key = first;
        loop {
            let value = self.value()?;
            match pairs.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => pairs.push((key, value)),
            }
            self.skip_ws();
            let more = self.eat(',');
            self.skip_ws();
            if self.eat('}') {
                return Ok(Value::Dict(pairs));
            }
            if !more {
                return Err(self.error("expected `,` or `}`"));
            }
            key = self.value()?;
            self.skip_ws();
            if !self.eat(':') {
                return Err(self.error("expected `:`"));
            }
        }
    }

    fn word(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().map(|&(_, c)| c).collect();

        // A string prefix directly followed by a quote.
        if matches!(self.peek(), Some('\'' | '"'))
            && matches!(
                word.to_ascii_lowercase().as_str(),
                "r" | "u" | "b" | "br" | "rb"
            )
        {
            self.pos = start;
            return self.strings();
        }

        match word.as_str() {
            "None" => Ok(Value::None),
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "Ellipsis" => Ok(Value::Ellipsis),
            "set" if self.peek() == Some('(') && self.peek_at(1) == Some(')') => {
                self.pos += 2;
                Ok(Value::Set(Vec::new()))
            }
            _ => {
                self.pos = start;
                Err(self.error(format!("`{word}` is not a literal")))
            }
        }
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let negative = match self.peek() {
            Some('-') => {
                self.bump();
                true
            }
            Some('+') => {
                self.bump();
                false
            }
            _ => false,
        };
        self.skip_ws();

        let start = self.pos;
        let radix = match (self.peek(), self.peek_at(1).map(|c| c.to_ascii_lowercase())) {
            (Some('0'), Some('x')) => 16,
            (Some('0'), Some('o')) => 8,
            (Some('0'), Some('b')) => 2,
            _ => 10,
        };
        if radix != 10 {
            self.pos += 2;
            let digits = self.take_while(|c| c.is_ascii_hexdigit() || c == '_');
            let n = i64::from_str_radix(&digits.replace('_', ""), radix)
                .map_err(|e| match e.kind() {
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                        self.error("integer out of range for i64")
                    }
                    _ => self.error(e.to_string()),
                })?;
            return Ok(Value::Int(if negative { -n } else { n }));
        }

        let mut text = self.take_while(|c| c.is_ascii_digit() || c == '_');
        let mut float = false;
        if self.peek() == Some('.') && self.peek_at(1) != Some('.') {
            self.bump();
            float = true;
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit() || c == '_'));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            float = true;
            text.push(self.bump().unwrap_or('e'));
            if let Some(sign @ ('-' | '+')) = self.peek() {
                self.bump();
                text.push(sign);
            }
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        if self.pos == start || text == "." {
            return Err(self.error("expected a number"));
        }
        if self.peek().is_some_and(|c| c.is_alphanumeric()) {
            return Err(self.error("unsupported numeric suffix"));
        }

        let text = text.replace('_', "");
        if float {
            let x: f64 = text.parse().map_err(|_| self.error("invalid float"))?;
            Ok(Value::Float(if negative { -x } else { x }))
        } else {
            let n: i64 = text.parse().map_err(|_| self.error("integer out of range for i64"))?;
            Ok(Value::Int(if negative { -n } else { n }))
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek().filter(|&c| pred(c)) {
            out.push(c);
            self.pos += 1;
        }
        out
    }

    /// One or more adjacent string literals, concatenated.
    fn strings(&mut self) -> Result<Value, LiteralError> {
        let mut text = String::new();
        let mut bytes: Option<Vec<u8>> = None;
        let mut first = true;
        loop {
            self.skip_ws();
            let start = self.pos;
            let prefix = self.take_while(|c| c.is_ascii_alphabetic()).to_ascii_lowercase();
            if !matches!(self.peek(), Some('\'' | '"')) {
                self.pos = start;
                break;
            }
            let is_bytes = prefix.contains('b');
            let raw = prefix.contains('r');
            if !first && is_bytes != bytes.is_some() {
                return Err(self.error("cannot mix bytes and str literals"));
            }
            let body = self.quoted(raw)?;
            if is_bytes {
                if !body.is_ascii() {
                    return Err(self.error("bytes can only contain ASCII characters"));
                }
                bytes.get_or_insert_with(Vec::new).extend(body.bytes());
            } else {
                text.push_str(&body);
            }
            first = false;
        }
        Ok(match bytes {
            Some(b) => Value::Bytes(b),
            None => Value::Str(text),
        })
    }

    fn quoted(&mut self, raw: bool) -> Result<String, LiteralError> {
        let Some(quote) = self.bump() else {
            return Err(self.error("expected a quote"));
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.pos += 2;
        }

        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.error("unterminated string"));
            };
            if c == quote {
                if !triple {
                    return Ok(out);
                }
                if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                    self.pos += 2;
                    return Ok(out);
                }
                out.push(c);
                continue;
            }
            if c == '\n' && !triple {
                return Err(self.error("newline in single-quoted string"));
            }
            if c != '\\' || raw {
                out.push(c);
                if c == '\\' {
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                }
                continue;
            }
            let Some(esc) = self.bump() else {
                return Err(self.error("unterminated escape"));
            };
            match esc {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '0' => out.push('\0'),
                '\\' | '\'' | '"' => out.push(esc),
                '\n' => {}
                'x' | 'u' => {
                    let width = if esc == 'x' { 2 } else { 4 };
                    let hex: String = (0..width).filter_map(|_| self.bump()).collect();
                    let code = u32::from_str_radix(&hex, 16)
                        .ok()
                        .and_then(char::from_u32)
                        .ok_or_else(|| self.error(format!("invalid escape `\\{esc}{hex}`")))?;
                    out.push(code);
                }
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
        }
    }
}

fn dedup(items: Vec<Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_wider_than_i64_are_rejected() {
        assert_eq!(parse("9223372036854775807").unwrap(), Value::Int(i64::MAX));
        for text in ["100000000000000000000", "0x1_0000_0000_0000_0000"] {
            let err = parse(text).unwrap_err();
            assert!(err.message.contains("out of range for i64"), "{text}: {err}");
        }
    }

    #[test]
    fn scalars() {
        assert_eq!(parse("None").unwrap(), Value::None);
        assert_eq!(parse("True").unwrap(), Value::Bool(true));
        assert_eq!(parse("-8").unwrap(), Value::Int(-8));
        assert_eq!(parse("1_000").unwrap(), Value::Int(1000));
        assert_eq!(parse("0x1f").unwrap(), Value::Int(31));
        assert_eq!(parse("3.14159").unwrap(), Value::Float(3.14159));
        assert_eq!(parse("1e3").unwrap(), Value::Float(1000.0));
        assert_eq!(parse(".5").unwrap(), Value::Float(0.5));
        assert_eq!(parse("...").unwrap(), Value::Ellipsis);
    }

    #[test]
    fn strings() {
        assert_eq!(parse("'foo'").unwrap(), Value::Str("foo".into()));
        assert_eq!(parse(r#""a\tb""#).unwrap(), Value::Str("a\tb".into()));
        assert_eq!(parse(r"r'a\tb'").unwrap(), Value::Str(r"a\tb".into()));
        assert_eq!(parse("'a' 'b'").unwrap(), Value::Str("ab".into()));
        assert_eq!(parse("b'ab'").unwrap(), Value::Bytes(b"ab".to_vec()));
        assert_eq!(parse("'''x'y'''").unwrap(), Value::Str("x'y".into()));
    }

    #[test]
    fn containers() {
        assert_eq!(
            parse("(1, 'a', None)").unwrap(),
            Value::Tuple(vec![Value::Int(1), Value::Str("a".into()), Value::None])
        );
        assert_eq!(parse("(1,)").unwrap(), Value::Tuple(vec![Value::Int(1)]));
        assert_eq!(parse("(1)").unwrap(), Value::Int(1));
        assert_eq!(parse("[]").unwrap(), Value::List(vec![]));
        assert_eq!(parse("[1, [2,],]").unwrap().to_string(), "[1, [2]]");
        assert_eq!(parse("{}").unwrap(), Value::Dict(vec![]));
        assert_eq!(
            parse("{'a': 1, 'b': (2, 3)}").unwrap().to_string(),
            "{'a': 1, 'b': (2, 3)}"
        );
        assert_eq!(parse("{1, 2, 1}").unwrap().to_string(), "{1, 2}");
        assert_eq!(parse("set()").unwrap(), Value::Set(vec![]));
        assert_eq!(parse("1, 2").unwrap().to_string(), "(1, 2)");
    }

    #[test]
    fn rejects_names_and_calls() {
        assert!(parse("str").is_err());
        assert!(parse("os.system('x')").is_err());
        assert!(parse("[1, foo]").is_err());
        assert!(parse("'open").is_err());
        assert!(parse("1j").is_err());
        assert!(parse("").is_err());
    }
}
