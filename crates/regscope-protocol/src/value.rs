//! # MI Values
//!
//! The value grammar shared by result, async and stream records:
//!
//! ```text
//! value  -> const | tuple | list
//! const  -> c-string
//! tuple  -> "{}" | "{" result ( "," result )* "}"
//! list   -> "[]" | "[" value ( "," value )* "]" | "[" result ( "," result )* "]"
//! result -> variable "=" value
//! ```

use crate::error::{MiError, MiResult};

/// A decoded MI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value
{
    /// A c-string constant, already unescaped
    Const(String),
    /// `{name=value,...}`
    Tuple(Vec<(String, Value)>),
    /// `[value,...]`
    List(Vec<Value>),
    /// `[name=value,...]`, which GDB emits for a few commands
    ResultList(Vec<(String, Value)>),
}

impl Value
{
    /// The string payload, if this is a constant.
    #[must_use]
    pub fn as_const(&self) -> Option<&str>
    {
        match self {
            Self::Const(text) => Some(text),
            _ => None,
        }
    }

    /// The elements of a `[value,...]` list.
    ///
    /// An empty list is ambiguous in the grammar and is always decoded as
    /// `List(vec![])`.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]>
    {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a named member of a tuple or result list.
    ///
    /// The first member with a matching name wins.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value>
    {
        match self {
            Self::Tuple(members) | Self::ResultList(members) => {
                members.iter().find(|(key, _)| key == name).map(|(_, value)| value)
            }
            _ => None,
        }
    }
}

/// Byte-oriented recursive descent parser over one MI line.
pub(crate) struct Parser<'a>
{
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a>
{
    pub(crate) fn new(input: &'a str) -> Self
    {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    pub(crate) fn is_at_end(&self) -> bool
    {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8>
    {
        self.bytes.get(self.pos).copied()
    }

    fn next_byte(&mut self) -> MiResult<u8>
    {
        let byte = self.peek().ok_or(MiError::UnexpectedEnd { column: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect(&mut self, wanted: u8, expected: &'static str) -> MiResult<()>
    {
        let column = self.pos;
        match self.next_byte()? {
            byte if byte == wanted => Ok(()),
            byte => Err(MiError::UnexpectedChar {
                found: char::from(byte),
                column,
                expected,
            }),
        }
    }

    /// Parse a `,`-prefixed run of results up to the end of input.
    ///
    /// This is the tail of every result and async record:
    /// `^done,a="1",b={...}`.
    pub(crate) fn parse_trailing_results(&mut self) -> MiResult<Vec<(String, Value)>>
    {
        let mut results = Vec::new();
        while !self.is_at_end() {
            self.expect(b',', "',' before result")?;
            results.push(self.parse_result()?);
        }
        Ok(results)
    }

    fn parse_result(&mut self) -> MiResult<(String, Value)>
    {
        let name = self.parse_variable()?;
        self.expect(b'=', "'=' after variable name")?;
        let value = self.parse_value()?;
        Ok((name, value))
    }

    fn parse_variable(&mut self) -> MiResult<String>
    {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }

        if self.pos == start {
            return match self.peek() {
                Some(byte) => Err(MiError::UnexpectedChar {
                    found: char::from(byte),
                    column: start,
                    expected: "variable name",
                }),
                None => Err(MiError::UnexpectedEnd { column: start }),
            };
        }

        Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    fn parse_value(&mut self) -> MiResult<Value>
    {
        match self.peek() {
            Some(b'"') => self.parse_cstring().map(Value::Const),
            Some(b'{') => self.parse_tuple(),
            Some(b'[') => self.parse_list(),
            Some(byte) => Err(MiError::UnexpectedChar {
                found: char::from(byte),
                column: self.pos,
                expected: "value",
            }),
            None => Err(MiError::UnexpectedEnd { column: self.pos }),
        }
    }

    fn parse_tuple(&mut self) -> MiResult<Value>
    {
        self.expect(b'{', "'{'")?;
        let mut members = Vec::new();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Value::Tuple(members));
        }

        loop {
            members.push(self.parse_result()?);
            let column = self.pos;
            match self.next_byte()? {
                b',' => {}
                b'}' => return Ok(Value::Tuple(members)),
                byte => {
                    return Err(MiError::UnexpectedChar {
                        found: char::from(byte),
                        column,
                        expected: "',' or '}'",
                    })
                }
            }
        }
    }

    fn parse_list(&mut self) -> MiResult<Value>
    {
        self.expect(b'[', "'['")?;
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Value::List(Vec::new()));
        }

        let holds_values = matches!(self.peek(), Some(b'"' | b'{' | b'['));
        let mut values = Vec::new();
        let mut results = Vec::new();
        loop {
            if holds_values {
                values.push(self.parse_value()?);
            } else {
                results.push(self.parse_result()?);
            }

            let column = self.pos;
            match self.next_byte()? {
                b',' => {}
                b']' => break,
                byte => {
                    return Err(MiError::UnexpectedChar {
                        found: char::from(byte),
                        column,
                        expected: "',' or ']'",
                    })
                }
            }
        }

        if holds_values {
            Ok(Value::List(values))
        } else {
            Ok(Value::ResultList(results))
        }
    }

    /// Parse a C-style quoted string.
    ///
    /// Octal escapes produce raw bytes, so multi-byte UTF-8 sequences that GDB
    /// escapes byte by byte are reassembled before decoding.
    pub(crate) fn parse_cstring(&mut self) -> MiResult<String>
    {
        self.expect(b'"', "'\"'")?;
        let mut out = Vec::new();
        loop {
            match self.next_byte()? {
                b'"' => break,
                b'\\' => {
                    let escaped = self.next_byte()?;
                    match escaped {
                        b'n' => out.push(b'\n'),
                        b't' => out.push(b'\t'),
                        b'r' => out.push(b'\r'),
                        b'a' => out.push(0x07),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0c),
                        b'v' => out.push(0x0b),
                        b'e' => out.push(0x1b),
                        b'\\' | b'"' | b'\'' => out.push(escaped),
                        b'0'..=b'7' => {
                            let mut code = u32::from(escaped - b'0');
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(digit @ b'0'..=b'7') => {
                                        code = code * 8 + u32::from(digit - b'0');
                                        self.pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            // Three octal digits can exceed a byte; GDB never emits that.
                            out.push(u8::try_from(code).map_err(|_| MiError::InvalidEscape(char::from(escaped)))?);
                        }
                        other => return Err(MiError::InvalidEscape(char::from(other))),
                    }
                }
                byte => out.push(byte),
            }
        }

        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Parse a standalone MI value, e.g. the payload of a single field.
///
/// ## Errors
///
/// Returns an [`MiError`] if `input` is not exactly one well-formed value.
///
/// ## Example
///
/// ```rust
/// use regscope_protocol::value::{parse_value, Value};
///
/// let value = parse_value(r#"{number="0",value="0x1"}"#).unwrap();
/// assert_eq!(value.field("value").and_then(Value::as_const), Some("0x1"));
/// ```
pub fn parse_value(input: &str) -> MiResult<Value>
{
    let mut parser = Parser::new(input);
    let value = parser.parse_value()?;
    match parser.peek() {
        None => Ok(value),
        Some(byte) => Err(MiError::UnexpectedChar {
            found: char::from(byte),
            column: parser.pos,
            expected: "end of input",
        }),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_const()
    {
        assert_eq!(parse_value(r#""eax""#).unwrap(), Value::Const("eax".to_string()));
        assert_eq!(parse_value(r#""""#).unwrap(), Value::Const(String::new()));
    }

    #[test]
    fn test_parse_cstring_escapes()
    {
        let value = parse_value(r#""line\n\t\"quoted\" \\ \101""#).unwrap();
        assert_eq!(value.as_const(), Some("line\n\t\"quoted\" \\ A"));
    }

    #[test]
    fn test_parse_octal_utf8_sequence()
    {
        // "é" escaped byte by byte
        let value = parse_value(r#""caf\303\251""#).unwrap();
        assert_eq!(value.as_const(), Some("café"));
    }

    #[test]
    fn test_parse_invalid_escape()
    {
        assert_eq!(parse_value(r#""\q""#), Err(MiError::InvalidEscape('q')));
    }

    #[test]
    fn test_parse_tuple_and_field_lookup()
    {
        let value = parse_value(r#"{number="12",value="0x7ffe"}"#).unwrap();
        assert_eq!(value.field("number").and_then(Value::as_const), Some("12"));
        assert_eq!(value.field("value").and_then(Value::as_const), Some("0x7ffe"));
        assert!(value.field("missing").is_none());
    }

    #[test]
    fn test_parse_empty_containers()
    {
        assert_eq!(parse_value("{}").unwrap(), Value::Tuple(Vec::new()));
        assert_eq!(parse_value("[]").unwrap(), Value::List(Vec::new()));
    }

    #[test]
    fn test_parse_value_list()
    {
        let value = parse_value(r#"["r0","","sp"]"#).unwrap();
        let items: Vec<_> = value.as_list().unwrap().iter().filter_map(Value::as_const).collect();
        assert_eq!(items, vec!["r0", "", "sp"]);
    }

    #[test]
    fn test_parse_result_list()
    {
        let value = parse_value(r#"[frame={level="0"},frame={level="1"}]"#).unwrap();
        match value {
            Value::ResultList(members) => {
                assert_eq!(members.len(), 2);
                assert_eq!(members[0].0, "frame");
            }
            other => panic!("expected result list, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_unterminated_string()
    {
        assert!(matches!(parse_value(r#""abc"#), Err(MiError::UnexpectedEnd { .. })));
    }

    #[test]
    fn test_parse_trailing_garbage()
    {
        assert!(matches!(
            parse_value(r#""a"x"#),
            Err(MiError::UnexpectedChar { found: 'x', column: 3, .. })
        ));
    }
}
