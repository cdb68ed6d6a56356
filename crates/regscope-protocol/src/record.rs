//! # MI Output Records
//!
//! Classification of a single line of backend output.
//!
//! ```text
//! output-record -> result-record | async-record | stream-record | "(gdb)"
//! result-record -> [token] "^" result-class ( "," result )*
//! async-record  -> [token] ( "*" | "+" | "=" ) async-class ( "," result )*
//! stream-record -> ( "~" | "@" | "&" ) c-string
//! ```

use std::fmt;

use crate::error::{MiError, MiResult};
use crate::value::{Parser, Value};

/// Outcome carried by a result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultClass
{
    /// `^done`: the command completed
    Done,
    /// `^running`: equivalent to done for execution commands
    Running,
    /// `^connected`: connected to a remote target
    Connected,
    /// `^error`: the command failed; carries `msg` and maybe `code`
    Error,
    /// `^exit`: the backend is exiting
    Exit,
}

impl ResultClass
{
    fn parse(text: &str) -> MiResult<Self>
    {
        match text {
            "done" => Ok(Self::Done),
            "running" => Ok(Self::Running),
            "connected" => Ok(Self::Connected),
            "error" => Ok(Self::Error),
            "exit" => Ok(Self::Exit),
            other => Err(MiError::UnknownResultClass(other.to_string())),
        }
    }
}

impl fmt::Display for ResultClass
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let text = match self {
            Self::Done => "done",
            Self::Running => "running",
            Self::Connected => "connected",
            Self::Error => "error",
            Self::Exit => "exit",
        };
        f.write_str(text)
    }
}

/// Which async channel a record arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncKind
{
    /// `*`: execution state changes (stopped, running)
    Exec,
    /// `+`: progress of slow operations
    Status,
    /// `=`: supplementary notifications (thread-created, library-loaded, ...)
    Notify,
}

/// Which stream a stream record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind
{
    /// `~`: console output meant for the user
    Console,
    /// `@`: output of the debugged program
    Target,
    /// `&`: the backend's internal log
    Log,
}

/// A `^...` line, the reply to one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord
{
    /// Token echoed from the command, if the command had one
    pub token: Option<u64>,
    /// Result class
    pub class: ResultClass,
    /// Named results following the class
    pub results: Vec<(String, Value)>,
}

impl ResultRecord
{
    /// Look up a top-level result by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value>
    {
        self.results.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }

    /// For `^error` records, the backend's `msg` text.
    #[must_use]
    pub fn error_message(&self) -> Option<&str>
    {
        if self.class != ResultClass::Error {
            return None;
        }
        self.field("msg").and_then(Value::as_const)
    }
}

/// One decoded line of MI output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record
{
    /// Reply to a command
    Result(ResultRecord),
    /// Out-of-band notification
    Async
    {
        /// Token of the command that triggered it, if any
        token: Option<u64>,
        /// Channel the notification arrived on
        kind: AsyncKind,
        /// Async class, e.g. `stopped` or `thread-created`
        class: String,
        /// Named results following the class
        results: Vec<(String, Value)>,
    },
    /// Free-form text
    Stream
    {
        /// Which stream
        kind: StreamKind,
        /// Unescaped text
        text: String,
    },
    /// The `(gdb)` prompt that ends a burst of output
    Prompt,
}

impl Record
{
    /// Decode a single line of MI output.
    ///
    /// Trailing whitespace (including `\r` from backends on Windows) is
    /// ignored.
    ///
    /// ## Errors
    ///
    /// - [`MiError::UnrecognizedRecord`] if the line does not start like any record
    /// - [`MiError::UnknownResultClass`] for a `^` line with an unknown class
    /// - any value-grammar error from the results that follow
    ///
    /// ## Example
    ///
    /// ```rust
    /// use regscope_protocol::{Record, ResultClass};
    ///
    /// let record = Record::parse(r#"3^done,register-names=["eax","ecx"]"#).unwrap();
    /// match record {
    ///     Record::Result(result) => {
    ///         assert_eq!(result.token, Some(3));
    ///         assert_eq!(result.class, ResultClass::Done);
    ///     }
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn parse(line: &str) -> MiResult<Self>
    {
        let line = line.trim_end();
        if line == "(gdb)" {
            return Ok(Self::Prompt);
        }

        let digits = line.bytes().take_while(u8::is_ascii_digit).count();
        let token = if digits == 0 {
            None
        } else {
            line[..digits].parse::<u64>().ok()
        };
        let rest = &line[digits..];

        let Some(marker) = rest.chars().next() else {
            return Err(MiError::UnrecognizedRecord(line.to_string()));
        };
        let body = &rest[marker.len_utf8()..];

        match marker {
            '^' => {
                let (class, tail) = split_class(body);
                let class = ResultClass::parse(class)?;
                let results = Parser::new(tail).parse_trailing_results()?;
                Ok(Self::Result(ResultRecord { token, class, results }))
            }
            '*' | '+' | '=' => {
                let kind = match marker {
                    '*' => AsyncKind::Exec,
                    '+' => AsyncKind::Status,
                    _ => AsyncKind::Notify,
                };
                let (class, tail) = split_class(body);
                let results = Parser::new(tail).parse_trailing_results()?;
                Ok(Self::Async {
                    token,
                    kind,
                    class: class.to_string(),
                    results,
                })
            }
            '~' | '@' | '&' if token.is_none() => {
                let kind = match marker {
                    '~' => StreamKind::Console,
                    '@' => StreamKind::Target,
                    _ => StreamKind::Log,
                };
                let mut parser = Parser::new(body);
                let text = parser.parse_cstring()?;
                if !parser.is_at_end() {
                    return Err(MiError::UnrecognizedRecord(line.to_string()));
                }
                Ok(Self::Stream { kind, text })
            }
            _ => Err(MiError::UnrecognizedRecord(line.to_string())),
        }
    }
}

/// Split `class,results...` at the first comma.
fn split_class(body: &str) -> (&str, &str)
{
    match body.find(',') {
        Some(idx) => (&body[..idx], &body[idx..]),
        None => (body, ""),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_prompt()
    {
        assert_eq!(Record::parse("(gdb) ").unwrap(), Record::Prompt);
        assert_eq!(Record::parse("(gdb)\r").unwrap(), Record::Prompt);
    }

    #[test]
    fn test_parse_done_without_results()
    {
        let record = Record::parse("^done").unwrap();
        assert_eq!(
            record,
            Record::Result(ResultRecord {
                token: None,
                class: ResultClass::Done,
                results: Vec::new(),
            })
        );
    }

    #[test]
    fn test_parse_error_record()
    {
        let record = Record::parse(r#"42^error,msg="No registers.",code="undefined-command""#).unwrap();
        let Record::Result(result) = record else {
            panic!("expected result record");
        };
        assert_eq!(result.token, Some(42));
        assert_eq!(result.error_message(), Some("No registers."));
        assert_eq!(result.field("code").and_then(Value::as_const), Some("undefined-command"));
    }

    #[test]
    fn test_error_message_only_for_error_class()
    {
        let Record::Result(result) = Record::parse(r#"^done,msg="hi""#).unwrap() else {
            panic!("expected result record");
        };
        assert_eq!(result.error_message(), None);
    }

    #[test]
    fn test_parse_async_stopped()
    {
        let record = Record::parse(r#"*stopped,reason="breakpoint-hit",thread-id="1""#).unwrap();
        match record {
            Record::Async {
                token,
                kind,
                class,
                results,
            } => {
                assert_eq!(token, None);
                assert_eq!(kind, AsyncKind::Exec);
                assert_eq!(class, "stopped");
                assert_eq!(results.len(), 2);
            }
            other => panic!("expected async record, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_notify_without_results()
    {
        let record = Record::parse("=thread-group-added").unwrap();
        assert!(matches!(record, Record::Async { kind: AsyncKind::Notify, .. }));
    }

    #[test]
    fn test_parse_stream_records()
    {
        assert_eq!(
            Record::parse(r#"~"GNU gdb 14.2\n""#).unwrap(),
            Record::Stream {
                kind: StreamKind::Console,
                text: "GNU gdb 14.2\n".to_string(),
            }
        );
        assert!(matches!(
            Record::parse(r#"&"warning""#).unwrap(),
            Record::Stream { kind: StreamKind::Log, .. }
        ));
    }

    #[test]
    fn test_parse_unknown_class()
    {
        assert_eq!(
            Record::parse("^weird"),
            Err(MiError::UnknownResultClass("weird".to_string()))
        );
    }

    #[test]
    fn test_parse_unrecognized_line()
    {
        assert!(matches!(Record::parse("hello"), Err(MiError::UnrecognizedRecord(_))));
        assert!(matches!(Record::parse(""), Err(MiError::UnrecognizedRecord(_))));
        assert!(matches!(Record::parse("12"), Err(MiError::UnrecognizedRecord(_))));
    }
}
