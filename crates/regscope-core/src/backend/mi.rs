//! MI backend.
//!
//! Talks to a debugger speaking GDB/MI over a pair of byte streams. In
//! production those are the pipes of a spawned `gdb --interpreter=mi2`; in
//! tests they are in-memory buffers.
//!
//! Each command carries a fresh numeric token. Output is read line by line
//! until the result record carrying that token arrives. Everything else on
//! the way (console text, `*stopped` notifications, prompts, replies to other
//! commands) is logged and skipped.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command as ProcessCommand, Stdio};

use regscope_protocol::registers::{register_names, register_values};
use regscope_protocol::{Command, MiError, Record, RegisterValueFormat, ResultClass, ResultRecord};
use tracing::{debug, info, trace, warn};

use super::RegisterBackend;
use crate::config::SessionConfig;
use crate::error::{RegscopeError, RegscopeResult};
use crate::types::ThreadId;

/// A [`RegisterBackend`] speaking GDB/MI.
#[derive(Debug)]
pub struct MiBackend<R, W>
{
    reader: R,
    writer: W,
    next_token: u64,
    value_format: RegisterValueFormat,
    /// Length of the last name list, used to size value lists
    register_count: Option<usize>,
    child: Option<Child>,
}

impl<R, W> MiBackend<R, W>
where
    R: BufRead,
    W: Write,
{
    /// Backend over already connected streams.
    #[must_use]
    pub fn new(reader: R, writer: W) -> Self
    {
        Self {
            reader,
            writer,
            next_token: 1,
            value_format: RegisterValueFormat::default(),
            register_count: None,
            child: None,
        }
    }

    /// Request register values in `format` instead of hex.
    #[must_use]
    pub fn with_value_format(mut self, format: RegisterValueFormat) -> Self
    {
        self.value_format = format;
        self
    }

    /// Send `command` and wait for its result record.
    ///
    /// ## Errors
    ///
    /// - `Backend` if the reply is `^error`
    /// - `Disconnected` on `^exit` or end of output
    /// - `Protocol` if the reply carrying our token cannot be decoded
    /// - `Io` if a pipe fails
    pub fn execute(&mut self, command: &Command) -> RegscopeResult<ResultRecord>
    {
        let token = self.next_token;
        self.next_token += 1;

        let line = command.to_line(token);
        trace!(%line, "-> backend");
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;

        let mut buffer = String::new();
        loop {
            buffer.clear();
            if self.reader.read_line(&mut buffer)? == 0 {
                warn!(operation = command.operation(), "backend output ended");
                return Err(RegscopeError::Disconnected);
            }
            let text = buffer.trim_end();

            match Record::parse(text) {
                Ok(Record::Result(result)) if result.token == Some(token) => {
                    return check_result(command, result);
                }
                Ok(Record::Result(result)) if result.class == ResultClass::Exit => {
                    warn!("backend exited while waiting for token {token}");
                    return Err(RegscopeError::Disconnected);
                }
                Ok(Record::Result(result)) => {
                    debug!(token = ?result.token, class = %result.class, "skipping reply to another command");
                }
                Ok(Record::Stream { kind, text }) => trace!(?kind, text = text.trim_end(), "<- backend stream"),
                Ok(Record::Async { kind, class, .. }) => trace!(?kind, %class, "<- backend notification"),
                Ok(Record::Prompt) => {}
                Err(err) if carries_token(text, token) => {
                    return Err(err.into());
                }
                Err(err) => debug!(%err, line = text, "skipping undecodable backend output"),
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn writer(&self) -> &W
    {
        &self.writer
    }
}

impl MiBackend<BufReader<ChildStdout>, ChildStdin>
{
    /// Launch the configured debugger in MI mode.
    ///
    /// The child is killed when the backend is dropped.
    ///
    /// ## Errors
    ///
    /// `Io` if the debugger cannot be started.
    pub fn spawn(config: &SessionConfig) -> RegscopeResult<Self>
    {
        let mut child = ProcessCommand::new(&config.debugger)
            .arg("--interpreter=mi2")
            .arg("--quiet")
            .args(&config.debugger_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(RegscopeError::Io(std::io::Error::other("debugger pipes were not captured")));
        };

        info!(
            debugger = %config.debugger.display(),
            args = ?config.debugger_args,
            pid = child.id(),
            "started MI backend"
        );

        let mut backend = Self::new(BufReader::new(stdout), stdin).with_value_format(config.value_format);
        backend.child = Some(child);
        Ok(backend)
    }
}

impl<R, W> RegisterBackend for MiBackend<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn register_names(&mut self) -> RegscopeResult<Vec<String>>
    {
        let record = self.execute(&Command::data_list_register_names())?;
        let names = register_names(&record)?;
        self.register_count = Some(names.len());
        Ok(names)
    }

    /// Values indexed by register number.
    ///
    /// The name list is fetched first if it never was, so every value list
    /// has the length of the name list. A number outside that list is a
    /// `Protocol` error.
    fn register_values(&mut self, thread: ThreadId) -> RegscopeResult<Vec<Option<String>>>
    {
        let len = match self.register_count {
            Some(len) => len,
            None => self.register_names()?.len(),
        };

        let command = Command::data_list_register_values(thread.raw(), self.value_format);
        let record = self.execute(&command)?;
        let entries = register_values(&record)?;

        let mut values = vec![None; len];
        for entry in entries {
            let Some(slot) = values.get_mut(entry.number) else {
                warn!(%thread, number = entry.number, registers = len, "register number outside the name list");
                return Err(MiError::RegisterOutOfRange {
                    number: entry.number,
                    registers: len,
                }
                .into());
            };
            *slot = Some(entry.value);
        }
        Ok(values)
    }
}

impl<R, W> Drop for MiBackend<R, W>
{
    fn drop(&mut self)
    {
        if let Some(child) = self.child.as_mut() {
            debug!(pid = child.id(), "stopping MI backend");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn check_result(command: &Command, result: ResultRecord) -> RegscopeResult<ResultRecord>
{
    match result.class {
        ResultClass::Error => Err(RegscopeError::Backend {
            command: command.operation().to_string(),
            message: result.error_message().unwrap_or("unknown error").to_string(),
        }),
        ResultClass::Exit => Err(RegscopeError::Disconnected),
        _ => Ok(result),
    }
}

/// Whether a line starts with exactly `token`.
fn carries_token(line: &str, token: u64) -> bool
{
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && line[..digits].parse::<u64>() == Ok(token)
}

#[cfg(test)]
mod tests
{
    use std::io::Cursor;

    use super::*;

    fn backend(output: &str) -> MiBackend<Cursor<Vec<u8>>, Vec<u8>>
    {
        MiBackend::new(Cursor::new(output.as_bytes().to_vec()), Vec::new())
    }

    fn sent(backend: &MiBackend<Cursor<Vec<u8>>, Vec<u8>>) -> String
    {
        String::from_utf8(backend.writer().clone()).unwrap()
    }

    #[test]
    fn test_register_names_skips_noise()
    {
        let mut backend = backend(concat!(
            "=thread-group-added,id=\"i1\"\n",
            "~\"GNU gdb\\n\"\n",
            "(gdb)\n",
            "1^done,register-names=[\"eax\",\"\",\"ebx\"]\n",
            "(gdb)\n",
        ));
        let names = backend.register_names().unwrap();
        assert_eq!(names, vec!["eax", "", "ebx"]);
        assert_eq!(sent(&backend), "1-data-list-register-names\n");
    }

    #[test]
    fn test_register_values_aligned_with_names()
    {
        let mut backend = backend(concat!(
            "1^done,register-names=[\"eax\",\"\",\"ebx\",\"ecx\"]\n",
            "*stopped,reason=\"signal-received\"\n",
            "2^done,register-values=[{number=\"3\",value=\"0x3\"},{number=\"0\",value=\"0x0\"}]\n",
        ));
        backend.register_names().unwrap();
        let values = backend.register_values(ThreadId(7)).unwrap();
        assert_eq!(values, vec![Some("0x0".to_string()), None, None, Some("0x3".to_string())]);
        assert!(sent(&backend).ends_with("2-data-list-register-values --thread 7 x\n"));
    }

    #[test]
    fn test_register_values_rejects_unknown_numbers()
    {
        let mut backend = backend(concat!(
            "1^done,register-names=[\"eax\",\"ebx\"]\n",
            "2^done,register-values=[{number=\"0\",value=\"0x0\"},{number=\"1\",value=\"0x1\"},",
            "{number=\"7\",value=\"0x7\"}]\n",
        ));
        backend.register_names().unwrap();
        assert!(matches!(
            backend.register_values(ThreadId(1)),
            Err(RegscopeError::Protocol(MiError::RegisterOutOfRange { number: 7, registers: 2 }))
        ));
    }

    #[test]
    fn test_register_values_fetches_names_first()
    {
        let mut backend = backend(concat!(
            "1^done,register-names=[\"r0\",\"r1\",\"r2\"]\n",
            "2^done,register-values=[{number=\"2\",value=\"0x2\"}]\n",
        ));
        assert_eq!(
            backend.register_values(ThreadId(1)).unwrap(),
            vec![None, None, Some("0x2".to_string())]
        );
        assert_eq!(
            sent(&backend),
            "1-data-list-register-names\n2-data-list-register-values --thread 1 x\n"
        );
    }

    #[test]
    fn test_value_format()
    {
        let mut backend = backend(concat!(
            "1^done,register-names=[]\n",
            "2^done,register-values=[]\n",
        ))
        .with_value_format(RegisterValueFormat::Natural);
        assert!(backend.register_values(ThreadId(2)).unwrap().is_empty());
        assert!(sent(&backend).ends_with("2-data-list-register-values --thread 2 N\n"));
    }

    #[test]
    fn test_error_reply()
    {
        let mut backend = backend("1^error,msg=\"The program has no registers now.\"\n");
        match backend.register_names() {
            Err(RegscopeError::Backend { command, message }) => {
                assert_eq!(command, "data-list-register-names");
                assert_eq!(message, "The program has no registers now.");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_reply_to_other_token_is_skipped()
    {
        let mut backend = backend(concat!(
            "9^done\n",
            "garbage that is not MI\n",
            "1^done,register-names=[\"pc\"]\n",
        ));
        assert_eq!(backend.register_names().unwrap(), vec!["pc"]);
    }

    #[test]
    fn test_malformed_reply_with_our_token()
    {
        let mut backend = backend("1^done,register-names=[\"eax\"\n");
        assert!(matches!(
            backend.register_names(),
            Err(RegscopeError::Protocol(MiError::UnexpectedEnd { .. }))
        ));
    }

    #[test]
    fn test_end_of_output_and_exit()
    {
        assert!(matches!(backend("(gdb)\n").register_names(), Err(RegscopeError::Disconnected)));
        assert!(matches!(backend("^exit\n").register_names(), Err(RegscopeError::Disconnected)));
    }

    #[test]
    fn test_tokens_increase()
    {
        let mut backend = backend(concat!(
            "1^done,register-names=[]\n",
            "2^done,register-names=[]\n",
        ));
        backend.register_names().unwrap();
        backend.register_names().unwrap();
        assert_eq!(
            sent(&backend),
            "1-data-list-register-names\n2-data-list-register-names\n"
        );
    }

    #[test]
    fn test_carries_token()
    {
        assert!(carries_token("12^done", 12));
        assert!(!carries_token("123^done", 12));
        assert!(!carries_token("^done", 12));
    }
}
