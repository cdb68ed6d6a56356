//! # regscope-protocol
//!
//! The GDB/MI ("machine interface") line protocol, as spoken by the debug
//! backends regscope talks to.
//!
//! MI is line oriented. Every line the backend prints is one *output record*:
//!
//! ```text
//! 17^done,register-names=["r0","r1","","sp"]
//! *stopped,reason="breakpoint-hit",thread-id="1"
//! ~"GNU gdb (GDB) 14.2\n"
//! (gdb)
//! ```
//!
//! This crate only deals with text. It has no notion of processes, pipes or
//! timeouts; that lives in `regscope-core`.
//!
//! ## Modules
//!
//! - [`value`]: the MI value grammar (c-strings, tuples, lists)
//! - [`record`]: classification of a single output line
//! - [`command`]: formatting of MI input commands
//! - [`registers`]: extraction of the register name/value payloads
//!
//! ## References
//!
//! - [GDB/MI Output Syntax](https://sourceware.org/gdb/current/onlinedocs/gdb.html/GDB_002fMI-Output-Syntax.html)
//! - [GDB/MI Data Manipulation](https://sourceware.org/gdb/current/onlinedocs/gdb.html/GDB_002fMI-Data-Manipulation.html)

pub mod command;
pub mod error;
pub mod record;
pub mod registers;
pub mod value;

pub use command::{Command, RegisterValueFormat};
pub use error::{MiError, MiResult};
pub use record::{AsyncKind, Record, ResultClass, ResultRecord, StreamKind};
pub use value::Value;
