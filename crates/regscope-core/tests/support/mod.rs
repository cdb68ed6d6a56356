//! Scripted register backend shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use regscope_core::backend::RegisterBackend;
use regscope_core::error::{RegscopeError, RegscopeResult};
use regscope_core::types::ThreadId;

/// How often each backend operation was called.
#[derive(Debug, Clone, Default)]
pub struct Calls
{
    names: Arc<AtomicUsize>,
    values: Arc<AtomicUsize>,
}

impl Calls
{
    pub fn names(&self) -> usize
    {
        self.names.load(Ordering::SeqCst)
    }

    pub fn values(&self) -> usize
    {
        self.values.load(Ordering::SeqCst)
    }
}

/// A backend that answers from fixed data.
///
/// Values are `t<thread>-<index>` for every slot except the ones marked
/// absent, so tests can check which slot a value came from.
#[derive(Debug, Default)]
pub struct ScriptedBackend
{
    names: Vec<String>,
    absent: Vec<usize>,
    names_delay: Duration,
    values_delay: Duration,
    names_failures: usize,
    panic_on: Option<ThreadId>,
    unknown_thread: Option<ThreadId>,
    calls: Calls,
}

impl ScriptedBackend
{
    pub fn new(names: &[&str]) -> Self
    {
        Self {
            names: names.iter().map(|name| (*name).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn absent(mut self, indices: &[usize]) -> Self
    {
        self.absent = indices.to_vec();
        self
    }

    pub fn names_delay(mut self, delay: Duration) -> Self
    {
        self.names_delay = delay;
        self
    }

    pub fn values_delay(mut self, delay: Duration) -> Self
    {
        self.values_delay = delay;
        self
    }

    /// Fail the first `count` name requests.
    pub fn failing_names(mut self, count: usize) -> Self
    {
        self.names_failures = count;
        self
    }

    /// Index out of bounds while reading values of `thread`.
    pub fn panic_on(mut self, thread: ThreadId) -> Self
    {
        self.panic_on = Some(thread);
        self
    }

    /// Answer value requests for `thread` with a backend error.
    pub fn unknown_thread(mut self, thread: ThreadId) -> Self
    {
        self.unknown_thread = Some(thread);
        self
    }

    pub fn calls(&self) -> Calls
    {
        self.calls.clone()
    }
}

impl RegisterBackend for ScriptedBackend
{
    fn register_names(&mut self) -> RegscopeResult<Vec<String>>
    {
        self.calls.names.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.names_delay);
        if self.names_failures > 0 {
            self.names_failures -= 1;
            return Err(RegscopeError::Backend {
                command: "data-list-register-names".to_string(),
                message: "The program has no registers now.".to_string(),
            });
        }
        Ok(self.names.clone())
    }

    fn register_values(&mut self, thread: ThreadId) -> RegscopeResult<Vec<Option<String>>>
    {
        self.calls.values.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.values_delay);
        if self.unknown_thread == Some(thread) {
            return Err(RegscopeError::Backend {
                command: "data-list-register-values".to_string(),
                message: format!("Invalid thread id: {thread}"),
            });
        }
        if self.panic_on == Some(thread) {
            let empty: Vec<String> = Vec::new();
            let index = usize::try_from(thread.raw()).unwrap_or(usize::MAX);
            return Ok(vec![Some(empty[index].clone())]);
        }
        Ok((0..self.names.len())
            .map(|index| (!self.absent.contains(&index)).then(|| format!("t{thread}-{index}")))
            .collect())
    }
}
