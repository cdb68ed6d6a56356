//! # Operation Channel
//!
//! The single serialized path to a register backend.
//!
//! ```text
//!  caller threads                     "regscope-backend" thread
//!  ──────────────                     ─────────────────────────
//!  register_names() ──┐
//!                     ├─ mpsc ──►  Request ──► backend.register_names()
//!  register_values() ─┘                              │
//!        ▲                                           │
//!        └──────────── oneshot ◄──── RegscopeResult ─┘
//! ```
//!
//! The backend is owned by one worker thread and serves one request at a
//! time, so there is never more than one command in flight. Callers block
//! until the reply arrives or the configured timeout expires. A timed-out
//! request is not cancelled; the worker finishes it and drops the reply.
//!
//! If the backend panics while serving a request, the panic is caught on the
//! worker, reported to that caller as [`RegscopeError::Corrupted`], and the
//! worker stops. Every later request fails with
//! [`RegscopeError::Disconnected`].
//!
//! Callers must not be running inside a Tokio runtime: waiting uses the
//! channel's own runtime.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::backend::RegisterBackend;
use crate::error::{panic_message, CorruptionKind, RegscopeError, RegscopeResult};
use crate::types::ThreadId;

const WORKER_THREAD: &str = "regscope-backend";
const TIMER_THREAD: &str = "regscope-timer";

type Reply<T> = oneshot::Sender<RegscopeResult<T>>;

enum Request
{
    Names
    {
        reply: Reply<Vec<String>>,
    },
    Values
    {
        thread: ThreadId,
        reply: Reply<Vec<Option<String>>>,
    },
}

/// Serializes backend calls onto a worker thread and bounds each wait.
pub struct OperationChannel
{
    requests: mpsc::UnboundedSender<Request>,
    runtime: Runtime,
    timeout: Duration,
}

impl OperationChannel
{
    /// Move `backend` onto a new worker thread.
    ///
    /// ## Errors
    ///
    /// `Io` if the worker thread or the timer runtime cannot be created.
    pub fn spawn<B>(backend: B, timeout: Duration) -> RegscopeResult<Self>
    where
        B: RegisterBackend + 'static,
    {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name(TIMER_THREAD)
            .enable_time()
            .build()?;

        let (requests, receiver) = mpsc::unbounded_channel();
        let backend: Box<dyn RegisterBackend> = Box::new(backend);
        thread::Builder::new()
            .name(WORKER_THREAD.to_string())
            .spawn(move || serve(backend, receiver))?;

        debug!(timeout_ms = timeout.as_millis(), "operation channel started");
        Ok(Self {
            requests,
            runtime,
            timeout,
        })
    }

    /// Upper bound on one round trip.
    #[must_use]
    pub fn timeout(&self) -> Duration
    {
        self.timeout
    }

    /// Whether the worker has stopped serving requests.
    #[must_use]
    pub fn is_closed(&self) -> bool
    {
        self.requests.is_closed()
    }

    /// Fetch the register name list.
    ///
    /// ## Errors
    ///
    /// Whatever the backend reports, `Timeout` if it does not answer in
    /// time, `Corrupted` if it panicked, `Disconnected` if the worker is gone.
    pub fn register_names(&self) -> RegscopeResult<Vec<String>>
    {
        self.request("register-names", |reply| Request::Names { reply })
    }

    /// Fetch the register values of `thread`.
    ///
    /// ## Errors
    ///
    /// Same as [`OperationChannel::register_names`].
    pub fn register_values(&self, thread: ThreadId) -> RegscopeResult<Vec<Option<String>>>
    {
        self.request(&format!("register-values (thread {thread})"), |reply| Request::Values {
            thread,
            reply,
        })
    }

    fn request<T>(&self, operation: &str, make: impl FnOnce(Reply<T>) -> Request) -> RegscopeResult<T>
    {
        let (reply, response) = oneshot::channel();
        if self.requests.send(make(reply)).is_err() {
            return Err(RegscopeError::Disconnected);
        }

        let waited = self
            .runtime
            .block_on(async { tokio::time::timeout(self.timeout, response).await });

        match waited {
            Ok(Ok(result)) => result,
            // The worker dropped the reply without answering
            Ok(Err(_)) => Err(RegscopeError::Disconnected),
            Err(_) => {
                warn!(operation, timeout_ms = self.timeout.as_millis(), "backend request timed out");
                Err(RegscopeError::Timeout {
                    operation: operation.to_string(),
                    after: self.timeout,
                })
            }
        }
    }
}

impl fmt::Debug for OperationChannel
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("OperationChannel")
            .field("timeout", &self.timeout)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

fn serve(mut backend: Box<dyn RegisterBackend>, mut requests: mpsc::UnboundedReceiver<Request>)
{
    while let Some(request) = requests.blocking_recv() {
        let healthy = match request {
            Request::Names { reply } => answer(reply, "register-names", || backend.register_names()),
            Request::Values { thread, reply } => answer(
                reply,
                &format!("register-values (thread {thread})"),
                || backend.register_values(thread),
            ),
        };
        if !healthy {
            break;
        }
    }
    debug!("backend worker stopped");
}

/// Run one backend call and send its outcome. Returns `false` if it panicked.
fn answer<T>(reply: Reply<T>, operation: &str, call: impl FnOnce() -> RegscopeResult<T>) -> bool
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => {
            if let Err(err) = &result {
                debug!(operation, %err, "backend request failed");
            }
            if reply.send(result).is_err() {
                debug!(operation, "caller stopped waiting, reply dropped");
            }
            true
        }
        Err(payload) => {
            let message = panic_message(&*payload);
            let kind = CorruptionKind::from_panic_message(&message);
            let origin = format!("{WORKER_THREAD} thread, {operation}");
            error!(
                %kind,
                origin = origin.as_str(),
                panic = message.as_str(),
                "backend panicked; operation channel is shutting down"
            );
            let _ = reply.send(Err(RegscopeError::Corrupted { kind, origin, message }));
            false
        }
    }
}
