//! Event handling for the TUI

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use regscope_core::snapshot::Snapshot;
use regscope_core::types::ThreadId;
use regscope_core::RegscopeResult;
use tokio::sync::mpsc;

/// Events that can occur in the TUI
#[derive(Debug)]
pub enum Event
{
    /// Keyboard input event
    Key(KeyEvent),
    /// Tick event (for periodic updates)
    Tick,
    /// A snapshot request finished
    Snapshot
    {
        thread: ThreadId,
        result: RegscopeResult<Snapshot>,
    },
    /// Taking a snapshot panicked; carries the panic payload
    SnapshotPanicked
    {
        thread: ThreadId,
        payload: Box<dyn Any + Send>,
    },
}

/// Event handler that reads from crossterm and produces TUI events
pub struct EventHandler
{
    receiver: mpsc::Receiver<Event>,
    sender: mpsc::Sender<Event>,
    should_stop: Arc<AtomicBool>,
}

impl EventHandler
{
    /// Create a new event handler
    ///
    /// This spawns a background task that reads crossterm events
    /// and sends them to the async receiver.
    #[must_use]
    pub fn new() -> Self
    {
        let tick_rate = Duration::from_millis(250);
        let (sender, receiver) = mpsc::channel(100);
        let should_stop = Arc::new(AtomicBool::new(false));

        let sender_clone = sender.clone();
        let should_stop_clone = should_stop.clone();
        tokio::task::spawn_blocking(move || {
            let mut last_tick = std::time::Instant::now();
            loop {
                if should_stop_clone.load(Ordering::Relaxed) {
                    break;
                }

                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or_else(|| Duration::from_secs(0));

                if event::poll(timeout).unwrap_or(false) {
                    if let Ok(CrosstermEvent::Key(key)) = event::read() {
                        if key.kind == KeyEventKind::Press && sender_clone.blocking_send(Event::Key(key)).is_err() {
                            break;
                        }
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if sender_clone.blocking_send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = std::time::Instant::now();
                }
            }
        });

        Self {
            receiver,
            sender,
            should_stop,
        }
    }

    /// Stop the event handler
    ///
    /// Sets the stop flag and closes the receiver; the background task
    /// exits on its next iteration.
    pub fn stop(&mut self)
    {
        self.should_stop.store(true, Ordering::Relaxed);
        self.receiver.close();
    }

    /// Get the next event (async)
    pub async fn next(&mut self) -> Option<Event>
    {
        self.receiver.recv().await
    }

    /// Get a sender that can be used to push events into the queue.
    #[must_use]
    pub fn sender(&self) -> mpsc::Sender<Event>
    {
        self.sender.clone()
    }
}

impl Default for EventHandler
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl Drop for EventHandler
{
    fn drop(&mut self)
    {
        self.stop();
    }
}
