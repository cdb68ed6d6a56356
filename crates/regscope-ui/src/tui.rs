//! Terminal User Interface initialization and management

use std::io::{self, Stdout};
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use regscope_core::collection::RegisterCollection;
use regscope_core::types::ThreadId;
use regscope_core::error::panic_message;
use regscope_utils::{debug, error, info, warn};
use tokio::sync::mpsc;

use crate::app::App;
use crate::event::{Event, EventHandler};

/// Terminal register view
///
/// This struct manages the terminal state and runs the interactive
/// register view.
pub struct Tui
{
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui
{
    /// Create a new TUI instance
    ///
    /// This initializes the terminal in raw mode and alternate screen,
    /// and sets up panic handling to restore the terminal on panic.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization fails (raw mode, alternate screen, etc.)
    pub fn new() -> io::Result<Self>
    {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        // Restore the terminal before the panic message is printed
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = Self::restore();
            original_hook(panic_info);
        }));

        Ok(Self { terminal })
    }

    /// Run the TUI event loop
    ///
    /// Shows the registers of `threads[0]` first and runs until the user
    /// quits. Snapshots are taken on the blocking thread pool so a slow
    /// backend never freezes input handling.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal drawing fails or terminal restoration fails
    ///
    /// # Panics
    ///
    /// If taking a snapshot panics, the terminal is restored and the panic
    /// is resumed on the caller.
    pub async fn run(&mut self, registers: Arc<RegisterCollection>, threads: Vec<ThreadId>) -> io::Result<()>
    {
        let mut app = App::new(threads);
        info!(threads = app.threads.len(), "register view started");

        let mut event_handler = EventHandler::new();

        loop {
            if app.should_quit {
                break;
            }

            if let Some(thread) = app.take_refresh() {
                request_snapshot(Arc::clone(&registers), thread, event_handler.sender());
            }

            self.terminal.draw(|frame| crate::ui::draw(frame, &mut app))?;

            match tokio::time::timeout(Duration::from_millis(100), event_handler.next()).await {
                Ok(Some(Event::Key(key_event))) => {
                    if app.handle_key_event(key_event) {
                        break;
                    }
                }
                Ok(Some(Event::Tick)) => {}
                Ok(Some(Event::Snapshot { thread, result })) => app.apply_snapshot(thread, result),
                Ok(Some(Event::SnapshotPanicked { thread, payload })) => {
                    error!(%thread, panic = panic_message(&*payload).as_str(), "register snapshot panicked");
                    event_handler.stop();
                    Self::restore()?;
                    panic::resume_unwind(payload);
                }
                // Channel closed
                Ok(None) => break,
                Err(_) => {}
            }
        }

        info!("register view closing");
        Self::restore()?;
        event_handler.stop();
        Ok(())
    }

    /// Restore the terminal to its original state
    ///
    /// # Errors
    ///
    /// Returns an error if terminal restoration fails (disabling raw mode, leaving alternate screen, etc.)
    pub fn restore() -> io::Result<()>
    {
        disable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;
        Ok(())
    }
}

/// Take a snapshot off the async runtime and post the result as an event.
///
/// A panic while taking the snapshot is posted as
/// [`Event::SnapshotPanicked`] so the view can stop instead of waiting
/// forever.
fn request_snapshot(registers: Arc<RegisterCollection>, thread: ThreadId, sender: mpsc::Sender<Event>)
{
    debug!(%thread, "requesting register snapshot");
    let task = tokio::task::spawn_blocking(move || registers.snapshot(thread));
    tokio::spawn(async move {
        let event = match task.await {
            Ok(result) => {
                if let Err(err) = &result {
                    warn!(%thread, error = %err.describe(), "register snapshot failed");
                }
                Event::Snapshot { thread, result }
            }
            Err(err) if err.is_panic() => Event::SnapshotPanicked {
                thread,
                payload: err.into_panic(),
            },
            // Cancelled because the runtime is shutting down
            Err(_) => return,
        };
        if sender.send(event).await.is_err() {
            debug!(%thread, "view closed before snapshot arrived");
        }
    });
}

impl Drop for Tui
{
    fn drop(&mut self)
    {
        let _ = Self::restore();
    }
}
