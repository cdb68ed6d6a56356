//! Application state and logic

use ratatui::widgets::TableState;
use regscope_core::snapshot::Snapshot;
use regscope_core::types::ThreadId;
use regscope_core::RegscopeResult;

/// What the register table currently shows.
#[derive(Debug, Clone)]
pub enum RegisterView
{
    /// A snapshot has been requested but not received yet
    Loading,
    /// The last snapshot of the selected thread
    Ready(Snapshot),
    /// The last request failed; holds a readable description
    Failed(String),
}

/// Application state
#[derive(Debug)]
pub struct App
{
    /// Threads the user can cycle through
    pub threads: Vec<ThreadId>,
    /// Index into `threads`
    pub selected_thread: usize,
    /// Whether the application should exit
    pub should_quit: bool,
    /// Contents of the register table
    pub view: RegisterView,
    /// State for the registers table
    pub registers_state: TableState,
    /// Status message to display (if any)
    pub status_message: Option<String>,
    /// Whether a new snapshot should be requested
    refresh_requested: bool,
}

impl App
{
    /// Create a new application instance
    ///
    /// An empty thread list falls back to thread 1.
    #[must_use]
    pub fn new(threads: Vec<ThreadId>) -> Self
    {
        let threads = if threads.is_empty() { vec![ThreadId(1)] } else { threads };
        let mut registers_state = TableState::default();
        registers_state.select(Some(0));

        Self {
            threads,
            selected_thread: 0,
            should_quit: false,
            view: RegisterView::Loading,
            registers_state,
            status_message: None,
            refresh_requested: true,
        }
    }

    /// The thread whose registers are shown.
    #[must_use]
    pub fn current_thread(&self) -> ThreadId
    {
        self.threads[self.selected_thread]
    }

    /// Take the pending refresh request, if any.
    pub fn take_refresh(&mut self) -> Option<ThreadId>
    {
        if self.refresh_requested {
            self.refresh_requested = false;
            self.view = RegisterView::Loading;
            Some(self.current_thread())
        } else {
            None
        }
    }

    /// Store the result of a snapshot request.
    ///
    /// Results for a thread that is no longer selected are dropped.
    pub fn apply_snapshot(&mut self, thread: ThreadId, result: RegscopeResult<Snapshot>)
    {
        if thread != self.current_thread() {
            return;
        }
        self.view = match result {
            Ok(snapshot) => {
                let rows = row_count(&snapshot);
                let selected = self.registers_state.selected().unwrap_or(0);
                self.registers_state.select(Some(selected.min(rows.saturating_sub(1))));
                RegisterView::Ready(snapshot)
            }
            Err(err) => RegisterView::Failed(err.describe()),
        };
    }

    /// Handle a keyboard event
    ///
    /// Returns `true` if the application should quit, `false` otherwise.
    pub fn handle_key_event(&mut self, key_event: crossterm::event::KeyEvent) -> bool
    {
        use crossterm::event::KeyCode;

        self.status_message = None;

        match key_event.code {
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => {
                self.should_quit = true;
                return true;
            }
            KeyCode::Char('r') => {
                self.refresh_requested = true;
            }
            KeyCode::Char('n') => self.select_thread(1),
            KeyCode::Char('p') => self.select_thread(self.threads.len() - 1),
            KeyCode::Up => {
                self.navigate_up();
            }
            KeyCode::Down => {
                self.navigate_down();
            }
            _ => {}
        }

        false
    }

    /// Move the thread selection forward by `step`, wrapping around.
    fn select_thread(&mut self, step: usize)
    {
        if self.threads.len() < 2 {
            self.status_message = Some("Only one thread to show".to_string());
            return;
        }
        self.selected_thread = (self.selected_thread + step) % self.threads.len();
        self.registers_state.select(Some(0));
        self.refresh_requested = true;
    }

    fn rows(&self) -> usize
    {
        match &self.view {
            RegisterView::Ready(snapshot) => row_count(snapshot),
            _ => 0,
        }
    }

    /// Navigate up in the register table
    fn navigate_up(&mut self)
    {
        let i = self.registers_state.selected().unwrap_or(0);
        let max = self.rows().saturating_sub(1);
        if max == 0 {
            return;
        }
        let next = if i == 0 { max } else { i - 1 };
        self.registers_state.select(Some(next));
    }

    /// Navigate down in the register table
    fn navigate_down(&mut self)
    {
        let i = self.registers_state.selected().unwrap_or(0);
        let max = self.rows().saturating_sub(1);
        if max == 0 {
            return;
        }
        let next = if i >= max { 0 } else { i + 1 };
        self.registers_state.select(Some(next));
    }
}

/// Table rows for a snapshot: one header per group plus one per register.
#[must_use]
pub fn row_count(snapshot: &Snapshot) -> usize
{
    snapshot.groups().len() + snapshot.len()
}
