//! # regscope-ui
//!
//! Register display for regscope.
//!
//! - [`property`]: read-only property nodes for groups and registers, for
//!   hosts that render registers as an expandable tree
//! - [`Tui`]: an interactive terminal register view built on `ratatui`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use regscope_core::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::from_env()?;
//! let backend = MiBackend::spawn(&config)?;
//! let channel = OperationChannel::spawn(backend, config.backend_timeout)?;
//! let registers = Arc::new(RegisterCollection::new(Arc::new(channel)));
//!
//! regscope_ui::run_tui(registers, vec![ThreadId(1)]).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod event;
pub mod property;
pub mod tui;
pub mod ui;
pub mod widgets;

use std::sync::Arc;

use regscope_core::collection::RegisterCollection;
use regscope_core::types::ThreadId;

pub use app::App;
pub use tui::Tui;

/// Run the register view until the user quits
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up, drawn to or restored.
pub async fn run_tui(registers: Arc<RegisterCollection>, threads: Vec<ThreadId>) -> std::io::Result<()>
{
    let mut tui = Tui::new()?;
    tui.run(registers, threads).await
}
