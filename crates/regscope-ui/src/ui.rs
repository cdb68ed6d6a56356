//! UI rendering logic

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;

const HELP: &str = "↑/↓:Navigate | r:Refresh | n/p:Next/Prev thread | q/Esc:Quit";

/// Draw the UI
pub fn draw(frame: &mut Frame, app: &mut App)
{
    let footer_height = if app.status_message.is_some() { 4 } else { 3 };
    let chunks = Layout::vertical([
        Constraint::Length(3),             // Header
        Constraint::Min(0),                // Registers
        Constraint::Length(footer_height), // Help and status
    ])
    .split(frame.area());

    draw_header(frame, chunks[0], app);
    crate::widgets::draw_registers(frame, chunks[1], app);
    draw_footer(frame, chunks[2], app);
}

/// Draw the header bar
fn draw_header(frame: &mut Frame, area: Rect, app: &App)
{
    let title = format!(
        "Thread {} ({} of {})",
        app.current_thread(),
        app.selected_thread + 1,
        app.threads.len()
    );

    let header = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL).title("regscope"))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    frame.render_widget(header, area);
}

/// Draw the footer with help text
fn draw_footer(frame: &mut Frame, area: Rect, app: &App)
{
    let mut lines = vec![Line::from(HELP)];
    if let Some(message) = &app.status_message {
        lines.push(Line::from(Span::styled(message.clone(), Style::default().fg(Color::Yellow))));
    }

    let footer = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, area);
}
