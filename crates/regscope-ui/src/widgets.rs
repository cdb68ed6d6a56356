//! Widget components for displaying registers

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};
use ratatui::Frame;
use regscope_core::snapshot::Snapshot;

use crate::app::{App, RegisterView};
use crate::property::{DebugProperty, GroupProperty, InfoFields};

/// Draw the registers view
///
/// Groups appear as header rows in schema order, each followed by its
/// registers. A failed request is shown as a single message instead.
pub fn draw_registers(frame: &mut Frame, area: Rect, app: &mut App)
{
    let title = format!("Registers - thread {}", app.current_thread());
    let block = Block::default().borders(Borders::ALL).title(title);

    let snapshot = match &app.view {
        RegisterView::Loading => {
            let loading = Paragraph::new("Loading registers...")
                .block(block)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(loading, area);
            return;
        }
        RegisterView::Failed(message) => {
            let error = Paragraph::new(format!("Error reading registers: {message}"))
                .block(block)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(error, area);
            return;
        }
        RegisterView::Ready(snapshot) => snapshot,
    };

    let table = Table::new(register_rows(snapshot), [Constraint::Length(18), Constraint::Min(10)])
        .block(block)
        .header(Row::new(vec![
            Cell::from("Register").style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from("Value").style(Style::default().add_modifier(Modifier::BOLD)),
        ]))
        .row_highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    frame.render_stateful_widget(table, area, &mut app.registers_state);
}

/// Rows of the register table for `snapshot`.
#[must_use]
pub fn register_rows(snapshot: &Snapshot) -> Vec<Row<'static>>
{
    let group_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut rows = Vec::new();

    for group in snapshot.groups() {
        let property = GroupProperty::new(group.clone());
        let name = property.info(InfoFields::NAME).name.unwrap_or_default();
        rows.push(
            Row::new(vec![
                Cell::from(name),
                Cell::from(format!("({} registers)", group.group().count())),
            ])
            .style(group_style),
        );

        let children = property.children(InfoFields::NAME | InfoFields::VALUE).unwrap_or_default();
        for child in children {
            rows.push(Row::new(vec![
                Cell::from(format!("  {}", child.name.unwrap_or_default())),
                Cell::from(child.value.unwrap_or_default()),
            ]));
        }
    }

    rows
}

#[cfg(test)]
mod tests
{
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use regscope_core::detect::FirstNameDetector;
    use regscope_core::error::RegscopeError;
    use regscope_core::schema::Schema;
    use regscope_core::types::ThreadId;

    use super::*;

    fn render(app: &mut App, width: u16) -> String
    {
        let mut terminal = Terminal::new(TestBackend::new(width, 12)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                draw_registers(frame, area, app);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn ready_app() -> App
    {
        let names: Vec<String> = ["eax", "", "ebx", "xmm0dh"].iter().map(|s| (*s).to_string()).collect();
        let snapshot = Schema::build(&names, &FirstNameDetector).assemble(
            ThreadId(1),
            vec![Some("0x2a".to_string()), None, None, Some("0x0".to_string())],
        );
        let mut app = App::new(vec![ThreadId(1)]);
        app.take_refresh();
        app.apply_snapshot(ThreadId(1), Ok(snapshot));
        app
    }

    #[test]
    fn test_rows_follow_schema_order()
    {
        let app = ready_app();
        let RegisterView::Ready(snapshot) = &app.view else {
            panic!("snapshot not applied");
        };
        // CPU header, eax, ebx, SSE2 header, xmm0dh
        assert_eq!(register_rows(snapshot).len(), 5);
    }

    #[test]
    fn test_draw_snapshot()
    {
        let text = render(&mut ready_app(), 48);
        assert!(text.contains("Registers - thread 1"));
        assert!(text.contains("CPU"));
        assert!(text.contains("(2 registers)"));
        assert!(text.contains("eax"));
        assert!(text.contains("0x2a"));
        assert!(text.contains("??"));
        assert!(text.contains("SSE2"));

        let cpu = text.find("CPU").unwrap();
        let sse = text.find("SSE2").unwrap();
        let ebx = text.find("ebx").unwrap();
        assert!(cpu < ebx && ebx < sse);
    }

    #[test]
    fn test_draw_failure_message()
    {
        let mut app = App::new(vec![ThreadId(4)]);
        app.take_refresh();
        app.apply_snapshot(
            ThreadId(4),
            Err(RegscopeError::Backend {
                command: "data-list-register-values".to_string(),
                message: "Invalid thread id".to_string(),
            }),
        );

        let text = render(&mut app, 120);
        assert!(text.contains("Error reading registers"));
        assert!(text.contains("Invalid thread id"));
        assert!(!text.contains("Register "));
    }

    #[test]
    fn test_draw_loading()
    {
        let mut app = App::new(Vec::new());
        assert!(render(&mut app, 48).contains("Loading registers..."));
    }
}
