//! Event log table.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::sim::LogEntry;

/// Cells for one log row: local time, line, voltage, message.
pub fn row_cells(entry: &LogEntry) -> [String; 4] {
    [
        entry.timestamp.with_timezone(&Local).format("%H:%M:%S").to_string(),
        entry.line_id.clone().unwrap_or_else(|| "System".to_string()),
        entry
            .voltage
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "N/A".to_string()),
        entry.message.clone(),
    ]
}

fn message_style(app: &App, entry: &LogEntry) -> Style {
    if entry.message.starts_with("TRIPPED") {
        Style::default().fg(app.theme.tripped)
    } else if entry.message.starts_with("DISASTER") {
        Style::default().fg(app.theme.warning).add_modifier(Modifier::BOLD)
    } else if entry.message.starts_with("RESTORED") {
        Style::default().fg(app.theme.on)
    } else {
        Style::default().fg(app.theme.info)
    }
}

/// Render the log, newest first.
///
/// With `selectable` the row at `app.log_scroll` is highlighted and kept in
/// view; otherwise only the most recent entries that fit are shown.
pub fn render(frame: &mut Frame, app: &App, area: Rect, selectable: bool) {
    let Some(ref data) = app.data else {
        return;
    };

    let header = Row::new(vec!["Time", "Line", "Voltage", "Event"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = data
        .logs
        .iter()
        .map(|entry| {
            let [time, line, voltage, message] = row_cells(entry);
            Row::new(vec![
                Cell::from(time).style(Style::default().add_modifier(Modifier::DIM)),
                Cell::from(line),
                Cell::from(voltage),
                Cell::from(message).style(message_style(app, entry)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(9),
        Constraint::Length(7),
        Constraint::Length(8),
        Constraint::Fill(1),
    ];

    let title = if data.logs.is_empty() {
        " Event Log (empty) ".to_string()
    } else if selectable {
        format!(" Event Log [{}/{}] ", app.log_scroll + 1, data.logs.len())
    } else {
        format!(" Recent Events ({}) ", data.logs.len())
    };

    let mut table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    let mut state = TableState::default();
    if selectable && !data.logs.is_empty() {
        table = table.row_highlight_style(app.theme.selected);
        state.select(Some(app.log_scroll.min(data.logs.len() - 1)));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
