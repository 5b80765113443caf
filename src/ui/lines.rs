//! Lines table.
//!
//! One row per feeder line with its reading, a trend sparkline over the
//! retained history and a status badge.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::sim::Line;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Samples shown in the trend column.
const SPARKLINE_WIDTH: usize = 16;

/// Render the lines table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let header = Row::new(vec![
        Cell::from("Line"),
        Cell::from("Name"),
        Cell::from("Voltage"),
        Cell::from("Trend"),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = data
        .lines
        .iter()
        .map(|line| {
            let status_style = app.theme.status_style(line.status);
            let voltage_style = if app.thresholds.contains(line.voltage) {
                Style::default()
            } else {
                status_style
            };

            Row::new(vec![
                Cell::from(line.id.clone()),
                Cell::from(line.name.clone()),
                Cell::from(format!("{:.2} V", line.voltage)).style(voltage_style),
                Cell::from(sparkline(line)).style(status_style),
                Cell::from(line.status.label()).style(status_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(7),
        Constraint::Fill(2),
        Constraint::Length(10),
        Constraint::Min(SPARKLINE_WIDTH as u16),
        Constraint::Length(8),
    ];

    let selected = app.selected_line_index.min(data.lines.len().saturating_sub(1));
    let title = format!(
        " Feeder Lines ({}/{}) ",
        selected + 1,
        data.lines.len()
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

/// Trend of the most recent samples scaled to the line's own range.
fn sparkline(line: &Line) -> String {
    let Some((lo, hi)) = line.history_range() else {
        return " ".repeat(SPARKLINE_WIDTH);
    };
    let span = hi - lo;
    let skip = line.history.len().saturating_sub(SPARKLINE_WIDTH);

    line.history
        .iter()
        .skip(skip)
        .map(|s| {
            let level = if span > 0.0 {
                ((s.voltage - lo) / span * 7.0).round() as usize
            } else {
                3
            };
            SPARKLINE_CHARS[level.min(7)]
        })
        .collect()
}
