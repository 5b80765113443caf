//! Voltage history chart for the selected line.

use chrono::Local;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols,
    text::{Line as TextLine, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::sim::{Line, Thresholds};

/// Padding above and below the plotted data, in volts.
const Y_MARGIN: f64 = 20.0;

/// Vertical bounds: data range widened by [`Y_MARGIN`] on both sides.
pub fn y_bounds(line: &Line) -> [f64; 2] {
    match line.history_range() {
        Some((lo, hi)) => [lo - Y_MARGIN, hi + Y_MARGIN],
        None => [line.voltage - Y_MARGIN, line.voltage + Y_MARGIN],
    }
}

fn points(line: &Line) -> Vec<(f64, f64)> {
    line.history
        .iter()
        .enumerate()
        .map(|(i, s)| (i as f64, s.voltage))
        .collect()
}

fn threshold_points(thresholds: &Thresholds, x_max: f64) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    (
        vec![(0.0, thresholds.min), (x_max, thresholds.min)],
        vec![(0.0, thresholds.max), (x_max, thresholds.max)],
    )
}

/// Render the chart, or a placeholder when nothing is selected.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(line) = app.selected_line() else {
        let placeholder = Paragraph::new("Waiting for data...")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block.title(" Voltage "));
        frame.render_widget(placeholder, area);
        return;
    };

    let data = points(line);
    let x_max = (data.len().saturating_sub(1) as f64).max(1.0);
    let (min_line, max_line) = threshold_points(&app.thresholds, x_max);
    let [y_min, y_max] = y_bounds(line);
    let trace_style = app.theme.status_style(line.status);
    let limit_style = Style::default().fg(app.theme.threshold);

    let datasets = vec![
        Dataset::default()
            .name(format!("min {:.0}", app.thresholds.min))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(limit_style)
            .data(&min_line),
        Dataset::default()
            .name(format!("max {:.0}", app.thresholds.max))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(limit_style)
            .data(&max_line),
        Dataset::default()
            .name(format!("{} {:.2}", line.id, line.voltage))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(trace_style)
            .data(&data),
    ];

    let time_label = |sample: Option<&crate::sim::Sample>| {
        sample
            .map(|s| s.time.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_default()
    };
    let first = time_label(line.history.front());
    let last = time_label(line.history.back());

    let title = TextLine::from(vec![
        Span::raw(format!(" {} {} ", line.id, line.name)),
        Span::styled(format!("{} ", line.status.label()), trace_style),
    ]);

    let chart = Chart::new(datasets)
        .block(block.title(title))
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(vec![TextLine::from(first), TextLine::from(last)]),
        )
        .y_axis(
            Axis::default()
                .title("V")
                .bounds([y_min, y_max])
                .labels(vec![
                    TextLine::from(format!("{y_min:.0}")),
                    TextLine::from(format!("{:.0}", (y_min + y_max) / 2.0)),
                    TextLine::from(format!("{y_max:.0}")),
                ]),
        );

    frame.render_widget(chart, area);
}
