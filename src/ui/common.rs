//! Common UI components shared across views.
//!
//! Header bar, tab bar, controls bar, status bar, alert toasts and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::sim::{status_counts, LineStatus};

/// Render the header bar with the fleet overview.
///
/// Displays: status indicator, ON/TRIPPED counts, tick counter.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            Span::styled(" LINEWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Starting..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let (on, tripped) = status_counts(&data.lines);
    let overall = if tripped > 0 {
        LineStatus::Tripped
    } else {
        LineStatus::On
    };

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.status_style(overall)),
        Span::styled("LINEWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(on.to_string(), Style::default().fg(app.theme.on)),
        Span::raw(" on "),
        if tripped > 0 {
            Span::styled(tripped.to_string(), app.theme.status_style(LineStatus::Tripped))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" tripped │ "),
        Span::styled(
            data.lines.len().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" lines │ "),
        Span::raw(format!("tick {}", data.tick)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = [View::Lines, View::EventLog]
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let selected = match app.current_view {
        View::Lines => 0,
        View::EventLog => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the controls bar with the active thresholds and operator keys.
pub fn render_controls(frame: &mut Frame, app: &App, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let line = Line::from(vec![
        Span::raw(" Min "),
        Span::styled(format!("{:.0}V", app.thresholds.min), bold),
        Span::styled(" [/] ", dim),
        Span::raw("  Max "),
        Span::styled(format!("{:.0}V", app.thresholds.max), bold),
        Span::styled(" {/} ", dim),
        Span::raw("  │ "),
        Span::styled("r", Style::default().fg(app.theme.highlight)),
        Span::raw(":reset "),
        Span::styled("d", Style::default().fg(app.theme.warning)),
        Span::raw(":disaster "),
        Span::styled("e", Style::default().fg(app.theme.highlight)),
        Span::raw(":export"),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Render the status bar at the bottom.
///
/// Priority: operator status message, latest live alert, key hints.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(alert) = app.active_alerts().next() {
        let line = Line::from(vec![
            Span::styled(format!(" {} ", alert.level.label()), app.theme.alert_style(alert.level)),
            Span::raw(alert.message.clone()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let status = if app.data.is_some() {
        let updated = app
            .last_updated
            .map(|t| format!("Updated {:.1}s ago", t.elapsed().as_secs_f64()))
            .unwrap_or_default();

        let controls = match app.current_view {
            View::Lines => {
                "↑↓:select r:reset d:disaster [ ]{ }:limits Tab:switch ?:help q:quit"
            }
            View::EventLog => "↑↓:scroll Home/End Tab:switch ?:help q:quit",
        };

        format!(" {} | {} | {}", app.source_description(), updated, controls)
    } else {
        " Starting... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render live alerts as a toast stack in the top-right corner of `area`.
///
/// Newest on top. Nothing is drawn once every alert has expired.
pub fn render_alerts(frame: &mut Frame, app: &App, area: Rect) {
    let toasts: Vec<Line> = app
        .active_alerts()
        .map(|alert| {
            Line::from(vec![
                Span::styled(
                    format!(" {:<5} ", alert.level.label()),
                    app.theme.alert_style(alert.level),
                ),
                Span::raw(alert.message.clone()),
            ])
        })
        .collect();
    if toasts.is_empty() {
        return;
    }

    let width = 56u16.min(area.width);
    let height = u16::try_from(toasts.len())
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .min(area.height);
    let toast_area = Rect::new(area.x + area.width - width, area.y, width, height);

    let block = Block::default()
        .title(" Alerts ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Clear, toast_area);
    frame.render_widget(Paragraph::new(toasts).block(block), toast_area);
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab 1/2     Switch views"),
        Line::from("  ↑/↓ j/k     Select line / scroll log"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        section(" Operator"),
        Line::from("  r Enter     Reset selected tripped line"),
        Line::from("  d           Trigger disaster event"),
        Line::from("  [ ]         Lower/raise min threshold"),
        Line::from("  { }         Lower/raise max threshold"),
        Line::from(""),
        section(" General"),
        Line::from("  e           Export to JSON"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 46u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
