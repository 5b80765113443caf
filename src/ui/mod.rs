//! Terminal rendering.
//!
//! [`render`] draws one full frame: header, tabs, controls, the active view
//! and the status bar, then live alert toasts and the help overlay when open.

pub mod chart;
pub mod common;
pub mod lines;
pub mod log;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

/// Smallest terminal the dashboard will draw into.
pub const MIN_WIDTH: u16 = 70;
pub const MIN_HEIGHT: u16 = 20;

/// Draw the whole dashboard.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let top = (area.height / 2).saturating_sub(2);
        let centered = Rect::new(0, top, area.width, 5u16.min(area.height - top));
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Length(1), // Tabs
        Constraint::Length(2), // Controls
        Constraint::Min(10),   // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);
    common::render_controls(frame, app, chunks[2]);

    match app.current_view {
        View::Lines => render_lines_view(frame, app, chunks[3]),
        View::EventLog => log::render(frame, app, chunks[3], true),
    }

    common::render_status_bar(frame, app, chunks[4]);
    common::render_alerts(frame, app, chunks[3]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

fn render_lines_view(frame: &mut Frame, app: &App, area: Rect) {
    let table_height = app
        .data
        .as_ref()
        .map(|d| u16::try_from(d.lines.len()).unwrap_or(u16::MAX).saturating_add(3))
        .unwrap_or(3);

    let [top, bottom] =
        Layout::vertical([Constraint::Max(table_height), Constraint::Min(6)]).areas(area);
    let [chart_area, log_area] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(bottom);

    lines::render(frame, app, top);
    chart::render(frame, app, chart_area);
    log::render(frame, app, log_area, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_LINE_COUNT;
    use crate::sim::{
        alert, Alert, AlertLevel, ScriptedRandom, Simulation, SimulationClock, SimulationParams,
    };
    use chrono::Utc;
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        app_with(SimulationParams::default())
    }

    fn app_with(params: SimulationParams) -> App {
        let (tx, rx) = alert::channel();
        let sim = Simulation::new(
            params,
            Box::new(ScriptedRandom::new([0.5])),
            tx,
            Utc::now(),
        );
        App::new(SimulationClock::new(sim).start(), rx, 5.0, Theme::dark())
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test(start_paused = true)]
    async fn draws_lines_view() {
        let mut app = app();
        app.reload_data();

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = screen(&terminal);

        assert!(text.contains("LINEWATCH"));
        assert!(text.contains("LT-1"));
        assert!(text.contains("LT-8"));
        assert!(text.contains("230.00 V"));
        assert!(text.contains("Min 180V"));
        app.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn small_terminal_shows_guard() {
        let mut app = app();
        app.reload_data();

        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        assert!(screen(&terminal).contains("Terminal too small"));
        app.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn live_alerts_stack_as_toasts() {
        let mut app = app();
        app.reload_data();
        app.alerts.push_front(Alert {
            raised_at: std::time::Instant::now() - std::time::Duration::from_secs(10),
            ..Alert::new(AlertLevel::Info, "long gone")
        });
        app.alerts.push_front(Alert::new(AlertLevel::Warning, "disaster drill"));
        app.alerts.push_front(Alert::new(AlertLevel::Error, "LT-2 tripped"));
        app.alerts.push_front(Alert::new(AlertLevel::Success, "LT-2 restored"));

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = screen(&terminal);

        assert!(text.contains(" Alerts "));
        assert!(text.contains("disaster drill"));
        assert!(text.contains("LT-2 tripped"));
        assert!(text.contains("LT-2 restored"));
        assert!(!text.contains("long gone"));
        app.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn many_lines_fit_the_lines_view() {
        let mut app = app_with(SimulationParams {
            line_count: MAX_LINE_COUNT,
            ..SimulationParams::default()
        });
        app.reload_data();

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = screen(&terminal);

        assert!(text.contains("LT-1"));
        assert!(text.contains("Voltage"));
        app.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn help_overlay_lists_operator_keys() {
        let mut app = app();
        app.reload_data();
        app.toggle_help();

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        assert!(screen(&terminal).contains("Trigger disaster event"));
        app.shutdown().await;
    }
}
