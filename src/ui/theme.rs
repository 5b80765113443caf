//! Theme configuration for the dashboard.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::sim::{AlertLevel, LineStatus};

/// Color and style theme for the dashboard.
///
/// Use [`Theme::auto_detect()`] to pick a theme from the terminal
/// background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Energized line, success alerts.
    pub on: Color,
    /// Tripped line, error alerts.
    pub tripped: Color,
    pub warning: Color,
    pub info: Color,
    /// Threshold reference lines in the chart.
    pub threshold: Color,
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for the selected row.
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub border_type: BorderType,
}

impl Theme {
    /// Dark theme for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            on: Color::Green,
            tripped: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
            threshold: Color::DarkGray,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Light theme for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            on: Color::Green,
            tripped: Color::Red,
            warning: Color::Magenta,
            info: Color::Blue,
            threshold: Color::Gray,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a line status badge.
    pub fn status_style(&self, status: LineStatus) -> Style {
        match status {
            LineStatus::On => Style::default().fg(self.on),
            LineStatus::Tripped => Style::default().fg(self.tripped).add_modifier(Modifier::BOLD),
        }
    }

    /// Style for an alert toast.
    pub fn alert_style(&self, level: AlertLevel) -> Style {
        let color = match level {
            AlertLevel::Error => self.tripped,
            AlertLevel::Success => self.on,
            AlertLevel::Info => self.info,
            AlertLevel::Warning => self.warning,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}
