//! Color palette and style constants for the garage panel.

use ratatui::style::{Color, Modifier, Style};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_BG: Color = Color::Rgb(18, 18, 18);
pub const C_ACCENT: Color = Color::Rgb(255, 95, 95);
pub const C_GARAGED: Color = Color::Rgb(80, 200, 120);
pub const C_OUTSIDE: Color = Color::Rgb(255, 184, 80);
pub const C_IMPOUNDED: Color = Color::Rgb(255, 80, 80);
pub const C_MUTED: Color = Color::Rgb(72, 72, 88);
pub const C_SEPARATOR: Color = Color::Rgb(40, 40, 52);
pub const C_SECONDARY: Color = Color::Rgb(115, 115, 138);
pub const C_PRIMARY: Color = Color::Rgb(210, 210, 225);
pub const C_SELECTION_BG: Color = Color::Rgb(28, 28, 40);
pub const C_PANEL_BORDER: Color = Color::Rgb(40, 40, 52);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(120, 100, 200);
pub const C_FILTER_BG: Color = Color::Rgb(20, 20, 32);
pub const C_FILTER_FG: Color = Color::Rgb(255, 200, 80);
pub const C_FAVORITE: Color = Color::Rgb(255, 210, 50);
pub const C_SHARED: Color = Color::Rgb(80, 140, 200);
pub const C_GAUGE_OK: Color = Color::Rgb(80, 200, 120);
pub const C_GAUGE_LOW: Color = Color::Rgb(255, 184, 80);
pub const C_GAUGE_CRITICAL: Color = Color::Rgb(255, 80, 80);
pub const C_FEE: Color = Color::Rgb(255, 200, 80);
pub const C_TOAST_INFO: Color = Color::Rgb(80, 160, 220);
pub const C_TOAST_SUCCESS: Color = Color::Rgb(80, 200, 120);
pub const C_TOAST_WARNING: Color = Color::Rgb(255, 184, 80);
pub const C_TOAST_ERROR: Color = Color::Rgb(255, 95, 95);

use garage_proto::model::VehicleStatus;

pub fn status_color(status: VehicleStatus) -> Color {
    match status {
        VehicleStatus::Garaged => C_GARAGED,
        VehicleStatus::Outside => C_OUTSIDE,
        VehicleStatus::Impounded => C_IMPOUNDED,
        VehicleStatus::Unknown => C_MUTED,
    }
}

/// Color for a 0–100 gauge value.
pub fn gauge_color(value: f64) -> Color {
    if value < 25.0 {
        C_GAUGE_CRITICAL
    } else if value < 50.0 {
        C_GAUGE_LOW
    } else {
        C_GAUGE_OK
    }
}

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_default() -> Style {
    Style::default().fg(C_PRIMARY)
}

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_accent() -> Style {
    Style::default().fg(C_ACCENT)
}

pub fn style_selected() -> Style {
    Style::default().bg(C_SELECTION_BG).fg(C_PRIMARY)
}

pub fn style_selected_focused() -> Style {
    Style::default()
        .bg(C_SELECTION_BG)
        .fg(C_PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}
