use ratatui::style::{Color, Modifier, Style};

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);
const SIDEBAR_BG: Color = Color::Rgb(24, 28, 36);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn nav_item_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn sidebar_style() -> Style {
    Style::default().bg(SIDEBAR_BG)
}

pub fn search_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

/// Colors a backend status value (task, leave, project, review, KPI).
pub fn status_style(status: Option<&str>) -> Style {
    match status {
        Some("DONE" | "APPROVED" | "ACHIEVED" | "COMPLETED" | "ACTIVE" | "REVIEWED") => {
            success_style()
        }
        Some("REJECTED" | "NOT_ACHIEVED" | "CANCELLED") => error_style(),
        Some("PENDING" | "IN_PROGRESS" | "REVIEW" | "SUBMITTED" | "ON_HOLD") => highlight_style(),
        _ => list_item_style(),
    }
}

pub fn priority_style(priority: Option<&str>) -> Style {
    match priority {
        Some("HIGH") => error_style(),
        Some("MEDIUM") => highlight_style(),
        _ => muted_style(),
    }
}
