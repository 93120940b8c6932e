use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use emsa_core::routing::{GuardDecision, Route};

use crate::app::{App, AppState, Focus, LoginFocus};
use crate::forms::FormState;

use super::pages;
use super::styles;

/// Width of the sidebar column.
const SIDEBAR_WIDTH: u16 = 26;

const APP_NAME: &str = "EMSA";

pub fn render(frame: &mut Frame, app: &App) {
    match app.decision() {
        GuardDecision::Render { shell: true, route } => render_shell(frame, app, route),
        GuardDecision::Render { shell: false, .. } => render_login(frame, app),
        GuardDecision::Loading | GuardDecision::Redirect(_) => render_loading(frame),
    }

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::ConfirmingAction => render_confirm_overlay(frame, app),
        AppState::EditingForm => {
            if let Some(ref form) = app.form {
                render_form_overlay(frame, form);
            }
        }
        AppState::Normal | AppState::Searching | AppState::Quitting => {}
    }
}

fn render_loading(frame: &mut Frame) {
    let area = centered_rect_fixed(30, 3, frame.area());
    let paragraph = Paragraph::new(Line::from(Span::styled("  Loading...", styles::muted_style())))
        .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(false)));
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Login
// ============================================================================

fn render_login(frame: &mut Frame, app: &App) {
    let has_notice = app.status_message.is_some();
    let has_error = app.login_error.is_some();
    let height = 11 + if has_notice { 2 } else { 0 } + if has_error { 2 } else { 0 };
    let area = centered_rect_fixed(50, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(format!("  {}", APP_NAME), styles::title_style())),
        Line::from(Span::styled(
            format!("  {}", Route::Login.subtitle()),
            styles::muted_style(),
        )),
        Line::from(""),
    ];

    if let Some(ref notice) = app.status_message {
        lines.push(Line::from(Span::styled(format!("  {}", notice), styles::highlight_style())));
        lines.push(Line::from(""));
    }

    let username_focused = app.login_focus == LoginFocus::Username;
    let username_style = if username_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::styled("  Username: [", styles::muted_style()),
        Span::styled(format!("{:<20}{}", app.login_username, cursor), username_style),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let masked = "*".repeat(app.login_password.chars().count().min(20));
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::styled("  Password: [", styles::muted_style()),
        Span::styled(format!("{:<20}{}", masked, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    lines.push(Line::from(""));
    let button_focused = app.login_focus == LoginFocus::Button;
    let button = if button_focused { " ▶ Sign In ◀ " } else { "   Sign In   " };
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(vec![
        Span::raw("              ["),
        Span::styled(button, button_style),
        Span::raw("]"),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab: next field  Enter: sign in  Esc: quit",
        styles::muted_style(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Shell
// ============================================================================

fn render_shell(frame: &mut Frame, app: &App, route: Route) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(40)])
        .split(frame.area());

    render_sidebar(frame, app, route, columns[0]);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Page content
            Constraint::Length(2), // Status bar
        ])
        .split(columns[1]);

    render_header(frame, app, route, chunks[0]);
    render_content(frame, app, route, chunks[1]);
    render_status_bar(frame, app, route, chunks[2]);
}

fn render_sidebar(frame: &mut Frame, app: &App, route: Route, area: Rect) {
    let focused = app.focus == Focus::Sidebar;
    let mut lines = vec![
        Line::from(Span::styled(format!(" {}", APP_NAME), styles::title_style())),
        Line::from(""),
    ];

    if let Some(user) = app.session.user() {
        lines.push(Line::from(Span::styled(
            format!(" {}", user.display_name()),
            styles::list_item_style(),
        )));
        let role = match app.session.current_role() {
            Some(role) => role.as_str().to_string(),
            None => format!("{} (unrecognized)", user.role),
        };
        lines.push(Line::from(Span::styled(format!(" {}", role), styles::muted_style())));
        lines.push(Line::from(""));
    }

    for (i, item) in app.menu().iter().enumerate() {
        let active = item.route == route;
        let marker = if active { "▌" } else { " " };
        let style = if focused && i == app.nav_selection {
            styles::selected_style()
        } else {
            styles::nav_item_style(active)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, styles::nav_item_style(true)),
            Span::styled(format!("{:<22}", item.label), style),
        ]));
    }

    let used = lines.len() as u16 + 2;
    let spacer = area.height.saturating_sub(used + 1);
    for _ in 0..spacer {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![
        Span::styled(" [L]", styles::help_key_style()),
        Span::styled(" Sign out", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(styles::border_style(focused))
        .style(styles::sidebar_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_header(frame: &mut Frame, app: &App, route: Route, area: Rect) {
    let subtitle = match (route, app.session.user()) {
        (Route::Dashboard, Some(user)) => format!("Welcome back, {}!", user.first_name()),
        _ => route.subtitle().to_string(),
    };
    let date = Local::now().format("%A, %B %-d, %Y").to_string();
    let title = format!("  {}", route.title());
    let left_len = title.chars().count() + subtitle.chars().count() + 3;
    let padding = (area.width as usize).saturating_sub(left_len + date.chars().count() + 2);

    let line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::styled(" · ", styles::muted_style()),
        Span::styled(subtitle, styles::muted_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(date, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_content(frame: &mut Frame, app: &App, route: Route, area: Rect) {
    if let Some(ref error) = app.page_error {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(5)])
            .split(area);
        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {}", error), styles::error_style())),
            chunks[0],
        );
        pages::render(frame, app, route, chunks[1]);
    } else {
        pages::render(frame, app, route, area);
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, route: Route, area: Rect) {
    let left_text = if app.state == AppState::Searching {
        format!(" Search: {}▌", app.search_query)
    } else if app.loading {
        " Loading...".to_string()
    } else if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        String::new()
    };

    let right_text = format!(" {} [r]efresh [?]help [q]uit ", pages::key_hints(app, route));
    let width = area.width as usize;
    let padding = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());

    let left_style = if app.state == AppState::Searching {
        styles::search_style()
    } else {
        styles::muted_style()
    };

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(Paragraph::new(status_line).style(styles::status_bar_style()), area);
}

// ============================================================================
// Overlays
// ============================================================================

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(56, 30, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(format!("  {} version {}", APP_NAME, version), styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("Tab", "Switch focus (sidebar ↔ page)"),
        help_line("↑/↓", "Move selection"),
        help_line("PgUp/PgDn", "Scroll by page"),
        help_line("Enter", "Open page (sidebar)"),
        help_line("r", "Reload page"),
        help_line("L", "Sign out"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("n", "New record"),
        help_line("e", "Edit selected"),
        help_line("d", "Delete selected"),
        help_line("t", "Activate / deactivate account"),
        help_line("p", "Reset password"),
        help_line("f", "Filter by status, role or department"),
        help_line("s", "Switch leave scope"),
        help_line("a/x", "Approve / reject request"),
        help_line("w", "Write self-appraisal"),
        help_line("c", "Change password (profile)"),
        help_line("/", "Search accounts or audit logs"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Forms", styles::highlight_style())),
        help_line("Tab/↑/↓", "Move between fields"),
        help_line("←/→", "Change option"),
        help_line("Enter", "Submit"),
        help_line("Esc", "Cancel"),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_confirm_overlay(frame: &mut Frame, app: &App) {
    let Some(ref pending) = app.pending else {
        return;
    };
    let area = centered_rect_fixed(56, 8, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", pending.prompt), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to confirm, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Confirm ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

fn render_form_overlay(frame: &mut Frame, form: &FormState) {
    let height = form.fields.len() as u16 + 6 + if form.error.is_some() { 2 } else { 0 };
    let area = centered_rect_fixed(64, height, frame.area());
    frame.render_widget(Clear, area);

    let label_width = form
        .fields
        .iter()
        .map(|f| f.label.chars().count() + 1)
        .max()
        .unwrap_or(0);

    let mut lines = vec![Line::from("")];
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let marker = if field.required { "*" } else { " " };
        let value_style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let value = if field.is_choice() {
            format!("◀ {} ▶", field.display_value())
        } else if focused {
            format!("{}▌", field.display_value())
        } else {
            field.display_value()
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {}", marker), styles::highlight_style()),
            Span::styled(
                format!("{:<width$} ", field.label, width = label_width),
                styles::muted_style(),
            ),
            Span::styled(value, value_style),
        ]));
    }

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Enter: save  Tab: next field  ←/→: change option  Esc: cancel",
        styles::muted_style(),
    )));

    let block = Block::default()
        .title(format!(" {} ", form.title))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed_fits() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect_fixed(50, 10, outer);
        assert_eq!(inner, Rect::new(25, 15, 50, 10));
    }

    #[test]
    fn test_centered_rect_fixed_clamps() {
        let outer = Rect::new(0, 0, 20, 5);
        let inner = centered_rect_fixed(50, 10, outer);
        assert_eq!(inner.width, 20);
        assert_eq!(inner.height, 5);
    }
}
