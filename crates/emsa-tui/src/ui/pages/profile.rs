use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use emsa_core::utils::{format_date, format_optional};

use crate::app::App;
use crate::ui::pages::field_line;
use crate::ui::styles;

/// Render the signed-in user's own account.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref account) = app.data.profile else {
        let text = if app.loading { " Loading..." } else { " Profile unavailable" };
        frame.render_widget(
            Paragraph::new(Span::styled(text, styles::muted_style()))
                .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(false))),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let personal = vec![
        Line::from(Span::styled(format!(" {}", account.display_name()), styles::title_style())),
        Line::from(Span::styled(
            format!(" {}", format_optional(&account.designation, "")),
            styles::muted_style(),
        )),
        Line::from(""),
        field_line("Username", account.username.clone()),
        field_line("Email", format_optional(&account.email, "-")),
        field_line("Phone", format_optional(&account.phone_number, "-")),
        field_line("Address", format_optional(&account.address, "-")),
        field_line("Date of birth", format_date(account.date_of_birth)),
        Line::from(""),
        Line::from(Span::styled(" Emergency contact", styles::highlight_style())),
        field_line("Name", format_optional(&account.emergency_contact_name, "-")),
        field_line("Phone", format_optional(&account.emergency_contact_phone, "-")),
    ];

    let work = vec![
        field_line("Role", format_optional(&account.role, "-")),
        field_line("Department", format_optional(&account.department_name, "-")),
        field_line("Reporting manager", format_optional(&account.reporting_manager_name, "-")),
        field_line("Hire date", format_date(account.hire_date)),
        field_line("Status", account.status_label().to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled(" [e]", styles::help_key_style()),
            Span::styled(" Edit profile   ", styles::muted_style()),
            Span::styled("[c]", styles::help_key_style()),
            Span::styled(" Change password", styles::muted_style()),
        ]),
    ];

    let block = |title: &'static str| {
        Block::default()
            .title(title)
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false))
    };

    frame.render_widget(Paragraph::new(personal).block(block(" Personal ")), chunks[0]);
    frame.render_widget(Paragraph::new(work).block(block(" Work ")), chunks[1]);
}
