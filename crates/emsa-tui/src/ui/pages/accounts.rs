use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row},
    Frame,
};

use emsa_core::routing::Route;
use emsa_core::utils::{format_date, format_optional};

use crate::app::App;
use crate::ui::pages::{field_line, render_table};
use crate::ui::styles;

/// Accounts, Employees, Users and My Team share one table layout.
pub fn render(frame: &mut Frame, app: &App, route: Route, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let accounts = app.visible_accounts();
    let rows: Vec<Row> = accounts
        .iter()
        .map(|account| {
            let status_style = if account.active() {
                styles::success_style()
            } else {
                styles::error_style()
            };
            Row::new(vec![
                Cell::from(account.display_name()),
                Cell::from(account.username.clone()),
                Cell::from(format_optional(&account.role, "-")),
                Cell::from(format_optional(&account.department_name, "-")),
                Cell::from(Span::styled(account.status_label(), status_style)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Length(9),
        Constraint::Fill(2),
        Constraint::Length(8),
    ];

    let mut title = format!(" {} ({}) ", route.title(), accounts.len());
    if app.is_account_list() {
        title.push_str(&format!("- [f]ilter: {} ", app.account_filter_label()));
    }
    if !app.search_query.is_empty() {
        title.push_str(&format!("- search: \"{}\" ", app.search_query));
    }
    render_table(
        frame,
        app,
        chunks[0],
        title,
        &["Name", "Username", "Role", "Department", "Status"],
        rows,
        &widths,
    );

    render_detail(frame, app, chunks[1]);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.selected_account() {
        Some(account) => vec![
            Line::from(Span::styled(format!(" {}", account.display_name()), styles::title_style())),
            Line::from(""),
            field_line("Email", format_optional(&account.email, "-")),
            field_line("Phone", format_optional(&account.phone_number, "-")),
            field_line("Designation", format_optional(&account.designation, "-")),
            field_line("Department", format_optional(&account.department_name, "-")),
            field_line("Manager", format_optional(&account.reporting_manager_name, "-")),
            field_line("Hire date", format_date(account.hire_date)),
            field_line("Status", account.status_label().to_string()),
        ],
        None => vec![Line::from(Span::styled(" No account selected", styles::muted_style()))],
    };

    let block = Block::default()
        .title(" Details ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
