//! Page content for each protected route.

pub mod accounts;
pub mod audit;
pub mod dashboard;
pub mod departments;
pub mod kpis;
pub mod leave;
pub mod performance;
pub mod profile;
pub mod projects;
pub mod tasks;

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use emsa_core::routing::Route;

use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, route: Route, area: Rect) {
    match route {
        Route::Dashboard => dashboard::render(frame, app, area),
        Route::Accounts | Route::Employees | Route::Users | Route::Team => {
            accounts::render(frame, app, route, area)
        }
        Route::Departments => departments::render(frame, app, area),
        Route::Projects => projects::render(frame, app, area),
        Route::Tasks => tasks::render(frame, app, area),
        Route::Kpis => kpis::render(frame, app, area),
        Route::LeaveRequests => leave::render(frame, app, area),
        Route::Performance => performance::render(frame, app, area),
        Route::AuditLogs => audit::render(frame, app, area),
        Route::Profile => profile::render(frame, app, area),
        Route::Login => {}
    }
}

/// Keys that do something on the current page for the current role.
pub fn key_hints(app: &App, route: Route) -> String {
    let mut hints: Vec<&str> = Vec::new();
    if app.can_create() {
        hints.push("[n]ew");
    }
    if app.can_edit() {
        hints.push("[e]dit");
    }
    if app.can_delete() {
        hints.push("[d]elete");
    }
    if app.can_toggle_active() {
        hints.push("[t]oggle active");
    }
    if app.can_reset_password() {
        hints.push("[p]assword");
    }
    match route {
        Route::Tasks => hints.push("[f]ilter"),
        Route::Accounts | Route::Employees | Route::Users => hints.push("[/]search [f]ilter"),
        Route::LeaveRequests => {
            if crate::app::LeaveScope::available(app.session.current_role()).len() > 1 {
                hints.push("[s]cope");
            }
            if app.can_review_leave() {
                hints.push("[a]pprove [x]reject");
            }
        }
        Route::Performance if app.can_self_appraise() => hints.push("[w]rite appraisal"),
        Route::AuditLogs => hints.push("[/]search"),
        Route::Profile => hints.push("[c]hange password"),
        _ => {}
    }
    hints.join(" ")
}

/// Table with a bordered title block, header row and the shared selection.
pub(crate) fn render_table(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: String,
    header: &[&'static str],
    rows: Vec<Row>,
    widths: &[Constraint],
) {
    let focused = app.focus == Focus::Content;
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if rows.is_empty() {
        let text = if app.loading { "Loading..." } else { "No records found" };
        let paragraph = Paragraph::new(Line::from(Span::styled(format!(" {}", text), styles::muted_style())))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(header.iter().map(|h| Cell::from(*h)))
        .style(styles::title_style())
        .height(1);

    let table = Table::new(rows, widths.to_vec())
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.selection));

    frame.render_stateful_widget(table, area, &mut state);
}

/// Label/value line used by detail panels.
pub(crate) fn field_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {:<22}", label), styles::muted_style()),
        Span::styled(value, styles::list_item_style()),
    ])
}
