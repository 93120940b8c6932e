use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row},
    Frame,
};

use emsa_core::utils::{format_date, format_optional, truncate_string};

use crate::app::{App, LeaveScope};
use crate::ui::pages::render_table;
use crate::ui::styles;

/// Render the scope tabs and the requests for the selected scope.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    render_scope_tabs(frame, app, chunks[0]);

    let show_owner = app.leave_scope != LeaveScope::Mine;
    let rows: Vec<Row> = app
        .data
        .leave_requests
        .iter()
        .map(|request| {
            let status = request.status.as_deref();
            let days = request
                .days()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            let mut cells = Vec::with_capacity(7);
            if show_owner {
                cells.push(Cell::from(format_optional(&request.account_name, "-")));
            }
            cells.push(Cell::from(request.request_type.clone()));
            cells.push(Cell::from(format_date(request.start_date)));
            cells.push(Cell::from(format_date(request.end_date)));
            cells.push(Cell::from(format!("{:>4}", days)));
            cells.push(Cell::from(Span::styled(
                status.unwrap_or("-").to_string(),
                styles::status_style(status),
            )));
            cells.push(Cell::from(truncate_string(
                &format_optional(&request.description, ""),
                40,
            )));
            Row::new(cells)
        })
        .collect();

    let title = format!(" {} ({}) ", app.leave_scope.title(), app.data.leave_requests.len());
    if show_owner {
        render_table(
            frame,
            app,
            chunks[1],
            title,
            &["Employee", "Type", "From", "To", "Days", "Status", "Description"],
            rows,
            &[
                Constraint::Fill(2),
                Constraint::Length(14),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(5),
                Constraint::Length(9),
                Constraint::Fill(3),
            ],
        );
    } else {
        render_table(
            frame,
            app,
            chunks[1],
            title,
            &["Type", "From", "To", "Days", "Status", "Description"],
            rows,
            &[
                Constraint::Length(14),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(5),
                Constraint::Length(9),
                Constraint::Fill(3),
            ],
        );
    }
}

fn render_scope_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let scopes = LeaveScope::available(app.session.current_role());
    let mut spans = vec![Span::raw(" ")];
    for (i, scope) in scopes.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let style = if *scope == app.leave_scope {
            styles::nav_item_style(true)
        } else {
            styles::muted_style()
        };
        spans.push(Span::styled(scope.title(), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
