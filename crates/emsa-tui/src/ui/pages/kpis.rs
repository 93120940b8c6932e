use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Cell, Row},
    Frame,
};

use emsa_core::utils::{format_optional, format_timestamp};

use crate::app::App;
use crate::ui::pages::render_table;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = app
        .data
        .kpis
        .iter()
        .map(|kpi| {
            let status = kpi.status.as_deref();
            Row::new(vec![
                Cell::from(kpi.title.clone()),
                Cell::from(format_optional(&kpi.employee_name, "-")),
                Cell::from(kpi.progress_display()),
                Cell::from(Span::styled(status.unwrap_or("-").to_string(), styles::status_style(status))),
                Cell::from(format_timestamp(kpi.due_date)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Length(16),
        Constraint::Length(13),
        Constraint::Length(18),
    ];

    let title = format!(" KPIs ({}) ", app.data.kpis.len());
    render_table(
        frame,
        app,
        area,
        title,
        &["KPI", "Employee", "Achieved/Target", "Status", "Due"],
        rows,
        &widths,
    );
}
