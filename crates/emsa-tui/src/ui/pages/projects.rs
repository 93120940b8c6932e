use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Cell, Row},
    Frame,
};

use emsa_core::utils::{format_date, format_optional};

use crate::app::App;
use crate::ui::pages::render_table;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = app
        .data
        .projects
        .iter()
        .map(|project| {
            let status = project.status.as_deref();
            Row::new(vec![
                Cell::from(project.project_name.clone()),
                Cell::from(format_optional(&project.manager_name, "-")),
                Cell::from(Span::styled(status.unwrap_or("-").to_string(), styles::status_style(status))),
                Cell::from(format_date(project.start_date)),
                Cell::from(format_date(project.end_date)),
                Cell::from(format!("{:>5}", project.task_count)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(6),
    ];

    let title = format!(" Projects ({}) ", app.data.projects.len());
    render_table(
        frame,
        app,
        area,
        title,
        &["Project", "Manager", "Status", "Start", "End", "Tasks"],
        rows,
        &widths,
    );
}
