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

/// Render the Tasks table, honoring the status filter.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let tasks = app.visible_tasks();

    let rows: Vec<Row> = tasks
        .iter()
        .map(|task| {
            let status = task.status.as_deref();
            let priority = task.priority.as_deref();
            Row::new(vec![
                Cell::from(task.title.clone()),
                Cell::from(format_optional(&task.project_name, "-")),
                Cell::from(format_optional(&task.assigned_to_name, "Unassigned")),
                Cell::from(Span::styled(status.unwrap_or("-").to_string(), styles::status_style(status))),
                Cell::from(Span::styled(priority.unwrap_or("-").to_string(), styles::priority_style(priority))),
                Cell::from(format_date(task.due_date)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(12),
    ];

    let filter = app.task_filter.unwrap_or("ALL");
    let title = format!(" Tasks ({}) - [f]ilter: {} ", tasks.len(), filter);
    render_table(
        frame,
        app,
        area,
        title,
        &["Title", "Project", "Assignee", "Status", "Priority", "Due"],
        rows,
        &widths,
    );
}
