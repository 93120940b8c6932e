use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Cell, Row},
    Frame,
};

use emsa_core::utils::{format_optional, format_timestamp, truncate_string};

use crate::app::App;
use crate::ui::pages::render_table;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let logs = app.visible_audit_logs();

    let rows: Vec<Row> = logs
        .iter()
        .map(|log| {
            let entity = match (&log.entity_name, log.entity_id) {
                (Some(name), Some(id)) => format!("{} #{}", name, id),
                (Some(name), None) => name.clone(),
                _ => "-".to_string(),
            };
            Row::new(vec![
                Cell::from(format_timestamp(log.created_at)),
                Cell::from(format_optional(&log.account_username, "system")),
                Cell::from(log.action.clone()),
                Cell::from(entity),
                Cell::from(truncate_string(&format_optional(&log.details, ""), 50)),
                Cell::from(format_optional(&log.ip_address, "-")),
            ])
        })
        .collect();

    let title = if app.search_query.is_empty() {
        format!(" Audit Logs ({}) ", logs.len())
    } else {
        format!(
            " Audit Logs ({} of {}) - \"{}\" ",
            logs.len(),
            app.data.audit_logs.len(),
            app.search_query
        )
    };

    render_table(
        frame,
        app,
        area,
        title,
        &["Time", "User", "Action", "Entity", "Details", "IP"],
        rows,
        &[
            Constraint::Length(18),
            Constraint::Length(14),
            Constraint::Length(18),
            Constraint::Length(16),
            Constraint::Fill(3),
            Constraint::Length(15),
        ],
    );
}
