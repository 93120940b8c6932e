use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Cell, Row},
    Frame,
};

use emsa_core::utils::{format_optional, truncate_string};

use crate::app::App;
use crate::ui::pages::render_table;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = app
        .data
        .departments
        .iter()
        .map(|dept| {
            Row::new(vec![
                Cell::from(dept.department_name.clone()),
                Cell::from(truncate_string(&format_optional(&dept.description, "-"), 40)),
                Cell::from(format!("{:>5}", dept.manager_count)),
                Cell::from(format!("{:>5}", dept.employee_count)),
                Cell::from(format!("{:>5}", dept.user_count)),
                Cell::from(format!("{:>5}", dept.headcount())),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(3),
        Constraint::Length(8),
        Constraint::Length(9),
        Constraint::Length(6),
        Constraint::Length(6),
    ];

    let title = format!(" Departments ({}) ", app.data.departments.len());
    render_table(
        frame,
        app,
        area,
        title,
        &["Name", "Description", "Managers", "Employees", "Users", "Total"],
        rows,
        &widths,
    );
}
