use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Wrap},
    Frame,
};

use emsa_core::utils::format_optional;

use crate::app::App;
use crate::ui::pages::{field_line, render_table};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let rows: Vec<Row> = app
        .data
        .reviews
        .iter()
        .map(|review| {
            let status = review.status.as_deref();
            Row::new(vec![
                Cell::from(format_optional(&review.employee_name, "-")),
                Cell::from(format_optional(&review.cycle_name, "-")),
                Cell::from(rating_stars(review.rating)),
                Cell::from(Span::styled(
                    status.unwrap_or("-").to_string(),
                    styles::status_style(status),
                )),
            ])
        })
        .collect();

    let title = format!(" Reviews ({}) ", app.data.reviews.len());
    render_table(
        frame,
        app,
        chunks[0],
        title,
        &["Employee", "Cycle", "Rating", "Status"],
        rows,
        &[
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Length(7),
            Constraint::Length(10),
        ],
    );

    render_detail(frame, app, chunks[1]);
}

fn rating_stars(rating: Option<i32>) -> String {
    match rating {
        Some(r) => {
            let r = r.clamp(0, 5) as usize;
            format!("{}{}", "★".repeat(r), "☆".repeat(5 - r))
        }
        None => "-".to_string(),
    }
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.selected_review() {
        Some(review) => {
            let mut lines = vec![
                field_line("Reviewer", format_optional(&review.reviewer_name, "-")),
                field_line(
                    "Increment",
                    review
                        .increment_recommended
                        .map(|i| format!("{:.1}%", i))
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Line::from(""),
                Line::from(Span::styled(" Self-appraisal", styles::highlight_style())),
                Line::from(format!(" {}", format_optional(&review.self_appraisal, "Not written yet"))),
                Line::from(""),
                Line::from(Span::styled(" Manager feedback", styles::highlight_style())),
                Line::from(format!(" {}", format_optional(&review.manager_feedback, "-"))),
            ];
            if app.can_self_appraise() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    " Press [w] to write your self-appraisal",
                    styles::muted_style(),
                )));
            }
            lines
        }
        None => vec![Line::from(Span::styled(" No review selected", styles::muted_style()))],
    };

    let block = Block::default()
        .title(" Review ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_stars() {
        assert_eq!(rating_stars(Some(3)), "★★★☆☆");
        assert_eq!(rating_stars(Some(9)), "★★★★★");
        assert_eq!(rating_stars(None), "-");
    }
}
