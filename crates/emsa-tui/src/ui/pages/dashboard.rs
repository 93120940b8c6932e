use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use emsa_core::utils::{format_date, format_optional, truncate_string};

use crate::app::App;
use crate::ui::styles;

/// Render the Dashboard: stat cards on top, recent tasks and requests below.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(6)])
        .split(area);

    render_stats(frame, app, chunks[0]);

    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_recent_tasks(frame, app, lists[0]);
    render_recent_requests(frame, app, lists[1]);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let stats = &app.data.dashboard.stats;
    if stats.is_empty() {
        let text = if app.loading { " Loading..." } else { " No data" };
        frame.render_widget(
            Paragraph::new(Span::styled(text, styles::muted_style()))
                .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(false))),
            area,
        );
        return;
    }

    let constraints: Vec<Constraint> = stats
        .iter()
        .map(|_| Constraint::Ratio(1, stats.len() as u32))
        .collect();
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for ((label, value), card) in stats.iter().zip(cards.iter()) {
        let lines = vec![
            Line::from(Span::styled(format!(" {}", value), styles::title_style())),
            Line::from(Span::styled(format!(" {}", label), styles::muted_style())),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false));
        frame.render_widget(Paragraph::new(lines).block(block), *card);
    }
}

fn render_recent_tasks(frame: &mut Frame, app: &App, area: Rect) {
    let tasks = &app.data.dashboard.recent_tasks;
    let mut lines = Vec::new();
    if tasks.is_empty() {
        lines.push(Line::from(Span::styled(" No tasks assigned", styles::muted_style())));
    }
    for task in tasks {
        let status = task.status.as_deref();
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<12}", status.unwrap_or("-")), styles::status_style(status)),
            Span::styled(truncate_string(&task.title, 32), styles::list_item_style()),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                "              {} · due {}",
                format_optional(&task.project_name, "No project"),
                format_date(task.due_date)
            ),
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .title(" My Recent Tasks ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_recent_requests(frame: &mut Frame, app: &App, area: Rect) {
    let requests = &app.data.dashboard.recent_requests;
    let mut lines = Vec::new();
    if requests.is_empty() {
        lines.push(Line::from(Span::styled(" No requests yet", styles::muted_style())));
    }
    for request in requests {
        let status = request.status.as_deref();
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<10}", status.unwrap_or("-")), styles::status_style(status)),
            Span::styled(request.request_type.clone(), styles::list_item_style()),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                "            {} to {}",
                format_date(request.start_date),
                format_date(request.end_date)
            ),
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .title(" My Requests ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
