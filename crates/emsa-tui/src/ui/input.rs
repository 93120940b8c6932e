//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Keys for actions the current role may not
//! take are ignored.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use emsa_core::auth::Role;
use emsa_core::routing::{GuardDecision, Route};

use crate::app::{
    can_add_password_char, can_add_username_char, Action, App, AppState, Focus, LoginFocus,
    PAGE_SCROLL_SIZE,
};
use crate::forms::FormState;

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    match app.state {
        AppState::EditingForm => {
            handle_form_input(app, key);
            return Ok(false);
        }
        AppState::ConfirmingAction => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.accept_pending(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_pending(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::Searching => {
            handle_search_input(app, key);
            return Ok(false);
        }
        _ => {}
    }

    match app.decision() {
        GuardDecision::Render { shell: true, .. } => handle_shell_input(app, key),
        GuardDecision::Render { shell: false, .. } => handle_login_input(app, key).await,
        GuardDecision::Loading | GuardDecision::Redirect(_) => {
            if key.code == KeyCode::Char('q') {
                return Ok(true);
            }
            Ok(false)
        }
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => return Ok(true),
        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => app.attempt_login().await,
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.len(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.len(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_shell_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('L') => {
            app.sign_out();
            return Ok(false);
        }
        KeyCode::Char('r') => {
            app.status_message = None;
            app.fetch_page();
            return Ok(false);
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.focus = match app.focus {
                Focus::Sidebar => Focus::Content,
                Focus::Content => Focus::Sidebar,
            };
            return Ok(false);
        }
        _ => {}
    }

    match app.focus {
        Focus::Sidebar => handle_sidebar_input(app, key),
        Focus::Content => handle_content_input(app, key),
    }
    Ok(false)
}

fn handle_sidebar_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.nav_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.nav_next(),
        KeyCode::Enter | KeyCode::Right => app.open_selected_nav(),
        _ => {}
    }
}

fn handle_content_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(1),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(1),
        KeyCode::PageUp => app.select_prev(PAGE_SCROLL_SIZE),
        KeyCode::PageDown => app.select_next(PAGE_SCROLL_SIZE),
        KeyCode::Home => app.selection = 0,
        KeyCode::End => app.selection = app.row_count().saturating_sub(1),
        KeyCode::Left => app.focus = Focus::Sidebar,
        KeyCode::Char('n') if app.can_create() => open_create_form(app),
        KeyCode::Char('e') if app.can_edit() => open_edit_form(app),
        KeyCode::Char('d') if app.can_delete() => confirm_delete(app),
        KeyCode::Char('t') if app.can_toggle_active() => confirm_toggle_active(app),
        KeyCode::Char('p') if app.can_reset_password() => {
            if let Some(form) = app.selected_account().map(FormState::reset_password) {
                app.open_form(form);
            }
        }
        KeyCode::Char('f') if app.route == Route::Tasks => app.cycle_task_filter(),
        KeyCode::Char('f') if app.is_account_list() => app.cycle_account_filter(),
        KeyCode::Char('s') if app.route == Route::LeaveRequests => app.cycle_leave_scope(),
        KeyCode::Char(c @ ('a' | 'x')) if app.can_review_leave() => {
            if let Some(id) = app.selected_leave_request().map(|r| r.request_id) {
                app.open_form(FormState::review_leave(id, c == 'a'));
            }
        }
        KeyCode::Char('w') if app.can_self_appraise() => {
            if let Some(form) = app.selected_review().map(FormState::self_appraisal) {
                app.open_form(form);
            }
        }
        KeyCode::Char('c') if app.route == Route::Profile => {
            app.open_form(FormState::change_password());
        }
        KeyCode::Char('/') if app.can_search() => {
            app.state = AppState::Searching;
        }
        _ => {}
    }
}

fn open_create_form(app: &mut App) {
    let form = match app.route {
        Route::Accounts | Route::Employees => FormState::create_account(Role::Employee),
        Route::Users => FormState::create_account(Role::User),
        Route::Departments => FormState::department(None),
        Route::Projects => FormState::project(None),
        Route::Tasks => FormState::task(None),
        Route::Kpis => FormState::kpi(None),
        Route::LeaveRequests => FormState::submit_leave(),
        Route::Performance => FormState::create_review(),
        _ => return,
    };
    app.open_form(form);
}

fn open_edit_form(app: &mut App) {
    let form = match app.route {
        Route::Accounts | Route::Employees | Route::Users => {
            app.selected_account().map(FormState::edit_account)
        }
        Route::Departments => app.selected_department().map(|d| FormState::department(Some(d))),
        Route::Projects => app.selected_project().map(|p| FormState::project(Some(p))),
        Route::Tasks => app.selected_task().map(|t| FormState::task(Some(t))),
        Route::Kpis => app.selected_kpi().map(|k| FormState::kpi(Some(k))),
        Route::Profile => app.data.profile.as_ref().map(FormState::edit_profile),
        _ => None,
    };
    if let Some(form) = form {
        app.open_form(form);
    }
}

fn confirm_delete(app: &mut App) {
    let target = match app.route {
        Route::Accounts => app
            .selected_account()
            .map(|a| (Action::DeleteAccount(a.account_id), a.display_name())),
        Route::Departments => app
            .selected_department()
            .map(|d| (Action::DeleteDepartment(d.department_id), d.department_name.clone())),
        Route::Projects => app
            .selected_project()
            .map(|p| (Action::DeleteProject(p.project_id), p.project_name.clone())),
        Route::Tasks => app
            .selected_task()
            .map(|t| (Action::DeleteTask(t.task_id), t.title.clone())),
        Route::Kpis => app
            .selected_kpi()
            .map(|k| (Action::DeleteKpi(k.kpi_id), k.title.clone())),
        _ => None,
    };
    if let Some((action, name)) = target {
        app.confirm(action, format!("Delete \"{}\"? This cannot be undone.", name));
    }
}

fn confirm_toggle_active(app: &mut App) {
    let Some(account) = app.selected_account() else {
        return;
    };
    let activate = !account.active();
    let verb = if activate { "Activate" } else { "Deactivate" };
    let prompt = format!("{} {}?", verb, account.display_name());
    let action = Action::SetAccountActive(account.account_id, activate);
    app.confirm(action, prompt);
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.submit_form();
        return;
    }
    if key.code == KeyCode::Esc {
        app.close_form();
        return;
    }

    let Some(form) = app.form.as_mut() else {
        app.state = AppState::Normal;
        return;
    };
    form.error = None;
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left => form.cycle_option(false),
        KeyCode::Right => form.cycle_option(true),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.insert_char(c),
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.search_query.clear();
            app.state = AppState::Normal;
        }
        KeyCode::Enter => app.state = AppState::Normal,
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => app.search_query.push(c),
        _ => {}
    }
    app.selection = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use emsa_core::auth::{AuthPayload, MemoryStorage, SessionStore, UserProfile};
    use emsa_core::config::Config;
    use emsa_core::models::{Account, AuditLog, Project};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_as(role: &str, route: Route) -> App {
        let mut session = SessionStore::new(Box::new(MemoryStorage::new()));
        session.initialize();
        session.login(AuthPayload::new(
            "tok",
            UserProfile {
                username: "tester".to_string(),
                role: role.to_string(),
                ..Default::default()
            },
        ));
        let mut app = App::new(Config::default(), session).unwrap();
        app.route = route;
        app
    }

    #[tokio::test]
    async fn test_forbidden_action_key_is_ignored() {
        let mut app = app_as("MANAGER", Route::Projects);
        app.data.projects.push(Project::default());

        handle_input(&mut app, key(KeyCode::Char('d'))).await.unwrap();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.pending.is_none());

        handle_input(&mut app, key(KeyCode::Char('e'))).await.unwrap();
        assert_eq!(app.state, AppState::EditingForm);
    }

    #[tokio::test]
    async fn test_delete_asks_for_confirmation() {
        let mut app = app_as("ADMIN", Route::Accounts);
        app.data.accounts.push(Account {
            account_id: 9,
            username: "bob".to_string(),
            ..Default::default()
        });

        handle_input(&mut app, key(KeyCode::Char('d'))).await.unwrap();
        assert_eq!(app.state, AppState::ConfirmingAction);
        assert_eq!(
            app.pending.as_ref().map(|p| p.action),
            Some(Action::DeleteAccount(9))
        );

        handle_input(&mut app, key(KeyCode::Char('n'))).await.unwrap();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.pending.is_none());
    }

    #[tokio::test]
    async fn test_toggle_deactivates_active_account() {
        let mut app = app_as("ADMIN", Route::Users);
        app.data.accounts.push(Account {
            account_id: 3,
            is_active: Some(true),
            ..Default::default()
        });
        handle_input(&mut app, key(KeyCode::Char('t'))).await.unwrap();
        assert_eq!(
            app.pending.as_ref().map(|p| p.action),
            Some(Action::SetAccountActive(3, false))
        );
    }

    #[tokio::test]
    async fn test_form_escape_cancels() {
        let mut app = app_as("USER", Route::LeaveRequests);
        handle_input(&mut app, key(KeyCode::Char('n'))).await.unwrap();
        assert_eq!(app.state, AppState::EditingForm);

        handle_input(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.form.is_none());
    }

    #[tokio::test]
    async fn test_invalid_form_stays_open() {
        let mut app = app_as("ADMIN", Route::Departments);
        handle_input(&mut app, key(KeyCode::Char('n'))).await.unwrap();
        handle_input(&mut app, key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.state, AppState::EditingForm);
        assert!(app.form.as_ref().and_then(|f| f.error.as_ref()).is_some());
    }

    #[tokio::test]
    async fn test_audit_search_filters_rows() {
        let mut app = app_as("ADMIN", Route::AuditLogs);
        app.data.audit_logs = vec![
            AuditLog {
                action: "LOGIN".to_string(),
                ..Default::default()
            },
            AuditLog {
                action: "DELETE_ACCOUNT".to_string(),
                ..Default::default()
            },
        ];

        handle_input(&mut app, key(KeyCode::Char('/'))).await.unwrap();
        for c in "delete".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        assert_eq!(app.row_count(), 1);

        handle_input(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.row_count(), 2);
    }

    #[tokio::test]
    async fn test_user_search_and_department_filter() {
        let mut app = app_as("ADMIN", Route::Users);
        app.data.accounts = vec![
            Account {
                account_id: 1,
                username: "ann".to_string(),
                department_id: Some(4),
                department_name: Some("Finance".to_string()),
                ..Default::default()
            },
            Account {
                account_id: 2,
                username: "andy".to_string(),
                ..Default::default()
            },
        ];

        handle_input(&mut app, key(KeyCode::Char('/'))).await.unwrap();
        assert_eq!(app.state, AppState::Searching);
        for c in "an".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        handle_input(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.row_count(), 2);

        handle_input(&mut app, key(KeyCode::Char('f'))).await.unwrap();
        assert_eq!(app.department_filter, Some(4));
        assert_eq!(app.row_count(), 1);
    }

    #[tokio::test]
    async fn test_tab_switches_focus_and_sidebar_navigates() {
        let mut app = app_as("EMPLOYEE", Route::Dashboard);
        handle_input(&mut app, key(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.focus, Focus::Sidebar);

        handle_input(&mut app, key(KeyCode::Down)).await.unwrap();
        handle_input(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.focus, Focus::Content);
        assert_eq!(app.route, app.menu()[1].route);
    }

    #[tokio::test]
    async fn test_quit_requires_confirmation() {
        let mut app = app_as("USER", Route::Dashboard);
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap());
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).await.unwrap());
    }

    #[tokio::test]
    async fn test_login_form_typing() {
        let mut session = SessionStore::new(Box::new(MemoryStorage::new()));
        session.initialize();
        let mut app = App::new(Config::default(), session).unwrap();
        app.route = Route::Login;
        app.login_username.clear();
        app.login_focus = LoginFocus::Username;

        for c in "ann".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        handle_input(&mut app, key(KeyCode::Tab)).await.unwrap();
        handle_input(&mut app, key(KeyCode::Char('x'))).await.unwrap();

        assert_eq!(app.login_username, "ann");
        assert_eq!(app.login_focus, LoginFocus::Password);
        assert!(app.login_password.ends_with('x'));
    }
}
