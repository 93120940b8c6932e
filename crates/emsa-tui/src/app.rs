//! Application state management for the EMSA terminal client.
//!
//! `App` owns the Session Store, the API client and everything on screen.
//! Network calls run in spawned tasks and report back over an mpsc channel;
//! every message carries the session generation and route it was issued
//! for, and anything that no longer matches is dropped unread.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use emsa_core::api::{ApiClient, ApiError};
use emsa_core::auth::{Role, SessionStore};
use emsa_core::config::{Config, ENV_PASSWORD, ENV_USERNAME};
use emsa_core::models::{
    Account, AuditLog, Department, Kpi, LeaveRequest, PerformanceReview, Project, Task,
    TASK_STATUSES,
};
use emsa_core::routing::{menu_for, resolve, GuardDecision, NavItem, Route, DEFAULT_ROUTE};

use crate::forms::{FormState, Submission};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Status line while a mutation is in flight.
const SAVING_MESSAGE: &str = "Saving...";

/// Dashboard shows this many of the user's most recent tasks.
pub const DASHBOARD_TASK_LIMIT: usize = 5;

/// Dashboard shows this many of the user's most recent requests.
pub const DASHBOARD_REQUEST_LIMIT: usize = 3;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    EditingForm,
    Searching,
    ConfirmingAction,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Which half of the shell receives arrow keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Content,
}

/// Which leave requests the Leave page lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveScope {
    Mine,
    Team,
    All,
}

impl LeaveScope {
    pub fn title(&self) -> &'static str {
        match self {
            LeaveScope::Mine => "My Requests",
            LeaveScope::Team => "Team Requests",
            LeaveScope::All => "All Requests",
        }
    }

    /// Scopes available to a role, in display order.
    pub fn available(role: Option<Role>) -> &'static [LeaveScope] {
        match role {
            Some(Role::Admin) => &[LeaveScope::Mine, LeaveScope::Team, LeaveScope::All],
            Some(Role::Manager) => &[LeaveScope::Mine, LeaveScope::Team],
            _ => &[LeaveScope::Mine],
        }
    }
}

/// A mutation that needs no form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    DeleteAccount(i64),
    SetAccountActive(i64, bool),
    DeleteDepartment(i64),
    DeleteProject(i64),
    DeleteTask(i64),
    DeleteKpi(i64),
}

impl Action {
    fn success_message(&self) -> &'static str {
        match self {
            Action::DeleteAccount(_) => "Account deleted",
            Action::SetAccountActive(_, true) => "Account activated",
            Action::SetAccountActive(_, false) => "Account deactivated",
            Action::DeleteDepartment(_) => "Department deleted",
            Action::DeleteProject(_) => "Project deleted",
            Action::DeleteTask(_) => "Task deleted",
            Action::DeleteKpi(_) => "KPI deleted",
        }
    }
}

/// An action waiting for y/n.
#[derive(Debug, Clone)]
pub struct PendingAction {
    pub action: Action,
    pub prompt: String,
}

/// Figures shown on the dashboard.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub recent_tasks: Vec<Task>,
    pub recent_requests: Vec<LeaveRequest>,
    pub stats: Vec<(&'static str, usize)>,
}

/// Everything fetched for the pages. Cleared on sign-out.
#[derive(Debug, Default)]
pub struct PageData {
    pub dashboard: DashboardData,
    pub accounts: Vec<Account>,
    pub departments: Vec<Department>,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub kpis: Vec<Kpi>,
    pub leave_requests: Vec<LeaveRequest>,
    pub reviews: Vec<PerformanceReview>,
    pub audit_logs: Vec<AuditLog>,
    pub profile: Option<Account>,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Data loaded for one page.
#[derive(Debug)]
enum PageLoad {
    Dashboard(DashboardData),
    Accounts(Vec<Account>),
    Departments(Vec<Department>),
    Projects(Vec<Project>),
    Tasks(Vec<Task>),
    Kpis(Vec<Kpi>),
    LeaveRequests(LeaveScope, Vec<LeaveRequest>),
    Reviews(Vec<PerformanceReview>),
    AuditLogs(Vec<AuditLog>),
    Profile(Account),
}

#[derive(Debug)]
enum PageResult {
    Loaded(PageLoad),
    /// A mutation succeeded; the page reloads.
    Done(&'static str),
    Failed(ApiError),
}

/// A background result tagged with what it was issued for.
#[derive(Debug)]
struct PageMessage {
    generation: u64,
    route: Route,
    result: PageResult,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionStore,
    pub api: ApiClient,

    // UI State
    pub state: AppState,
    pub route: Route,
    pub focus: Focus,
    pub nav_selection: usize,
    pub selection: usize,
    pub loading: bool,
    pub page_error: Option<String>,
    pub status_message: Option<String>,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Page state
    pub data: PageData,
    pub task_filter: Option<&'static str>,
    pub role_filter: Option<Role>,
    pub department_filter: Option<i64>,
    pub leave_scope: LeaveScope,
    pub search_query: String,
    pub form: Option<FormState>,
    pub pending: Option<PendingAction>,

    // Background task channel
    result_rx: mpsc::Receiver<PageMessage>,
    result_tx: mpsc::Sender<PageMessage>,
}

impl App {
    pub fn new(config: Config, session: SessionStore) -> Result<Self, ApiError> {
        let api = ApiClient::new(config.api_base_url())?;
        debug!(base_url = api.base_url(), "API client configured");

        let (result_tx, result_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_username = std::env::var(ENV_USERNAME)
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let login_password = std::env::var(ENV_PASSWORD).unwrap_or_default();
        let login_focus = if login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };

        Ok(Self {
            config,
            session,
            api,

            state: AppState::Normal,
            route: DEFAULT_ROUTE,
            focus: Focus::Content,
            nav_selection: 0,
            selection: 0,
            loading: false,
            page_error: None,
            status_message: None,

            login_username,
            login_password,
            login_focus,
            login_error: None,

            data: PageData::default(),
            task_filter: None,
            role_filter: None,
            department_filter: None,
            leave_scope: LeaveScope::Mine,
            search_query: String::new(),
            form: None,
            pending: None,

            result_rx,
            result_tx,
        })
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Guard decision for the current route, evaluated fresh.
    pub fn decision(&self) -> GuardDecision {
        resolve(&self.session, self.route)
    }

    pub fn menu(&self) -> &'static [NavItem] {
        menu_for(self.session.current_role())
    }

    /// Navigate to `requested`, following guard redirects, and load the page.
    pub fn navigate(&mut self, requested: Route) {
        let decision = resolve(&self.session, requested);
        let target = match decision {
            GuardDecision::Render { route, .. } => route,
            GuardDecision::Redirect(route) => route,
            GuardDecision::Loading => requested,
        };
        if target != requested {
            debug!(requested = %requested, target = %target, "Navigation redirected");
        }
        info!(route = %target, "Navigate");

        self.route = target;
        self.selection = 0;
        self.page_error = None;
        self.search_query.clear();
        self.role_filter = None;
        self.department_filter = None;
        self.form = None;
        self.pending = None;
        if !matches!(self.state, AppState::Quitting) {
            self.state = AppState::Normal;
        }
        if let Some(pos) = self.menu().iter().position(|i| i.route == target) {
            self.nav_selection = pos;
        }

        if !LeaveScope::available(self.session.current_role()).contains(&self.leave_scope) {
            self.leave_scope = LeaveScope::Mine;
        }

        if target == Route::Login {
            self.login_focus = if self.login_username.is_empty() {
                LoginFocus::Username
            } else {
                LoginFocus::Password
            };
        } else {
            self.fetch_page();
        }
    }

    /// Open the highlighted sidebar entry.
    pub fn open_selected_nav(&mut self) {
        if let Some(item) = self.menu().get(self.nav_selection) {
            let route = item.route;
            self.focus = Focus::Content;
            self.navigate(route);
        }
    }

    pub fn nav_next(&mut self) {
        let len = self.menu().len();
        if len > 0 {
            self.nav_selection = (self.nav_selection + 1) % len;
        }
    }

    pub fn nav_prev(&mut self) {
        let len = self.menu().len();
        if len > 0 {
            self.nav_selection = (self.nav_selection + len - 1) % len;
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Attempt login with the credentials from the login form.
    pub async fn attempt_login(&mut self) {
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return;
        }

        self.login_error = None;

        match self.api.login(&username, &password).await {
            Ok(payload) => {
                self.session.login(payload);
                self.login_password.clear();

                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!("Failed to save config: {:#}", e);
                }

                self.status_message = None;
                self.navigate(DEFAULT_ROUTE);
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(login_error_message(&e));
            }
        }
    }

    /// Sign out locally; the server is told on a best-effort basis.
    pub fn sign_out(&mut self) {
        if let Some(token) = self.session.token() {
            let api = self.api.with_token(token);
            tokio::spawn(async move {
                if let Err(e) = api.logout().await {
                    debug!(error = %e, "Server logout failed, ignoring");
                }
            });
        }
        self.session.logout();
        self.data = PageData::default();
        self.status_message = None;
        self.navigate(Route::Login);
    }

    /// Central handling of every failed API call made under a session.
    pub fn handle_api_error(&mut self, err: ApiError) {
        if err.is_auth_failure() {
            self.session.invalidate();
            self.data = PageData::default();
            self.loading = false;
            self.status_message = Some("Session expired. Please sign in again.".to_string());
            self.navigate(Route::Login);
            return;
        }

        error!(error = %err, route = %self.route, "Request failed");
        self.loading = false;
        self.page_error = Some(user_error_message(&err));
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Helper to send results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<PageMessage>, message: PageMessage) {
        if let Err(e) = tx.send(message).await {
            error!(error = %e, "Failed to send page result - channel closed");
        }
    }

    /// Client carrying the current token, or `None` when signed out.
    fn authed_api(&self) -> Option<ApiClient> {
        self.session.token().map(|t| self.api.with_token(t))
    }

    /// Spawn a task that loads the data for the current route.
    pub fn fetch_page(&mut self) {
        let Some(api) = self.authed_api() else {
            return;
        };
        let route = self.route;
        let generation = self.session.generation();
        let role = self.session.current_role();
        let scope = self.leave_scope;
        let tx = self.result_tx.clone();

        self.loading = true;
        self.page_error = None;

        tokio::spawn(async move {
            let result = match load_page(&api, route, role, scope).await {
                Ok(load) => PageResult::Loaded(load),
                Err(e) => PageResult::Failed(e),
            };
            Self::send_result(&tx, PageMessage { generation, route, result }).await;
        });
    }

    /// Send a parsed form to the server.
    pub fn submit(&mut self, submission: Submission) {
        self.run(move |api| async move {
            execute_submission(&api, &submission).await?;
            Ok::<_, ApiError>(submission.success_message())
        });
    }

    pub fn perform(&mut self, action: Action) {
        self.run(move |api| async move {
            execute_action(&api, action).await?;
            Ok::<_, ApiError>(action.success_message())
        });
    }

    fn run<F, Fut>(&mut self, job: F)
    where
        F: FnOnce(ApiClient) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<&'static str, ApiError>> + Send + 'static,
    {
        let Some(api) = self.authed_api() else {
            return;
        };
        let route = self.route;
        let generation = self.session.generation();
        let tx = self.result_tx.clone();
        self.status_message = Some(SAVING_MESSAGE.to_string());

        tokio::spawn(async move {
            let result = match job(api).await {
                Ok(message) => PageResult::Done(message),
                Err(e) => PageResult::Failed(e),
            };
            Self::send_result(&tx, PageMessage { generation, route, result }).await;
        });
    }

    /// Drain finished background work. Called once per tick.
    pub fn check_background_tasks(&mut self) {
        let mut messages = Vec::new();
        while let Ok(message) = self.result_rx.try_recv() {
            messages.push(message);
        }
        for message in messages {
            self.process_message(message);
        }
    }

    fn process_message(&mut self, message: PageMessage) {
        if !self.session.is_current(message.generation) {
            debug!(route = %message.route, "Dropping result from a previous session");
            return;
        }
        let same_page = message.route == self.route;

        match message.result {
            PageResult::Failed(err) if err.is_auth_failure() => self.handle_api_error(err),
            PageResult::Loaded(_) if !same_page => {
                debug!(route = %message.route, current = %self.route, "Dropping result for another page");
            }
            PageResult::Loaded(load) => {
                self.loading = false;
                self.store(load);
                self.clamp_selection();
            }
            PageResult::Done(msg) => {
                info!(route = %message.route, "{}", msg);
                self.status_message = Some(msg.to_string());
                if same_page {
                    self.fetch_page();
                }
            }
            PageResult::Failed(err) if !same_page => {
                error!(error = %err, route = %message.route, "Request failed");
                self.status_message = Some(user_error_message(&err));
            }
            PageResult::Failed(err) => {
                if self.status_message.as_deref() == Some(SAVING_MESSAGE) {
                    self.status_message = None;
                }
                self.handle_api_error(err);
            }
        }
    }

    fn store(&mut self, load: PageLoad) {
        match load {
            PageLoad::Dashboard(data) => self.data.dashboard = data,
            PageLoad::Accounts(data) => self.data.accounts = data,
            PageLoad::Departments(data) => self.data.departments = data,
            PageLoad::Projects(data) => self.data.projects = data,
            PageLoad::Tasks(data) => self.data.tasks = data,
            PageLoad::Kpis(data) => self.data.kpis = data,
            PageLoad::LeaveRequests(scope, data) => {
                if scope == self.leave_scope {
                    self.data.leave_requests = data;
                } else {
                    debug!("Dropping leave requests for a previous scope");
                }
            }
            PageLoad::Reviews(data) => self.data.reviews = data,
            PageLoad::AuditLogs(data) => self.data.audit_logs = data,
            PageLoad::Profile(data) => self.data.profile = Some(data),
        }
    }

    // =========================================================================
    // Permissions
    // =========================================================================

    pub fn can_create(&self) -> bool {
        match self.route {
            Route::Accounts | Route::Employees | Route::Users | Route::Departments => {
                self.session.is_admin()
            }
            Route::Projects | Route::Tasks | Route::Kpis | Route::Performance => {
                self.session.can_manage()
            }
            Route::LeaveRequests => self.session.is_authenticated(),
            _ => false,
        }
    }

    pub fn can_edit(&self) -> bool {
        match self.route {
            Route::Accounts | Route::Employees | Route::Users | Route::Departments => {
                self.session.is_admin()
            }
            Route::Projects | Route::Tasks | Route::Kpis => self.session.can_manage(),
            Route::Profile => self.data.profile.is_some(),
            _ => false,
        }
    }

    pub fn can_delete(&self) -> bool {
        match self.route {
            Route::Accounts | Route::Departments | Route::Projects => self.session.is_admin(),
            Route::Tasks | Route::Kpis => self.session.can_manage(),
            _ => false,
        }
    }

    pub fn can_toggle_active(&self) -> bool {
        matches!(self.route, Route::Accounts | Route::Employees | Route::Users)
            && self.session.is_admin()
    }

    pub fn can_reset_password(&self) -> bool {
        self.route == Route::Accounts && self.session.is_admin()
    }

    /// Approve or reject requests from the team or all scopes.
    pub fn can_review_leave(&self) -> bool {
        self.route == Route::LeaveRequests
            && self.leave_scope != LeaveScope::Mine
            && self.session.can_manage()
            && self.selected_leave_request().is_some_and(|r| r.is_pending())
    }

    pub fn can_self_appraise(&self) -> bool {
        self.route == Route::Performance
            && self.session.is_employee()
            && self.selected_review().is_some_and(|r| r.is_draft())
    }

    // =========================================================================
    // Page helpers
    // =========================================================================

    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.data
            .tasks
            .iter()
            .filter(|t| match self.task_filter {
                Some(status) => t.status.as_deref() == Some(status),
                None => true,
            })
            .collect()
    }

    /// Accounts after the search box and the role or department filter.
    pub fn visible_accounts(&self) -> Vec<&Account> {
        self.data
            .accounts
            .iter()
            .filter(|a| a.matches(&self.search_query))
            .filter(|a| match self.role_filter {
                Some(role) => a.role() == Some(role),
                None => true,
            })
            .filter(|a| match self.department_filter {
                Some(id) => a.department_id == Some(id),
                None => true,
            })
            .collect()
    }

    /// Departments present in the loaded accounts, sorted by name.
    pub fn account_departments(&self) -> Vec<(i64, String)> {
        let mut departments: Vec<(i64, String)> = Vec::new();
        for account in &self.data.accounts {
            if let Some(id) = account.department_id {
                if !departments.iter().any(|(d, _)| *d == id) {
                    let name = account.department_name.clone().unwrap_or_else(|| format!("#{}", id));
                    departments.push((id, name));
                }
            }
        }
        departments.sort_by(|a, b| a.1.cmp(&b.1));
        departments
    }

    pub fn is_account_list(&self) -> bool {
        matches!(self.route, Route::Accounts | Route::Employees | Route::Users)
    }

    pub fn can_search(&self) -> bool {
        self.is_account_list() || self.route == Route::AuditLogs
    }

    /// Label for the active account filter, `ALL` when none is set.
    pub fn account_filter_label(&self) -> String {
        if let Some(role) = self.role_filter {
            return role.as_str().to_string();
        }
        match self.department_filter {
            Some(id) => self
                .account_departments()
                .into_iter()
                .find(|(d, _)| *d == id)
                .map(|(_, name)| name)
                .unwrap_or_else(|| format!("#{}", id)),
            None => "ALL".to_string(),
        }
    }

    pub fn visible_audit_logs(&self) -> Vec<&AuditLog> {
        self.data
            .audit_logs
            .iter()
            .filter(|l| l.matches(&self.search_query))
            .collect()
    }

    /// Number of selectable rows on the current page.
    pub fn row_count(&self) -> usize {
        match self.route {
            Route::Accounts | Route::Employees | Route::Users | Route::Team => {
                self.visible_accounts().len()
            }
            Route::Departments => self.data.departments.len(),
            Route::Projects => self.data.projects.len(),
            Route::Tasks => self.visible_tasks().len(),
            Route::Kpis => self.data.kpis.len(),
            Route::LeaveRequests => self.data.leave_requests.len(),
            Route::Performance => self.data.reviews.len(),
            Route::AuditLogs => self.visible_audit_logs().len(),
            Route::Dashboard | Route::Profile | Route::Login => 0,
        }
    }

    pub fn clamp_selection(&mut self) {
        let len = self.row_count();
        if self.selection >= len {
            self.selection = len.saturating_sub(1);
        }
    }

    pub fn select_next(&mut self, step: usize) {
        let len = self.row_count();
        if len > 0 {
            self.selection = (self.selection + step).min(len - 1);
        }
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selection = self.selection.saturating_sub(step);
    }

    pub fn selected_account(&self) -> Option<&Account> {
        self.visible_accounts().get(self.selection).copied()
    }

    pub fn selected_department(&self) -> Option<&Department> {
        self.data.departments.get(self.selection)
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.data.projects.get(self.selection)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.selection).copied()
    }

    pub fn selected_kpi(&self) -> Option<&Kpi> {
        self.data.kpis.get(self.selection)
    }

    pub fn selected_leave_request(&self) -> Option<&LeaveRequest> {
        self.data.leave_requests.get(self.selection)
    }

    pub fn selected_review(&self) -> Option<&PerformanceReview> {
        self.data.reviews.get(self.selection)
    }

    /// Cycle the task status filter: all, then each status in turn.
    pub fn cycle_task_filter(&mut self) {
        self.task_filter = match self.task_filter {
            None => TASK_STATUSES.first().copied(),
            Some(current) => {
                let pos = TASK_STATUSES.iter().position(|s| *s == current);
                pos.and_then(|p| TASK_STATUSES.get(p + 1)).copied()
            }
        };
        self.selection = 0;
    }

    /// Accounts filter by role; Employees and Users filter by department.
    /// Each press moves to the next value, wrapping back to all.
    pub fn cycle_account_filter(&mut self) {
        match self.route {
            Route::Accounts => {
                self.role_filter = match self.role_filter {
                    None => Role::ALL.first().copied(),
                    Some(current) => {
                        let pos = Role::ALL.iter().position(|r| *r == current);
                        pos.and_then(|p| Role::ALL.get(p + 1)).copied()
                    }
                };
            }
            Route::Employees | Route::Users => {
                let ids: Vec<i64> = self.account_departments().into_iter().map(|(id, _)| id).collect();
                self.department_filter = match self.department_filter {
                    None => ids.first().copied(),
                    Some(current) => {
                        let pos = ids.iter().position(|id| *id == current);
                        pos.and_then(|p| ids.get(p + 1)).copied()
                    }
                };
            }
            _ => return,
        }
        self.selection = 0;
    }

    /// Switch to the next leave scope this role may see and reload.
    pub fn cycle_leave_scope(&mut self) {
        let scopes = LeaveScope::available(self.session.current_role());
        if scopes.len() < 2 {
            return;
        }
        let pos = scopes.iter().position(|s| *s == self.leave_scope).unwrap_or(0);
        self.leave_scope = scopes[(pos + 1) % scopes.len()];
        self.data.leave_requests.clear();
        self.selection = 0;
        self.fetch_page();
    }

    pub fn open_form(&mut self, form: FormState) {
        self.form = Some(form);
        self.state = AppState::EditingForm;
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.state = AppState::Normal;
    }

    /// Validate the open form and submit it, or show why it can't be.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match form.submission() {
            Ok(submission) => {
                self.close_form();
                self.submit(submission);
            }
            Err(msg) => form.error = Some(msg),
        }
    }

    pub fn confirm(&mut self, action: Action, prompt: String) {
        self.pending = Some(PendingAction { action, prompt });
        self.state = AppState::ConfirmingAction;
    }

    pub fn accept_pending(&mut self) {
        self.state = AppState::Normal;
        if let Some(pending) = self.pending.take() {
            self.perform(pending.action);
        }
    }

    pub fn cancel_pending(&mut self) {
        self.pending = None;
        self.state = AppState::Normal;
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Fetch everything a route shows. Which endpoint is used depends on the role.
async fn load_page(
    api: &ApiClient,
    route: Route,
    role: Option<Role>,
    scope: LeaveScope,
) -> Result<PageLoad, ApiError> {
    let load = match route {
        Route::Dashboard => PageLoad::Dashboard(load_dashboard(api, role).await?),
        Route::Accounts => PageLoad::Accounts(api.fetch_accounts().await?),
        Route::Employees => PageLoad::Accounts(api.fetch_accounts_by_role(Role::Employee).await?),
        Route::Users => PageLoad::Accounts(api.fetch_accounts_by_role(Role::User).await?),
        Route::Team => PageLoad::Accounts(api.fetch_team().await?),
        Route::Departments => PageLoad::Departments(api.fetch_departments().await?),
        Route::Projects => PageLoad::Projects(match role {
            Some(Role::Admin) => api.fetch_projects().await?,
            Some(Role::Manager) => api.fetch_my_projects().await?,
            _ => api.fetch_assigned_projects().await?,
        }),
        Route::Tasks => PageLoad::Tasks(match role {
            Some(Role::Admin) => api.fetch_tasks().await?,
            _ => api.fetch_my_tasks().await?,
        }),
        Route::Kpis => PageLoad::Kpis(api.fetch_my_kpis().await?),
        Route::LeaveRequests => {
            let requests = match scope {
                LeaveScope::Mine => api.fetch_my_leave_requests().await?,
                LeaveScope::Team => api.fetch_team_leave_requests().await?,
                LeaveScope::All => api.fetch_leave_requests().await?,
            };
            PageLoad::LeaveRequests(scope, requests)
        }
        Route::Performance => PageLoad::Reviews(match role {
            Some(Role::Admin) => api.fetch_reviews().await?,
            _ => api.fetch_my_reviews().await?,
        }),
        Route::AuditLogs => PageLoad::AuditLogs(api.fetch_audit_logs().await?),
        Route::Profile => PageLoad::Profile(api.fetch_my_account().await?),
        Route::Login => {
            return Err(ApiError::InvalidResponse("login page has no data".to_string()))
        }
    };
    Ok(load)
}

/// A dashboard section that failed is shown empty, except that an
/// auth failure still ends the session.
fn or_empty<T: Default>(name: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    match result {
        Ok(data) => Ok(data),
        Err(e) if e.is_auth_failure() => Err(e),
        Err(e) => {
            warn!(error = %e, "Dashboard {} fetch failed", name);
            Ok(T::default())
        }
    }
}

async fn load_dashboard(api: &ApiClient, role: Option<Role>) -> Result<DashboardData, ApiError> {
    let (tasks, requests) = futures::join!(api.fetch_my_tasks(), api.fetch_my_leave_requests());
    let tasks = or_empty("tasks", tasks)?;
    let requests = or_empty("requests", requests)?;

    let mut stats = Vec::new();
    match role {
        Some(Role::Admin) => {
            let (accounts, departments, projects) = futures::join!(
                api.fetch_accounts(),
                api.fetch_departments(),
                api.fetch_projects()
            );
            let accounts = or_empty("accounts", accounts)?;
            let departments = or_empty("departments", departments)?;
            let projects = or_empty("projects", projects)?;
            stats.push(("Total Accounts", accounts.len()));
            stats.push(("Departments", departments.len()));
            stats.push(("Total Projects", projects.len()));
            stats.push(("Active Projects", projects.iter().filter(|p| p.is_active()).count()));
        }
        Some(Role::Manager) => {
            let (team, projects) = futures::join!(api.fetch_team(), api.fetch_my_projects());
            stats.push(("Team Size", or_empty("team", team)?.len()));
            stats.push(("My Projects", or_empty("projects", projects)?.len()));
        }
        _ => {}
    }

    stats.push(("My Tasks", tasks.len()));
    stats.push(("Pending Tasks", tasks.iter().filter(|t| t.is_open()).count()));
    stats.push(("My Requests", requests.len()));
    stats.push(("Pending Requests", requests.iter().filter(|r| r.is_pending()).count()));

    Ok(DashboardData {
        recent_tasks: tasks.into_iter().take(DASHBOARD_TASK_LIMIT).collect(),
        recent_requests: requests.into_iter().take(DASHBOARD_REQUEST_LIMIT).collect(),
        stats,
    })
}

async fn execute_submission(api: &ApiClient, submission: &Submission) -> Result<(), ApiError> {
    match submission {
        Submission::CreateAccount(req) => api.create_account(req).await.map(drop),
        Submission::UpdateAccount(id, req) => api.update_account(*id, req).await.map(drop),
        Submission::ResetPassword(id, req) => api.reset_password(*id, req).await,
        Submission::CreateDepartment(req) => api.create_department(req).await.map(drop),
        Submission::UpdateDepartment(id, req) => api.update_department(*id, req).await.map(drop),
        Submission::CreateProject(req) => api.create_project(req).await.map(drop),
        Submission::UpdateProject(id, req) => api.update_project(*id, req).await.map(drop),
        Submission::CreateTask(req) => api.create_task(req).await.map(drop),
        Submission::UpdateTask(id, req) => api.update_task(*id, req).await.map(drop),
        Submission::CreateKpi(req) => api.create_kpi(req).await.map(drop),
        Submission::UpdateKpi(id, req) => api.update_kpi(*id, req).await.map(drop),
        Submission::SubmitLeave(req) => api.create_leave_request(req).await.map(drop),
        Submission::ReviewLeave(id, req) => api.review_leave_request(*id, req).await.map(drop),
        Submission::CreateReview(req) => api.create_review(req).await.map(drop),
        Submission::SelfAppraisal(id, req) => api.submit_self_appraisal(*id, req).await.map(drop),
        Submission::UpdateProfile(req) => api.update_my_account(req).await.map(drop),
        Submission::ChangePassword(req) => api.change_my_password(req).await,
    }
}

async fn execute_action(api: &ApiClient, action: Action) -> Result<(), ApiError> {
    match action {
        Action::DeleteAccount(id) => api.delete_account(id).await,
        Action::SetAccountActive(id, true) => api.activate_account(id).await,
        Action::SetAccountActive(id, false) => api.deactivate_account(id).await,
        Action::DeleteDepartment(id) => api.delete_department(id).await,
        Action::DeleteProject(id) => api.delete_project(id).await,
        Action::DeleteTask(id) => api.delete_task(id).await,
        Action::DeleteKpi(id) => api.delete_kpi(id).await,
    }
}

// ============================================================================
// Messages
// ============================================================================

/// What the login view shows for a failed sign-in.
pub fn login_error_message(err: &ApiError) -> String {
    match err {
        ApiError::NetworkError(e) if e.is_timeout() => {
            "Connection timed out. Please try again.".to_string()
        }
        ApiError::NetworkError(_) => {
            "Unable to connect to server. Check that the API is reachable.".to_string()
        }
        ApiError::InvalidResponse(_) => "Login failed: unexpected response from server".to_string(),
        other => other
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| "Invalid username or password".to_string()),
    }
}

/// Page-scoped message for a failed request.
pub fn user_error_message(err: &ApiError) -> String {
    match err {
        ApiError::RateLimited => "Server is busy. Please wait a moment and try again.".to_string(),
        ApiError::NetworkError(_) => "Network error. Check your connection.".to_string(),
        ApiError::AccessDenied(_) => "You do not have permission to do that.".to_string(),
        other => match other.server_message() {
            Some(msg) => msg.to_string(),
            None => format!("Error: {}", other),
        },
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use emsa_core::auth::{AuthPayload, MemoryStorage, UserProfile};

    fn app_with(role: Option<&str>) -> App {
        let mut session = SessionStore::new(Box::new(MemoryStorage::new()));
        session.initialize();
        if let Some(role) = role {
            session.login(AuthPayload::new(
                "tok",
                UserProfile {
                    username: "tester".to_string(),
                    role: role.to_string(),
                    ..Default::default()
                },
            ));
        }
        App::new(Config::default(), session).unwrap()
    }

    fn message(app: &App, result: PageResult) -> PageMessage {
        PageMessage {
            generation: app.session.generation(),
            route: app.route,
            result,
        }
    }

    #[tokio::test]
    async fn test_navigate_follows_guard() {
        let mut app = app_with(Some("MANAGER"));
        app.navigate(Route::Accounts);
        assert_eq!(app.route, Route::Dashboard);

        app.navigate(Route::Team);
        assert_eq!(app.route, Route::Team);
        assert_eq!(app.menu()[app.nav_selection].route, Route::Team);
    }

    #[tokio::test]
    async fn test_unauthenticated_navigation_lands_on_login() {
        let mut app = app_with(None);
        app.navigate(Route::Tasks);
        assert_eq!(app.route, Route::Login);
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn test_unauthorized_result_signs_out() {
        let mut app = app_with(Some("EMPLOYEE"));
        app.route = Route::Tasks;
        let msg = message(&app, PageResult::Failed(ApiError::Unauthorized));
        app.process_message(msg);

        assert!(!app.session.is_authenticated());
        assert_eq!(app.route, Route::Login);
        assert!(app.page_error.is_none());
    }

    #[tokio::test]
    async fn test_other_failures_stay_on_page() {
        let mut app = app_with(Some("EMPLOYEE"));
        app.route = Route::Tasks;
        let msg = message(&app, PageResult::Failed(ApiError::NotFound("gone".into())));
        app.process_message(msg);

        assert!(app.session.is_authenticated());
        assert_eq!(app.route, Route::Tasks);
        assert_eq!(app.page_error.as_deref(), Some("gone"));
    }

    #[tokio::test]
    async fn test_stale_generation_is_dropped() {
        let mut app = app_with(Some("ADMIN"));
        app.route = Route::Tasks;
        let stale = message(
            &app,
            PageResult::Loaded(PageLoad::Tasks(vec![Task::default()])),
        );

        app.session.logout();
        app.session.login(AuthPayload::new(
            "other",
            UserProfile {
                username: "next".to_string(),
                role: "USER".to_string(),
                ..Default::default()
            },
        ));
        app.process_message(stale);
        assert!(app.data.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_result_for_other_route_is_dropped() {
        let mut app = app_with(Some("ADMIN"));
        app.route = Route::Departments;
        let mut msg = message(&app, PageResult::Loaded(PageLoad::Kpis(vec![Kpi::default()])));
        msg.route = Route::Kpis;
        app.process_message(msg);
        assert!(app.data.kpis.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_from_another_page_still_signs_out() {
        let mut app = app_with(Some("ADMIN"));
        app.route = Route::Departments;
        let mut msg = message(&app, PageResult::Failed(ApiError::Unauthorized));
        msg.route = Route::Tasks;
        app.process_message(msg);

        assert!(!app.session.is_authenticated());
        assert_eq!(app.route, Route::Login);
    }

    #[tokio::test]
    async fn test_mutation_done_after_leaving_page_updates_status() {
        let mut app = app_with(Some("ADMIN"));
        app.route = Route::Departments;
        app.status_message = Some(SAVING_MESSAGE.to_string());
        let mut msg = message(&app, PageResult::Done("Task deleted"));
        msg.route = Route::Tasks;
        app.process_message(msg);

        assert_eq!(app.status_message.as_deref(), Some("Task deleted"));
        assert!(!app.loading);
        assert!(app.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_mutation_failure_after_leaving_page_replaces_saving() {
        let mut app = app_with(Some("ADMIN"));
        app.route = Route::Departments;
        app.status_message = Some(SAVING_MESSAGE.to_string());
        let mut msg = message(&app, PageResult::Failed(ApiError::NotFound("gone".into())));
        msg.route = Route::Tasks;
        app.process_message(msg);

        assert_eq!(app.status_message.as_deref(), Some("gone"));
        assert!(app.page_error.is_none());
        assert_eq!(app.route, Route::Departments);
    }

    #[tokio::test]
    async fn test_sign_out_clears_data() {
        let mut app = app_with(Some("ADMIN"));
        app.data.accounts.push(Account::default());
        app.sign_out();
        assert!(app.data.accounts.is_empty());
        assert_eq!(app.route, Route::Login);
        assert!(!app.session.is_authenticated());
    }

    #[test]
    fn test_task_filter_cycles_back_to_all() {
        let mut app = app_with(Some("USER"));
        let mut seen = Vec::new();
        for _ in 0..=TASK_STATUSES.len() {
            app.cycle_task_filter();
            seen.push(app.task_filter);
        }
        assert_eq!(seen.first(), Some(&Some("TODO")));
        assert_eq!(seen.last(), Some(&None));
    }

    fn account(id: i64, username: &str, role: &str, department: Option<(i64, &str)>) -> Account {
        Account {
            account_id: id,
            username: username.to_string(),
            role: Some(role.to_string()),
            department_id: department.map(|(d, _)| d),
            department_name: department.map(|(_, n)| n.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_account_search_and_role_filter() {
        let mut app = app_with(Some("ADMIN"));
        app.route = Route::Accounts;
        app.data.accounts = vec![
            account(1, "alice", "ADMIN", None),
            account(2, "bob", "EMPLOYEE", None),
            account(3, "bobby", "MANAGER", None),
        ];

        app.search_query = "bob".to_string();
        assert_eq!(app.row_count(), 2);

        app.cycle_account_filter();
        assert_eq!(app.role_filter, Some(Role::Admin));
        assert_eq!(app.row_count(), 0);
        app.cycle_account_filter();
        assert_eq!(app.role_filter, Some(Role::Manager));
        assert_eq!(app.selected_account().map(|a| a.account_id), Some(3));

        app.cycle_account_filter();
        app.cycle_account_filter();
        app.cycle_account_filter();
        assert_eq!(app.role_filter, None);
        assert_eq!(app.account_filter_label(), "ALL");
    }

    #[test]
    fn test_employee_department_filter() {
        let mut app = app_with(Some("ADMIN"));
        app.route = Route::Employees;
        app.data.accounts = vec![
            account(1, "ann", "EMPLOYEE", Some((20, "Sales"))),
            account(2, "ben", "EMPLOYEE", Some((10, "Engineering"))),
            account(3, "cal", "EMPLOYEE", None),
        ];

        app.cycle_account_filter();
        assert_eq!(app.department_filter, Some(10));
        assert_eq!(app.account_filter_label(), "Engineering");
        assert_eq!(app.selected_account().map(|a| a.account_id), Some(2));

        app.cycle_account_filter();
        assert_eq!(app.department_filter, Some(20));
        app.cycle_account_filter();
        assert_eq!(app.department_filter, None);
        assert_eq!(app.row_count(), 3);
    }

    #[test]
    fn test_action_permissions_follow_role() {
        let mut manager = app_with(Some("MANAGER"));
        manager.route = Route::Projects;
        assert!(manager.can_create());
        assert!(manager.can_edit());
        assert!(!manager.can_delete());

        manager.route = Route::Departments;
        assert!(!manager.can_create());

        let mut admin = app_with(Some("ADMIN"));
        admin.route = Route::Accounts;
        assert!(admin.can_delete());
        assert!(admin.can_reset_password());
        admin.route = Route::Employees;
        assert!(admin.can_toggle_active());
        assert!(!admin.can_reset_password());

        let mut unknown = app_with(Some("SUPERUSER"));
        unknown.route = Route::Tasks;
        assert!(!unknown.can_create());
        assert!(!unknown.can_delete());
    }

    #[test]
    fn test_self_appraisal_only_for_draft_reviews() {
        let mut app = app_with(Some("EMPLOYEE"));
        app.route = Route::Performance;
        app.data.reviews.push(PerformanceReview {
            status: Some("SUBMITTED".to_string()),
            ..Default::default()
        });
        assert!(!app.can_self_appraise());
        app.data.reviews[0].status = Some("DRAFT".to_string());
        assert!(app.can_self_appraise());
    }

    #[test]
    fn test_leave_review_needs_pending_team_request() {
        let mut app = app_with(Some("MANAGER"));
        app.route = Route::LeaveRequests;
        app.data.leave_requests.push(LeaveRequest {
            status: Some("PENDING".to_string()),
            ..Default::default()
        });
        assert!(!app.can_review_leave());
        app.leave_scope = LeaveScope::Team;
        assert!(app.can_review_leave());
    }

    #[test]
    fn test_leave_scopes_by_role() {
        assert_eq!(LeaveScope::available(Some(Role::Admin)).len(), 3);
        assert_eq!(LeaveScope::available(Some(Role::Manager)).len(), 2);
        assert_eq!(LeaveScope::available(None), &[LeaveScope::Mine]);
    }

    #[test]
    fn test_login_error_messages() {
        assert_eq!(
            login_error_message(&ApiError::Unauthorized),
            "Invalid username or password"
        );
        assert_eq!(
            login_error_message(&ApiError::BadRequest("Account is disabled".into())),
            "Account is disabled"
        );
    }

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(!can_add_username_char(MAX_USERNAME_LENGTH, 'a'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(MAX_PASSWORD_LENGTH - 1, '!'));
        assert!(!can_add_password_char(MAX_PASSWORD_LENGTH, 'x'));
    }
}
