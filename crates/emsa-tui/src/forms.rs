//! Modal form state and conversion of form input into API requests.
//!
//! A form is a flat list of fields. Text fields accept typed characters,
//! choice fields cycle through a fixed option list. Nothing is sent until
//! `submission()` has parsed every field into a typed request.

use chrono::{NaiveDate, NaiveDateTime};

use emsa_core::auth::Role;
use emsa_core::models::{
    Account, ChangePasswordRequest, CreateAccountRequest, Department, DepartmentRequest, Kpi,
    KpiRequest, LeaveRequestDto, PerformanceReview, PerformanceReviewRequest, Project,
    ProjectRequest, ResetPasswordRequest, ReviewLeaveRequest, SelfAppraisalRequest, Task,
    TaskRequest, UpdateAccountRequest, KPI_STATUSES, LEAVE_STATUSES, LEAVE_TYPES,
    PROJECT_STATUSES, REVIEW_STATUSES, TASK_PRIORITIES, TASK_STATUSES,
};

/// Maximum length of any single form value.
const MAX_FIELD_LENGTH: usize = 500;

const DATE_FORMAT: &str = "%Y-%m-%d";

const ROLE_NAMES: &[&str] = &["ADMIN", "MANAGER", "EMPLOYEE", "USER"];

/// Editing leaves the role alone until one is picked.
const EDIT_ROLE_NAMES: &[&str] = &["", "ADMIN", "MANAGER", "EMPLOYEE", "USER"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Rendered masked.
    Secret,
    Number,
    Decimal,
    /// `YYYY-MM-DD`
    Date,
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
}

impl FormField {
    fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        let value = match kind {
            FieldKind::Choice(options) => options.first().copied().unwrap_or_default().to_string(),
            _ => String::new(),
        };
        Self {
            key,
            label,
            kind,
            required: false,
            value,
        }
    }

    fn text(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    fn with_opt(self, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.with_value(v),
            None => self,
        }
    }

    /// The value to show on screen.
    pub fn display_value(&self) -> String {
        match self.kind {
            FieldKind::Secret => "*".repeat(self.value.chars().count()),
            FieldKind::Choice(_) if self.value.is_empty() => "(unchanged)".to_string(),
            _ => self.value.clone(),
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, FieldKind::Choice(_))
    }

    fn accepts(&self, c: char) -> bool {
        if c.is_control() || self.value.chars().count() >= MAX_FIELD_LENGTH {
            return false;
        }
        match self.kind {
            FieldKind::Number => c.is_ascii_digit(),
            FieldKind::Decimal => c.is_ascii_digit() || c == '.',
            FieldKind::Date => c.is_ascii_digit() || c == '-',
            FieldKind::Choice(_) => false,
            FieldKind::Text | FieldKind::Secret => true,
        }
    }

    fn cycle(&mut self, forward: bool) {
        if let FieldKind::Choice(options) = self.kind {
            if options.is_empty() {
                return;
            }
            let current = options.iter().position(|o| *o == self.value).unwrap_or(0);
            let next = if forward {
                (current + 1) % options.len()
            } else {
                (current + options.len() - 1) % options.len()
            };
            self.value = options[next].to_string();
        }
    }
}

/// What a form creates or edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    CreateAccount,
    EditAccount(i64),
    ResetPassword(i64),
    CreateDepartment,
    EditDepartment(i64),
    CreateProject,
    EditProject(i64),
    CreateTask,
    EditTask(i64),
    CreateKpi,
    EditKpi(i64),
    SubmitLeave,
    ReviewLeave(i64),
    CreateReview,
    SelfAppraisal(i64),
    EditProfile,
    ChangePassword,
}

/// A parsed, ready-to-send form.
#[derive(Debug, Clone)]
pub enum Submission {
    CreateAccount(CreateAccountRequest),
    UpdateAccount(i64, UpdateAccountRequest),
    ResetPassword(i64, ResetPasswordRequest),
    CreateDepartment(DepartmentRequest),
    UpdateDepartment(i64, DepartmentRequest),
    CreateProject(ProjectRequest),
    UpdateProject(i64, ProjectRequest),
    CreateTask(TaskRequest),
    UpdateTask(i64, TaskRequest),
    CreateKpi(KpiRequest),
    UpdateKpi(i64, KpiRequest),
    SubmitLeave(LeaveRequestDto),
    ReviewLeave(i64, ReviewLeaveRequest),
    CreateReview(PerformanceReviewRequest),
    SelfAppraisal(i64, SelfAppraisalRequest),
    UpdateProfile(UpdateAccountRequest),
    ChangePassword(ChangePasswordRequest),
}

impl Submission {
    /// Status line shown after the server accepts the submission.
    pub fn success_message(&self) -> &'static str {
        match self {
            Submission::CreateAccount(_) => "Account created",
            Submission::UpdateAccount(..) => "Account updated",
            Submission::ResetPassword(..) => "Password reset",
            Submission::CreateDepartment(_) => "Department created",
            Submission::UpdateDepartment(..) => "Department updated",
            Submission::CreateProject(_) => "Project created",
            Submission::UpdateProject(..) => "Project updated",
            Submission::CreateTask(_) => "Task created",
            Submission::UpdateTask(..) => "Task updated",
            Submission::CreateKpi(_) => "KPI created",
            Submission::UpdateKpi(..) => "KPI updated",
            Submission::SubmitLeave(_) => "Request submitted",
            Submission::ReviewLeave(..) => "Request reviewed",
            Submission::CreateReview(_) => "Review created",
            Submission::SelfAppraisal(..) => "Self-appraisal submitted",
            Submission::UpdateProfile(_) => "Profile updated",
            Submission::ChangePassword(_) => "Password changed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub title: String,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
}

impl FormState {
    fn new(kind: FormKind, title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            title: title.into(),
            fields,
            focus: 0,
            error: None,
        }
    }

    // ========================================================================
    // Builders
    // ========================================================================

    pub fn create_account(role: Role) -> Self {
        let fields = vec![
            FormField::text("username", "Username").required(),
            FormField::text("email", "Email").required(),
            FormField::new("password", "Password", FieldKind::Secret).required(),
            FormField::new("role", "Role", FieldKind::Choice(ROLE_NAMES)).with_value(role.as_str()),
            FormField::text("firstName", "First name").required(),
            FormField::text("lastName", "Last name").required(),
            FormField::text("designation", "Designation"),
            FormField::new("departmentId", "Department ID", FieldKind::Number),
            FormField::text("phoneNumber", "Phone"),
            FormField::new("hireDate", "Hire date", FieldKind::Date),
        ];
        Self::new(FormKind::CreateAccount, "New Account", fields)
    }

    pub fn edit_account(account: &Account) -> Self {
        let fields = vec![
            FormField::text("email", "Email").with_opt(account.email.as_deref()),
            FormField::new("role", "Role", FieldKind::Choice(EDIT_ROLE_NAMES))
                .with_opt(account.role().map(|r| r.as_str())),
            FormField::text("firstName", "First name").with_opt(account.first_name.as_deref()),
            FormField::text("lastName", "Last name").with_opt(account.last_name.as_deref()),
            FormField::text("designation", "Designation").with_opt(account.designation.as_deref()),
            FormField::new("departmentId", "Department ID", FieldKind::Number)
                .with_opt(account.department_id.map(|id| id.to_string()).as_deref()),
            FormField::text("phoneNumber", "Phone").with_opt(account.phone_number.as_deref()),
            FormField::new("hireDate", "Hire date", FieldKind::Date)
                .with_opt(format_date_input(account.hire_date).as_deref()),
        ];
        Self::new(
            FormKind::EditAccount(account.account_id),
            format!("Edit {}", account.display_name()),
            fields,
        )
    }

    pub fn reset_password(account: &Account) -> Self {
        let fields = vec![FormField::new("newPassword", "New password", FieldKind::Secret).required()];
        Self::new(
            FormKind::ResetPassword(account.account_id),
            format!("Reset password for {}", account.username),
            fields,
        )
    }

    pub fn department(existing: Option<&Department>) -> Self {
        let fields = vec![
            FormField::text("departmentName", "Name")
                .required()
                .with_opt(existing.map(|d| d.department_name.as_str())),
            FormField::text("description", "Description")
                .with_opt(existing.and_then(|d| d.description.as_deref())),
        ];
        match existing {
            Some(d) => Self::new(FormKind::EditDepartment(d.department_id), "Edit Department", fields),
            None => Self::new(FormKind::CreateDepartment, "New Department", fields),
        }
    }

    pub fn project(existing: Option<&Project>) -> Self {
        let fields = vec![
            FormField::text("projectName", "Name")
                .required()
                .with_opt(existing.map(|p| p.project_name.as_str())),
            FormField::text("description", "Description")
                .with_opt(existing.and_then(|p| p.description.as_deref())),
            FormField::new("managerId", "Manager ID", FieldKind::Number)
                .with_opt(existing.and_then(|p| p.manager_id).map(|id| id.to_string()).as_deref()),
            FormField::new("startDate", "Start date", FieldKind::Date)
                .with_opt(format_date_input(existing.and_then(|p| p.start_date)).as_deref()),
            FormField::new("endDate", "End date", FieldKind::Date)
                .with_opt(format_date_input(existing.and_then(|p| p.end_date)).as_deref()),
            FormField::new("status", "Status", FieldKind::Choice(PROJECT_STATUSES))
                .with_opt(existing.and_then(|p| p.status.as_deref())),
        ];
        match existing {
            Some(p) => Self::new(FormKind::EditProject(p.project_id), "Edit Project", fields),
            None => Self::new(FormKind::CreateProject, "New Project", fields),
        }
    }

    pub fn task(existing: Option<&Task>) -> Self {
        let fields = vec![
            FormField::text("title", "Title")
                .required()
                .with_opt(existing.map(|t| t.title.as_str())),
            FormField::text("description", "Description")
                .with_opt(existing.and_then(|t| t.description.as_deref())),
            FormField::new("projectId", "Project ID", FieldKind::Number)
                .required()
                .with_opt(existing.and_then(|t| t.project_id).map(|id| id.to_string()).as_deref()),
            FormField::new("assignedToId", "Assignee ID", FieldKind::Number)
                .with_opt(existing.and_then(|t| t.assigned_to_id).map(|id| id.to_string()).as_deref()),
            FormField::new("status", "Status", FieldKind::Choice(TASK_STATUSES))
                .with_opt(existing.and_then(|t| t.status.as_deref())),
            FormField::new("priority", "Priority", FieldKind::Choice(TASK_PRIORITIES))
                .with_value("MEDIUM")
                .with_opt(existing.and_then(|t| t.priority.as_deref())),
            FormField::new("dueDate", "Due date", FieldKind::Date)
                .with_opt(format_date_input(existing.and_then(|t| t.due_date)).as_deref()),
            FormField::new("hoursLogged", "Hours logged", FieldKind::Decimal)
                .with_opt(existing.and_then(|t| t.hours_logged).map(|h| h.to_string()).as_deref()),
        ];
        match existing {
            Some(t) => Self::new(FormKind::EditTask(t.task_id), "Edit Task", fields),
            None => Self::new(FormKind::CreateTask, "New Task", fields),
        }
    }

    pub fn kpi(existing: Option<&Kpi>) -> Self {
        let fields = vec![
            FormField::new("employeeId", "Employee ID", FieldKind::Number)
                .required()
                .with_opt(existing.and_then(|k| k.employee_id).map(|id| id.to_string()).as_deref()),
            FormField::text("title", "Title")
                .required()
                .with_opt(existing.map(|k| k.title.as_str())),
            FormField::text("description", "Description")
                .with_opt(existing.and_then(|k| k.description.as_deref())),
            FormField::text("targetValue", "Target").with_opt(existing.and_then(|k| k.target_value.as_deref())),
            FormField::text("achievedValue", "Achieved")
                .with_opt(existing.and_then(|k| k.achieved_value.as_deref())),
            FormField::new("status", "Status", FieldKind::Choice(KPI_STATUSES))
                .with_opt(existing.and_then(|k| k.status.as_deref())),
            FormField::new("dueDate", "Due date", FieldKind::Date)
                .with_opt(format_date_input(existing.and_then(|k| k.due_date).map(|d| d.date())).as_deref()),
        ];
        match existing {
            Some(k) => Self::new(FormKind::EditKpi(k.kpi_id), "Edit KPI", fields),
            None => Self::new(FormKind::CreateKpi, "New KPI", fields),
        }
    }

    pub fn submit_leave() -> Self {
        let fields = vec![
            FormField::new("requestType", "Type", FieldKind::Choice(LEAVE_TYPES)),
            FormField::text("description", "Description"),
            FormField::new("startDate", "Start date", FieldKind::Date),
            FormField::new("endDate", "End date", FieldKind::Date),
        ];
        Self::new(FormKind::SubmitLeave, "New Request", fields)
    }

    pub fn review_leave(request_id: i64, approve: bool) -> Self {
        let status = if approve { "APPROVED" } else { "REJECTED" };
        let fields = vec![
            FormField::new("status", "Decision", FieldKind::Choice(LEAVE_STATUSES)).with_value(status),
            FormField::text("reviewComment", "Comment"),
        ];
        Self::new(FormKind::ReviewLeave(request_id), "Review Request", fields)
    }

    pub fn create_review() -> Self {
        let fields = vec![
            FormField::new("employeeId", "Employee ID", FieldKind::Number).required(),
            FormField::text("cycleName", "Cycle").required(),
            FormField::text("managerFeedback", "Feedback"),
            FormField::new("rating", "Rating (1-5)", FieldKind::Number),
            FormField::new("status", "Status", FieldKind::Choice(REVIEW_STATUSES)),
            FormField::new("incrementRecommended", "Increment %", FieldKind::Decimal),
        ];
        Self::new(FormKind::CreateReview, "New Review", fields)
    }

    pub fn self_appraisal(review: &PerformanceReview) -> Self {
        let fields = vec![FormField::text("selfAppraisal", "Self-appraisal")
            .required()
            .with_opt(review.self_appraisal.as_deref())];
        Self::new(FormKind::SelfAppraisal(review.review_id), "Self-appraisal", fields)
    }

    pub fn edit_profile(account: &Account) -> Self {
        let fields = vec![
            FormField::text("firstName", "First name").with_opt(account.first_name.as_deref()),
            FormField::text("lastName", "Last name").with_opt(account.last_name.as_deref()),
            FormField::text("phoneNumber", "Phone").with_opt(account.phone_number.as_deref()),
            FormField::text("address", "Address").with_opt(account.address.as_deref()),
            FormField::text("emergencyContactName", "Emergency contact")
                .with_opt(account.emergency_contact_name.as_deref()),
            FormField::text("emergencyContactPhone", "Emergency phone")
                .with_opt(account.emergency_contact_phone.as_deref()),
        ];
        Self::new(FormKind::EditProfile, "Edit Profile", fields)
    }

    pub fn change_password() -> Self {
        let fields = vec![
            FormField::new("currentPassword", "Current password", FieldKind::Secret).required(),
            FormField::new("newPassword", "New password", FieldKind::Secret).required(),
        ];
        Self::new(FormKind::ChangePassword, "Change Password", fields)
    }

    // ========================================================================
    // Editing
    // ========================================================================

    pub fn focused(&self) -> Option<&FormField> {
        self.fields.get(self.focus)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn cycle_option(&mut self, forward: bool) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.cycle(forward);
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if field.accepts(c) {
                field.value.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if !field.is_choice() {
                field.value.pop();
            }
        }
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    fn field(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Trimmed value, `None` when blank or absent.
    fn opt(&self, key: &str) -> Option<String> {
        self.field(key)
            .map(|f| f.value.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn req(&self, key: &str) -> Result<String, String> {
        self.opt(key)
            .ok_or_else(|| format!("{} is required", self.label(key)))
    }

    fn label(&self, key: &str) -> &'static str {
        self.field(key).map(|f| f.label).unwrap_or("Field")
    }

    fn number(&self, key: &str) -> Result<Option<i64>, String> {
        self.opt(key)
            .map(|v| v.parse::<i64>().map_err(|_| format!("{} must be a whole number", self.label(key))))
            .transpose()
    }

    fn req_number(&self, key: &str) -> Result<i64, String> {
        self.number(key)?
            .ok_or_else(|| format!("{} is required", self.label(key)))
    }

    fn decimal(&self, key: &str) -> Result<Option<f64>, String> {
        self.opt(key)
            .map(|v| v.parse::<f64>().map_err(|_| format!("{} must be a number", self.label(key))))
            .transpose()
    }

    fn date(&self, key: &str) -> Result<Option<NaiveDate>, String> {
        self.opt(key)
            .map(|v| {
                NaiveDate::parse_from_str(&v, DATE_FORMAT)
                    .map_err(|_| format!("{} must be YYYY-MM-DD", self.label(key)))
            })
            .transpose()
    }

    fn datetime(&self, key: &str) -> Result<Option<NaiveDateTime>, String> {
        Ok(self.date(key)?.and_then(|d| d.and_hms_opt(0, 0, 0)))
    }

    fn role(&self) -> Result<Role, String> {
        self.opt_role()?
            .ok_or_else(|| format!("{} is required", self.label("role")))
    }

    /// `None` when no role is picked.
    fn opt_role(&self) -> Result<Option<Role>, String> {
        self.opt("role")
            .map(|v| Role::parse(&v).ok_or_else(|| format!("Unknown role: {}", v)))
            .transpose()
    }

    /// Validate and convert the form into a request.
    pub fn submission(&self) -> Result<Submission, String> {
        let submission = match self.kind {
            FormKind::CreateAccount => Submission::CreateAccount(CreateAccountRequest {
                username: self.req("username")?,
                email: self.req("email")?,
                password: self.req("password")?,
                role: self.role()?,
                first_name: self.req("firstName")?,
                last_name: self.req("lastName")?,
                phone_number: self.opt("phoneNumber"),
                address: None,
                date_of_birth: None,
                hire_date: self.date("hireDate")?,
                designation: self.opt("designation"),
                department_id: self.number("departmentId")?,
                reporting_manager_id: None,
                emergency_contact_name: None,
                emergency_contact_phone: None,
            }),
            FormKind::EditAccount(id) => Submission::UpdateAccount(
                id,
                UpdateAccountRequest {
                    email: self.opt("email"),
                    first_name: self.opt("firstName"),
                    last_name: self.opt("lastName"),
                    phone_number: self.opt("phoneNumber"),
                    hire_date: self.date("hireDate")?,
                    designation: self.opt("designation"),
                    department_id: self.number("departmentId")?,
                    role: self.opt_role()?,
                    ..Default::default()
                },
            ),
            FormKind::ResetPassword(id) => Submission::ResetPassword(
                id,
                ResetPasswordRequest {
                    new_password: self.req("newPassword")?,
                },
            ),
            FormKind::CreateDepartment | FormKind::EditDepartment(_) => {
                let req = DepartmentRequest {
                    department_name: self.req("departmentName")?,
                    description: self.opt("description"),
                };
                match self.kind {
                    FormKind::EditDepartment(id) => Submission::UpdateDepartment(id, req),
                    _ => Submission::CreateDepartment(req),
                }
            }
            FormKind::CreateProject | FormKind::EditProject(_) => {
                let start_date = self.date("startDate")?;
                let end_date = self.date("endDate")?;
                if let (Some(start), Some(end)) = (start_date, end_date) {
                    if end < start {
                        return Err("End date is before start date".to_string());
                    }
                }
                let req = ProjectRequest {
                    project_name: self.req("projectName")?,
                    description: self.opt("description"),
                    manager_id: self.number("managerId")?,
                    start_date,
                    end_date,
                    status: self.opt("status"),
                };
                match self.kind {
                    FormKind::EditProject(id) => Submission::UpdateProject(id, req),
                    _ => Submission::CreateProject(req),
                }
            }
            FormKind::CreateTask | FormKind::EditTask(_) => {
                let req = TaskRequest {
                    project_id: self.req_number("projectId")?,
                    assigned_to_id: self.number("assignedToId")?,
                    title: self.req("title")?,
                    description: self.opt("description"),
                    status: self.opt("status"),
                    priority: self.opt("priority"),
                    due_date: self.date("dueDate")?,
                    hours_logged: self.decimal("hoursLogged")?,
                };
                match self.kind {
                    FormKind::EditTask(id) => Submission::UpdateTask(id, req),
                    _ => Submission::CreateTask(req),
                }
            }
            FormKind::CreateKpi | FormKind::EditKpi(_) => {
                let req = KpiRequest {
                    employee_id: self.req_number("employeeId")?,
                    title: self.req("title")?,
                    description: self.opt("description"),
                    target_value: self.opt("targetValue"),
                    achieved_value: self.opt("achievedValue"),
                    status: self.opt("status"),
                    due_date: self.datetime("dueDate")?,
                };
                match self.kind {
                    FormKind::EditKpi(id) => Submission::UpdateKpi(id, req),
                    _ => Submission::CreateKpi(req),
                }
            }
            FormKind::SubmitLeave => {
                let start_date = self.date("startDate")?;
                let end_date = self.date("endDate")?;
                if let (Some(start), Some(end)) = (start_date, end_date) {
                    if end < start {
                        return Err("End date is before start date".to_string());
                    }
                }
                Submission::SubmitLeave(LeaveRequestDto {
                    request_type: self.req("requestType")?,
                    description: self.opt("description"),
                    start_date,
                    end_date,
                })
            }
            FormKind::ReviewLeave(id) => Submission::ReviewLeave(
                id,
                ReviewLeaveRequest {
                    status: self.req("status")?,
                    review_comment: self.opt("reviewComment"),
                },
            ),
            FormKind::CreateReview => {
                let rating = self.number("rating")?;
                if let Some(r) = rating {
                    if !(1..=5).contains(&r) {
                        return Err("Rating must be between 1 and 5".to_string());
                    }
                }
                Submission::CreateReview(PerformanceReviewRequest {
                    employee_id: Some(self.req_number("employeeId")?),
                    cycle_name: Some(self.req("cycleName")?),
                    manager_feedback: self.opt("managerFeedback"),
                    rating: rating.map(|r| r as i32),
                    status: self.opt("status"),
                    increment_recommended: self.decimal("incrementRecommended")?,
                    ..Default::default()
                })
            }
            FormKind::SelfAppraisal(id) => Submission::SelfAppraisal(
                id,
                SelfAppraisalRequest {
                    self_appraisal: self.req("selfAppraisal")?,
                },
            ),
            FormKind::EditProfile => Submission::UpdateProfile(UpdateAccountRequest {
                first_name: self.opt("firstName"),
                last_name: self.opt("lastName"),
                phone_number: self.opt("phoneNumber"),
                address: self.opt("address"),
                emergency_contact_name: self.opt("emergencyContactName"),
                emergency_contact_phone: self.opt("emergencyContactPhone"),
                ..Default::default()
            }),
            FormKind::ChangePassword => Submission::ChangePassword(ChangePasswordRequest {
                current_password: self.req("currentPassword")?,
                new_password: self.req("newPassword")?,
            }),
        };
        Ok(submission)
    }
}

fn format_date_input(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(form: &mut FormState, key: &str, text: &str) {
        form.focus = form.fields.iter().position(|f| f.key == key).unwrap();
        for c in text.chars() {
            form.insert_char(c);
        }
    }

    #[test]
    fn test_required_fields_are_enforced() {
        let form = FormState::department(None);
        assert_eq!(form.submission().unwrap_err(), "Name is required");
    }

    #[test]
    fn test_department_submission() {
        let mut form = FormState::department(None);
        type_into(&mut form, "departmentName", "Engineering");
        match form.submission().unwrap() {
            Submission::CreateDepartment(req) => {
                assert_eq!(req.department_name, "Engineering");
                assert_eq!(req.description, None);
            }
            other => panic!("unexpected submission: {:?}", other),
        }
    }

    #[test]
    fn test_number_fields_reject_letters() {
        let mut form = FormState::task(None);
        type_into(&mut form, "projectId", "4x2");
        assert_eq!(form.field("projectId").unwrap().value, "42");
    }

    #[test]
    fn test_choice_cycles_both_ways() {
        let mut form = FormState::task(None);
        form.focus = form.fields.iter().position(|f| f.key == "status").unwrap();
        assert_eq!(form.focused().unwrap().value, "TODO");
        form.cycle_option(true);
        assert_eq!(form.focused().unwrap().value, "IN_PROGRESS");
        form.cycle_option(false);
        form.cycle_option(false);
        assert_eq!(form.focused().unwrap().value, "DONE");
        form.backspace();
        assert_eq!(form.focused().unwrap().value, "DONE");
    }

    #[test]
    fn test_task_defaults_and_dates() {
        let mut form = FormState::task(None);
        type_into(&mut form, "title", "Write docs");
        type_into(&mut form, "projectId", "3");
        type_into(&mut form, "dueDate", "2024-13-01");
        assert!(form.submission().unwrap_err().contains("YYYY-MM-DD"));

        form.fields.iter_mut().find(|f| f.key == "dueDate").unwrap().value = "2024-12-01".into();
        let Submission::CreateTask(req) = form.submission().unwrap() else {
            panic!("expected task");
        };
        assert_eq!(req.project_id, 3);
        assert_eq!(req.priority.as_deref(), Some("MEDIUM"));
        assert_eq!(req.due_date, NaiveDate::from_ymd_opt(2024, 12, 1));
    }

    #[test]
    fn test_edit_task_prefills() {
        let task = Task {
            task_id: 9,
            title: "Fix bug".to_string(),
            project_id: Some(2),
            status: Some("REVIEW".to_string()),
            priority: Some("HIGH".to_string()),
            ..Default::default()
        };
        let form = FormState::task(Some(&task));
        let Submission::UpdateTask(id, req) = form.submission().unwrap() else {
            panic!("expected update");
        };
        assert_eq!(id, 9);
        assert_eq!(req.status.as_deref(), Some("REVIEW"));
        assert_eq!(req.priority.as_deref(), Some("HIGH"));
    }

    #[test]
    fn test_leave_date_order() {
        let mut form = FormState::submit_leave();
        type_into(&mut form, "startDate", "2024-05-10");
        type_into(&mut form, "endDate", "2024-05-01");
        assert_eq!(form.submission().unwrap_err(), "End date is before start date");
    }

    #[test]
    fn test_review_rating_range() {
        let mut form = FormState::create_review();
        type_into(&mut form, "employeeId", "5");
        type_into(&mut form, "cycleName", "2024 H1");
        type_into(&mut form, "rating", "7");
        assert!(form.submission().is_err());
    }

    #[test]
    fn test_secret_is_masked() {
        let mut form = FormState::change_password();
        type_into(&mut form, "currentPassword", "hunter2");
        assert_eq!(form.fields[0].display_value(), "*******");
    }

    #[test]
    fn test_edit_account_without_role_keeps_role_unset() {
        let account = Account {
            account_id: 4,
            username: "legacy".to_string(),
            role: None,
            ..Default::default()
        };
        let form = FormState::edit_account(&account);
        let Submission::UpdateAccount(id, req) = form.submission().unwrap() else {
            panic!("expected update");
        };
        assert_eq!(id, 4);
        assert_eq!(req.role, None);
        assert_eq!(form.field("role").unwrap().display_value(), "(unchanged)");

        let odd = Account {
            role: Some("SUPERUSER".to_string()),
            ..account
        };
        let Submission::UpdateAccount(_, req) = FormState::edit_account(&odd).submission().unwrap() else {
            panic!("expected update");
        };
        assert_eq!(req.role, None);
    }

    #[test]
    fn test_edit_account_role_picked_or_kept() {
        let account = Account {
            account_id: 5,
            role: Some("MANAGER".to_string()),
            ..Default::default()
        };
        let mut form = FormState::edit_account(&account);
        let Submission::UpdateAccount(_, req) = form.submission().unwrap() else {
            panic!("expected update");
        };
        assert_eq!(req.role, Some(Role::Manager));

        form.focus = form.fields.iter().position(|f| f.key == "role").unwrap();
        form.cycle_option(true);
        let Submission::UpdateAccount(_, req) = form.submission().unwrap() else {
            panic!("expected update");
        };
        assert_eq!(req.role, Some(Role::Employee));
    }

    #[test]
    fn test_leave_decision_excludes_pending() {
        let mut form = FormState::review_leave(8, true);
        form.focus = 0;
        for _ in 0..3 {
            form.cycle_option(true);
            assert_ne!(form.focused().unwrap().value, "PENDING");
        }
        let Submission::ReviewLeave(id, req) = form.submission().unwrap() else {
            panic!("expected review");
        };
        assert_eq!(id, 8);
        assert_eq!(req.status, "REJECTED");
    }

    #[test]
    fn test_create_account_role() {
        let form = FormState::create_account(Role::User);
        assert_eq!(form.field("role").unwrap().value, "USER");
    }
}
