//! Data models for EMSA resources.
//!
//! Response types mirror the backend's JSON (camelCase, most fields optional).
//! Request types skip `None` fields when serialized so partial updates only
//! carry what the user changed.
//!
//! - `Account` plus the account request bodies
//! - `Department`, `Project`, `Task`, `Kpi`
//! - `LeaveRequest`, `PerformanceReview`
//! - `AuditLog`

pub mod account;
pub mod audit;
pub mod department;
pub mod kpi;
pub mod leave;
pub mod project;
pub mod review;
pub mod task;

pub use account::{
    Account, ChangePasswordRequest, CreateAccountRequest, LoginRequest, ResetPasswordRequest,
    UpdateAccountRequest,
};
pub use audit::AuditLog;
pub use department::{Department, DepartmentRequest};
pub use kpi::{Kpi, KpiRequest, KPI_STATUSES};
pub use leave::{LeaveRequest, LeaveRequestDto, ReviewLeaveRequest, LEAVE_STATUSES, LEAVE_TYPES};
pub use project::{Project, ProjectRequest, PROJECT_STATUSES};
pub use review::{PerformanceReview, PerformanceReviewRequest, SelfAppraisalRequest, REVIEW_STATUSES};
pub use task::{Task, TaskRequest, TASK_PRIORITIES, TASK_STATUSES};
