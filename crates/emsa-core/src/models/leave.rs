use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const LEAVE_TYPES: &[&str] = &["LEAVE", "WFH", "REIMBURSEMENT", "HR_REQUEST"];
pub const LEAVE_STATUSES: &[&str] = &["APPROVED", "REJECTED"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub request_id: i64,
    pub account_id: Option<i64>,
    pub account_name: Option<String>,
    pub request_type: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub reviewed_by_id: Option<i64>,
    pub reviewed_by_name: Option<String>,
    pub review_comment: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl LeaveRequest {
    pub fn is_pending(&self) -> bool {
        self.status.as_deref() == Some("PENDING")
    }

    /// Inclusive number of days covered, when both ends are known.
    pub fn days(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_days() + 1),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestDto {
    pub request_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Approve or reject a pending request. `status` is APPROVED or REJECTED.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLeaveRequest {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_days_inclusive() {
        let req = LeaveRequest {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 20),
            ..Default::default()
        };
        assert_eq!(req.days(), Some(6));

        let backwards = LeaveRequest {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 20),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            ..Default::default()
        };
        assert_eq!(backwards.days(), None);
    }
}
