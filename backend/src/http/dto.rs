//! Data Transfer Objects for the HTTP API.
//!
//! Records and summaries that already derive Serialize/Deserialize are sent
//! as they are; this module only holds request bodies, query strings and the
//! envelopes that wrap them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    FacilityId, ShiftHelperDetail, ShiftHelperId, ShiftId, TaskId, UserAccountId,
};
use crate::routes::ShiftSummary;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Query string of `GET /v1/shifts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftListQuery {
    pub facility_id: Option<FacilityId>,
    /// Only shifts overlapping this calendar day (`YYYY-MM-DD`)
    pub date: Option<NaiveDate>,
    /// Only shifts that have not ended yet
    #[serde(default)]
    pub open: bool,
}

/// Response for shift listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftListResponse {
    pub shifts: Vec<ShiftSummary>,
    pub total: usize,
}

/// Request body for `POST /v1/shifts/{shift_id}/helpers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub user_account_id: UserAccountId,
}

/// One sign-up as listed under a shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperDto {
    pub id: ShiftHelperId,
    pub shift_id: ShiftId,
    pub user_account_id: UserAccountId,
    pub username: String,
    pub task_id: TaskId,
    pub joined_shift_at: DateTime<Utc>,
    pub description: String,
}

impl From<ShiftHelperDetail> for HelperDto {
    fn from(detail: ShiftHelperDetail) -> Self {
        let description = detail.describe();
        Self {
            id: detail.helper.id,
            shift_id: detail.helper.shift_id,
            user_account_id: detail.helper.user_account_id,
            username: detail.user_account.username,
            task_id: detail.task.id,
            joined_shift_at: detail.helper.joined_shift_at,
            description,
        }
    }
}

/// Response for `GET /v1/shifts/{shift_id}/helpers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperListResponse {
    pub helpers: Vec<HelperDto>,
    pub total: usize,
}

/// Path segments of the planner route.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlannerPath {
    pub pk: FacilityId,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl PlannerPath {
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}
