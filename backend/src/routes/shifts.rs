use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{
    ContactPerson, DisplayFormat, FacilityId, ShiftDetail, ShiftId, TaskId, WorkplaceId,
};

pub const LIST_SHIFTS: &str = "list_shifts";
pub const GET_SHIFT: &str = "get_shift";
pub const SIGN_UP: &str = "sign_up";

/// Shift with its derived display values, as listed to volunteers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftSummary {
    pub shift_id: ShiftId,
    pub slots: i32,
    pub helper_count: usize,
    pub task_id: TaskId,
    pub task_name: String,
    pub workplace_id: Option<WorkplaceId>,
    pub workplace_name: Option<String>,
    pub facility_id: FacilityId,
    pub facility_name: String,
    pub starting_time: NaiveDateTime,
    pub ending_time: NaiveDateTime,
    pub starting_date: NaiveDate,
    pub span_in_days: i64,
    pub duration_minutes: i64,
    pub display_ending_time: String,
    pub description: String,
    pub url: String,
    pub contact: Option<ContactPerson>,
}

impl ShiftSummary {
    pub fn from_detail(detail: &ShiftDetail, helper_count: usize, format: &DisplayFormat) -> Self {
        let shift = &detail.shift;
        Self {
            shift_id: shift.id,
            slots: shift.slots,
            helper_count,
            task_id: detail.task.record.id,
            task_name: detail.task.record.name.clone(),
            workplace_id: detail.workplace.as_ref().map(|w| w.record.id),
            workplace_name: detail.workplace.as_ref().map(|w| w.record.name.clone()),
            facility_id: detail.facility.record.id,
            facility_name: detail.facility.record.name.clone(),
            starting_time: shift.starting_time,
            ending_time: shift.ending_time,
            starting_date: shift.starting_date(),
            span_in_days: shift.span_in_days(),
            duration_minutes: shift.duration().num_minutes(),
            display_ending_time: shift.display_ending_time_with(format),
            description: detail.describe_with(format),
            url: shift.canonical_url(),
            contact: detail.resolve_contact().cloned(),
        }
    }
}
