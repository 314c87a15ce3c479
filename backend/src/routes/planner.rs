use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::shifts::ShiftSummary;
use crate::models::FacilityId;

pub const PLANNER_BY_FACILITY: &str = "planner_by_facility";
pub const PLANNER_BY_FACILITY_PATH: &str = "/shifts/{pk}/{year}/{month}/{day}/";

/// Reverse the `planner_by_facility` route.
pub fn reverse_planner_by_facility(facility_id: FacilityId, date: NaiveDate) -> String {
    PLANNER_BY_FACILITY_PATH
        .replace("{pk}", &facility_id.to_string())
        .replace("{year}", &date.year().to_string())
        .replace("{month}", &date.month().to_string())
        .replace("{day}", &date.day().to_string())
}

/// Shifts of one facility on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerDay {
    pub facility_id: FacilityId,
    pub facility_name: String,
    pub date: NaiveDate,
    pub shifts: Vec<ShiftSummary>,
}
