//! Public API surface of the shift planner.
//!
//! Consolidates the record types, identifiers and response shapes a caller
//! needs, so `use shift_planner::api::*` is enough to drive the library.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::models::{
    day_qualifier, ContactPerson, ContactPersonId, DisplayFormat, Facility, FacilityId,
    InvalidFormat, NewContactPerson, NewFacility, NewShift, NewTask, NewUserAccount,
    NewWorkplace, Related, Shift, ShiftDetail, ShiftHelper, ShiftHelperDetail, ShiftHelperId,
    ShiftId, ShiftValidationError, Task, TaskId, UserAccount, UserAccountId, Workplace,
    WorkplaceId,
};

pub use crate::routes::{reverse_planner_by_facility, PlannerDay, Route, ShiftSummary};

pub use crate::db::repository::{RepositoryError, RepositoryResult, ShiftFilter};
