//! Named routes and the data shapes they serve.
//!
//! Path templates use axum's `{param}` syntax and are mounted verbatim by
//! the HTTP router, so reversing a route here always yields a path the
//! server answers.

pub mod planner;
pub mod shifts;

pub use planner::{
    reverse_planner_by_facility, PlannerDay, PLANNER_BY_FACILITY, PLANNER_BY_FACILITY_PATH,
};
pub use shifts::{ShiftSummary, GET_SHIFT, LIST_SHIFTS, SIGN_UP};

/// Every route the server mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Health,
    ListShifts,
    GetShift,
    SignUp,
    Withdraw,
    Contacts,
    Facilities,
    Workplaces,
    Tasks,
    Accounts,
    PlannerByFacility,
}

impl Route {
    pub const ALL: [Route; 11] = [
        Route::Health,
        Route::ListShifts,
        Route::GetShift,
        Route::SignUp,
        Route::Withdraw,
        Route::Contacts,
        Route::Facilities,
        Route::Workplaces,
        Route::Tasks,
        Route::Accounts,
        Route::PlannerByFacility,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Route::Health => "health",
            Route::ListShifts => LIST_SHIFTS,
            Route::GetShift => GET_SHIFT,
            Route::SignUp => SIGN_UP,
            Route::Withdraw => "withdraw",
            Route::Contacts => "contacts",
            Route::Facilities => "facilities",
            Route::Workplaces => "workplaces",
            Route::Tasks => "tasks",
            Route::Accounts => "accounts",
            Route::PlannerByFacility => PLANNER_BY_FACILITY,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Health => "/health",
            Route::ListShifts => "/v1/shifts",
            Route::GetShift => "/v1/shifts/{shift_id}",
            Route::SignUp => "/v1/shifts/{shift_id}/helpers",
            Route::Withdraw => "/v1/shifts/{shift_id}/helpers/{user_account_id}",
            Route::Contacts => "/v1/contacts",
            Route::Facilities => "/v1/facilities",
            Route::Workplaces => "/v1/workplaces",
            Route::Tasks => "/v1/tasks",
            Route::Accounts => "/v1/accounts",
            Route::PlannerByFacility => PLANNER_BY_FACILITY_PATH,
        }
    }

    pub fn by_name(name: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|route| route.name() == name)
    }
}
