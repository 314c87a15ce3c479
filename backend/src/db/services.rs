//! High-level service layer.
//!
//! Repository-agnostic operations used by the HTTP layer and by library
//! callers. They work with any [`FullRepository`], including
//! `dyn FullRepository` behind the global singleton.
//!
//! Invariants are enforced by the storage backends, not here: a duplicate
//! sign-up is rejected by the backend's atomic uniqueness check and comes
//! back as `RepositoryError::UniqueViolation`.
//!
//! # Usage
//!
//! ```no_run
//! use shift_planner::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let now = chrono::Local::now().naive_local();
//!     let shifts = services::open_shifts(&repo, now).await?;
//!     println!("{} open shifts", shifts.len());
//!     Ok(())
//! }
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};

use super::repository::{FullRepository, RepositoryResult, ShiftFilter};
use crate::models::*;
use crate::routes::{PlannerDay, ShiftSummary};

// ==================== Health & Connection ====================

pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Shifts ====================

/// Validate and store a new shift.
pub async fn create_shift<R: FullRepository + ?Sized>(
    repo: &R,
    shift: NewShift,
) -> RepositoryResult<Shift> {
    let stored = repo.store_shift(shift).await?;
    info!(
        "Created shift {} for task {} at facility {} ({} - {})",
        stored.id, stored.task_id, stored.facility_id, stored.starting_time, stored.ending_time
    );
    Ok(stored)
}

pub async fn update_shift<R: FullRepository + ?Sized>(
    repo: &R,
    shift: Shift,
) -> RepositoryResult<Shift> {
    let updated = repo.update_shift(shift).await?;
    info!("Updated shift {}", updated.id);
    Ok(updated)
}

pub async fn get_shift_detail<R: FullRepository + ?Sized>(
    repo: &R,
    shift_id: ShiftId,
) -> RepositoryResult<ShiftDetail> {
    repo.get_shift_detail(shift_id).await
}

/// Load a shift with its derived display values and current helper count.
pub async fn shift_summary<R: FullRepository + ?Sized>(
    repo: &R,
    shift_id: ShiftId,
    format: &DisplayFormat,
) -> RepositoryResult<ShiftSummary> {
    let detail = repo.get_shift_detail(shift_id).await?;
    let helper_count = repo.count_helpers(shift_id).await?;
    Ok(ShiftSummary::from_detail(&detail, helper_count, format))
}

/// Summaries for every shift matching `filter`, in shift order.
pub async fn shift_summaries<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &ShiftFilter,
    format: &DisplayFormat,
) -> RepositoryResult<Vec<ShiftSummary>> {
    let shifts = repo.list_shifts(filter).await?;
    let mut summaries = Vec::with_capacity(shifts.len());
    for shift in shifts {
        summaries.push(shift_summary(repo, shift.id, format).await?);
    }
    Ok(summaries)
}

pub async fn list_shifts<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &ShiftFilter,
) -> RepositoryResult<Vec<Shift>> {
    repo.list_shifts(filter).await
}

/// Shifts that have not ended at `now`.
pub async fn open_shifts<R: FullRepository + ?Sized>(
    repo: &R,
    now: NaiveDateTime,
) -> RepositoryResult<Vec<Shift>> {
    repo.list_shifts(&ShiftFilter::all().open_at(now)).await
}

/// Shifts of one facility overlapping one calendar day.
pub async fn planner_shifts<R: FullRepository + ?Sized>(
    repo: &R,
    facility_id: FacilityId,
    date: NaiveDate,
) -> RepositoryResult<Vec<Shift>> {
    repo.list_shifts(&ShiftFilter::all().facility(facility_id).on_date(date))
        .await
}

/// The planner page: a facility's shifts on one day, rendered.
pub async fn planner_day<R: FullRepository + ?Sized>(
    repo: &R,
    facility_id: FacilityId,
    date: NaiveDate,
    format: &DisplayFormat,
) -> RepositoryResult<PlannerDay> {
    let facility = repo.get_facility(facility_id).await?;
    let filter = ShiftFilter::all().facility(facility_id).on_date(date);
    let shifts = shift_summaries(repo, &filter, format).await?;
    debug!(
        "Planner for facility {} on {}: {} shifts",
        facility_id,
        date,
        shifts.len()
    );
    Ok(PlannerDay {
        facility_id,
        facility_name: facility.name,
        date,
        shifts,
    })
}

pub async fn delete_shift<R: FullRepository + ?Sized>(
    repo: &R,
    shift_id: ShiftId,
) -> RepositoryResult<bool> {
    let deleted = repo.delete_shift(shift_id).await?;
    if deleted {
        info!("Deleted shift {}", shift_id);
    }
    Ok(deleted)
}

// ==================== Sign-ups ====================

/// Sign a volunteer up for a shift.
///
/// There is no pre-check here; the backend rejects a duplicate atomically
/// with `RepositoryError::UniqueViolation`.
pub async fn sign_up<R: FullRepository + ?Sized>(
    repo: &R,
    user_account_id: UserAccountId,
    shift_id: ShiftId,
) -> RepositoryResult<ShiftHelper> {
    match repo.join_shift(user_account_id, shift_id).await {
        Ok(helper) => {
            info!("User account {} joined shift {}", user_account_id, shift_id);
            Ok(helper)
        }
        Err(e) => {
            if e.is_unique_violation() {
                warn!(
                    "User account {} already joined shift {}",
                    user_account_id, shift_id
                );
            }
            Err(e)
        }
    }
}

/// Remove a volunteer from a shift. `Ok(false)` when they had not joined.
pub async fn withdraw<R: FullRepository + ?Sized>(
    repo: &R,
    user_account_id: UserAccountId,
    shift_id: ShiftId,
) -> RepositoryResult<bool> {
    let removed = repo.leave_shift(user_account_id, shift_id).await?;
    if removed {
        info!("User account {} left shift {}", user_account_id, shift_id);
    }
    Ok(removed)
}

/// Sign-ups for a shift with account and task loaded, oldest first.
pub async fn shift_helpers<R: FullRepository + ?Sized>(
    repo: &R,
    shift_id: ShiftId,
) -> RepositoryResult<Vec<ShiftHelperDetail>> {
    let helpers = repo.list_helpers_for_shift(shift_id).await?;
    let mut details = Vec::with_capacity(helpers.len());
    for helper in helpers {
        details.push(repo.get_shift_helper_detail(helper.id).await?);
    }
    Ok(details)
}

pub async fn shifts_for_user<R: FullRepository + ?Sized>(
    repo: &R,
    user_account_id: UserAccountId,
) -> RepositoryResult<Vec<Shift>> {
    repo.list_shifts_for_user(user_account_id).await
}

// ==================== Organization ====================

pub async fn create_contact<R: FullRepository + ?Sized>(
    repo: &R,
    contact: NewContactPerson,
) -> RepositoryResult<ContactPerson> {
    let stored = repo.store_contact(contact).await?;
    info!("Created contact person {}", stored.id);
    Ok(stored)
}

pub async fn create_facility<R: FullRepository + ?Sized>(
    repo: &R,
    facility: NewFacility,
) -> RepositoryResult<Facility> {
    let stored = repo.store_facility(facility).await?;
    info!("Created facility {} '{}'", stored.id, stored.name);
    Ok(stored)
}

pub async fn create_workplace<R: FullRepository + ?Sized>(
    repo: &R,
    workplace: NewWorkplace,
) -> RepositoryResult<Workplace> {
    let stored = repo.store_workplace(workplace).await?;
    info!(
        "Created workplace {} '{}' at facility {}",
        stored.id, stored.name, stored.facility_id
    );
    Ok(stored)
}

pub async fn create_task<R: FullRepository + ?Sized>(
    repo: &R,
    task: NewTask,
) -> RepositoryResult<Task> {
    let stored = repo.store_task(task).await?;
    info!(
        "Created task {} '{}' at facility {}",
        stored.id, stored.name, stored.facility_id
    );
    Ok(stored)
}

pub async fn create_user_account<R: FullRepository + ?Sized>(
    repo: &R,
    account: NewUserAccount,
) -> RepositoryResult<UserAccount> {
    let stored = repo.store_user_account(account).await?;
    info!("Created user account {} '{}'", stored.id, stored.username);
    Ok(stored)
}
