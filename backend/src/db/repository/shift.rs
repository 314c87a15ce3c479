//! Shift repository trait and listing filter.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::error::RepositoryResult;
use crate::models::{FacilityId, NewShift, Shift, ShiftDetail, ShiftId};

/// Criteria for [`ShiftRepository::list_shifts`]. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftFilter {
    /// Only shifts at this facility.
    pub facility: Option<FacilityId>,
    /// Only shifts overlapping this calendar day.
    pub on_date: Option<NaiveDate>,
    /// Only shifts that have not ended at this instant.
    pub open_at: Option<NaiveDateTime>,
}

impl ShiftFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn facility(mut self, facility: FacilityId) -> Self {
        self.facility = Some(facility);
        self
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.on_date = Some(date);
        self
    }

    pub fn open_at(mut self, now: NaiveDateTime) -> Self {
        self.open_at = Some(now);
        self
    }

    pub fn matches(&self, shift: &Shift) -> bool {
        self.facility.map_or(true, |facility| shift.facility_id == facility)
            && self.on_date.map_or(true, |date| shift.overlaps_date(date))
            && self.open_at.map_or(true, |now| shift.is_open_at(now))
    }
}

/// Repository trait for shift records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ShiftRepository: Send + Sync {
    /// Check if the storage backend is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if healthy
    /// - `Ok(false)` if unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Validate and store a new shift.
    ///
    /// # Returns
    /// * `Ok(Shift)` - The stored shift with its assigned ID
    /// * `Err(RepositoryError::ValidationError)` - If slots are negative or the shift ends before it starts
    /// * `Err(RepositoryError::NotFound)` - If the task, workplace, facility or contact does not exist
    async fn store_shift(&self, shift: NewShift) -> RepositoryResult<Shift>;

    /// Replace every field of an existing shift.
    async fn update_shift(&self, shift: Shift) -> RepositoryResult<Shift>;

    async fn get_shift(&self, shift_id: ShiftId) -> RepositoryResult<Shift>;

    /// Load a shift together with its task, workplace, facility and their
    /// contact persons.
    async fn get_shift_detail(&self, shift_id: ShiftId) -> RepositoryResult<ShiftDetail>;

    /// List shifts matching `filter`, ordered by starting time, then ending
    /// time, then id.
    async fn list_shifts(&self, filter: &ShiftFilter) -> RepositoryResult<Vec<Shift>>;

    /// Delete a shift and its helper sign-ups.
    ///
    /// # Returns
    /// * `Ok(true)` - The shift existed and was deleted
    /// * `Ok(false)` - No shift with that ID
    async fn delete_shift(&self, shift_id: ShiftId) -> RepositoryResult<bool>;
}
