//! Shift helper (sign-up) repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Shift, ShiftHelper, ShiftHelperDetail, ShiftHelperId, ShiftId, UserAccountId};

/// Repository trait for the association between volunteers and shifts.
///
/// Implementations must make the `(user_account_id, shift_id)` uniqueness
/// check and the insert a single atomic step.
#[async_trait]
pub trait ShiftHelperRepository: Send + Sync {
    /// Sign a volunteer up for a shift, stamping `joined_shift_at` with the
    /// current time.
    ///
    /// # Returns
    /// * `Ok(ShiftHelper)` - The new sign-up
    /// * `Err(RepositoryError::UniqueViolation)` - If the volunteer already joined this shift
    /// * `Err(RepositoryError::NotFound)` - If the account or the shift does not exist
    async fn join_shift(
        &self,
        user_account_id: UserAccountId,
        shift_id: ShiftId,
    ) -> RepositoryResult<ShiftHelper>;

    async fn get_shift_helper(&self, helper_id: ShiftHelperId) -> RepositoryResult<ShiftHelper>;

    /// Load a sign-up together with the volunteer's account and the task
    /// of the shift.
    async fn get_shift_helper_detail(
        &self,
        helper_id: ShiftHelperId,
    ) -> RepositoryResult<ShiftHelperDetail>;

    /// Sign-ups for a shift, oldest first.
    async fn list_helpers_for_shift(&self, shift_id: ShiftId) -> RepositoryResult<Vec<ShiftHelper>>;

    /// Shifts a volunteer joined, in shift order.
    async fn list_shifts_for_user(
        &self,
        user_account_id: UserAccountId,
    ) -> RepositoryResult<Vec<Shift>>;

    async fn count_helpers(&self, shift_id: ShiftId) -> RepositoryResult<usize>;

    /// Remove a volunteer from a shift.
    ///
    /// # Returns
    /// * `Ok(true)` - The sign-up existed and was removed
    /// * `Ok(false)` - The volunteer had not joined the shift
    async fn leave_shift(
        &self,
        user_account_id: UserAccountId,
        shift_id: ShiftId,
    ) -> RepositoryResult<bool>;
}
