//! Repository trait for the records shifts reference.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    ContactPerson, ContactPersonId, Facility, FacilityId, NewContactPerson, NewFacility, NewTask,
    NewUserAccount, NewWorkplace, Task, TaskId, UserAccount, UserAccountId, Workplace, WorkplaceId,
};

/// Store, fetch and delete organization records.
///
/// Stores fail with `NotFound` when a referenced parent or contact person
/// does not exist. Deletes return `Ok(false)` for unknown IDs and cascade:
///
/// - facility: its workplaces, tasks and shifts
/// - workplace: its tasks and shifts
/// - task: its shifts
/// - user account: its sign-ups
/// - contact person: references to it are cleared, nothing is deleted
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    // ==================== Contact persons ====================

    async fn store_contact(&self, contact: NewContactPerson) -> RepositoryResult<ContactPerson>;

    async fn get_contact(&self, contact_id: ContactPersonId) -> RepositoryResult<ContactPerson>;

    async fn delete_contact(&self, contact_id: ContactPersonId) -> RepositoryResult<bool>;

    // ==================== Facilities ====================

    async fn store_facility(&self, facility: NewFacility) -> RepositoryResult<Facility>;

    async fn get_facility(&self, facility_id: FacilityId) -> RepositoryResult<Facility>;

    async fn list_facilities(&self) -> RepositoryResult<Vec<Facility>>;

    async fn delete_facility(&self, facility_id: FacilityId) -> RepositoryResult<bool>;

    // ==================== Workplaces ====================

    async fn store_workplace(&self, workplace: NewWorkplace) -> RepositoryResult<Workplace>;

    async fn get_workplace(&self, workplace_id: WorkplaceId) -> RepositoryResult<Workplace>;

    async fn delete_workplace(&self, workplace_id: WorkplaceId) -> RepositoryResult<bool>;

    // ==================== Tasks ====================

    async fn store_task(&self, task: NewTask) -> RepositoryResult<Task>;

    async fn get_task(&self, task_id: TaskId) -> RepositoryResult<Task>;

    async fn delete_task(&self, task_id: TaskId) -> RepositoryResult<bool>;

    // ==================== User accounts ====================

    /// Store an account.
    ///
    /// # Returns
    /// * `Err(RepositoryError::UniqueViolation)` - If the username is taken
    async fn store_user_account(&self, account: NewUserAccount) -> RepositoryResult<UserAccount>;

    async fn get_user_account(&self, account_id: UserAccountId) -> RepositoryResult<UserAccount>;

    async fn delete_user_account(&self, account_id: UserAccountId) -> RepositoryResult<bool>;
}
