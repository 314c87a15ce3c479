//! In-memory local repository implementation.
//!
//! Implements every repository trait over `HashMap`s behind a single
//! `parking_lot::RwLock`. Each operation takes the lock once, so checks and
//! writes inside one call are atomic with respect to other callers. That is
//! what makes sign-up uniqueness hold under concurrent requests.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::*;

/// In-memory local repository, suitable for tests and local development.
///
/// # Example
/// ```
/// use shift_planner::db::repositories::LocalRepository;
/// use shift_planner::db::repository::OrganizationRepository;
/// use shift_planner::models::NewFacility;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// runtime.block_on(async {
///     let repo = LocalRepository::new();
///     let facility = repo
///         .store_facility(NewFacility {
///             name: "Central Station".into(),
///             description: String::new(),
///             shift_contact_id: None,
///         })
///         .await
///         .unwrap();
///     assert_eq!(facility.id.value(), 1);
/// });
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    contacts: HashMap<ContactPersonId, ContactPerson>,
    facilities: HashMap<FacilityId, Facility>,
    workplaces: HashMap<WorkplaceId, Workplace>,
    tasks: HashMap<TaskId, Task>,
    accounts: HashMap<UserAccountId, UserAccount>,
    shifts: HashMap<ShiftId, Shift>,
    helpers: HashMap<ShiftHelperId, ShiftHelper>,

    // ID counters
    next_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            contacts: HashMap::new(),
            facilities: HashMap::new(),
            workplaces: HashMap::new(),
            tasks: HashMap::new(),
            accounts: HashMap::new(),
            shifts: HashMap::new(),
            helpers: HashMap::new(),
            next_id: 1,
            is_healthy: true,
        }
    }
}

fn shift_order(a: &Shift, b: &Shift) -> std::cmp::Ordering {
    (a.starting_time, a.ending_time, a.id).cmp(&(b.starting_time, b.ending_time, b.id))
}

impl LocalData {
    /// One sequence shared by every table.
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn contact(&self, op: &str, id: ContactPersonId) -> RepositoryResult<&ContactPerson> {
        self.contacts
            .get(&id)
            .ok_or_else(|| RepositoryError::missing(op, "contact_person", id))
    }

    fn facility(&self, op: &str, id: FacilityId) -> RepositoryResult<&Facility> {
        self.facilities
            .get(&id)
            .ok_or_else(|| RepositoryError::missing(op, "facility", id))
    }

    fn workplace(&self, op: &str, id: WorkplaceId) -> RepositoryResult<&Workplace> {
        self.workplaces
            .get(&id)
            .ok_or_else(|| RepositoryError::missing(op, "workplace", id))
    }

    fn task(&self, op: &str, id: TaskId) -> RepositoryResult<&Task> {
        self.tasks
            .get(&id)
            .ok_or_else(|| RepositoryError::missing(op, "task", id))
    }

    fn account(&self, op: &str, id: UserAccountId) -> RepositoryResult<&UserAccount> {
        self.accounts
            .get(&id)
            .ok_or_else(|| RepositoryError::missing(op, "user_account", id))
    }

    fn shift(&self, op: &str, id: ShiftId) -> RepositoryResult<&Shift> {
        self.shifts
            .get(&id)
            .ok_or_else(|| RepositoryError::missing(op, "shift", id))
    }

    fn helper(&self, op: &str, id: ShiftHelperId) -> RepositoryResult<&ShiftHelper> {
        self.helpers
            .get(&id)
            .ok_or_else(|| RepositoryError::missing(op, "shift_helper", id))
    }

    fn check_contact(&self, op: &str, id: Option<ContactPersonId>) -> RepositoryResult<()> {
        match id {
            Some(id) => self.contact(op, id).map(|_| ()),
            None => Ok(()),
        }
    }

    fn optional_contact(&self, id: Option<ContactPersonId>) -> Option<ContactPerson> {
        id.and_then(|id| self.contacts.get(&id).cloned())
    }

    fn check_shift_references(&self, op: &str, shift: &NewShift) -> RepositoryResult<()> {
        self.facility(op, shift.facility_id)?;
        self.task(op, shift.task_id)?;
        if let Some(workplace_id) = shift.workplace_id {
            self.workplace(op, workplace_id)?;
        }
        self.check_contact(op, shift.shift_contact_id)
    }

    fn shift_detail(&self, op: &str, shift: &Shift) -> RepositoryResult<ShiftDetail> {
        let task = self.task(op, shift.task_id)?;
        let facility = self.facility(op, shift.facility_id)?;
        let workplace = match shift.workplace_id {
            Some(id) => {
                let workplace = self.workplace(op, id)?;
                Some(Related::new(
                    workplace.clone(),
                    self.optional_contact(workplace.shift_contact_id),
                ))
            }
            None => None,
        };

        Ok(ShiftDetail {
            shift: shift.clone(),
            shift_contact: self.optional_contact(shift.shift_contact_id),
            task: Related::new(task.clone(), self.optional_contact(task.shift_contact_id)),
            workplace,
            facility: Related::new(
                facility.clone(),
                self.optional_contact(facility.shift_contact_id),
            ),
        })
    }

    fn remove_shift(&mut self, id: ShiftId) -> bool {
        let existed = self.shifts.remove(&id).is_some();
        if existed {
            self.helpers.retain(|_, helper| helper.shift_id != id);
        }
        existed
    }

    fn remove_shifts_where(&mut self, predicate: impl Fn(&Shift) -> bool) {
        let doomed: Vec<ShiftId> = self
            .shifts
            .values()
            .filter(|shift| predicate(*shift))
            .map(|shift| shift.id)
            .collect();
        for id in doomed {
            self.remove_shift(id);
        }
    }

    fn remove_task(&mut self, id: TaskId) -> bool {
        let existed = self.tasks.remove(&id).is_some();
        if existed {
            self.remove_shifts_where(|shift| shift.task_id == id);
        }
        existed
    }

    fn remove_tasks_where(&mut self, predicate: impl Fn(&Task) -> bool) {
        let doomed: Vec<TaskId> = self
            .tasks
            .values()
            .filter(|task| predicate(*task))
            .map(|task| task.id)
            .collect();
        for id in doomed {
            self.remove_task(id);
        }
    }

    fn remove_workplace(&mut self, id: WorkplaceId) -> bool {
        let existed = self.workplaces.remove(&id).is_some();
        if existed {
            self.remove_tasks_where(|task| task.workplace_id == Some(id));
            self.remove_shifts_where(|shift| shift.workplace_id == Some(id));
        }
        existed
    }

    fn remove_facility(&mut self, id: FacilityId) -> bool {
        let existed = self.facilities.remove(&id).is_some();
        if existed {
            let workplaces: Vec<WorkplaceId> = self
                .workplaces
                .values()
                .filter(|workplace| workplace.facility_id == id)
                .map(|workplace| workplace.id)
                .collect();
            for workplace in workplaces {
                self.remove_workplace(workplace);
            }
            self.remove_tasks_where(|task| task.facility_id == id);
            self.remove_shifts_where(|shift| shift.facility_id == id);
        }
        existed
    }

    /// Clear every `shift_contact_id` pointing at `id`.
    fn detach_contact(&mut self, id: ContactPersonId) {
        let detach = |slot: &mut Option<ContactPersonId>| {
            if *slot == Some(id) {
                *slot = None;
            }
        };
        self.facilities
            .values_mut()
            .for_each(|f| detach(&mut f.shift_contact_id));
        self.workplaces
            .values_mut()
            .for_each(|w| detach(&mut w.shift_contact_id));
        self.tasks
            .values_mut()
            .for_each(|t| detach(&mut t.shift_contact_id));
        self.shifts
            .values_mut()
            .for_each(|s| detach(&mut s.shift_contact_id));
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository. Health status and the ID
    /// sequence are kept.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            next_id: data.next_id,
            ..Default::default()
        };
    }

    /// Get the number of shifts stored.
    pub fn shift_count(&self) -> usize {
        self.data.read().shifts.len()
    }

    /// Get the number of sign-ups stored, across all shifts.
    pub fn helper_count(&self) -> usize {
        self.data.read().helpers.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Local repository is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShiftRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn store_shift(&self, shift: NewShift) -> RepositoryResult<Shift> {
        const OP: &str = "store_shift";
        self.check_health(OP)?;
        shift
            .validate()
            .map_err(|e| RepositoryError::from(e).with_operation(OP))?;

        let mut data = self.data.write();
        data.check_shift_references(OP, &shift)?;
        let id = ShiftId::new(data.allocate_id());
        let stored = shift.into_shift(id);
        data.shifts.insert(id, stored.clone());
        log::debug!("Stored shift {} at facility {}", id, stored.facility_id);
        Ok(stored)
    }

    async fn update_shift(&self, shift: Shift) -> RepositoryResult<Shift> {
        const OP: &str = "update_shift";
        self.check_health(OP)?;
        shift
            .validate()
            .map_err(|e| RepositoryError::from(e).with_operation(OP).with_entity("shift", shift.id))?;

        let mut data = self.data.write();
        data.shift(OP, shift.id)?;
        let references = NewShift {
            slots: shift.slots,
            task_id: shift.task_id,
            workplace_id: shift.workplace_id,
            facility_id: shift.facility_id,
            starting_time: shift.starting_time,
            ending_time: shift.ending_time,
            shift_contact_id: shift.shift_contact_id,
        };
        data.check_shift_references(OP, &references)?;
        data.shifts.insert(shift.id, shift.clone());
        Ok(shift)
    }

    async fn get_shift(&self, shift_id: ShiftId) -> RepositoryResult<Shift> {
        self.check_health("get_shift")?;
        self.data.read().shift("get_shift", shift_id).cloned()
    }

    async fn get_shift_detail(&self, shift_id: ShiftId) -> RepositoryResult<ShiftDetail> {
        const OP: &str = "get_shift_detail";
        self.check_health(OP)?;
        let data = self.data.read();
        let shift = data.shift(OP, shift_id)?;
        data.shift_detail(OP, shift)
    }

    async fn list_shifts(&self, filter: &ShiftFilter) -> RepositoryResult<Vec<Shift>> {
        self.check_health("list_shifts")?;
        let data = self.data.read();
        let mut shifts: Vec<Shift> = data
            .shifts
            .values()
            .filter(|shift| filter.matches(shift))
            .cloned()
            .collect();
        shifts.sort_by(shift_order);
        Ok(shifts)
    }

    async fn delete_shift(&self, shift_id: ShiftId) -> RepositoryResult<bool> {
        self.check_health("delete_shift")?;
        Ok(self.data.write().remove_shift(shift_id))
    }
}

#[async_trait]
impl ShiftHelperRepository for LocalRepository {
    async fn join_shift(
        &self,
        user_account_id: UserAccountId,
        shift_id: ShiftId,
    ) -> RepositoryResult<ShiftHelper> {
        const OP: &str = "join_shift";
        self.check_health(OP)?;

        let mut data = self.data.write();
        data.account(OP, user_account_id)?;
        data.shift(OP, shift_id)?;
        if data
            .helpers
            .values()
            .any(|h| h.user_account_id == user_account_id && h.shift_id == shift_id)
        {
            return Err(RepositoryError::unique_violation_with_context(
                format!("user account {} already joined shift {}", user_account_id, shift_id),
                ErrorContext::new(OP)
                    .with_entity("shift_helper")
                    .with_details("unique (user_account_id, shift_id)"),
            ));
        }

        let id = ShiftHelperId::new(data.allocate_id());
        let helper = ShiftHelper {
            id,
            user_account_id,
            shift_id,
            joined_shift_at: Utc::now(),
        };
        data.helpers.insert(id, helper.clone());
        Ok(helper)
    }

    async fn get_shift_helper(&self, helper_id: ShiftHelperId) -> RepositoryResult<ShiftHelper> {
        self.check_health("get_shift_helper")?;
        self.data.read().helper("get_shift_helper", helper_id).cloned()
    }

    async fn get_shift_helper_detail(
        &self,
        helper_id: ShiftHelperId,
    ) -> RepositoryResult<ShiftHelperDetail> {
        const OP: &str = "get_shift_helper_detail";
        self.check_health(OP)?;
        let data = self.data.read();
        let helper = data.helper(OP, helper_id)?;
        let user_account = data.account(OP, helper.user_account_id)?;
        let shift = data.shift(OP, helper.shift_id)?;
        let task = data.task(OP, shift.task_id)?;
        Ok(ShiftHelperDetail {
            helper: helper.clone(),
            user_account: user_account.clone(),
            task: task.clone(),
        })
    }

    async fn list_helpers_for_shift(&self, shift_id: ShiftId) -> RepositoryResult<Vec<ShiftHelper>> {
        self.check_health("list_helpers_for_shift")?;
        let data = self.data.read();
        let mut helpers: Vec<ShiftHelper> = data
            .helpers
            .values()
            .filter(|h| h.shift_id == shift_id)
            .cloned()
            .collect();
        helpers.sort_by_key(|h| (h.joined_shift_at, h.id));
        Ok(helpers)
    }

    async fn list_shifts_for_user(
        &self,
        user_account_id: UserAccountId,
    ) -> RepositoryResult<Vec<Shift>> {
        self.check_health("list_shifts_for_user")?;
        let data = self.data.read();
        let mut shifts: Vec<Shift> = data
            .helpers
            .values()
            .filter(|h| h.user_account_id == user_account_id)
            .filter_map(|h| data.shifts.get(&h.shift_id).cloned())
            .collect();
        shifts.sort_by(shift_order);
        Ok(shifts)
    }

    async fn count_helpers(&self, shift_id: ShiftId) -> RepositoryResult<usize> {
        self.check_health("count_helpers")?;
        Ok(self
            .data
            .read()
            .helpers
            .values()
            .filter(|h| h.shift_id == shift_id)
            .count())
    }

    async fn leave_shift(
        &self,
        user_account_id: UserAccountId,
        shift_id: ShiftId,
    ) -> RepositoryResult<bool> {
        self.check_health("leave_shift")?;
        let mut data = self.data.write();
        let before = data.helpers.len();
        data.helpers
            .retain(|_, h| !(h.user_account_id == user_account_id && h.shift_id == shift_id));
        Ok(data.helpers.len() < before)
    }
}

#[async_trait]
impl OrganizationRepository for LocalRepository {
    async fn store_contact(&self, contact: NewContactPerson) -> RepositoryResult<ContactPerson> {
        self.check_health("store_contact")?;
        let mut data = self.data.write();
        let id = ContactPersonId::new(data.allocate_id());
        let stored = contact.into_record(id);
        data.contacts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_contact(&self, contact_id: ContactPersonId) -> RepositoryResult<ContactPerson> {
        self.check_health("get_contact")?;
        self.data.read().contact("get_contact", contact_id).cloned()
    }

    async fn delete_contact(&self, contact_id: ContactPersonId) -> RepositoryResult<bool> {
        self.check_health("delete_contact")?;
        let mut data = self.data.write();
        let existed = data.contacts.remove(&contact_id).is_some();
        if existed {
            data.detach_contact(contact_id);
        }
        Ok(existed)
    }

    async fn store_facility(&self, facility: NewFacility) -> RepositoryResult<Facility> {
        const OP: &str = "store_facility";
        self.check_health(OP)?;
        let mut data = self.data.write();
        data.check_contact(OP, facility.shift_contact_id)?;
        let id = FacilityId::new(data.allocate_id());
        let stored = facility.into_record(id);
        data.facilities.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_facility(&self, facility_id: FacilityId) -> RepositoryResult<Facility> {
        self.check_health("get_facility")?;
        self.data.read().facility("get_facility", facility_id).cloned()
    }

    async fn list_facilities(&self) -> RepositoryResult<Vec<Facility>> {
        self.check_health("list_facilities")?;
        let mut facilities: Vec<Facility> = self.data.read().facilities.values().cloned().collect();
        facilities.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(facilities)
    }

    async fn delete_facility(&self, facility_id: FacilityId) -> RepositoryResult<bool> {
        self.check_health("delete_facility")?;
        Ok(self.data.write().remove_facility(facility_id))
    }

    async fn store_workplace(&self, workplace: NewWorkplace) -> RepositoryResult<Workplace> {
        const OP: &str = "store_workplace";
        self.check_health(OP)?;
        let mut data = self.data.write();
        data.facility(OP, workplace.facility_id)?;
        data.check_contact(OP, workplace.shift_contact_id)?;
        let id = WorkplaceId::new(data.allocate_id());
        let stored = workplace.into_record(id);
        data.workplaces.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_workplace(&self, workplace_id: WorkplaceId) -> RepositoryResult<Workplace> {
        self.check_health("get_workplace")?;
        self.data.read().workplace("get_workplace", workplace_id).cloned()
    }

    async fn delete_workplace(&self, workplace_id: WorkplaceId) -> RepositoryResult<bool> {
        self.check_health("delete_workplace")?;
        Ok(self.data.write().remove_workplace(workplace_id))
    }

    async fn store_task(&self, task: NewTask) -> RepositoryResult<Task> {
        const OP: &str = "store_task";
        self.check_health(OP)?;
        let mut data = self.data.write();
        data.facility(OP, task.facility_id)?;
        if let Some(workplace_id) = task.workplace_id {
            data.workplace(OP, workplace_id)?;
        }
        data.check_contact(OP, task.shift_contact_id)?;
        let id = TaskId::new(data.allocate_id());
        let stored = task.into_record(id);
        data.tasks.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_task(&self, task_id: TaskId) -> RepositoryResult<Task> {
        self.check_health("get_task")?;
        self.data.read().task("get_task", task_id).cloned()
    }

    async fn delete_task(&self, task_id: TaskId) -> RepositoryResult<bool> {
        self.check_health("delete_task")?;
        Ok(self.data.write().remove_task(task_id))
    }

    async fn store_user_account(&self, account: NewUserAccount) -> RepositoryResult<UserAccount> {
        const OP: &str = "store_user_account";
        self.check_health(OP)?;
        if account.username.trim().is_empty() {
            return Err(RepositoryError::validation_with_context(
                "username must not be empty",
                ErrorContext::new(OP).with_entity("user_account"),
            ));
        }

        let mut data = self.data.write();
        if data.accounts.values().any(|a| a.username == account.username) {
            return Err(RepositoryError::unique_violation_with_context(
                format!("username '{}' is taken", account.username),
                ErrorContext::new(OP)
                    .with_entity("user_account")
                    .with_details("unique (username)"),
            ));
        }
        let id = UserAccountId::new(data.allocate_id());
        let stored = account.into_record(id);
        data.accounts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_user_account(&self, account_id: UserAccountId) -> RepositoryResult<UserAccount> {
        self.check_health("get_user_account")?;
        self.data.read().account("get_user_account", account_id).cloned()
    }

    async fn delete_user_account(&self, account_id: UserAccountId) -> RepositoryResult<bool> {
        self.check_health("delete_user_account")?;
        let mut data = self.data.write();
        let existed = data.accounts.remove(&account_id).is_some();
        if existed {
            data.helpers.retain(|_, h| h.user_account_id != account_id);
        }
        Ok(existed)
    }
}
