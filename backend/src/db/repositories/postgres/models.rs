use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;

use super::schema::{
    contact_persons, facilities, shift_helpers, shifts, tasks, user_accounts, workplaces,
};
use crate::models::{
    ContactPerson, ContactPersonId, Facility, FacilityId, NewContactPerson, NewFacility, NewShift,
    NewTask, NewUserAccount, NewWorkplace, Shift, ShiftHelper, ShiftHelperId, ShiftId, Task,
    TaskId, UserAccount, UserAccountId, Workplace, WorkplaceId,
};

fn contact_id(raw: Option<i64>) -> Option<ContactPersonId> {
    raw.map(ContactPersonId::new)
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contact_persons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ContactPersonRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = contact_persons)]
pub struct NewContactPersonRow {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<ContactPersonRow> for ContactPerson {
    fn from(row: ContactPersonRow) -> Self {
        ContactPerson {
            id: ContactPersonId::new(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
        }
    }
}

impl From<NewContactPerson> for NewContactPersonRow {
    fn from(contact: NewContactPerson) -> Self {
        Self {
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = facilities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FacilityRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub shift_contact_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = facilities)]
pub struct NewFacilityRow {
    pub name: String,
    pub description: String,
    pub shift_contact_id: Option<i64>,
}

impl From<FacilityRow> for Facility {
    fn from(row: FacilityRow) -> Self {
        Facility {
            id: FacilityId::new(row.id),
            name: row.name,
            description: row.description,
            shift_contact_id: contact_id(row.shift_contact_id),
        }
    }
}

impl From<NewFacility> for NewFacilityRow {
    fn from(facility: NewFacility) -> Self {
        Self {
            name: facility.name,
            description: facility.description,
            shift_contact_id: facility.shift_contact_id.map(|id| id.value()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = workplaces)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkplaceRow {
    pub id: i64,
    pub facility_id: i64,
    pub name: String,
    pub description: String,
    pub shift_contact_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workplaces)]
pub struct NewWorkplaceRow {
    pub facility_id: i64,
    pub name: String,
    pub description: String,
    pub shift_contact_id: Option<i64>,
}

impl From<WorkplaceRow> for Workplace {
    fn from(row: WorkplaceRow) -> Self {
        Workplace {
            id: WorkplaceId::new(row.id),
            facility_id: FacilityId::new(row.facility_id),
            name: row.name,
            description: row.description,
            shift_contact_id: contact_id(row.shift_contact_id),
        }
    }
}

impl From<NewWorkplace> for NewWorkplaceRow {
    fn from(workplace: NewWorkplace) -> Self {
        Self {
            facility_id: workplace.facility_id.value(),
            name: workplace.name,
            description: workplace.description,
            shift_contact_id: workplace.shift_contact_id.map(|id| id.value()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    pub id: i64,
    pub facility_id: i64,
    pub workplace_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub shift_contact_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    pub facility_id: i64,
    pub workplace_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub shift_contact_id: Option<i64>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: TaskId::new(row.id),
            facility_id: FacilityId::new(row.facility_id),
            workplace_id: row.workplace_id.map(WorkplaceId::new),
            name: row.name,
            description: row.description,
            shift_contact_id: contact_id(row.shift_contact_id),
        }
    }
}

impl From<NewTask> for NewTaskRow {
    fn from(task: NewTask) -> Self {
        Self {
            facility_id: task.facility_id.value(),
            workplace_id: task.workplace_id.map(|id| id.value()),
            name: task.name,
            description: task.description,
            shift_contact_id: task.shift_contact_id.map(|id| id.value()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserAccountRow {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_accounts)]
pub struct NewUserAccountRow {
    pub username: String,
}

impl From<UserAccountRow> for UserAccount {
    fn from(row: UserAccountRow) -> Self {
        UserAccount {
            id: UserAccountId::new(row.id),
            username: row.username,
        }
    }
}

impl From<NewUserAccount> for NewUserAccountRow {
    fn from(account: NewUserAccount) -> Self {
        Self {
            username: account.username,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = shifts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShiftRow {
    pub id: i64,
    pub slots: i32,
    pub task_id: i64,
    pub workplace_id: Option<i64>,
    pub facility_id: i64,
    pub starting_time: NaiveDateTime,
    pub ending_time: NaiveDateTime,
    pub shift_contact_id: Option<i64>,
}

/// Insert and full-update shape for `shifts`. `treat_none_as_null` makes an
/// update clear optional references instead of skipping them.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = shifts)]
#[diesel(treat_none_as_null = true)]
pub struct ShiftValuesRow {
    pub slots: i32,
    pub task_id: i64,
    pub workplace_id: Option<i64>,
    pub facility_id: i64,
    pub starting_time: NaiveDateTime,
    pub ending_time: NaiveDateTime,
    pub shift_contact_id: Option<i64>,
}

impl From<ShiftRow> for Shift {
    fn from(row: ShiftRow) -> Self {
        Shift {
            id: ShiftId::new(row.id),
            slots: row.slots,
            task_id: TaskId::new(row.task_id),
            workplace_id: row.workplace_id.map(WorkplaceId::new),
            facility_id: FacilityId::new(row.facility_id),
            starting_time: row.starting_time,
            ending_time: row.ending_time,
            shift_contact_id: contact_id(row.shift_contact_id),
        }
    }
}

impl From<&NewShift> for ShiftValuesRow {
    fn from(shift: &NewShift) -> Self {
        Self {
            slots: shift.slots,
            task_id: shift.task_id.value(),
            workplace_id: shift.workplace_id.map(|id| id.value()),
            facility_id: shift.facility_id.value(),
            starting_time: shift.starting_time,
            ending_time: shift.ending_time,
            shift_contact_id: shift.shift_contact_id.map(|id| id.value()),
        }
    }
}

impl From<&Shift> for ShiftValuesRow {
    fn from(shift: &Shift) -> Self {
        Self {
            slots: shift.slots,
            task_id: shift.task_id.value(),
            workplace_id: shift.workplace_id.map(|id| id.value()),
            facility_id: shift.facility_id.value(),
            starting_time: shift.starting_time,
            ending_time: shift.ending_time,
            shift_contact_id: shift.shift_contact_id.map(|id| id.value()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = shift_helpers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShiftHelperRow {
    pub id: i64,
    pub user_account_id: i64,
    pub shift_id: i64,
    pub joined_shift_at: DateTime<Utc>,
}

/// `joined_shift_at` is left to the column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = shift_helpers)]
pub struct NewShiftHelperRow {
    pub user_account_id: i64,
    pub shift_id: i64,
}

impl From<ShiftHelperRow> for ShiftHelper {
    fn from(row: ShiftHelperRow) -> Self {
        ShiftHelper {
            id: ShiftHelperId::new(row.id),
            user_account_id: UserAccountId::new(row.user_account_id),
            shift_id: ShiftId::new(row.shift_id),
            joined_shift_at: row.joined_shift_at,
        }
    }
}
