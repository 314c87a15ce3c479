//! Organization hierarchy referenced by shifts.
//!
//! A facility hosts workplaces and tasks; tasks may be grouped under a
//! workplace. Each level can name a contact person that shift helpers are
//! pointed to when the shift itself has none.

use serde::{Deserialize, Serialize};

use crate::define_id_type;

define_id_type!(i64, ContactPersonId);
define_id_type!(i64, FacilityId);
define_id_type!(i64, WorkplaceId);
define_id_type!(i64, TaskId);

/// Person to share with shift helpers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPerson {
    pub id: ContactPersonId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContactPerson {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl NewContactPerson {
    pub fn into_record(self, id: ContactPersonId) -> ContactPerson {
        ContactPerson {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
        }
    }
}

/// Physical location hosting tasks and shifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub shift_contact_id: Option<ContactPersonId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFacility {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub shift_contact_id: Option<ContactPersonId>,
}

impl NewFacility {
    pub fn into_record(self, id: FacilityId) -> Facility {
        Facility {
            id,
            name: self.name,
            description: self.description,
            shift_contact_id: self.shift_contact_id,
        }
    }
}

/// Optional grouping between a facility and its tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workplace {
    pub id: WorkplaceId,
    pub facility_id: FacilityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub shift_contact_id: Option<ContactPersonId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkplace {
    pub facility_id: FacilityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub shift_contact_id: Option<ContactPersonId>,
}

impl NewWorkplace {
    pub fn into_record(self, id: WorkplaceId) -> Workplace {
        Workplace {
            id,
            facility_id: self.facility_id,
            name: self.name,
            description: self.description,
            shift_contact_id: self.shift_contact_id,
        }
    }
}

/// Kind of volunteer work a shift instantiates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub facility_id: FacilityId,
    pub workplace_id: Option<WorkplaceId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub shift_contact_id: Option<ContactPersonId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub facility_id: FacilityId,
    #[serde(default)]
    pub workplace_id: Option<WorkplaceId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub shift_contact_id: Option<ContactPersonId>,
}

impl NewTask {
    pub fn into_record(self, id: TaskId) -> Task {
        Task {
            id,
            facility_id: self.facility_id,
            workplace_id: self.workplace_id,
            name: self.name,
            description: self.description,
            shift_contact_id: self.shift_contact_id,
        }
    }
}

/// A record joined with the contact person it references, as loaded for
/// shift detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Related<T> {
    pub record: T,
    pub shift_contact: Option<ContactPerson>,
}

impl<T> Related<T> {
    pub fn new(record: T, shift_contact: Option<ContactPerson>) -> Self {
        Self {
            record,
            shift_contact,
        }
    }

    pub fn without_contact(record: T) -> Self {
        Self::new(record, None)
    }
}
