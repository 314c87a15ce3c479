#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use shift_planner::db::repositories::LocalRepository;
use shift_planner::db::repository::OrganizationRepository;
use shift_planner::models::*;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to the
/// process-global environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Wall-clock timestamp in 2023.
pub fn dt(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// A facility with one task and one volunteer, ready to hold shifts.
pub struct Fixture {
    pub repo: LocalRepository,
    pub facility: Facility,
    pub task: Task,
    pub account: UserAccount,
}

impl Fixture {
    pub async fn new() -> Self {
        let repo = LocalRepository::new();
        let facility = repo
            .store_facility(NewFacility {
                name: "Central Station".to_string(),
                description: "Arrival hall".to_string(),
                shift_contact_id: None,
            })
            .await
            .unwrap();
        let task = repo
            .store_task(NewTask {
                facility_id: facility.id,
                workplace_id: None,
                name: "Translation".to_string(),
                description: String::new(),
                shift_contact_id: None,
            })
            .await
            .unwrap();
        let account = repo
            .store_user_account(NewUserAccount {
                username: "alice".to_string(),
            })
            .await
            .unwrap();

        Self {
            repo,
            facility,
            task,
            account,
        }
    }

    pub fn shift(&self, starting_time: NaiveDateTime, ending_time: NaiveDateTime) -> NewShift {
        NewShift {
            slots: 4,
            task_id: self.task.id,
            workplace_id: None,
            facility_id: self.facility.id,
            starting_time,
            ending_time,
            shift_contact_id: None,
        }
    }

    pub async fn account(&self, username: &str) -> UserAccount {
        self.repo
            .store_user_account(NewUserAccount {
                username: username.to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn contact(&self, name: &str) -> ContactPerson {
        self.repo
            .store_contact(NewContactPerson {
                name: name.to_string(),
                email: format!("{}@example.org", name.to_lowercase()),
                phone: String::new(),
            })
            .await
            .unwrap()
    }
}
