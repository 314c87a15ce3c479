//! Helper sign-ups: the association between a user account and a shift.
//!
//! Each `(user_account_id, shift_id)` pair exists at most once. Storage
//! enforces that atomically, a duplicate sign-up surfaces as
//! `RepositoryError::UniqueViolation`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::account::{UserAccount, UserAccountId};
use super::organization::Task;
use super::shift::ShiftId;
use crate::define_id_type;

define_id_type!(i64, ShiftHelperId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftHelper {
    pub id: ShiftHelperId,
    pub user_account_id: UserAccountId,
    pub shift_id: ShiftId,
    /// Set by storage when the row is created; never updated.
    pub joined_shift_at: DateTime<Utc>,
}

/// A sign-up joined with the volunteer's account and the shift's task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftHelperDetail {
    pub helper: ShiftHelper,
    pub user_account: UserAccount,
    pub task: Task,
}

impl ShiftHelperDetail {
    pub fn describe(&self) -> String {
        format!("{} on {}", self.user_account.username, self.task.name)
    }
}

impl fmt::Display for ShiftHelperDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
