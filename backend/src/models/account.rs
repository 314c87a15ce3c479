use serde::{Deserialize, Serialize};

use crate::define_id_type;

define_id_type!(i64, UserAccountId);

/// Volunteer account that can sign up for shifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserAccountId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserAccount {
    pub username: String,
}

impl NewUserAccount {
    pub fn into_record(self, id: UserAccountId) -> UserAccount {
        UserAccount {
            id,
            username: self.username,
        }
    }
}
