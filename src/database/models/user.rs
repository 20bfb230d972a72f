use chrono::{DateTime, Utc};

use super::RecordStatus;
use crate::database::memory::{Record, SortKey};

#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub real_name: Option<String>,
    pub phone: Option<String>,
    pub status: RecordStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }
}

impl Record for User {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "username" => Some(SortKey::Text(self.username.clone())),
            "created_at" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}
