use chrono::{DateTime, Utc};

use super::RecordStatus;
use crate::database::memory::{Record, SortKey};

#[derive(Debug, Clone)]
pub struct Supplier {
    pub id: u64,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub bank_account: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Supplier {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "name" => Some(SortKey::Text(self.name.clone())),
            "created_at" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}
