use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::string_enum;
use crate::database::memory::{Record, SortKey};

string_enum! {
    ProjectStatus, "project status" {
        Planning => "planning",
        Active => "active",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub manager_id: Option<u64>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub budget: Decimal,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Project {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "code" => Some(SortKey::Text(self.code.clone())),
            "name" => Some(SortKey::Text(self.name.clone())),
            "start_date" => Some(SortKey::Date(self.start_date)),
            "budget" => Some(SortKey::Decimal(self.budget)),
            "created_at" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}
