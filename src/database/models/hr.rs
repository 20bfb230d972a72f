use chrono::{DateTime, NaiveDate, Utc};

use super::RecordStatus;
use crate::database::memory::{Record, SortKey};

#[derive(Debug, Clone)]
pub struct Department {
    pub id: u64,
    pub name: String,
    pub parent_id: Option<u64>,
    pub manager_id: Option<u64>,
    pub description: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Employee {
    pub id: u64,
    pub employee_no: String,
    pub name: String,
    pub id_card: String,
    pub phone: String,
    pub email: Option<String>,
    pub department_id: Option<u64>,
    pub position: Option<String>,
    pub hire_date: NaiveDate,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Department {
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

impl Record for Employee {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "employee_no" => Some(SortKey::Text(self.employee_no.clone())),
            "name" => Some(SortKey::Text(self.name.clone())),
            "hire_date" => Some(SortKey::Date(self.hire_date)),
            "created_at" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}
