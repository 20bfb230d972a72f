use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::RecordStatus;
use crate::database::memory::{Record, SortKey};

#[derive(Debug, Clone)]
pub struct Product {
    pub id: u64,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub unit_price: Decimal,
    pub description: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Warehouse {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub location: Option<String>,
    pub manager: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Product {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "sku" => Some(SortKey::Text(self.sku.clone())),
            "name" => Some(SortKey::Text(self.name.clone())),
            "unit_price" => Some(SortKey::Decimal(self.unit_price)),
            "created_at" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}

impl Record for Warehouse {
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
            "created_at" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}
