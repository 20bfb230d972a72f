use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::string_enum;
use crate::database::memory::{Record, SortKey};

string_enum! {
    WorkOrderStatus, "work order status" {
        Planned => "planned",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone)]
pub struct WorkOrder {
    pub id: u64,
    pub order_no: String,
    pub product_id: u64,
    pub quantity: Decimal,
    pub planned_start: NaiveDate,
    pub planned_end: NaiveDate,
    pub status: WorkOrderStatus,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for WorkOrder {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
        self.order_no = format!("WO{}{:06}", self.planned_start.format("%Y%m%d"), id);
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "order_no" => Some(SortKey::Text(self.order_no.clone())),
            "planned_start" => Some(SortKey::Date(self.planned_start)),
            "planned_end" => Some(SortKey::Date(self.planned_end)),
            "quantity" => Some(SortKey::Decimal(self.quantity)),
            "created_at" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}
