use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::{string_enum, RecordStatus};
use crate::database::memory::{Record, SortKey};

string_enum! {
    OrderStatus, "order status" {
        Pending => "pending",
        Confirmed => "confirmed",
        Shipped => "shipped",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: u64,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: u64,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct SalesOrder {
    pub id: u64,
    pub order_no: String,
    pub customer_id: u64,
    pub order_date: NaiveDate,
    pub lines: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub remark: Option<String>,
    pub created_by: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SalesOrder {
    /// Line amounts are quantity × unit price; the order total is their sum
    pub fn recompute_totals(&mut self) {
        for line in &mut self.lines {
            line.amount = line.quantity * line.unit_price;
        }
        self.total_amount = self.lines.iter().map(|l| l.amount).sum();
    }
}

impl Record for Customer {
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

impl Record for SalesOrder {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
        self.order_no = format!("SO{}{:06}", self.order_date.format("%Y%m%d"), id);
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "order_no" => Some(SortKey::Text(self.order_no.clone())),
            "order_date" => Some(SortKey::Date(self.order_date)),
            "total_amount" => Some(SortKey::Decimal(self.total_amount)),
            "created_at" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}
