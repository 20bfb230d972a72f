use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::{string_enum, RecordStatus};
use crate::database::memory::{Record, SortKey};

string_enum! {
    /// Chart-of-accounts classification
    AccountType, "account type" {
        Asset => "asset",
        Liability => "liability",
        Equity => "equity",
        Revenue => "revenue",
        Expense => "expense",
        Cost => "cost",
    }
}

string_enum! {
    /// Journal entry lifecycle: draft → posted → voided
    EntryStatus, "entry status" {
        Draft => "draft",
        Posted => "posted",
        Voided => "voided",
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub parent_id: Option<u64>,
    pub description: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalLine {
    pub account_id: u64,
    pub debit: Decimal,
    pub credit: Decimal,
    pub summary: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub id: u64,
    pub entry_no: String,
    pub entry_date: NaiveDate,
    pub description: Option<String>,
    pub lines: Vec<JournalLine>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub status: EntryStatus,
    pub created_by: u64,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Recompute the debit/credit totals from the lines
    pub fn recompute_totals(&mut self) {
        self.total_debit = self.lines.iter().map(|l| l.debit).sum();
        self.total_credit = self.lines.iter().map(|l| l.credit).sum();
    }
}

impl Record for Account {
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
            "account_type" => Some(SortKey::Text(self.account_type.as_str().to_string())),
            "created_at" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}

impl Record for JournalEntry {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
        self.entry_no = format!("JE{}{:06}", self.entry_date.format("%Y%m%d"), id);
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "entry_no" => Some(SortKey::Text(self.entry_no.clone())),
            "entry_date" => Some(SortKey::Date(self.entry_date)),
            "total_debit" => Some(SortKey::Decimal(self.total_debit)),
            "created_at" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}
