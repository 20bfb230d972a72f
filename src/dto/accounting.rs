use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{clean, parse_opt, require, validate_account_type, validate_not_blank};
use crate::api::validation::{min_items, validate_non_negative, validate_record_status};
use crate::database::models::{Account, JournalEntry, JournalLine};
use crate::error::{field_errors, ApiError, ErrorKind};
use crate::services::accounting::{AccountDraft, AccountPatch, JournalEntryDraft, JournalEntryPatch, JournalLineDraft};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(required, length(min = 1, max = 20), custom(function = "validate_not_blank"))]
    pub code: Option<String>,
    #[validate(required, length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(required, custom(function = "validate_account_type"))]
    pub account_type: Option<String>,
    #[validate(range(min = 1))]
    pub parent_id: Option<u64>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl TryFrom<CreateAccountRequest> for AccountDraft {
    type Error = ApiError;

    fn try_from(request: CreateAccountRequest) -> Result<Self, Self::Error> {
        Ok(AccountDraft {
            code: require(request.code, "code")?.trim().to_string(),
            name: require(request.name, "name")?.trim().to_string(),
            account_type: require(request.account_type, "account_type")?.parse()?,
            parent_id: request.parent_id,
            description: clean(request.description),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_account_type"))]
    pub account_type: Option<String>,
    #[validate(range(min = 1))]
    pub parent_id: Option<u64>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_record_status"))]
    pub status: Option<String>,
}

impl TryFrom<UpdateAccountRequest> for AccountPatch {
    type Error = ApiError;

    fn try_from(request: UpdateAccountRequest) -> Result<Self, Self::Error> {
        Ok(AccountPatch {
            name: request.name.map(|n| n.trim().to_string()),
            account_type: parse_opt(request.account_type)?,
            parent_id: request.parent_id,
            description: clean(request.description),
            status: parse_opt(request.status)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub parent_id: Option<u64>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            code: account.code,
            name: account.name,
            account_type: account.account_type.as_str().to_string(),
            parent_id: account.parent_id,
            description: account.description,
            status: account.status.as_str().to_string(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct JournalLineRequest {
    #[validate(required, range(min = 1))]
    pub account_id: Option<u64>,
    #[validate(custom(function = "validate_non_negative"))]
    pub debit: Option<Decimal>,
    #[validate(custom(function = "validate_non_negative"))]
    pub credit: Option<Decimal>,
    #[validate(length(max = 200))]
    pub summary: Option<String>,
}

impl JournalLineRequest {
    fn debit(&self) -> Decimal {
        self.debit.unwrap_or(Decimal::ZERO)
    }

    fn credit(&self) -> Decimal {
        self.credit.unwrap_or(Decimal::ZERO)
    }
}

impl TryFrom<JournalLineRequest> for JournalLineDraft {
    type Error = ApiError;

    fn try_from(line: JournalLineRequest) -> Result<Self, Self::Error> {
        let (debit, credit) = (line.debit(), line.credit());
        Ok(JournalLineDraft {
            account_id: require(line.account_id, "account_id")?,
            debit,
            credit,
            summary: clean(line.summary),
        })
    }
}

/// Debits must equal credits across all lines
pub fn ensure_balanced(lines: &[JournalLineRequest]) -> Result<(), ApiError> {
    let debit: Decimal = lines.iter().map(JournalLineRequest::debit).sum();
    let credit: Decimal = lines.iter().map(JournalLineRequest::credit).sum();
    if debit == credit {
        return Ok(());
    }
    Err(ApiError::new(ErrorKind::Validation, "UNBALANCED_ENTRY", "借贷金额不平衡")
        .with_details(field_errors([("lines", format!("借方合计 {} 与贷方合计 {} 不相等", debit, credit))])))
}

const MIN_LINES: &str = "凭证至少需要两条分录";

fn validate_entry_lines(request: &CreateJournalEntryRequest) -> Result<(), ValidationError> {
    min_items(&request.lines, 2, "lines", MIN_LINES)
}

fn validate_replacement_lines(request: &UpdateJournalEntryRequest) -> Result<(), ValidationError> {
    match &request.lines {
        Some(lines) => min_items(lines, 2, "lines", MIN_LINES),
        None => Ok(()),
    }
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_entry_lines", skip_on_field_errors = false))]
pub struct CreateJournalEntryRequest {
    #[validate(required)]
    pub entry_date: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub lines: Vec<JournalLineRequest>,
}

impl TryFrom<CreateJournalEntryRequest> for JournalEntryDraft {
    type Error = ApiError;

    fn try_from(request: CreateJournalEntryRequest) -> Result<Self, Self::Error> {
        Ok(JournalEntryDraft {
            entry_date: require(request.entry_date, "entry_date")?,
            description: clean(request.description),
            lines: request.lines.into_iter().map(JournalLineDraft::try_from).collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_replacement_lines", skip_on_field_errors = false))]
pub struct UpdateJournalEntryRequest {
    pub entry_date: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(nested)]
    pub lines: Option<Vec<JournalLineRequest>>,
}

impl TryFrom<UpdateJournalEntryRequest> for JournalEntryPatch {
    type Error = ApiError;

    fn try_from(request: UpdateJournalEntryRequest) -> Result<Self, Self::Error> {
        let lines = match request.lines {
            Some(lines) => Some(lines.into_iter().map(JournalLineDraft::try_from).collect::<Result<_, _>>()?),
            None => None,
        };
        Ok(JournalEntryPatch {
            entry_date: request.entry_date,
            description: clean(request.description),
            lines,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct JournalLineResponse {
    pub account_id: u64,
    pub debit: Decimal,
    pub credit: Decimal,
    pub summary: Option<String>,
}

impl From<JournalLine> for JournalLineResponse {
    fn from(line: JournalLine) -> Self {
        Self {
            account_id: line.account_id,
            debit: line.debit,
            credit: line.credit,
            summary: line.summary,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JournalEntryResponse {
    pub id: u64,
    pub entry_no: String,
    pub entry_date: NaiveDate,
    pub description: Option<String>,
    pub lines: Vec<JournalLineResponse>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub status: String,
    pub created_by: u64,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JournalEntry> for JournalEntryResponse {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: entry.id,
            entry_no: entry.entry_no,
            entry_date: entry.entry_date,
            description: entry.description,
            lines: entry.lines.into_iter().map(JournalLineResponse::from).collect(),
            total_debit: entry.total_debit,
            total_credit: entry.total_credit,
            status: entry.status.as_str().to_string(),
            created_by: entry.created_by,
            posted_at: entry.posted_at,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}
