// dto/mod.rs - Request and response shapes for every endpoint group
//
// Requests derive `Deserialize + Validate` and convert into the service
// layer's draft/patch types through `TryFrom`. Responses are built from
// models through explicit `From` impls so nothing internal (password hashes,
// raw ids of other tables) leaks by accident.

pub mod accounting;
pub mod auth;
pub mod hr;
pub mod inventory;
pub mod production;
pub mod project;
pub mod purchase;
pub mod sales;

use chrono::NaiveDate;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::api::validation::{one_of, validate_record_status, Violation};
use crate::database::models::RecordStatus;
use crate::error::ApiError;

/// `PATCH .../{id}/status` body shared by master-data resources
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    #[validate(required, custom(function = "validate_record_status"))]
    pub status: Option<String>,
}

impl TryFrom<UpdateStatusRequest> for RecordStatus {
    type Error = ApiError;

    fn try_from(request: UpdateStatusRequest) -> Result<Self, Self::Error> {
        Ok(require(request.status, "status")?.parse()?)
    }
}

/// Take a field the validator already checked as `required`
pub(crate) fn require<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::validation(vec![Violation::new(field, "required", "该字段为必填项")]))
}

/// Parse an optional enum field that passed its `one_of` rule
pub(crate) fn parse_opt<T>(value: Option<String>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr,
    ApiError: From<T::Err>,
{
    value.map(|v| v.parse::<T>()).transpose().map_err(ApiError::from)
}

/// `end` may not be earlier than `start`
pub(crate) fn check_date_order(start: NaiveDate, end: Option<NaiveDate>, end_field: &str) -> Result<(), ApiError> {
    match end {
        Some(end) if end < start => Err(ApiError::validation(vec![Violation::new(
            end_field,
            "date_order",
            "结束日期不能早于开始日期",
        )])),
        _ => Ok(()),
    }
}

/// Trim and drop empty optional strings
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("required"))
    } else {
        Ok(())
    }
}

fn validate_account_type(value: &str) -> Result<(), ValidationError> {
    one_of(value, crate::database::models::AccountType::VALUES)
}
