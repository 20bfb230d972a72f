use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{clean, parse_opt, require, validate_not_blank};
use crate::api::validation::{validate_phone, validate_record_status};
use crate::database::models::Supplier;
use crate::error::ApiError;
use crate::services::purchase::{SupplierDraft, SupplierPatch};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierRequest {
    #[validate(required, length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub contact_person: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(min = 8, max = 32))]
    pub bank_account: Option<String>,
}

impl TryFrom<CreateSupplierRequest> for SupplierDraft {
    type Error = ApiError;

    fn try_from(request: CreateSupplierRequest) -> Result<Self, Self::Error> {
        Ok(SupplierDraft {
            name: require(request.name, "name")?.trim().to_string(),
            contact_person: clean(request.contact_person),
            phone: clean(request.phone),
            email: clean(request.email),
            address: clean(request.address),
            bank_account: clean(request.bank_account),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSupplierRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub contact_person: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(min = 8, max = 32))]
    pub bank_account: Option<String>,
    #[validate(custom(function = "validate_record_status"))]
    pub status: Option<String>,
}

impl TryFrom<UpdateSupplierRequest> for SupplierPatch {
    type Error = ApiError;

    fn try_from(request: UpdateSupplierRequest) -> Result<Self, Self::Error> {
        Ok(SupplierPatch {
            name: request.name.map(|n| n.trim().to_string()),
            contact_person: clean(request.contact_person),
            phone: clean(request.phone),
            email: clean(request.email),
            address: clean(request.address),
            bank_account: clean(request.bank_account),
            status: parse_opt(request.status)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SupplierResponse {
    pub id: u64,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub bank_account: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Supplier> for SupplierResponse {
    fn from(supplier: Supplier) -> Self {
        Self {
            id: supplier.id,
            name: supplier.name,
            contact_person: supplier.contact_person,
            phone: supplier.phone,
            email: supplier.email,
            address: supplier.address,
            bank_account: supplier.bank_account,
            status: supplier.status.as_str().to_string(),
            created_at: supplier.created_at,
            updated_at: supplier.updated_at,
        }
    }
}
