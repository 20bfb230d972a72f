use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{clean, parse_opt, require, validate_not_blank};
use crate::api::validation::{validate_non_negative, validate_record_status};
use crate::database::models::{Product, Warehouse};
use crate::error::ApiError;
use crate::services::inventory::{ProductDraft, ProductPatch, WarehouseDraft, WarehousePatch};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(required, length(min = 1, max = 50), custom(function = "validate_not_blank"))]
    pub sku: Option<String>,
    #[validate(required, length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    #[validate(required, length(min = 1, max = 20))]
    pub unit: Option<String>,
    #[validate(required, custom(function = "validate_non_negative"))]
    pub unit_price: Option<Decimal>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl TryFrom<CreateProductRequest> for ProductDraft {
    type Error = ApiError;

    fn try_from(request: CreateProductRequest) -> Result<Self, Self::Error> {
        Ok(ProductDraft {
            sku: require(request.sku, "sku")?.trim().to_string(),
            name: require(request.name, "name")?.trim().to_string(),
            category: clean(request.category),
            unit: require(request.unit, "unit")?,
            unit_price: require(request.unit_price, "unit_price")?,
            description: clean(request.description),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,
    #[validate(custom(function = "validate_non_negative"))]
    pub unit_price: Option<Decimal>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_record_status"))]
    pub status: Option<String>,
}

impl TryFrom<UpdateProductRequest> for ProductPatch {
    type Error = ApiError;

    fn try_from(request: UpdateProductRequest) -> Result<Self, Self::Error> {
        Ok(ProductPatch {
            name: request.name.map(|n| n.trim().to_string()),
            category: clean(request.category),
            unit: request.unit,
            unit_price: request.unit_price,
            description: clean(request.description),
            status: parse_opt(request.status)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: u64,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub unit_price: Decimal,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            sku: product.sku,
            name: product.name,
            category: product.category,
            unit: product.unit,
            unit_price: product.unit_price,
            description: product.description,
            status: product.status.as_str().to_string(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWarehouseRequest {
    #[validate(required, length(min = 1, max = 20), custom(function = "validate_not_blank"))]
    pub code: Option<String>,
    #[validate(required, length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(length(max = 50))]
    pub manager: Option<String>,
}

impl TryFrom<CreateWarehouseRequest> for WarehouseDraft {
    type Error = ApiError;

    fn try_from(request: CreateWarehouseRequest) -> Result<Self, Self::Error> {
        Ok(WarehouseDraft {
            code: require(request.code, "code")?.trim().to_string(),
            name: require(request.name, "name")?.trim().to_string(),
            location: clean(request.location),
            manager: clean(request.manager),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWarehouseRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(length(max = 50))]
    pub manager: Option<String>,
    #[validate(custom(function = "validate_record_status"))]
    pub status: Option<String>,
}

impl TryFrom<UpdateWarehouseRequest> for WarehousePatch {
    type Error = ApiError;

    fn try_from(request: UpdateWarehouseRequest) -> Result<Self, Self::Error> {
        Ok(WarehousePatch {
            name: request.name.map(|n| n.trim().to_string()),
            location: clean(request.location),
            manager: clean(request.manager),
            status: parse_opt(request.status)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct WarehouseResponse {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub location: Option<String>,
    pub manager: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Warehouse> for WarehouseResponse {
    fn from(warehouse: Warehouse) -> Self {
        Self {
            id: warehouse.id,
            code: warehouse.code,
            name: warehouse.name,
            location: warehouse.location,
            manager: warehouse.manager,
            status: warehouse.status.as_str().to_string(),
            created_at: warehouse.created_at,
            updated_at: warehouse.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RequestValidator;
    use serde_json::json;

    #[test]
    fn negative_price_is_a_violation() {
        let request: CreateProductRequest = serde_json::from_value(json!({
            "sku": "P-001",
            "name": "螺栓",
            "unit": "个",
            "unit_price": "-0.01"
        }))
        .unwrap();
        let violations = RequestValidator::new().validate(&request);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "unit_price");
        assert_eq!(violations[0].message, "金额不能为负数");
    }

    #[test]
    fn blank_name_counts_as_missing() {
        let request: CreateWarehouseRequest = serde_json::from_value(json!({"code": "WH1", "name": "   "})).unwrap();
        let violations = RequestValidator::new().validate(&request);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "name");
        assert_eq!(violations[0].rule, "required");
    }
}
