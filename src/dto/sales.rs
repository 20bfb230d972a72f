use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{clean, parse_opt, require, validate_not_blank};
use crate::api::validation::{min_items, one_of, validate_non_negative, validate_phone, validate_positive, validate_record_status};
use crate::database::models::{Customer, OrderLine, OrderStatus, SalesOrder};
use crate::error::ApiError;
use crate::services::sales::{CustomerDraft, CustomerPatch, OrderLineDraft, SalesOrderDraft, SalesOrderPatch};

fn validate_order_status(value: &str) -> Result<(), ValidationError> {
    one_of(value, OrderStatus::VALUES)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
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
}

impl TryFrom<CreateCustomerRequest> for CustomerDraft {
    type Error = ApiError;

    fn try_from(request: CreateCustomerRequest) -> Result<Self, Self::Error> {
        Ok(CustomerDraft {
            name: require(request.name, "name")?.trim().to_string(),
            contact_person: clean(request.contact_person),
            phone: clean(request.phone),
            email: clean(request.email),
            address: clean(request.address),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
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
    #[validate(custom(function = "validate_record_status"))]
    pub status: Option<String>,
}

impl TryFrom<UpdateCustomerRequest> for CustomerPatch {
    type Error = ApiError;

    fn try_from(request: UpdateCustomerRequest) -> Result<Self, Self::Error> {
        Ok(CustomerPatch {
            name: request.name.map(|n| n.trim().to_string()),
            contact_person: clean(request.contact_person),
            phone: clean(request.phone),
            email: clean(request.email),
            address: clean(request.address),
            status: parse_opt(request.status)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: u64,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            contact_person: customer.contact_person,
            phone: customer.phone,
            email: customer.email,
            address: customer.address,
            status: customer.status.as_str().to_string(),
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct OrderLineRequest {
    #[validate(required, range(min = 1))]
    pub product_id: Option<u64>,
    #[validate(required, custom(function = "validate_positive"))]
    pub quantity: Option<Decimal>,
    /// Catalogue price applies when omitted
    #[validate(custom(function = "validate_non_negative"))]
    pub unit_price: Option<Decimal>,
}

impl TryFrom<OrderLineRequest> for OrderLineDraft {
    type Error = ApiError;

    fn try_from(line: OrderLineRequest) -> Result<Self, Self::Error> {
        Ok(OrderLineDraft {
            product_id: require(line.product_id, "product_id")?,
            quantity: require(line.quantity, "quantity")?,
            unit_price: line.unit_price,
        })
    }
}

fn validate_order_items(request: &CreateSalesOrderRequest) -> Result<(), ValidationError> {
    min_items(&request.items, 1, "items", "订单至少需要一条明细")
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_order_items", skip_on_field_errors = false))]
pub struct CreateSalesOrderRequest {
    #[validate(required, range(min = 1))]
    pub customer_id: Option<u64>,
    #[validate(required)]
    pub order_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<OrderLineRequest>,
    #[validate(length(max = 500))]
    pub remark: Option<String>,
}

impl TryFrom<CreateSalesOrderRequest> for SalesOrderDraft {
    type Error = ApiError;

    fn try_from(request: CreateSalesOrderRequest) -> Result<Self, Self::Error> {
        Ok(SalesOrderDraft {
            customer_id: require(request.customer_id, "customer_id")?,
            order_date: require(request.order_date, "order_date")?,
            lines: request.items.into_iter().map(OrderLineDraft::try_from).collect::<Result<_, _>>()?,
            remark: clean(request.remark),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSalesOrderRequest {
    #[validate(custom(function = "validate_order_status"))]
    pub status: Option<String>,
    #[validate(length(max = 500))]
    pub remark: Option<String>,
}

impl TryFrom<UpdateSalesOrderRequest> for SalesOrderPatch {
    type Error = ApiError;

    fn try_from(request: UpdateSalesOrderRequest) -> Result<Self, Self::Error> {
        Ok(SalesOrderPatch {
            status: parse_opt(request.status)?,
            remark: clean(request.remark),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct OrderLineResponse {
    pub product_id: u64,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
            amount: line.amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SalesOrderResponse {
    pub id: u64,
    pub order_no: String,
    pub customer_id: u64,
    pub order_date: NaiveDate,
    pub items: Vec<OrderLineResponse>,
    pub total_amount: Decimal,
    pub status: String,
    pub remark: Option<String>,
    pub created_by: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SalesOrder> for SalesOrderResponse {
    fn from(order: SalesOrder) -> Self {
        Self {
            id: order.id,
            order_no: order.order_no,
            customer_id: order.customer_id,
            order_date: order.order_date,
            items: order.lines.into_iter().map(OrderLineResponse::from).collect(),
            total_amount: order.total_amount,
            status: order.status.as_str().to_string(),
            remark: order.remark,
            created_by: order.created_by,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}
