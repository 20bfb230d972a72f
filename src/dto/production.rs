use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{check_date_order, clean, parse_opt, require};
use crate::api::validation::{one_of, validate_positive};
use crate::database::models::{WorkOrder, WorkOrderStatus};
use crate::error::ApiError;
use crate::services::production::{WorkOrderDraft, WorkOrderPatch};

fn validate_work_order_status(value: &str) -> Result<(), ValidationError> {
    one_of(value, WorkOrderStatus::VALUES)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkOrderRequest {
    #[validate(required, range(min = 1))]
    pub product_id: Option<u64>,
    #[validate(required, custom(function = "validate_positive"))]
    pub quantity: Option<Decimal>,
    #[validate(required)]
    pub planned_start: Option<NaiveDate>,
    #[validate(required)]
    pub planned_end: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub remark: Option<String>,
}

impl TryFrom<CreateWorkOrderRequest> for WorkOrderDraft {
    type Error = ApiError;

    fn try_from(request: CreateWorkOrderRequest) -> Result<Self, Self::Error> {
        let planned_start = require(request.planned_start, "planned_start")?;
        let planned_end = require(request.planned_end, "planned_end")?;
        check_date_order(planned_start, Some(planned_end), "planned_end")?;

        Ok(WorkOrderDraft {
            product_id: require(request.product_id, "product_id")?,
            quantity: require(request.quantity, "quantity")?,
            planned_start,
            planned_end,
            remark: clean(request.remark),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWorkOrderRequest {
    #[validate(custom(function = "validate_positive"))]
    pub quantity: Option<Decimal>,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    #[validate(custom(function = "validate_work_order_status"))]
    pub status: Option<String>,
    #[validate(length(max = 500))]
    pub remark: Option<String>,
}

impl TryFrom<UpdateWorkOrderRequest> for WorkOrderPatch {
    type Error = ApiError;

    fn try_from(request: UpdateWorkOrderRequest) -> Result<Self, Self::Error> {
        if let Some(start) = request.planned_start {
            check_date_order(start, request.planned_end, "planned_end")?;
        }
        Ok(WorkOrderPatch {
            quantity: request.quantity,
            planned_start: request.planned_start,
            planned_end: request.planned_end,
            status: parse_opt(request.status)?,
            remark: clean(request.remark),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct WorkOrderResponse {
    pub id: u64,
    pub order_no: String,
    pub product_id: u64,
    pub quantity: Decimal,
    pub planned_start: NaiveDate,
    pub planned_end: NaiveDate,
    pub status: String,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WorkOrder> for WorkOrderResponse {
    fn from(order: WorkOrder) -> Self {
        Self {
            id: order.id,
            order_no: order.order_no,
            product_id: order.product_id,
            quantity: order.quantity,
            planned_start: order.planned_start,
            planned_end: order.planned_end,
            status: order.status.as_str().to_string(),
            remark: order.remark,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}
