use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::context::RequestContext;
use super::crud::{set_if, Resource};
use super::error::{Entity, ServiceError};
use crate::api::pagination::PageQuery;
use crate::database::models::{WorkOrder, WorkOrderStatus};

#[derive(Debug)]
pub struct WorkOrderDraft {
    pub product_id: u64,
    pub quantity: Decimal,
    pub planned_start: NaiveDate,
    pub planned_end: NaiveDate,
    pub remark: Option<String>,
}

#[derive(Debug, Default)]
pub struct WorkOrderPatch {
    pub quantity: Option<Decimal>,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub status: Option<WorkOrderStatus>,
    pub remark: Option<String>,
}

#[derive(Default)]
pub struct WorkOrderCriteria {
    pub status: Option<WorkOrderStatus>,
    pub product_id: Option<u64>,
}

impl Resource for WorkOrder {
    const ENTITY: Entity = Entity::WorkOrder;

    type Draft = WorkOrderDraft;
    type Patch = WorkOrderPatch;
    type Criteria = WorkOrderCriteria;

    fn from_draft(draft: WorkOrderDraft, _ctx: &RequestContext, now: DateTime<Utc>) -> Self {
        WorkOrder {
            id: 0,
            order_no: String::new(),
            product_id: draft.product_id,
            quantity: draft.quantity,
            planned_start: draft.planned_start,
            planned_end: draft.planned_end,
            status: WorkOrderStatus::Planned,
            remark: draft.remark,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: WorkOrderPatch, now: DateTime<Utc>) {
        set_if(&mut self.quantity, patch.quantity);
        set_if(&mut self.planned_start, patch.planned_start);
        set_if(&mut self.planned_end, patch.planned_end);
        set_if(&mut self.status, patch.status);
        if patch.remark.is_some() {
            self.remark = patch.remark;
        }
        self.updated_at = now;
    }

    fn matches(&self, criteria: &WorkOrderCriteria, query: &PageQuery) -> bool {
        let status_ok = match criteria.status {
            Some(status) => status == self.status,
            None => query.matches_status(self.status.as_str()),
        };
        status_ok
            && criteria.product_id.map_or(true, |id| id == self.product_id)
            && query.start_date.map_or(true, |start| self.planned_start >= start)
            && query.end_date.map_or(true, |end| self.planned_end <= end)
            && query.matches_keyword(&[self.order_no.as_str()])
    }

    /// Merged patches can break the date order even when each field was valid on its own
    fn check(&self) -> Result<(), ServiceError> {
        if self.quantity <= Decimal::ZERO {
            return Err(ServiceError::business("生产数量必须大于0"));
        }
        if self.planned_end < self.planned_start {
            return Err(ServiceError::business("计划完成日期不能早于计划开始日期"));
        }
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), ServiceError> {
        match self.status {
            WorkOrderStatus::Completed | WorkOrderStatus::Cancelled => {
                Err(ServiceError::business("工单已结束，不能修改"))
            }
            _ => Ok(()),
        }
    }
}
