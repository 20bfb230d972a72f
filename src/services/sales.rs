use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::context::RequestContext;
use super::crud::{set_if, CrudService, MemoryCrud, Resource};
use super::error::{Entity, ServiceError};
use crate::api::pagination::{Page, PageQuery};
use crate::database::models::{Customer, OrderLine, OrderStatus, Product, RecordStatus, SalesOrder};

#[derive(Debug)]
pub struct CustomerDraft {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub status: Option<RecordStatus>,
}

impl Resource for Customer {
    const ENTITY: Entity = Entity::Customer;

    type Draft = CustomerDraft;
    type Patch = CustomerPatch;
    type Criteria = ();

    fn from_draft(draft: CustomerDraft, _ctx: &RequestContext, now: DateTime<Utc>) -> Self {
        Customer {
            id: 0,
            name: draft.name,
            contact_person: draft.contact_person,
            phone: draft.phone,
            email: draft.email,
            address: draft.address,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: CustomerPatch, now: DateTime<Utc>) {
        set_if(&mut self.name, patch.name);
        set_if(&mut self.status, patch.status);
        for (slot, value) in [
            (&mut self.contact_person, patch.contact_person),
            (&mut self.phone, patch.phone),
            (&mut self.email, patch.email),
            (&mut self.address, patch.address),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }
        self.updated_at = now;
    }

    fn matches(&self, _criteria: &(), query: &PageQuery) -> bool {
        query.matches_status(self.status.as_str())
            && query.matches_keyword(&[
                self.name.as_str(),
                self.contact_person.as_deref().unwrap_or_default(),
                self.phone.as_deref().unwrap_or_default(),
            ])
    }

    fn conflicts_with(&self, other: &Self) -> Option<&'static str> {
        (self.name == other.name).then_some("客户名称已存在")
    }
}

#[derive(Debug)]
pub struct OrderLineDraft {
    pub product_id: u64,
    pub quantity: Decimal,
    /// Falls back to the product's list price
    pub unit_price: Option<Decimal>,
}

#[derive(Debug)]
pub struct SalesOrderDraft {
    pub customer_id: u64,
    pub order_date: NaiveDate,
    pub lines: Vec<OrderLineDraft>,
    pub remark: Option<String>,
}

#[derive(Debug, Default)]
pub struct SalesOrderPatch {
    pub status: Option<OrderStatus>,
    pub remark: Option<String>,
}

#[derive(Default)]
pub struct SalesOrderCriteria {
    pub customer_id: Option<u64>,
    pub status: Option<OrderStatus>,
}

/// Sales order draft with prices already resolved against the product catalogue
pub struct PricedOrder {
    customer_id: u64,
    order_date: NaiveDate,
    lines: Vec<OrderLine>,
    remark: Option<String>,
}

impl Resource for SalesOrder {
    const ENTITY: Entity = Entity::SalesOrder;

    type Draft = PricedOrder;
    type Patch = SalesOrderPatch;
    type Criteria = SalesOrderCriteria;

    fn from_draft(draft: PricedOrder, ctx: &RequestContext, now: DateTime<Utc>) -> Self {
        let mut order = SalesOrder {
            id: 0,
            order_no: String::new(),
            customer_id: draft.customer_id,
            order_date: draft.order_date,
            lines: draft.lines,
            total_amount: Decimal::ZERO,
            status: OrderStatus::Pending,
            remark: draft.remark,
            created_by: ctx.user_id(),
            created_at: now,
            updated_at: now,
        };
        order.recompute_totals();
        order
    }

    fn apply(&mut self, patch: SalesOrderPatch, now: DateTime<Utc>) {
        set_if(&mut self.status, patch.status);
        if patch.remark.is_some() {
            self.remark = patch.remark;
        }
        self.updated_at = now;
    }

    fn matches(&self, criteria: &SalesOrderCriteria, query: &PageQuery) -> bool {
        let status_ok = match criteria.status {
            Some(status) => status == self.status,
            None => query.matches_status(self.status.as_str()),
        };
        status_ok
            && criteria.customer_id.map_or(true, |id| id == self.customer_id)
            && query.start_date.map_or(true, |start| self.order_date >= start)
            && query.end_date.map_or(true, |end| self.order_date <= end)
            && query.matches_keyword(&[self.order_no.as_str()])
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.lines.is_empty() {
            return Err(ServiceError::business("订单至少需要一条明细"));
        }
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), ServiceError> {
        match self.status {
            OrderStatus::Completed | OrderStatus::Cancelled => Err(ServiceError::business("订单已关闭，不能修改")),
            _ => Ok(()),
        }
    }
}

/// Sales orders referencing customers and products
pub struct SalesOrderService {
    orders: MemoryCrud<SalesOrder>,
    customers: Arc<dyn CrudService<Customer>>,
    products: Arc<dyn CrudService<Product>>,
}

impl SalesOrderService {
    pub fn new(customers: Arc<dyn CrudService<Customer>>, products: Arc<dyn CrudService<Product>>) -> Self {
        Self {
            orders: MemoryCrud::new("sales_orders"),
            customers,
            products,
        }
    }

    async fn price(&self, ctx: &RequestContext, draft: SalesOrderDraft) -> Result<PricedOrder, ServiceError> {
        let customer = self.customers.get(ctx, draft.customer_id).await?;
        if customer.status == RecordStatus::Inactive {
            return Err(ServiceError::business("客户已停用"));
        }

        let mut lines = Vec::with_capacity(draft.lines.len());
        for line in draft.lines {
            let product = match self.products.get(ctx, line.product_id).await {
                Ok(product) => product,
                Err(ServiceError::NotFound { .. }) => {
                    return Err(ServiceError::business(format!("订单明细引用的产品不存在: {}", line.product_id)));
                }
                Err(other) => return Err(other),
            };
            lines.push(OrderLine {
                product_id: product.id,
                quantity: line.quantity,
                unit_price: line.unit_price.unwrap_or(product.unit_price),
                amount: Decimal::ZERO,
            });
        }

        Ok(PricedOrder {
            customer_id: customer.id,
            order_date: draft.order_date,
            lines,
            remark: draft.remark,
        })
    }

    pub async fn create_order(&self, ctx: &RequestContext, draft: SalesOrderDraft) -> Result<SalesOrder, ServiceError> {
        let priced = self.price(ctx, draft).await?;
        self.orders.create(ctx, priced).await
    }
}

#[async_trait]
impl CrudService<SalesOrder> for SalesOrderService {
    async fn create(&self, ctx: &RequestContext, draft: PricedOrder) -> Result<SalesOrder, ServiceError> {
        self.orders.create(ctx, draft).await
    }

    async fn get(&self, ctx: &RequestContext, id: u64) -> Result<SalesOrder, ServiceError> {
        self.orders.get(ctx, id).await
    }

    async fn list(
        &self,
        ctx: &RequestContext,
        criteria: SalesOrderCriteria,
        query: &PageQuery,
    ) -> Result<Page<SalesOrder>, ServiceError> {
        self.orders.list(ctx, criteria, query).await
    }

    async fn update(&self, ctx: &RequestContext, id: u64, patch: SalesOrderPatch) -> Result<SalesOrder, ServiceError> {
        self.orders.update(ctx, id, patch).await
    }

    async fn delete(&self, ctx: &RequestContext, id: u64) -> Result<(), ServiceError> {
        self.orders.delete(ctx, id).await
    }
}
