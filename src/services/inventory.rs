use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::context::RequestContext;
use super::crud::{set_if, Resource};
use super::error::{Entity, ServiceError};
use crate::api::pagination::PageQuery;
use crate::database::models::{Product, RecordStatus, Warehouse};

#[derive(Debug)]
pub struct ProductDraft {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub unit_price: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub unit_price: Option<Decimal>,
    pub description: Option<String>,
    pub status: Option<RecordStatus>,
}

#[derive(Default)]
pub struct ProductCriteria {
    pub category: Option<String>,
}

impl Resource for Product {
    const ENTITY: Entity = Entity::Product;

    type Draft = ProductDraft;
    type Patch = ProductPatch;
    type Criteria = ProductCriteria;

    fn from_draft(draft: ProductDraft, _ctx: &RequestContext, now: DateTime<Utc>) -> Self {
        Product {
            id: 0,
            sku: draft.sku,
            name: draft.name,
            category: draft.category,
            unit: draft.unit,
            unit_price: draft.unit_price,
            description: draft.description,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: ProductPatch, now: DateTime<Utc>) {
        set_if(&mut self.name, patch.name);
        set_if(&mut self.unit, patch.unit);
        set_if(&mut self.unit_price, patch.unit_price);
        set_if(&mut self.status, patch.status);
        if patch.category.is_some() {
            self.category = patch.category;
        }
        if patch.description.is_some() {
            self.description = patch.description;
        }
        self.updated_at = now;
    }

    fn matches(&self, criteria: &ProductCriteria, query: &PageQuery) -> bool {
        let category_ok = match (&criteria.category, &self.category) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted == actual,
            (Some(_), None) => false,
        };
        category_ok
            && query.matches_status(self.status.as_str())
            && query.matches_keyword(&[self.sku.as_str(), self.name.as_str()])
    }

    fn conflicts_with(&self, other: &Self) -> Option<&'static str> {
        (self.sku == other.sku).then_some("产品编码已存在")
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.unit_price < Decimal::ZERO {
            return Err(ServiceError::business("单价不能为负数"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct WarehouseDraft {
    pub code: String,
    pub name: String,
    pub location: Option<String>,
    pub manager: Option<String>,
}

#[derive(Debug, Default)]
pub struct WarehousePatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub manager: Option<String>,
    pub status: Option<RecordStatus>,
}

impl Resource for Warehouse {
    const ENTITY: Entity = Entity::Warehouse;

    type Draft = WarehouseDraft;
    type Patch = WarehousePatch;
    type Criteria = ();

    fn from_draft(draft: WarehouseDraft, _ctx: &RequestContext, now: DateTime<Utc>) -> Self {
        Warehouse {
            id: 0,
            code: draft.code,
            name: draft.name,
            location: draft.location,
            manager: draft.manager,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: WarehousePatch, now: DateTime<Utc>) {
        set_if(&mut self.name, patch.name);
        set_if(&mut self.status, patch.status);
        if patch.location.is_some() {
            self.location = patch.location;
        }
        if patch.manager.is_some() {
            self.manager = patch.manager;
        }
        self.updated_at = now;
    }

    fn matches(&self, _criteria: &(), query: &PageQuery) -> bool {
        query.matches_status(self.status.as_str()) && query.matches_keyword(&[self.code.as_str(), self.name.as_str()])
    }

    fn conflicts_with(&self, other: &Self) -> Option<&'static str> {
        (self.code == other.code).then_some("仓库编码已存在")
    }
}
