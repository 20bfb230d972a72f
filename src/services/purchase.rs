use chrono::{DateTime, Utc};

use super::context::RequestContext;
use super::crud::{set_if, Resource};
use super::error::Entity;
use crate::api::pagination::PageQuery;
use crate::database::models::{RecordStatus, Supplier};

#[derive(Debug)]
pub struct SupplierDraft {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub bank_account: Option<String>,
}

#[derive(Debug, Default)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub bank_account: Option<String>,
    pub status: Option<RecordStatus>,
}

impl Resource for Supplier {
    const ENTITY: Entity = Entity::Supplier;

    type Draft = SupplierDraft;
    type Patch = SupplierPatch;
    type Criteria = ();

    fn from_draft(draft: SupplierDraft, _ctx: &RequestContext, now: DateTime<Utc>) -> Self {
        Supplier {
            id: 0,
            name: draft.name,
            contact_person: draft.contact_person,
            phone: draft.phone,
            email: draft.email,
            address: draft.address,
            bank_account: draft.bank_account,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: SupplierPatch, now: DateTime<Utc>) {
        set_if(&mut self.name, patch.name);
        set_if(&mut self.status, patch.status);
        for (slot, value) in [
            (&mut self.contact_person, patch.contact_person),
            (&mut self.phone, patch.phone),
            (&mut self.email, patch.email),
            (&mut self.address, patch.address),
            (&mut self.bank_account, patch.bank_account),
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
        (self.name == other.name).then_some("供应商名称已存在")
    }
}
