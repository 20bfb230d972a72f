use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::context::RequestContext;
use super::crud::{set_if, Resource};
use super::error::{Entity, ServiceError};
use crate::api::pagination::PageQuery;
use crate::database::models::{Project, ProjectStatus};

#[derive(Debug)]
pub struct ProjectDraft {
    pub code: String,
    pub name: String,
    pub manager_id: Option<u64>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub budget: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub manager_id: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<Decimal>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

#[derive(Default)]
pub struct ProjectCriteria {
    pub status: Option<ProjectStatus>,
    pub manager_id: Option<u64>,
}

impl Resource for Project {
    const ENTITY: Entity = Entity::Project;

    type Draft = ProjectDraft;
    type Patch = ProjectPatch;
    type Criteria = ProjectCriteria;

    fn from_draft(draft: ProjectDraft, _ctx: &RequestContext, now: DateTime<Utc>) -> Self {
        Project {
            id: 0,
            code: draft.code,
            name: draft.name,
            manager_id: draft.manager_id,
            start_date: draft.start_date,
            end_date: draft.end_date,
            budget: draft.budget,
            description: draft.description,
            status: ProjectStatus::Planning,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: ProjectPatch, now: DateTime<Utc>) {
        set_if(&mut self.name, patch.name);
        set_if(&mut self.start_date, patch.start_date);
        set_if(&mut self.budget, patch.budget);
        set_if(&mut self.status, patch.status);
        if patch.manager_id.is_some() {
            self.manager_id = patch.manager_id;
        }
        if patch.end_date.is_some() {
            self.end_date = patch.end_date;
        }
        if patch.description.is_some() {
            self.description = patch.description;
        }
        self.updated_at = now;
    }

    fn matches(&self, criteria: &ProjectCriteria, query: &PageQuery) -> bool {
        let status_ok = match criteria.status {
            Some(status) => status == self.status,
            None => query.matches_status(self.status.as_str()),
        };
        status_ok
            && criteria.manager_id.map_or(true, |id| self.manager_id == Some(id))
            && query.start_date.map_or(true, |start| self.start_date >= start)
            && query.end_date.map_or(true, |end| self.start_date <= end)
            && query.matches_keyword(&[self.code.as_str(), self.name.as_str()])
    }

    fn conflicts_with(&self, other: &Self) -> Option<&'static str> {
        (self.code == other.code).then_some("项目编码已存在")
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.budget < Decimal::ZERO {
            return Err(ServiceError::business("预算不能为负数"));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ServiceError::business("结束日期不能早于开始日期"));
            }
        }
        Ok(())
    }
}
