use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use super::context::RequestContext;
use super::crud::{set_if, CrudService, MemoryCrud, Resource};
use super::error::{Entity, ServiceError};
use crate::api::pagination::{Page, PageQuery};
use crate::database::models::{Department, Employee, RecordStatus};
use crate::database::Filter;

#[derive(Debug)]
pub struct DepartmentDraft {
    pub name: String,
    pub parent_id: Option<u64>,
    pub manager_id: Option<u64>,
    pub description: Option<String>,
}

#[derive(Debug, Default)]
pub struct DepartmentPatch {
    pub name: Option<String>,
    pub parent_id: Option<u64>,
    pub manager_id: Option<u64>,
    pub description: Option<String>,
    pub status: Option<RecordStatus>,
}

impl Resource for Department {
    const ENTITY: Entity = Entity::Department;

    type Draft = DepartmentDraft;
    type Patch = DepartmentPatch;
    type Criteria = ();

    fn from_draft(draft: DepartmentDraft, _ctx: &RequestContext, now: DateTime<Utc>) -> Self {
        Department {
            id: 0,
            name: draft.name,
            parent_id: draft.parent_id,
            manager_id: draft.manager_id,
            description: draft.description,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: DepartmentPatch, now: DateTime<Utc>) {
        set_if(&mut self.name, patch.name);
        set_if(&mut self.status, patch.status);
        if patch.parent_id.is_some() {
            self.parent_id = patch.parent_id;
        }
        if patch.manager_id.is_some() {
            self.manager_id = patch.manager_id;
        }
        if patch.description.is_some() {
            self.description = patch.description;
        }
        self.updated_at = now;
    }

    fn matches(&self, _criteria: &(), query: &PageQuery) -> bool {
        query.matches_status(self.status.as_str()) && query.matches_keyword(&[self.name.as_str()])
    }

    fn conflicts_with(&self, other: &Self) -> Option<&'static str> {
        (self.name == other.name).then_some("部门名称已存在")
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.id != 0 && self.parent_id == Some(self.id) {
            return Err(ServiceError::business("上级部门不能是自身"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct EmployeeDraft {
    pub employee_no: String,
    pub name: String,
    pub id_card: String,
    pub phone: String,
    pub email: Option<String>,
    pub department_id: Option<u64>,
    pub position: Option<String>,
    pub hire_date: NaiveDate,
}

#[derive(Debug, Default)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub department_id: Option<u64>,
    pub position: Option<String>,
    pub status: Option<RecordStatus>,
}

#[derive(Default)]
pub struct EmployeeCriteria {
    pub department_id: Option<u64>,
}

impl Resource for Employee {
    const ENTITY: Entity = Entity::Employee;

    type Draft = EmployeeDraft;
    type Patch = EmployeePatch;
    type Criteria = EmployeeCriteria;

    fn from_draft(draft: EmployeeDraft, _ctx: &RequestContext, now: DateTime<Utc>) -> Self {
        Employee {
            id: 0,
            employee_no: draft.employee_no,
            name: draft.name,
            id_card: draft.id_card.to_ascii_uppercase(),
            phone: draft.phone,
            email: draft.email,
            department_id: draft.department_id,
            position: draft.position,
            hire_date: draft.hire_date,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: EmployeePatch, now: DateTime<Utc>) {
        set_if(&mut self.name, patch.name);
        set_if(&mut self.phone, patch.phone);
        set_if(&mut self.status, patch.status);
        if patch.email.is_some() {
            self.email = patch.email;
        }
        if patch.department_id.is_some() {
            self.department_id = patch.department_id;
        }
        if patch.position.is_some() {
            self.position = patch.position;
        }
        self.updated_at = now;
    }

    fn matches(&self, criteria: &EmployeeCriteria, query: &PageQuery) -> bool {
        criteria.department_id.map_or(true, |id| self.department_id == Some(id))
            && query.matches_status(self.status.as_str())
            && query.start_date.map_or(true, |start| self.hire_date >= start)
            && query.end_date.map_or(true, |end| self.hire_date <= end)
            && query.matches_keyword(&[self.employee_no.as_str(), self.name.as_str(), self.phone.as_str()])
    }

    fn conflicts_with(&self, other: &Self) -> Option<&'static str> {
        if self.employee_no == other.employee_no {
            Some("员工编号已存在")
        } else if self.id_card == other.id_card {
            Some("身份证号已存在")
        } else {
            None
        }
    }
}

/// Departments; removing one detaches its employees instead of orphaning them
pub struct DepartmentService {
    departments: MemoryCrud<Department>,
    employees: Arc<MemoryCrud<Employee>>,
}

impl DepartmentService {
    pub fn new(employees: Arc<MemoryCrud<Employee>>) -> Self {
        Self {
            departments: MemoryCrud::new("departments"),
            employees,
        }
    }
}

#[async_trait]
impl CrudService<Department> for DepartmentService {
    async fn create(&self, ctx: &RequestContext, draft: DepartmentDraft) -> Result<Department, ServiceError> {
        self.departments.create(ctx, draft).await
    }

    async fn get(&self, ctx: &RequestContext, id: u64) -> Result<Department, ServiceError> {
        self.departments.get(ctx, id).await
    }

    async fn list(&self, ctx: &RequestContext, criteria: (), query: &PageQuery) -> Result<Page<Department>, ServiceError> {
        self.departments.list(ctx, criteria, query).await
    }

    async fn update(&self, ctx: &RequestContext, id: u64, patch: DepartmentPatch) -> Result<Department, ServiceError> {
        self.departments.update(ctx, id, patch).await
    }

    async fn delete(&self, ctx: &RequestContext, id: u64) -> Result<(), ServiceError> {
        self.departments.delete(ctx, id).await?;

        let members = Filter::new().and(move |e: &Employee| e.department_id == Some(id));
        let detached = self
            .employees
            .table()
            .update_where(&members, |e| {
                e.department_id = None;
                e.updated_at = Utc::now();
            })
            .await?;

        info!(request_id = ctx.request_id(), department_id = id, detached, "department removed");
        Ok(())
    }
}
