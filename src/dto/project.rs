use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{check_date_order, clean, parse_opt, require, validate_not_blank};
use crate::api::validation::{one_of, validate_non_negative};
use crate::database::models::{Project, ProjectStatus};
use crate::error::ApiError;
use crate::services::project::{ProjectDraft, ProjectPatch};

fn validate_project_status(value: &str) -> Result<(), ValidationError> {
    one_of(value, ProjectStatus::VALUES)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(required, length(min = 1, max = 20), custom(function = "validate_not_blank"))]
    pub code: Option<String>,
    #[validate(required, length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(range(min = 1))]
    pub manager_id: Option<u64>,
    #[validate(required)]
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(custom(function = "validate_non_negative"))]
    pub budget: Option<Decimal>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl TryFrom<CreateProjectRequest> for ProjectDraft {
    type Error = ApiError;

    fn try_from(request: CreateProjectRequest) -> Result<Self, Self::Error> {
        let start_date = require(request.start_date, "start_date")?;
        check_date_order(start_date, request.end_date, "end_date")?;

        Ok(ProjectDraft {
            code: require(request.code, "code")?.trim().to_string(),
            name: require(request.name, "name")?.trim().to_string(),
            manager_id: request.manager_id,
            start_date,
            end_date: request.end_date,
            budget: request.budget.unwrap_or(Decimal::ZERO),
            description: clean(request.description),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(range(min = 1))]
    pub manager_id: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(custom(function = "validate_non_negative"))]
    pub budget: Option<Decimal>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_project_status"))]
    pub status: Option<String>,
}

impl TryFrom<UpdateProjectRequest> for ProjectPatch {
    type Error = ApiError;

    fn try_from(request: UpdateProjectRequest) -> Result<Self, Self::Error> {
        if let Some(start) = request.start_date {
            check_date_order(start, request.end_date, "end_date")?;
        }
        Ok(ProjectPatch {
            name: request.name.map(|n| n.trim().to_string()),
            manager_id: request.manager_id,
            start_date: request.start_date,
            end_date: request.end_date,
            budget: request.budget,
            description: clean(request.description),
            status: parse_opt(request.status)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub manager_id: Option<u64>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub budget: Decimal,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            code: project.code,
            name: project.name,
            manager_id: project.manager_id,
            start_date: project.start_date,
            end_date: project.end_date,
            budget: project.budget,
            description: project.description,
            status: project.status.as_str().to_string(),
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}
