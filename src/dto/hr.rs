use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{clean, parse_opt, require, validate_not_blank};
use crate::api::validation::{validate_id_card, validate_phone, validate_record_status};
use crate::database::models::{Department, Employee};
use crate::error::ApiError;
use crate::services::hr::{DepartmentDraft, DepartmentPatch, EmployeeDraft, EmployeePatch};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDepartmentRequest {
    #[validate(required, length(min = 1, max = 50), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(range(min = 1))]
    pub parent_id: Option<u64>,
    #[validate(range(min = 1))]
    pub manager_id: Option<u64>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl TryFrom<CreateDepartmentRequest> for DepartmentDraft {
    type Error = ApiError;

    fn try_from(request: CreateDepartmentRequest) -> Result<Self, Self::Error> {
        Ok(DepartmentDraft {
            name: require(request.name, "name")?.trim().to_string(),
            parent_id: request.parent_id,
            manager_id: request.manager_id,
            description: clean(request.description),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDepartmentRequest {
    #[validate(length(min = 1, max = 50), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(range(min = 1))]
    pub parent_id: Option<u64>,
    #[validate(range(min = 1))]
    pub manager_id: Option<u64>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_record_status"))]
    pub status: Option<String>,
}

impl TryFrom<UpdateDepartmentRequest> for DepartmentPatch {
    type Error = ApiError;

    fn try_from(request: UpdateDepartmentRequest) -> Result<Self, Self::Error> {
        Ok(DepartmentPatch {
            name: request.name.map(|n| n.trim().to_string()),
            parent_id: request.parent_id,
            manager_id: request.manager_id,
            description: clean(request.description),
            status: parse_opt(request.status)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DepartmentResponse {
    pub id: u64,
    pub name: String,
    pub parent_id: Option<u64>,
    pub manager_id: Option<u64>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Department> for DepartmentResponse {
    fn from(department: Department) -> Self {
        Self {
            id: department.id,
            name: department.name,
            parent_id: department.parent_id,
            manager_id: department.manager_id,
            description: department.description,
            status: department.status.as_str().to_string(),
            created_at: department.created_at,
            updated_at: department.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[validate(required, length(min = 1, max = 20), custom(function = "validate_not_blank"))]
    pub employee_no: Option<String>,
    #[validate(required, length(min = 1, max = 50), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(required, custom(function = "validate_id_card"))]
    pub id_card: Option<String>,
    #[validate(required, custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(range(min = 1))]
    pub department_id: Option<u64>,
    #[validate(length(max = 50))]
    pub position: Option<String>,
    #[validate(required)]
    pub hire_date: Option<NaiveDate>,
}

impl TryFrom<CreateEmployeeRequest> for EmployeeDraft {
    type Error = ApiError;

    fn try_from(request: CreateEmployeeRequest) -> Result<Self, Self::Error> {
        Ok(EmployeeDraft {
            employee_no: require(request.employee_no, "employee_no")?.trim().to_string(),
            name: require(request.name, "name")?.trim().to_string(),
            id_card: require(request.id_card, "id_card")?,
            phone: require(request.phone, "phone")?,
            email: clean(request.email),
            department_id: request.department_id,
            position: clean(request.position),
            hire_date: require(request.hire_date, "hire_date")?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1, max = 50), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(range(min = 1))]
    pub department_id: Option<u64>,
    #[validate(length(max = 50))]
    pub position: Option<String>,
    #[validate(custom(function = "validate_record_status"))]
    pub status: Option<String>,
}

impl TryFrom<UpdateEmployeeRequest> for EmployeePatch {
    type Error = ApiError;

    fn try_from(request: UpdateEmployeeRequest) -> Result<Self, Self::Error> {
        Ok(EmployeePatch {
            name: request.name.map(|n| n.trim().to_string()),
            phone: request.phone,
            email: clean(request.email),
            department_id: request.department_id,
            position: clean(request.position),
            status: parse_opt(request.status)?,
        })
    }
}

/// Employee view; the identity number is masked
#[derive(Debug, Serialize)]
pub struct EmployeeResponse {
    pub id: u64,
    pub employee_no: String,
    pub name: String,
    pub id_card: String,
    pub phone: String,
    pub email: Option<String>,
    pub department_id: Option<u64>,
    pub position: Option<String>,
    pub hire_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            employee_no: employee.employee_no,
            name: employee.name,
            id_card: mask_id_card(&employee.id_card),
            phone: employee.phone,
            email: employee.email,
            department_id: employee.department_id,
            position: employee.position,
            hire_date: employee.hire_date,
            status: employee.status.as_str().to_string(),
            created_at: employee.created_at,
            updated_at: employee.updated_at,
        }
    }
}

/// Keep the region prefix and the check digit
fn mask_id_card(id_card: &str) -> String {
    let chars: Vec<char> = id_card.chars().collect();
    if chars.len() < 10 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 10), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RequestValidator;
    use serde_json::json;

    #[test]
    fn employee_formats_are_checked() {
        let request: CreateEmployeeRequest = serde_json::from_value(json!({
            "employee_no": "E001",
            "name": "张三",
            "id_card": "110105194912310021",
            "phone": "1381234567",
            "hire_date": "2023-09-01"
        }))
        .unwrap();
        let violations = RequestValidator::new().validate(&request);
        let rules: Vec<(&str, &str)> = violations.iter().map(|v| (v.field.as_str(), v.rule.as_str())).collect();
        assert_eq!(rules, vec![("id_card", "id_card"), ("phone", "phone")]);
        assert_eq!(violations[0].message, "身份证号格式不正确");
    }

    #[test]
    fn id_card_is_masked() {
        assert_eq!(mask_id_card("11010519491231002X"), "110105********002X");
        assert_eq!(mask_id_card("short"), "*****");
    }
}
