use thiserror::Error;

use crate::auth::password::HashError;
use crate::database::StoreError;

/// Business entities a collaborator can report on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Account,
    JournalEntry,
    Product,
    Warehouse,
    Customer,
    SalesOrder,
    Supplier,
    WorkOrder,
    Department,
    Employee,
    Project,
    User,
}

impl Entity {
    /// User-facing name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            Entity::Account => "科目",
            Entity::JournalEntry => "凭证",
            Entity::Product => "产品",
            Entity::Warehouse => "仓库",
            Entity::Customer => "客户",
            Entity::SalesOrder => "销售订单",
            Entity::Supplier => "供应商",
            Entity::WorkOrder => "生产工单",
            Entity::Department => "部门",
            Entity::Employee => "员工",
            Entity::Project => "项目",
            Entity::User => "用户",
        }
    }
}

/// Typed outcome of a failed collaborator call
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{} {id} does not exist", entity.label())]
    NotFound { entity: Entity, id: u64 },

    #[error("{0}")]
    Conflict(String),

    /// Business-rule rejection with a user-facing message
    #[error("{0}")]
    Business(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(HashError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn not_found(entity: Entity, id: u64) -> Self {
        ServiceError::NotFound { entity, id }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }

    pub fn business(message: impl Into<String>) -> Self {
        ServiceError::Business(message.into())
    }
}
