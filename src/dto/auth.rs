use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{clean, require};
use crate::api::validation::{validate_password, validate_phone};
use crate::auth::IssuedToken;
use crate::database::models::User;
use crate::error::ApiError;
use crate::services::users::NewUser;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(required, length(min = 3, max = 32))]
    pub username: Option<String>,
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, custom(function = "validate_password"))]
    pub password: Option<String>,
    #[validate(length(max = 50))]
    pub real_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
}

impl TryFrom<RegisterRequest> for NewUser {
    type Error = ApiError;

    fn try_from(request: RegisterRequest) -> Result<Self, Self::Error> {
        Ok(NewUser {
            username: require(request.username, "username")?.trim().to_string(),
            email: require(request.email, "email")?.trim().to_lowercase(),
            password: require(request.password, "password")?,
            real_name: clean(request.real_name),
            phone: clean(request.phone),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required, length(min = 1))]
    pub username: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

/// Public view of a user account
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub real_name: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            real_name: user.real_name,
            phone: user.phone,
            status: user.status.as_str().to_string(),
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

impl LoginResponse {
    pub fn new(issued: IssuedToken, user: User) -> Self {
        Self {
            token: issued.token,
            token_type: "Bearer",
            expires_at: issued.expires_at,
            user: user.into(),
        }
    }
}
