use chrono::Utc;
use tracing::{info, warn};

use super::context::RequestContext;
use super::error::{Entity, ServiceError};
use crate::api::pagination::{Page, PageQuery};
use crate::auth::password::{hash_password, verify_password};
use crate::database::models::{RecordStatus, User};
use crate::database::{Filter, StoreError, Table};

/// Validated registration input
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub real_name: Option<String>,
    pub phone: Option<String>,
}

/// Account store behind registration, login and user administration
pub struct UserService {
    users: Table<User>,
}

impl Default for UserService {
    fn default() -> Self {
        Self::new()
    }
}

impl UserService {
    pub fn new() -> Self {
        Self {
            users: Table::new("users"),
        }
    }

    pub async fn register(&self, ctx: &RequestContext, new_user: NewUser) -> Result<User, ServiceError> {
        let password_hash = hash_password(&new_user.password).map_err(ServiceError::PasswordHash)?;
        let now = Utc::now();
        let candidate = User {
            id: 0,
            username: new_user.username,
            email: new_user.email,
            password_hash,
            real_name: new_user.real_name,
            phone: new_user.phone,
            status: RecordStatus::Active,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        let user = self
            .users
            .write(|rows| {
                if rows.any(|u| u.username == candidate.username) {
                    return Err(ServiceError::conflict("用户名已存在"));
                }
                Ok(rows.insert(candidate))
            })
            .await?;

        info!(request_id = ctx.request_id(), user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Check credentials and stamp the login time
    pub async fn authenticate(&self, ctx: &RequestContext, username: &str, password: &str) -> Result<User, ServiceError> {
        let user = self
            .users
            .write(|rows| {
                let id = rows.find(|u| u.username == username).map(|u| u.id);
                // Same message for unknown user and wrong password
                let bad_credentials = || ServiceError::Unauthorized("用户名或密码错误".to_string());
                let id = id.ok_or_else(bad_credentials)?;
                let user = rows.get_mut(id)?;
                if !verify_password(password, &user.password_hash) {
                    return Err(bad_credentials());
                }
                if !user.is_active() {
                    return Err(ServiceError::Forbidden("账号已被禁用".to_string()));
                }
                user.last_login_at = Some(Utc::now());
                Ok(user.clone())
            })
            .await;

        match &user {
            Ok(user) => info!(request_id = ctx.request_id(), user_id = user.id, "login succeeded"),
            Err(e) => warn!(request_id = ctx.request_id(), username, "login rejected: {}", e),
        }
        user
    }

    pub async fn find(&self, _ctx: &RequestContext, id: u64) -> Result<User, ServiceError> {
        self.users.get(id).await.map_err(|err| match err {
            StoreError::RecordNotFound => ServiceError::not_found(Entity::User, id),
            other => other.into(),
        })
    }

    pub async fn list(&self, _ctx: &RequestContext, query: &PageQuery) -> Result<Page<User>, ServiceError> {
        let filter = Filter::new().and(|u: &User| {
            query.matches_status(u.status.as_str())
                && query.in_date_range(u.created_at)
                && query.matches_keyword(&[
                    u.username.as_str(),
                    u.email.as_str(),
                    u.real_name.as_deref().unwrap_or_default(),
                ])
        });
        Ok(self.users.list(&filter, query).await)
    }

    /// Enable or disable an account; nobody can change their own status
    pub async fn set_status(&self, ctx: &RequestContext, id: u64, status: RecordStatus) -> Result<User, ServiceError> {
        if ctx.user_id() == id {
            return Err(ServiceError::Forbidden("不能修改自己的账号状态".to_string()));
        }

        let user = self
            .users
            .update(id, |u| {
                u.status = status;
                u.updated_at = Utc::now();
            })
            .await
            .map_err(|err| match err {
                StoreError::RecordNotFound => ServiceError::not_found(Entity::User, id),
                other => other.into(),
            })?;

        info!(
            request_id = ctx.request_id(),
            user_id = id,
            status = status.as_str(),
            by = ctx.user_id(),
            "user status changed"
        );
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: format!("{}@example.com", username),
            password: "Secret123".into(),
            real_name: None,
            phone: None,
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let ctx = RequestContext::system();
        let service = UserService::new();
        let user = service.register(&ctx, new_user("alice")).await.unwrap();
        assert_ne!(user.password_hash, "Secret123");

        let logged_in = service.authenticate(&ctx, "alice", "Secret123").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(logged_in.last_login_at.is_some());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let ctx = RequestContext::system();
        let service = UserService::new();
        service.register(&ctx, new_user("bob")).await.unwrap();
        let err = service.register(&ctx, new_user("bob")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == "用户名已存在"));
    }

    #[tokio::test]
    async fn bad_credentials_share_one_message() {
        let ctx = RequestContext::system();
        let service = UserService::new();
        service.register(&ctx, new_user("carol")).await.unwrap();

        for (username, password) in [("carol", "Wrong1234"), ("nobody", "Secret123")] {
            let err = service.authenticate(&ctx, username, password).await.unwrap_err();
            assert!(matches!(err, ServiceError::Unauthorized(ref m) if m == "用户名或密码错误"));
        }
    }

    #[tokio::test]
    async fn disabled_users_cannot_log_in() {
        let service = UserService::new();
        let user = service.register(&RequestContext::system(), new_user("dave")).await.unwrap();

        let admin = RequestContext::new("req-1", Some(Principal::new(999, "admin")));
        service.set_status(&admin, user.id, RecordStatus::Inactive).await.unwrap();

        let err = service
            .authenticate(&RequestContext::system(), "dave", "Secret123")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn own_status_is_protected() {
        let service = UserService::new();
        let user = service.register(&RequestContext::system(), new_user("erin")).await.unwrap();
        let me = RequestContext::new("req-2", Some(Principal::new(user.id, "erin")));
        assert!(matches!(
            service.set_status(&me, user.id, RecordStatus::Inactive).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.set_status(&me, 404, RecordStatus::Inactive).await,
            Err(ServiceError::NotFound { entity: Entity::User, id: 404 })
        ));
    }
}
