// SQLite Authenticator & Authorizer

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use token_display_core::domain::Principal;
use token_display_core::error::{AppError, Result};
use token_display_core::port::{Authenticator, Authorizer};
use tracing::debug;
use uuid::Uuid;

/// Permission name that allows listing tokens of a resource
pub const CAN_LIST_TOKEN: &str = "can_list_token";

/// Token-key authentication and per-resource permission checks
pub struct SqliteAccessControl {
    pool: SqlitePool,
}

impl SqliteAccessControl {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Issue a fresh auth token for a user
    pub async fn issue_token(&self, user_id: &str) -> Result<String> {
        let key = Uuid::new_v4().simple().to_string();

        sqlx::query("INSERT INTO api_tokens (key, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&key)
            .bind(user_id)
            .bind(chrono::Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(key)
    }

    /// Grant a user the token-listing permission on a resource
    pub async fn grant_list_tokens(&self, user_id: &str, resource_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO resource_permissions (user_id, resource_id, permission)
            VALUES (?, ?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(resource_id)
        .bind(CAN_LIST_TOKEN)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TokenOwnerRow {
    user_id: String,
    is_superuser: bool,
    is_active: bool,
}

#[async_trait]
impl Authenticator for SqliteAccessControl {
    async fn authenticate(&self, key: &str) -> Result<Principal> {
        let row = sqlx::query_as::<_, TokenOwnerRow>(
            r#"
            SELECT u.id AS user_id, u.is_superuser, u.is_active
            FROM api_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            None => Err(AppError::Unauthenticated("Invalid token.".to_string())),
            Some(row) if !row.is_active => {
                debug!(user_id = %row.user_id, "Rejected token of inactive user");
                Err(AppError::Unauthenticated(
                    "User inactive or deleted.".to_string(),
                ))
            }
            Some(row) => Ok(Principal {
                user_id: row.user_id,
                is_superuser: row.is_superuser,
            }),
        }
    }
}

#[async_trait]
impl Authorizer for SqliteAccessControl {
    async fn can_list_tokens(
        &self,
        resource_id: &str,
        principal: Option<&Principal>,
    ) -> Result<bool> {
        let Some(principal) = principal else {
            return Ok(false);
        };
        if principal.is_superuser {
            return Ok(true);
        }

        let granted: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM resource_permissions
            WHERE user_id = ? AND resource_id = ? AND permission = ?
            "#,
        )
        .bind(&principal.user_id)
        .bind(resource_id)
        .bind(CAN_LIST_TOKEN)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(granted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use token_display_core::port::authenticate_optional;

    async fn setup() -> SqliteAccessControl {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        for sql in [
            "INSERT INTO users (id, first_name, is_superuser) VALUES ('admin', 'Ada', 1)",
            "INSERT INTO users (id, first_name) VALUES ('nurse', 'Nia')",
            "INSERT INTO users (id, first_name, is_active) VALUES ('gone', 'Gil', 0)",
            "INSERT INTO locations (id, name) VALUES ('loc1', 'Ward 3')",
            "INSERT INTO schedulable_resources (id, resource_type, location_id) VALUES ('r1', 'location', 'loc1')",
            "INSERT INTO schedulable_resources (id, resource_type, location_id) VALUES ('r2', 'location', 'loc1')",
        ] {
            sqlx::query(sql).execute(&pool).await.unwrap();
        }

        SqliteAccessControl::new(pool)
    }

    #[tokio::test]
    async fn test_issued_token_authenticates() {
        let access = setup().await;
        let key = access.issue_token("nurse").await.unwrap();

        let principal = access.authenticate(&key).await.unwrap();
        assert_eq!(principal, Principal::user("nurse"));
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let access = setup().await;
        let result = authenticate_optional(&access, Some("not-a-key")).await;
        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_inactive_user_is_rejected() {
        let access = setup().await;
        let key = access.issue_token("gone").await.unwrap();
        assert!(matches!(
            access.authenticate(&key).await,
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn test_permission_is_per_resource() {
        let access = setup().await;
        access.grant_list_tokens("nurse", "r1").await.unwrap();
        access.grant_list_tokens("nurse", "r1").await.unwrap();
        let nurse = Principal::user("nurse");

        assert!(access.can_list_tokens("r1", Some(&nurse)).await.unwrap());
        assert!(!access.can_list_tokens("r2", Some(&nurse)).await.unwrap());
    }

    #[tokio::test]
    async fn test_superuser_and_anonymous() {
        let access = setup().await;
        let key = access.issue_token("admin").await.unwrap();
        let admin = access.authenticate(&key).await.unwrap();

        assert!(admin.is_superuser);
        assert!(access.can_list_tokens("r2", Some(&admin)).await.unwrap());
        assert!(!access.can_list_tokens("r2", None).await.unwrap());
    }
}
