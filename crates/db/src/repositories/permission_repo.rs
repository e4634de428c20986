//! Repository for `permissions` and the `users_permissions` join table.

use greenlight_core::error::{CoreError, CoreResult};
use greenlight_core::permissions::Permissions;
use greenlight_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::permission::Permission;
use crate::storage::bounded;

const TABLE: &str = "users_permissions";

/// Grants and reads permission codes.
pub struct PermissionRepo;

impl PermissionRepo {
    /// List the permission catalogue.
    pub async fn list_all(pool: &PgPool) -> CoreResult<Vec<Permission>> {
        bounded(
            "list_all",
            "permissions",
            sqlx::query_as::<_, Permission>("SELECT id, code FROM permissions ORDER BY code")
                .fetch_all(pool),
        )
        .await
    }

    /// Every known capability code, sorted.
    pub async fn list_codes(pool: &PgPool) -> CoreResult<Vec<String>> {
        let catalogue = Self::list_all(pool).await?;
        Ok(catalogue.into_iter().map(|permission| permission.code).collect())
    }

    /// Every permission code held by `user_id`. Unknown users hold nothing.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> CoreResult<Permissions> {
        let codes = bounded(
            "list_for_user",
            TABLE,
            sqlx::query_scalar::<_, String>(
                "SELECT p.code
                 FROM permissions p
                 INNER JOIN users_permissions up ON up.permission_id = p.id
                 WHERE up.user_id = $1",
            )
            .bind(user_id)
            .fetch_all(pool),
        )
        .await?;
        Ok(codes.into_iter().collect())
    }

    /// Grant `codes` to `user_id`. Already-held codes are skipped.
    ///
    /// Fails with `NotFound` naming the first code missing from the
    /// catalogue, in which case nothing is granted.
    pub async fn grant(pool: &PgPool, user_id: DbId, codes: &[&str]) -> CoreResult<()> {
        let mut conn = bounded("grant", TABLE, pool.acquire()).await?;
        Self::grant_on(&mut conn, user_id, codes).await
    }

    /// [`PermissionRepo::grant`] on a caller-owned connection or transaction.
    pub async fn grant_on(
        conn: &mut PgConnection,
        user_id: DbId,
        codes: &[&str],
    ) -> CoreResult<()> {
        if codes.is_empty() {
            return Ok(());
        }
        let requested: Vec<String> = codes.iter().map(|code| code.to_string()).collect();

        let known = bounded(
            "grant",
            "permissions",
            sqlx::query_scalar::<_, String>("SELECT code FROM permissions WHERE code = ANY($1)")
                .bind(&requested)
                .fetch_all(&mut *conn),
        )
        .await?;
        if let Some(missing) = requested.iter().find(|code| !known.contains(code)) {
            return Err(CoreError::not_found("permission", missing));
        }

        let result = bounded(
            "grant",
            TABLE,
            sqlx::query(
                "INSERT INTO users_permissions (user_id, permission_id)
                 SELECT $1, id FROM permissions WHERE code = ANY($2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(&requested)
            .execute(&mut *conn),
        )
        .await
        .map_err(|err| match err {
            CoreError::NotFound { .. } => CoreError::not_found("user", user_id),
            other => other,
        })?;

        tracing::debug!(user_id, granted = result.rows_affected(), "Permissions granted");
        Ok(())
    }
}
