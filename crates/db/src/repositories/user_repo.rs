//! Repository for the `users` table.

use chrono::Duration;
use greenlight_core::error::{CoreError, CoreResult};
use greenlight_core::filters::{Filters, Metadata};
use greenlight_core::tokens::{hash_token, TokenScope};
use greenlight_core::types::{DbId, Version};
use greenlight_core::validation::FieldErrors;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::models::token::IssuedToken;
use crate::models::user::{CreateUser, User};
use crate::repositories::{PermissionRepo, TokenRepo};
use crate::storage::bounded;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_at, name, email, password_hash, activated, version";

const TABLE: &str = "users";

#[derive(FromRow)]
struct UserWindowRow {
    total_records: i64,
    #[sqlx(flatten)]
    user: User,
}

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new, not yet activated user.
    ///
    /// A taken email (compared case-insensitively) fails with
    /// `DuplicateKey { field: "email" }`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> CoreResult<User> {
        let mut conn = bounded("create", TABLE, pool.acquire()).await?;
        Self::create_on(&mut conn, input).await
    }

    /// [`UserRepo::create`] on a caller-owned connection or transaction.
    pub async fn create_on(conn: &mut PgConnection, input: &CreateUser) -> CoreResult<User> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let user = bounded(
            "create",
            TABLE,
            sqlx::query_as::<_, User>(&query)
                .bind(&input.name)
                .bind(&input.email)
                .bind(&input.password_hash)
                .fetch_one(&mut *conn),
        )
        .await?;
        tracing::debug!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Create a user, grant `permissions` and issue its first activation
    /// token in one transaction.
    ///
    /// Any failing step rolls back the whole registration, so no account
    /// is left behind without its grants or token.
    pub async fn register(
        pool: &PgPool,
        input: &CreateUser,
        permissions: &[&str],
        activation_ttl: Duration,
    ) -> CoreResult<(User, IssuedToken)> {
        let mut tx = bounded("register", TABLE, pool.begin()).await?;

        let user = Self::create_on(&mut tx, input).await?;
        PermissionRepo::grant_on(&mut tx, user.id, permissions).await?;
        let token =
            TokenRepo::issue_on(&mut tx, user.id, activation_ttl, TokenScope::Activation).await?;

        bounded("register", TABLE, tx.commit()).await?;
        Ok((user, token))
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> CoreResult<User> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        bounded(
            "find_by_id",
            TABLE,
            sqlx::query_as::<_, User>(&query).bind(id).fetch_optional(pool),
        )
        .await?
        .ok_or_else(|| CoreError::not_found("user", id))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> CoreResult<Option<User>> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        bounded(
            "find_by_email",
            TABLE,
            sqlx::query_as::<_, User>(&query).bind(email).fetch_optional(pool),
        )
        .await
    }

    /// Write `user`'s mutable fields if the stored version still equals
    /// `user.version`, returning the new version.
    pub async fn update(pool: &PgPool, user: &User) -> CoreResult<Version> {
        let version = bounded(
            "update",
            TABLE,
            sqlx::query_scalar::<_, Version>(
                "UPDATE users
                 SET name = $1, email = $2, password_hash = $3, activated = $4,
                     version = version + 1
                 WHERE id = $5 AND version = $6
                 RETURNING version",
            )
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.activated)
            .bind(user.id)
            .bind(user.version)
            .fetch_optional(pool),
        )
        .await?;

        version.ok_or_else(|| {
            tracing::info!(user_id = user.id, expected_version = user.version, "Edit conflict on user");
            CoreError::edit_conflict()
        })
    }

    /// Delete a user. Their tokens and permission grants cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> CoreResult<()> {
        let result = bounded(
            "delete",
            TABLE,
            sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(pool),
        )
        .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("user", id));
        }
        tracing::debug!(user_id = id, "User deleted");
        Ok(())
    }

    /// Page through users ordered by a safelisted key, ties by ascending `id`.
    ///
    /// As with [`crate::repositories::MovieRepo::list`], a page past the end
    /// reports all-zero metadata.
    pub async fn list(pool: &PgPool, filters: &Filters) -> CoreResult<(Vec<User>, Metadata)> {
        let mut errors = FieldErrors::new();
        filters.validate(&mut errors);
        errors.into_result()?;

        let column = filters
            .sort_column()
            .ok_or_else(|| CoreError::invalid_field("sort", "invalid sort value"))?;
        let direction = filters.sort_direction().as_sql();
        let sql = format!(
            "SELECT count(*) OVER() AS total_records, {COLUMNS}
             FROM users
             ORDER BY {column} {direction}, id ASC
             LIMIT $1 OFFSET $2"
        );

        let rows = bounded(
            "list",
            TABLE,
            sqlx::query_as::<_, UserWindowRow>(&sql)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(pool),
        )
        .await?;

        let total = rows.first().map_or(0, |row| row.total_records);
        let users = rows.into_iter().map(|row| row.user).collect();
        Ok((users, Metadata::calculate(total, filters.page, filters.page_size)))
    }

    /// Resolve the owner of an unexpired token of the given scope.
    ///
    /// Unknown, expired and wrong-scope tokens all fail the same way.
    pub async fn find_for_token(
        pool: &PgPool,
        scope: TokenScope,
        plaintext: &str,
    ) -> CoreResult<User> {
        let query = "SELECT u.id, u.created_at, u.name, u.email, u.password_hash,
                            u.activated, u.version
                     FROM users u
                     INNER JOIN tokens t ON t.user_id = u.id
                     WHERE t.hash = $1 AND t.scope = $2 AND t.expiry > NOW()";
        bounded(
            "find_for_token",
            TABLE,
            sqlx::query_as::<_, User>(query)
                .bind(hash_token(plaintext))
                .bind(scope.as_str())
                .fetch_optional(pool),
        )
        .await?
        .ok_or_else(|| CoreError::not_found("token", scope))
    }
}
