//! Repository for the `tokens` table.
//!
//! Plaintexts are never stored or logged; lookups go through the digest.

use chrono::{Duration, Utc};
use greenlight_core::error::{CoreError, CoreResult};
use greenlight_core::tokens::{generate_token, hash_token, validate_token_plaintext, TokenScope};
use greenlight_core::types::DbId;
use greenlight_core::validation::FieldErrors;
use sqlx::{PgConnection, PgPool};

use crate::models::token::{IssuedToken, TokenRecord};
use crate::storage::bounded;

const TABLE: &str = "tokens";

/// Issues, validates and revokes scoped bearer tokens.
pub struct TokenRepo;

impl TokenRepo {
    /// Generate a token for `user_id` that expires `ttl` from now.
    ///
    /// Fails with `NotFound` if the user does not exist.
    pub async fn issue(
        pool: &PgPool,
        user_id: DbId,
        ttl: Duration,
        scope: TokenScope,
    ) -> CoreResult<IssuedToken> {
        let mut conn = bounded("issue", TABLE, pool.acquire()).await?;
        Self::issue_on(&mut conn, user_id, ttl, scope).await
    }

    /// [`TokenRepo::issue`] on a caller-owned connection or transaction.
    pub async fn issue_on(
        conn: &mut PgConnection,
        user_id: DbId,
        ttl: Duration,
        scope: TokenScope,
    ) -> CoreResult<IssuedToken> {
        let generated = generate_token();
        let expiry = Utc::now() + ttl;

        bounded(
            "issue",
            TABLE,
            sqlx::query(
                "INSERT INTO tokens (hash, user_id, expiry, scope)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(&generated.hash)
            .bind(user_id)
            .bind(expiry)
            .bind(scope.as_str())
            .execute(&mut *conn),
        )
        .await
        .map_err(|err| match err {
            CoreError::NotFound { .. } => CoreError::not_found("user", user_id),
            other => other,
        })?;

        tracing::debug!(user_id, %scope, %expiry, "Token issued");
        Ok(IssuedToken {
            plaintext: generated.plaintext,
            expiry,
        })
    }

    /// Return the owning user ID of an unexpired token of `scope`.
    ///
    /// Malformed plaintexts fail validation before the store is touched.
    pub async fn validate(pool: &PgPool, plaintext: &str, scope: TokenScope) -> CoreResult<DbId> {
        let mut errors = FieldErrors::new();
        validate_token_plaintext(plaintext, &mut errors);
        errors.into_result()?;

        bounded(
            "validate",
            TABLE,
            sqlx::query_scalar::<_, DbId>(
                "SELECT user_id FROM tokens
                 WHERE hash = $1 AND scope = $2 AND expiry > NOW()",
            )
            .bind(hash_token(plaintext))
            .bind(scope.as_str())
            .fetch_optional(pool),
        )
        .await?
        .ok_or_else(|| CoreError::not_found("token", scope))
    }

    /// Delete every token of `scope` belonging to `user_id`.
    ///
    /// Returns the number of tokens removed; zero is not an error.
    pub async fn revoke(pool: &PgPool, user_id: DbId, scope: TokenScope) -> CoreResult<u64> {
        let result = bounded(
            "revoke",
            TABLE,
            sqlx::query("DELETE FROM tokens WHERE user_id = $1 AND scope = $2")
                .bind(user_id)
                .bind(scope.as_str())
                .execute(pool),
        )
        .await?;
        let revoked = result.rows_affected();
        tracing::debug!(user_id, %scope, revoked, "Tokens revoked");
        Ok(revoked)
    }

    /// Remove tokens whose expiry has passed.
    pub async fn delete_expired(pool: &PgPool) -> CoreResult<u64> {
        let result = bounded(
            "delete_expired",
            TABLE,
            sqlx::query("DELETE FROM tokens WHERE expiry <= NOW()").execute(pool),
        )
        .await?;
        Ok(result.rows_affected())
    }

    /// List the stored tokens of a user, soonest expiry first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> CoreResult<Vec<TokenRecord>> {
        bounded(
            "list_for_user",
            TABLE,
            sqlx::query_as::<_, TokenRecord>(
                "SELECT hash, user_id, expiry, scope FROM tokens
                 WHERE user_id = $1
                 ORDER BY expiry ASC",
            )
            .bind(user_id)
            .fetch_all(pool),
        )
        .await
    }
}
