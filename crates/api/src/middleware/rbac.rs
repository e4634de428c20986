//! Permission-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests from inactive
//! accounts or users lacking a permission code, so handlers enforce
//! authorization at the type level.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use greenlight_core::permissions::{self, MOVIES_READ, MOVIES_WRITE};
use greenlight_db::repositories::PermissionRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires an authenticated user whose account is activated.
///
/// ```ignore
/// async fn activated_only(RequireActivated(user): RequireActivated) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireActivated(pub AuthUser);

impl FromRequestParts<AppState> for RequireActivated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.0.activated {
            return Err(AppError::forbidden(
                "your user account must be activated to access this resource",
            ));
        }
        Ok(RequireActivated(user))
    }
}

/// A permission code checked at extraction time.
pub trait RequiredPermission {
    const CODE: &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct MoviesRead;

impl RequiredPermission for MoviesRead {
    const CODE: &'static str = MOVIES_READ;
}

#[derive(Debug, Clone, Copy)]
pub struct MoviesWrite;

impl RequiredPermission for MoviesWrite {
    const CODE: &'static str = MOVIES_WRITE;
}

/// Requires an activated user holding `P::CODE`. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn writers(RequirePermission { user, .. }: RequirePermission<MoviesWrite>) { }
/// ```
#[derive(Debug, Clone)]
pub struct RequirePermission<P> {
    pub user: AuthUser,
    _code: PhantomData<P>,
}

impl<P> FromRequestParts<AppState> for RequirePermission<P>
where
    P: RequiredPermission + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireActivated(user) = RequireActivated::from_request_parts(parts, state).await?;

        let held = PermissionRepo::list_for_user(&state.pool, user.0.id).await?;
        if !permissions::has(&held, P::CODE) {
            tracing::debug!(user_id = user.0.id, required = P::CODE, "Permission denied");
            return Err(AppError::forbidden(
                "your user account doesn't have the necessary permissions to access this resource",
            ));
        }

        Ok(RequirePermission {
            user,
            _code: PhantomData,
        })
    }
}
