//! Handlers for the `/movies` resource.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use greenlight_core::filters::{ListParams, MovieQuery};
use greenlight_core::types::Version;
use greenlight_core::versioning::check_expected_version;
use greenlight_db::models::movie::{CreateMovie, UpdateMovie};
use greenlight_db::repositories::MovieRepo;
use serde_json::json;

use super::parse_id;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{MoviesRead, MoviesWrite, RequirePermission};
use crate::response::PageResponse;
use crate::state::AppState;

/// Optional compare-and-swap header for updates.
pub const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

/// GET /v1/movies
pub async fn list_movies(
    State(state): State<AppState>,
    _auth: RequirePermission<MoviesRead>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let query = MovieQuery::from_params(&params)?;
    let (movies, metadata) = MovieRepo::list(&state.pool, &query).await?;
    Ok(Json(PageResponse {
        data: movies,
        metadata,
    }))
}

/// POST /v1/movies
///
/// Returns 201 with a `Location` header pointing at the new movie.
pub async fn create_movie(
    State(state): State<AppState>,
    RequirePermission { user, .. }: RequirePermission<MoviesWrite>,
    payload: Result<Json<CreateMovie>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    input.validate()?;

    let movie = MovieRepo::create(&state.pool, &input).await?;
    tracing::info!(movie_id = movie.id, user_id = user.0.id, "Movie added");

    let location = format!("/v1/movies/{}", movie.id);
    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(json!({ "movie": movie })),
    ))
}

/// GET /v1/movies/{id}
pub async fn show_movie(
    State(state): State<AppState>,
    _auth: RequirePermission<MoviesRead>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id("movie", &raw_id)?;
    let movie = MovieRepo::find_by_id(&state.pool, id).await?;
    Ok(Json(json!({ "movie": movie })))
}

/// PATCH /v1/movies/{id}
///
/// Read, merge, validate, then write with the version that was read. An
/// `X-Expected-Version` header that does not match the stored version is
/// an edit conflict before anything is written.
pub async fn update_movie(
    State(state): State<AppState>,
    RequirePermission { user, .. }: RequirePermission<MoviesWrite>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<UpdateMovie>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id("movie", &raw_id)?;
    let expected = expected_version(&headers)?;
    let Json(patch) = payload?;

    let mut movie = MovieRepo::find_by_id(&state.pool, id).await?;
    check_expected_version(movie.version, expected)?;

    patch.apply(&mut movie)?;
    movie.version = MovieRepo::update(&state.pool, &movie).await?;
    tracing::info!(movie_id = movie.id, version = movie.version, user_id = user.0.id, "Movie updated");

    Ok(Json(json!({ "movie": movie })))
}

/// DELETE /v1/movies/{id}
pub async fn delete_movie(
    State(state): State<AppState>,
    RequirePermission { user, .. }: RequirePermission<MoviesWrite>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id("movie", &raw_id)?;
    MovieRepo::delete(&state.pool, id).await?;
    tracing::info!(movie_id = id, user_id = user.0.id, "Movie deleted");
    Ok(Json(json!({ "message": "movie successfully deleted" })))
}

fn expected_version(headers: &HeaderMap) -> AppResult<Option<Version>> {
    let Some(value) = headers.get(EXPECTED_VERSION_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .map(Some)
        .ok_or_else(|| AppError::BadRequest("X-Expected-Version must be an integer".into()))
}
