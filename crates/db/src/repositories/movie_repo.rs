//! Repository for the `movies` table.

use greenlight_core::error::{CoreError, CoreResult};
use greenlight_core::filters::{Metadata, MovieQuery};
use greenlight_core::types::{DbId, Version};
use sqlx::{FromRow, PgPool};

use crate::models::movie::{CreateMovie, Movie};
use crate::storage::bounded;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_at, title, year, runtime, genres, version";

const TABLE: &str = "movies";

/// A list row carrying the windowed total alongside the movie.
#[derive(FromRow)]
struct MovieWindowRow {
    total_records: i64,
    #[sqlx(flatten)]
    movie: Movie,
}

/// Provides versioned CRUD and search over movies.
pub struct MovieRepo;

impl MovieRepo {
    /// Insert a new movie at version 1, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateMovie) -> CoreResult<Movie> {
        let query = format!(
            "INSERT INTO movies (title, year, runtime, genres)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let movie = bounded(
            "create",
            TABLE,
            sqlx::query_as::<_, Movie>(&query)
                .bind(&input.title)
                .bind(input.year)
                .bind(input.runtime.minutes())
                .bind(&input.genres)
                .fetch_one(pool),
        )
        .await?;
        tracing::debug!(movie_id = movie.id, "Movie created");
        Ok(movie)
    }

    /// Fetch a movie by ID. Non-positive IDs are never looked up.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> CoreResult<Movie> {
        if id < 1 {
            return Err(CoreError::not_found("movie", id));
        }
        let query = format!("SELECT {COLUMNS} FROM movies WHERE id = $1");
        bounded(
            "find_by_id",
            TABLE,
            sqlx::query_as::<_, Movie>(&query).bind(id).fetch_optional(pool),
        )
        .await?
        .ok_or_else(|| CoreError::not_found("movie", id))
    }

    /// Write `movie`'s fields if the stored version still equals
    /// `movie.version`, returning the new version.
    ///
    /// A moved version or a vanished row is an edit conflict; the caller
    /// read the row before writing, so both mean a concurrent writer won.
    pub async fn update(pool: &PgPool, movie: &Movie) -> CoreResult<Version> {
        let version = bounded(
            "update",
            TABLE,
            sqlx::query_scalar::<_, Version>(
                "UPDATE movies
                 SET title = $1, year = $2, runtime = $3, genres = $4, version = version + 1
                 WHERE id = $5 AND version = $6
                 RETURNING version",
            )
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.runtime.minutes())
            .bind(&movie.genres)
            .bind(movie.id)
            .bind(movie.version)
            .fetch_optional(pool),
        )
        .await?;

        match version {
            Some(version) => Ok(version),
            None => {
                tracing::info!(movie_id = movie.id, expected_version = movie.version, "Edit conflict on movie");
                Err(CoreError::edit_conflict())
            }
        }
    }

    /// Delete a movie by ID.
    pub async fn delete(pool: &PgPool, id: DbId) -> CoreResult<()> {
        if id < 1 {
            return Err(CoreError::not_found("movie", id));
        }
        let result = bounded(
            "delete",
            TABLE,
            sqlx::query("DELETE FROM movies WHERE id = $1").bind(id).execute(pool),
        )
        .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("movie", id));
        }
        tracing::debug!(movie_id = id, "Movie deleted");
        Ok(())
    }

    /// Search, sort and paginate movies.
    ///
    /// The sort column comes from the query's safelist, so it is safe to
    /// splice into the SQL. Ties are broken by ascending `id`.
    ///
    /// The total comes from the `count(*) OVER()` column of the returned
    /// rows. A page past the end returns no rows, so its metadata is all
    /// zero even when other pages hold matches.
    pub async fn list(pool: &PgPool, query: &MovieQuery) -> CoreResult<(Vec<Movie>, Metadata)> {
        let filters = &query.filters;
        let column = filters
            .sort_column()
            .ok_or_else(|| CoreError::invalid_field("sort", "invalid sort value"))?;
        let direction = filters.sort_direction().as_sql();

        let sql = format!(
            "SELECT count(*) OVER() AS total_records, {COLUMNS}
             FROM movies
             WHERE ($1 = '' OR to_tsvector('simple', title) @@ plainto_tsquery('simple', $1))
               AND (cardinality($2::text[]) = 0 OR genres @> $2::text[])
             ORDER BY {column} {direction}, id ASC
             LIMIT $3 OFFSET $4"
        );

        let rows = bounded(
            "list",
            TABLE,
            sqlx::query_as::<_, MovieWindowRow>(&sql)
                .bind(query.text_or_empty())
                .bind(&query.genres)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(pool),
        )
        .await?;

        let total = rows.first().map_or(0, |row| row.total_records);
        let movies = rows.into_iter().map(|row| row.movie).collect();
        let metadata = Metadata::calculate(total, filters.page, filters.page_size);
        Ok((movies, metadata))
    }
}
