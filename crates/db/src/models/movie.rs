//! Movie entity model and DTOs.

use greenlight_core::error::CoreResult;
use greenlight_core::movie::{validate_movie, MovieFields, Runtime};
use greenlight_core::patch::Patch;
use greenlight_core::types::{DbId, Timestamp, Version};
use greenlight_core::validation::FieldErrors;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `movies` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Movie {
    pub id: DbId,
    pub created_at: Timestamp,
    pub title: String,
    pub year: i32,
    #[sqlx(try_from = "i32")]
    pub runtime: Runtime,
    pub genres: Vec<String>,
    pub version: Version,
}

impl Movie {
    pub fn fields(&self) -> MovieFields<'_> {
        MovieFields {
            title: &self.title,
            year: self.year,
            runtime: self.runtime,
            genres: &self.genres,
        }
    }
}

/// DTO for inserting a movie.
///
/// Missing keys deserialize to zero values so validation can name them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMovie {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub runtime: Runtime,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl CreateMovie {
    pub fn fields(&self) -> MovieFields<'_> {
        MovieFields {
            title: &self.title,
            year: self.year,
            runtime: self.runtime,
            genres: &self.genres,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        let mut errors = FieldErrors::new();
        validate_movie(&self.fields(), &mut errors);
        errors.into_result()
    }
}

/// Partial update. Absent keys keep the stored value; explicit nulls are
/// rejected because every movie column is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMovie {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub year: Patch<i32>,
    #[serde(default)]
    pub runtime: Patch<Runtime>,
    #[serde(default)]
    pub genres: Patch<Vec<String>>,
}

impl UpdateMovie {
    /// Merge into `movie` and validate the merged record. The version is
    /// left alone; the store bumps it on a successful write.
    pub fn apply(self, movie: &mut Movie) -> CoreResult<()> {
        let mut errors = FieldErrors::new();
        self.title.apply_required(&mut movie.title, "title", &mut errors);
        self.year.apply_required(&mut movie.year, "year", &mut errors);
        self.runtime.apply_required(&mut movie.runtime, "runtime", &mut errors);
        self.genres.apply_required(&mut movie.genres, "genres", &mut errors);
        validate_movie(&movie.fields(), &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use greenlight_core::error::CoreError;

    use super::*;

    fn casablanca() -> Movie {
        Movie {
            id: 1,
            created_at: chrono::Utc::now(),
            title: "Casablanca".to_string(),
            year: 1942,
            runtime: Runtime(102),
            genres: vec!["drama".to_string(), "romance".to_string()],
            version: 1,
        }
    }

    #[test]
    fn serializes_runtime_as_minutes_string() {
        let json = serde_json::to_value(casablanca()).unwrap();
        assert_eq!(json["runtime"], "102 mins");
        assert_eq!(json["version"], 1);
    }

    #[test]
    fn absent_fields_are_kept() {
        let mut movie = casablanca();
        let patch: UpdateMovie = serde_json::from_str(r#"{"year": 1943}"#).unwrap();
        patch.apply(&mut movie).unwrap();
        assert_eq!(movie.year, 1943);
        assert_eq!(movie.title, "Casablanca");
        assert_eq!(movie.version, 1);
    }

    #[test]
    fn explicit_null_is_rejected() {
        let mut movie = casablanca();
        let patch: UpdateMovie = serde_json::from_str(r#"{"title": null}"#).unwrap();
        let err = patch.apply(&mut movie).unwrap_err();
        assert_matches!(err, CoreError::Validation(errors) if errors.get("title") == Some("must not be null"));
    }

    #[test]
    fn merged_record_is_validated() {
        let mut movie = casablanca();
        let patch: UpdateMovie = serde_json::from_str(r#"{"genres": []}"#).unwrap();
        assert_matches!(patch.apply(&mut movie), Err(CoreError::Validation(_)));
    }

    #[test]
    fn create_reports_missing_fields() {
        let input: CreateMovie = serde_json::from_str("{}").unwrap();
        let err = input.validate().unwrap_err();
        assert_matches!(err, CoreError::Validation(errors) => {
            assert_eq!(errors.get("title"), Some("must be provided"));
            assert_eq!(errors.get("year"), Some("must be provided"));
            assert_eq!(errors.get("runtime"), Some("must be provided"));
            assert_eq!(errors.get("genres"), Some("must contain at least 1 genre"));
        });
    }
}
