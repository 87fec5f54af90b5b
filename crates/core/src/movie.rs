//! Movie record, request DTOs and domain validation.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{DbId, Timestamp};
use crate::validator::{unique, FieldErrors};

/// Entity name used in not-found and conflict errors.
pub const ENTITY: &str = "Movie";

/// Sort keys the movie list endpoint accepts.
pub const MOVIE_SORT_SAFELIST: &[&str] = &[
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

/// Maximum title length in bytes.
pub const MAX_TITLE_BYTES: usize = 500;

/// Year of the earliest known motion picture.
pub const MIN_YEAR: i32 = 1888;

pub const MAX_GENRES: usize = 5;

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// Running time in minutes, encoded in JSON as `"<n> mins"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Runtime(pub i32);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid runtime format")]
pub struct InvalidRuntimeFormat;

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mins", self.0)
    }
}

impl FromStr for Runtime {
    type Err = InvalidRuntimeFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(' ') {
            Some((minutes, "mins")) => minutes
                .parse::<i32>()
                .map(Runtime)
                .map_err(|_| InvalidRuntimeFormat),
            _ => Err(InvalidRuntimeFormat),
        }
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Movie
// ---------------------------------------------------------------------------

/// A movie as stored and returned to clients.
///
/// `id`, `created_at` and `version` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub created_at: Timestamp,
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
    /// Starts at 1, incremented by the store on every successful update.
    pub version: i32,
}

/// Request body for creating a movie.
///
/// Missing fields default to zero values so they surface as
/// "must be provided" validation errors instead of decode failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateMovie {
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
}

/// Request body for a partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMovie {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

impl CreateMovie {
    /// Build an unsaved movie; the store fills in `id`, `created_at` and `version`.
    pub fn into_movie(self) -> Movie {
        Movie {
            id: 0,
            created_at: chrono::Utc::now(),
            title: self.title,
            year: self.year,
            runtime: self.runtime,
            genres: self.genres,
            version: 0,
        }
    }
}

impl UpdateMovie {
    /// Copy every present field onto `movie`.
    pub fn apply_to(&self, movie: &mut Movie) {
        if let Some(title) = &self.title {
            movie.title.clone_from(title);
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(runtime) = self.runtime {
            movie.runtime = runtime;
        }
        if let Some(genres) = &self.genres {
            movie.genres.clone_from(genres);
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Record every domain rule `movie` breaks.
pub fn validate_movie(errors: &mut FieldErrors, movie: &Movie) {
    validate_movie_for_year(errors, movie, chrono::Utc::now().year());
}

fn validate_movie_for_year(errors: &mut FieldErrors, movie: &Movie, current_year: i32) {
    errors.check(!movie.title.is_empty(), "title", "must be provided");
    errors.check(
        movie.title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    errors.check(movie.year != 0, "year", "must be provided");
    errors.check(movie.year >= MIN_YEAR, "year", "must be greater than 1888");
    errors.check(movie.year <= current_year, "year", "must not be in the future");

    errors.check(movie.runtime.0 != 0, "runtime", "must be provided");
    errors.check(movie.runtime.0 > 0, "runtime", "must be a positive integer");

    errors.check(!movie.genres.is_empty(), "genres", "must contain at least 1 genre");
    errors.check(
        movie.genres.len() <= MAX_GENRES,
        "genres",
        "must not contain more than 5 genres",
    );
    errors.check(unique(&movie.genres), "genres", "must not contain duplicate values");
    errors.check(
        movie.genres.iter().all(|g| *g == g.to_lowercase()),
        "genres",
        "must be lowercase",
    );
}
