//! Storage contract for movies.
//!
//! The API layer holds an `Arc<dyn MovieStore>`; the PostgreSQL
//! implementation lives in `greenlight_db`, the in-memory one in
//! [`crate::memory_store`].

use async_trait::async_trait;

use crate::error::CoreError;
use crate::filters::PageRequest;
use crate::movie::Movie;
use crate::types::DbId;

/// Predicates and bounds for a movie list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieQuery {
    /// Case-insensitive title match; empty matches everything.
    pub title: String,
    /// Every listed genre must be present on the movie; empty matches everything.
    pub genres: Vec<String>,
    pub page: PageRequest,
}

#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Persist a new movie, filling in `id`, `created_at` and `version = 1`.
    async fn insert(&self, movie: &mut Movie) -> Result<(), CoreError>;

    /// Fetch a movie by id, or [`CoreError::NotFound`].
    async fn get(&self, id: DbId) -> Result<Movie, CoreError>;

    /// Conditionally write `movie` if the stored version still equals
    /// `movie.version`, then bump `movie.version` to the stored value.
    ///
    /// A stale version yields [`CoreError::EditConflict`] and writes nothing.
    async fn update(&self, movie: &mut Movie) -> Result<(), CoreError>;

    /// Remove a movie by id, or [`CoreError::NotFound`].
    async fn delete(&self, id: DbId) -> Result<(), CoreError>;

    /// One page of matching movies plus the total match count ignoring
    /// limit and offset.
    async fn get_all(&self, query: &MovieQuery) -> Result<(Vec<Movie>, i64), CoreError>;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Not-found error for a movie id.
pub fn movie_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: crate::movie::ENTITY,
        id,
    }
}

/// Edit-conflict error for a movie id.
pub fn movie_edit_conflict(id: DbId) -> CoreError {
    CoreError::EditConflict {
        entity: crate::movie::ENTITY,
        id,
    }
}
