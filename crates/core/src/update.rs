//! Optimistic-concurrency update of a single movie.
//!
//! Fetch, merge the partial payload, validate, then submit exactly one
//! conditional write carrying the version that was read. A concurrent
//! writer surfaces as [`CoreError::EditConflict`]; retrying is up to the
//! caller.

use crate::error::CoreError;
use crate::movie::{validate_movie, Movie, UpdateMovie};
use crate::store::{movie_edit_conflict, MovieStore};
use crate::types::DbId;
use crate::validator::FieldErrors;

/// Apply `patch` to the movie with `id`.
///
/// When `expected_version` is given and differs from the stored version the
/// update is rejected as an edit conflict before anything is merged.
pub async fn update_movie(
    store: &dyn MovieStore,
    id: DbId,
    patch: &UpdateMovie,
    expected_version: Option<i32>,
) -> Result<Movie, CoreError> {
    let mut movie = store.get(id).await?;

    if let Some(expected) = expected_version {
        if expected != movie.version {
            tracing::debug!(
                movie_id = id,
                expected,
                actual = movie.version,
                "Expected version does not match stored version"
            );
            return Err(movie_edit_conflict(id));
        }
    }

    patch.apply_to(&mut movie);

    let mut errors = FieldErrors::new();
    validate_movie(&mut errors, &movie);
    errors.into_result()?;

    store.update(&mut movie).await?;
    tracing::debug!(movie_id = id, version = movie.version, "Movie updated");

    Ok(movie)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;
    use crate::memory_store::MemoryMovieStore;
    use crate::movie::{CreateMovie, Runtime};
    use crate::store::MovieQuery;

    async fn store_with_movie() -> MemoryMovieStore {
        let store = MemoryMovieStore::new();
        let mut movie = CreateMovie {
            title: "Black Panther".to_string(),
            year: 2018,
            runtime: Runtime(134),
            genres: vec!["action".to_string(), "adventure".to_string()],
        }
        .into_movie();
        store.insert(&mut movie).await.unwrap();
        store
    }

    fn patch(json: &str) -> UpdateMovie {
        serde_json::from_str(json).unwrap()
    }

    /// Advance the stored version of movie 1 to `version`.
    async fn bump_to(store: &MemoryMovieStore, version: i32) {
        while store.get(1).await.unwrap().version < version {
            let mut m = store.get(1).await.unwrap();
            store.update(&mut m).await.unwrap();
        }
    }

    #[tokio::test]
    async fn successful_update_increments_version() {
        let store = store_with_movie().await;
        let updated = update_movie(&store, 1, &patch(r#"{"runtime":"135 mins"}"#), None)
            .await
            .unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.runtime, Runtime(135));
        assert_eq!(updated.title, "Black Panther");
        assert_eq!(store.get(1).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = store_with_movie().await;
        let result = update_movie(&store, 42, &patch("{}"), None).await;
        assert_matches!(result, Err(CoreError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn omitted_genres_are_preserved() {
        let store = store_with_movie().await;
        let updated = update_movie(&store, 1, &patch(r#"{"title":"Black Panther II"}"#), None)
            .await
            .unwrap();
        assert_eq!(updated.genres, vec!["action", "adventure"]);
    }

    #[tokio::test]
    async fn empty_genres_fail_validation_without_writing() {
        let store = store_with_movie().await;
        let result = update_movie(&store, 1, &patch(r#"{"genres":[]}"#), None).await;
        assert_matches!(result, Err(CoreError::FailedValidation(ref errors)) => {
            assert_eq!(errors.get("genres"), Some("must contain at least 1 genre"));
        });
        let stored = store.get(1).await.unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.genres.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_editors_lose_to_the_first_commit() {
        let store = store_with_movie().await;
        bump_to(&store, 3).await;

        // Both editors read version 3.
        let mut first = store.get(1).await.unwrap();
        let mut second = store.get(1).await.unwrap();
        assert_eq!(first.version, 3);
        assert_eq!(second.version, 3);

        patch(r#"{"year":2019}"#).apply_to(&mut first);
        store.update(&mut first).await.unwrap();
        assert_eq!(first.version, 4);

        patch(r#"{"year":2020}"#).apply_to(&mut second);
        assert_matches!(
            store.update(&mut second).await,
            Err(CoreError::EditConflict { .. })
        );
        assert_eq!(store.get(1).await.unwrap().year, 2019);
    }

    #[tokio::test]
    async fn replaying_a_stale_version_always_conflicts() {
        let store = store_with_movie().await;
        let stale = store.get(1).await.unwrap();

        let mut fresh = stale.clone();
        store.update(&mut fresh).await.unwrap();

        for _ in 0..3 {
            let mut replay = stale.clone();
            assert_matches!(
                store.update(&mut replay).await,
                Err(CoreError::EditConflict { .. })
            );
        }
        assert_eq!(store.get(1).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn mismatched_expected_version_is_a_conflict() {
        let store = store_with_movie().await;
        let result = update_movie(&store, 1, &patch(r#"{"year":2019}"#), Some(7)).await;
        assert_matches!(result, Err(CoreError::EditConflict { id: 1, .. }));
        assert_eq!(store.get(1).await.unwrap().year, 2018);

        let updated = update_movie(&store, 1, &patch(r#"{"year":2019}"#), Some(1))
            .await
            .unwrap();
        assert_eq!(updated.version, 2);
    }

    /// Store wrapper counting conditional writes.
    struct CountingStore {
        inner: MemoryMovieStore,
        updates: AtomicUsize,
    }

    #[async_trait]
    impl MovieStore for CountingStore {
        async fn insert(&self, movie: &mut Movie) -> Result<(), CoreError> {
            self.inner.insert(movie).await
        }
        async fn get(&self, id: DbId) -> Result<Movie, CoreError> {
            self.inner.get(id).await
        }
        async fn update(&self, movie: &mut Movie) -> Result<(), CoreError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            self.inner.update(movie).await
        }
        async fn delete(&self, id: DbId) -> Result<(), CoreError> {
            self.inner.delete(id).await
        }
        async fn get_all(&self, query: &MovieQuery) -> Result<(Vec<Movie>, i64), CoreError> {
            self.inner.get_all(query).await
        }
    }

    #[tokio::test]
    async fn commits_exactly_once_per_attempt() {
        let store = CountingStore {
            inner: store_with_movie().await,
            updates: AtomicUsize::new(0),
        };
        update_movie(&store, 1, &patch(r#"{"year":2019}"#), None)
            .await
            .unwrap();
        assert_eq!(store.updates.load(Ordering::SeqCst), 1);

        let _ = update_movie(&store, 1, &patch(r#"{"genres":[]}"#), None).await;
        assert_eq!(store.updates.load(Ordering::SeqCst), 1);
    }

    /// Store wrapper that lets a rival editor commit between the first read
    /// and the conditional write.
    struct RacingStore {
        inner: MemoryMovieStore,
        raced: AtomicBool,
        updates: AtomicUsize,
    }

    #[async_trait]
    impl MovieStore for RacingStore {
        async fn insert(&self, movie: &mut Movie) -> Result<(), CoreError> {
            self.inner.insert(movie).await
        }
        async fn get(&self, id: DbId) -> Result<Movie, CoreError> {
            let movie = self.inner.get(id).await?;
            if !self.raced.swap(true, Ordering::SeqCst) {
                let mut rival = movie.clone();
                rival.title = "Rival Edit".to_string();
                self.inner.update(&mut rival).await?;
            }
            Ok(movie)
        }
        async fn update(&self, movie: &mut Movie) -> Result<(), CoreError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            self.inner.update(movie).await
        }
        async fn delete(&self, id: DbId) -> Result<(), CoreError> {
            self.inner.delete(id).await
        }
        async fn get_all(&self, query: &MovieQuery) -> Result<(Vec<Movie>, i64), CoreError> {
            self.inner.get_all(query).await
        }
    }

    #[tokio::test]
    async fn write_after_a_rival_commit_is_a_conflict() {
        let store = RacingStore {
            inner: store_with_movie().await,
            raced: AtomicBool::new(false),
            updates: AtomicUsize::new(0),
        };

        let result = update_movie(&store, 1, &patch(r#"{"year":2019}"#), None).await;
        assert_matches!(result, Err(CoreError::EditConflict { id: 1, .. }));
        assert_eq!(store.updates.load(Ordering::SeqCst), 1);

        let stored = store.inner.get(1).await.unwrap();
        assert_eq!(stored.title, "Rival Edit");
        assert_eq!(stored.year, 2018);
        assert_eq!(stored.version, 2);
    }
}
