//! In-memory [`MovieStore`] with the same semantics as the PostgreSQL store.
//!
//! Used by tests and local tooling. All state sits behind one
//! `tokio::sync::RwLock`, so the version check and the write in
//! [`MovieStore::update`] happen atomically.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::filters::SortDirection;
use crate::movie::Movie;
use crate::store::{movie_edit_conflict, movie_not_found, MovieQuery, MovieStore};
use crate::types::DbId;

#[derive(Debug, Default)]
struct Inner {
    last_id: DbId,
    movies: BTreeMap<DbId, Movie>,
}

#[derive(Debug, Default)]
pub struct MemoryMovieStore {
    inner: RwLock<Inner>,
}

impl MemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored movies.
    pub async fn len(&self) -> usize {
        self.inner.read().await.movies.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn title_matches(title: &str, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    let title = title.to_lowercase();
    let filter = filter.to_lowercase();
    if title.contains(&filter) {
        return true;
    }
    let words: Vec<&str> = title.split_whitespace().collect();
    filter.split_whitespace().all(|term| words.contains(&term))
}

fn compare_by(column: &str, a: &Movie, b: &Movie) -> Result<Ordering, CoreError> {
    let ordering = match column {
        "id" => a.id.cmp(&b.id),
        "title" => a.title.cmp(&b.title),
        "year" => a.year.cmp(&b.year),
        "runtime" => a.runtime.cmp(&b.runtime),
        other => {
            return Err(CoreError::ContractViolation(format!(
                "unsupported sort column: {other}"
            )))
        }
    };
    Ok(ordering)
}

#[async_trait]
impl MovieStore for MemoryMovieStore {
    async fn insert(&self, movie: &mut Movie) -> Result<(), CoreError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        movie.id = inner.last_id;
        movie.created_at = chrono::Utc::now();
        movie.version = 1;
        inner.movies.insert(movie.id, movie.clone());
        Ok(())
    }

    async fn get(&self, id: DbId) -> Result<Movie, CoreError> {
        if id < 1 {
            return Err(movie_not_found(id));
        }
        self.inner
            .read()
            .await
            .movies
            .get(&id)
            .cloned()
            .ok_or_else(|| movie_not_found(id))
    }

    async fn update(&self, movie: &mut Movie) -> Result<(), CoreError> {
        let mut inner = self.inner.write().await;
        let stored = match inner.movies.get_mut(&movie.id) {
            Some(stored) if stored.version == movie.version => stored,
            _ => return Err(movie_edit_conflict(movie.id)),
        };

        movie.version += 1;
        stored.title.clone_from(&movie.title);
        stored.year = movie.year;
        stored.runtime = movie.runtime;
        stored.genres.clone_from(&movie.genres);
        stored.version = movie.version;
        Ok(())
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        if id < 1 {
            return Err(movie_not_found(id));
        }
        match self.inner.write().await.movies.remove(&id) {
            Some(_) => Ok(()),
            None => Err(movie_not_found(id)),
        }
    }

    async fn get_all(&self, query: &MovieQuery) -> Result<(Vec<Movie>, i64), CoreError> {
        let inner = self.inner.read().await;
        let mut matched: Vec<Movie> = inner
            .movies
            .values()
            .filter(|m| title_matches(&m.title, &query.title))
            .filter(|m| query.genres.iter().all(|g| m.genres.contains(g)))
            .cloned()
            .collect();
        drop(inner);

        let sort = &query.page.sort;
        // Validate the column once so the comparator below cannot fail.
        if let (Some(a), Some(b)) = (matched.first(), matched.last()) {
            compare_by(&sort.column, a, b)?;
        }
        matched.sort_by(|a, b| {
            let primary = compare_by(&sort.column, a, b).unwrap_or(Ordering::Equal);
            let primary = match sort.direction {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(query.page.offset.max(0) as usize)
            .take(query.page.limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }
}
