//! Repository for the `movies` table.

use async_trait::async_trait;
use greenlight_core::error::CoreError;
use greenlight_core::movie::Movie;
use greenlight_core::store::{movie_edit_conflict, movie_not_found, MovieQuery, MovieStore};
use greenlight_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::movie::{CountedMovieRow, MovieRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_at, title, year, runtime, genres, version";

/// Title (`$1`) and genre (`$2`) predicates shared by list and count.
const FILTER_PREDICATE: &str = "($1 = ''
        OR strpos(lower(title), lower($1)) > 0
        OR to_tsvector('simple', title) @@ plainto_tsquery('simple', $1))
    AND (genres @> $2 OR $2 = '{}')";

/// Sortable columns; anything else never reaches the ORDER BY clause.
const SORTABLE_COLUMNS: &[&str] = &["id", "title", "year", "runtime"];

/// Provides CRUD operations for movies.
pub struct MovieRepo;

impl MovieRepo {
    /// Insert a new movie, returning the generated `(id, created_at, version)`.
    pub async fn create(
        pool: &PgPool,
        movie: &Movie,
    ) -> Result<(DbId, Timestamp, i32), sqlx::Error> {
        sqlx::query_as::<_, (DbId, Timestamp, i32)>(
            "INSERT INTO movies (title, year, runtime, genres)
             VALUES ($1, $2, $3, $4)
             RETURNING id, created_at, version",
        )
        .bind(&movie.title)
        .bind(movie.year)
        .bind(movie.runtime.0)
        .bind(&movie.genres)
        .fetch_one(pool)
        .await
    }

    /// Find a movie by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MovieRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies WHERE id = $1");
        sqlx::query_as::<_, MovieRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Write all mutable fields if the stored version equals `movie.version`.
    ///
    /// Returns the new version, or `None` if the row is gone or was changed
    /// by someone else since it was read.
    pub async fn update_if_version(
        pool: &PgPool,
        movie: &Movie,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE movies SET
                title = $1,
                year = $2,
                runtime = $3,
                genres = $4,
                version = version + 1
             WHERE id = $5 AND version = $6
             RETURNING version",
        )
        .bind(&movie.title)
        .bind(movie.year)
        .bind(movie.runtime.0)
        .bind(&movie.genres)
        .bind(movie.id)
        .bind(movie.version)
        .fetch_optional(pool)
        .await
    }

    /// Permanently delete a movie by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List one page of movies matching the title and genre filters.
    ///
    /// The title filter matches case-insensitive substrings or full-text
    /// terms; the genre filter requires every listed genre. Each row carries
    /// the total match count computed before LIMIT/OFFSET.
    pub async fn list(
        pool: &PgPool,
        query: &MovieQuery,
    ) -> Result<Vec<CountedMovieRow>, sqlx::Error> {
        let sort = &query.page.sort;
        let sql = format!(
            "SELECT count(*) OVER() AS total_records, {COLUMNS}
             FROM movies
             WHERE {FILTER_PREDICATE}
             ORDER BY {} {}, id ASC
             LIMIT $3 OFFSET $4",
            sort.column,
            sort.direction.as_sql(),
        );
        sqlx::query_as::<_, CountedMovieRow>(&sql)
            .bind(&query.title)
            .bind(&query.genres)
            .bind(query.page.limit)
            .bind(query.page.offset)
            .fetch_all(pool)
            .await
    }

    /// Count movies matching the same filters as [`MovieRepo::list`].
    pub async fn count(pool: &PgPool, query: &MovieQuery) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(&format!(
            "SELECT count(*) FROM movies WHERE {FILTER_PREDICATE}"
        ))
        .bind(&query.title)
        .bind(&query.genres)
        .fetch_one(pool)
        .await
    }
}

// ---------------------------------------------------------------------------
// MovieStore
// ---------------------------------------------------------------------------

/// PostgreSQL-backed [`MovieStore`].
#[derive(Debug, Clone)]
pub struct PgMovieStore {
    pool: PgPool,
}

impl PgMovieStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn storage(err: sqlx::Error) -> CoreError {
    CoreError::Storage(Box::new(err))
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn insert(&self, movie: &mut Movie) -> Result<(), CoreError> {
        let (id, created_at, version) = MovieRepo::create(&self.pool, movie)
            .await
            .map_err(storage)?;
        movie.id = id;
        movie.created_at = created_at;
        movie.version = version;
        Ok(())
    }

    async fn get(&self, id: DbId) -> Result<Movie, CoreError> {
        if id < 1 {
            return Err(movie_not_found(id));
        }
        MovieRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage)?
            .map(Movie::from)
            .ok_or_else(|| movie_not_found(id))
    }

    async fn update(&self, movie: &mut Movie) -> Result<(), CoreError> {
        match MovieRepo::update_if_version(&self.pool, movie)
            .await
            .map_err(storage)?
        {
            Some(version) => {
                movie.version = version;
                Ok(())
            }
            None => {
                tracing::debug!(movie_id = movie.id, version = movie.version, "Stale movie version");
                Err(movie_edit_conflict(movie.id))
            }
        }
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        if id < 1 {
            return Err(movie_not_found(id));
        }
        if MovieRepo::delete(&self.pool, id).await.map_err(storage)? {
            Ok(())
        } else {
            Err(movie_not_found(id))
        }
    }

    async fn get_all(&self, query: &MovieQuery) -> Result<(Vec<Movie>, i64), CoreError> {
        if !SORTABLE_COLUMNS.contains(&query.page.sort.column.as_str()) {
            return Err(CoreError::ContractViolation(format!(
                "unsupported sort column: {}",
                query.page.sort.column
            )));
        }

        let rows = MovieRepo::list(&self.pool, query).await.map_err(storage)?;
        let total = match rows.first() {
            Some(row) => row.total_records,
            // Past the last page the window total is unavailable.
            None if query.page.offset > 0 => {
                MovieRepo::count(&self.pool, query).await.map_err(storage)?
            }
            None => 0,
        };
        let movies = rows.into_iter().map(|r| Movie::from(r.movie)).collect();
        Ok((movies, total))
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(storage)
    }
}
