//! Handlers for the `/movies` resource.

use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::Json;
use greenlight_core::filters::{calculate_metadata, validate_filters};
use greenlight_core::movie::{validate_movie, CreateMovie, Movie, UpdateMovie, MOVIE_SORT_SAFELIST};
use greenlight_core::store::MovieQuery;
use greenlight_core::types::DbId;
use greenlight_core::update::update_movie;
use greenlight_core::validator::FieldErrors;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::query::ListMoviesParams;
use crate::response::{DataResponse, ListResponse, MessageResponse};
use crate::state::AppState;

/// Optional request header carrying the version the client last saw.
pub const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

/// GET /api/v1/movies
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListMoviesParams>,
) -> AppResult<Json<ListResponse<Movie>>> {
    let mut errors = FieldErrors::new();
    let filters = params.filters(&mut errors, "id");
    validate_filters(&mut errors, &filters, MOVIE_SORT_SAFELIST);
    errors.into_result()?;

    let query = MovieQuery {
        title: params.title(),
        genres: params.genres(),
        page: filters.page_request(MOVIE_SORT_SAFELIST)?,
    };

    let (movies, total_records) = state.store.get_all(&query).await?;
    let metadata = calculate_metadata(total_records, filters.page, filters.page_size);

    Ok(Json(ListResponse {
        data: movies,
        metadata,
    }))
}

/// POST /api/v1/movies
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateMovie>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<DataResponse<Movie>>)> {
    let mut movie = input.into_movie();

    let mut errors = FieldErrors::new();
    validate_movie(&mut errors, &movie);
    errors.into_result()?;

    state.store.insert(&mut movie).await?;
    tracing::info!(movie_id = movie.id, title = %movie.title, "Movie created");

    let location = format!("/api/v1/movies/{}", movie.id);
    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(DataResponse { data: movie }),
    ))
}

/// GET /api/v1/movies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Movie>>> {
    let movie = state.store.get(id).await?;
    Ok(Json(DataResponse { data: movie }))
}

/// PATCH /api/v1/movies/{id}
///
/// Only fields present in the body are changed. A stale
/// `X-Expected-Version` header or a concurrent write yields 409.
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    headers: HeaderMap,
    AppJson(input): AppJson<UpdateMovie>,
) -> AppResult<Json<DataResponse<Movie>>> {
    let expected_version = expected_version(&headers)?;
    let movie = update_movie(&*state.store, id, &input, expected_version).await?;
    tracing::info!(movie_id = id, version = movie.version, "Movie updated");
    Ok(Json(DataResponse { data: movie }))
}

/// DELETE /api/v1/movies/{id}
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    state.store.delete(id).await?;
    tracing::info!(movie_id = id, "Movie deleted");
    Ok(Json(MessageResponse {
        message: "movie successfully deleted",
    }))
}

fn expected_version(headers: &HeaderMap) -> AppResult<Option<i32>> {
    let Some(value) = headers.get(EXPECTED_VERSION_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i32>().ok())
        .map(Some)
        .ok_or_else(|| {
            AppError::BadRequest("X-Expected-Version header must be an integer".to_string())
        })
}
