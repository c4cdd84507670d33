//! HTTP request handlers for the movie catalog API
//!
//! Handlers stay thin: they extract the request, call the matching catalog
//! operation on [`AppState`] and shape the JSON response. Every movie leaves
//! the API as a [`MovieResponse`] so old and new frontends can both read it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::database::AppState;
use crate::error::AppError;
use crate::model::{ListParams, Movie, MovieResponse};
use crate::reconcile::Payload;

fn to_responses(movies: Vec<Movie>) -> Vec<MovieResponse> {
    movies.into_iter().map(MovieResponse::from).collect()
}

/// Lists visible movies, newest first
///
/// # Example Request
///
/// `GET /api/movies?trending=true&page=1&limit=20`
///
/// Without `limit` every visible movie is returned.
pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let movies = state.public_movies(&params)?;
    Ok(Json(to_responses(movies)))
}

/// Lists every movie including hidden ones (admin only)
pub async fn list_all_movies(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(to_responses(state.all_movies()?)))
}

/// Fetches one movie
///
/// # Response
///
/// - **200 OK** - The movie
/// - **404 Not Found** - Unknown id, or the movie is hidden
pub async fn get_movie(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(MovieResponse::from(state.public_movie(&id)?)))
}

/// Creates a movie (admin only)
///
/// Accepts both current (`movie_name`, `movie_show`, ...) and legacy
/// (`title`, `isActive`, ...) field names. `download_links` may be an array,
/// a JSON-encoded string or a map keyed by quality; each link is shortened
/// through the configured provider before the movie is saved.
///
/// # Request Body
///
/// ```json
/// {
///   "movie_name": "Heat",
///   "movie_year": "1995",
///   "movie_tags": "crime, thriller",
///   "download_links": [{ "label": "GDrive", "url": "https://..." }]
/// }
/// ```
///
/// # Response
///
/// - **201 Created** - `{ "message": ..., "movie": {...} }`
/// - **400 Bad Request** - Movie name missing
pub async fn create_movie(
    State(state): State<AppState>,
    Json(payload): Json<Payload>,
) -> Result<impl IntoResponse, AppError> {
    let movie = state.create_movie(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Movie added successfully",
            "movie": MovieResponse::from(movie),
        })),
    ))
}

/// Updates a movie (admin only)
///
/// Only supplied fields change. Links are regenerated only when
/// `download_links` is part of the body.
///
/// # Response
///
/// - **200 OK** - `{ "message": ..., "movie": {...} }`
/// - **400 Bad Request** - Attempt to clear the movie name
/// - **404 Not Found** - Unknown id
pub async fn update_movie(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<Payload>,
) -> Result<impl IntoResponse, AppError> {
    let movie = state.update_movie(&id, &payload).await?;

    Ok(Json(json!({
        "message": "Movie updated successfully",
        "movie": MovieResponse::from(movie),
    })))
}

/// Deletes a movie (admin only)
pub async fn delete_movie(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    state.delete_movie(&id)?;

    Ok(Json(json!({
        "message": "Movie deleted successfully",
        "deleted_id": id
    })))
}

/// Counts a click on one of a movie's download links
///
/// # Example Request
///
/// `POST /api/movies/x1Y2z3A4b5C6/link/0/click`
///
/// # Response
///
/// - **200 OK** - `{ "message": ..., "click_count": 3 }`
/// - **400 Bad Request** - Index is not a valid link position
/// - **404 Not Found** - Unknown movie
pub async fn track_link_click(
    Path((id, index)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let click_count = state.record_click(&id, &index)?;

    Ok(Json(json!({
        "message": "Click tracked successfully",
        "click_count": click_count
    })))
}

/// Returns the home-page layout
pub async fn get_home_config(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.home_config()?))
}

/// Updates the home-page layout (admin only)
pub async fn update_home_config(
    State(state): State<AppState>,
    Json(payload): Json<Payload>,
) -> Result<impl IntoResponse, AppError> {
    let config = state.update_home_config(&payload)?;

    Ok(Json(json!({
        "message": "Home layout updated successfully",
        "config": config
    })))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
