//! Route definitions for the movie catalog API
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;

use crate::database::AppState;
use crate::handler::{
    create_movie, delete_movie, get_home_config, get_movie, health, list_all_movies, list_movies,
    track_link_click, update_home_config, update_movie,
};
use crate::middleware::require_admin;

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// Public:
/// - `GET /api/movies` - Visible movies
/// - `GET /api/movies/{id}` - One visible movie
/// - `POST /api/movies/{id}/link/{index}/click` - Count a download click
/// - `GET /api/home-config` - Home-page layout
/// - `GET /health` - Liveness probe
///
/// Admin (guarded by [`require_admin`]):
/// - `GET /api/movies/admin/all` - All movies, hidden ones included
/// - `POST /api/movies` - Create a movie
/// - `PUT /api/movies/{id}` - Update a movie
/// - `DELETE /api/movies/{id}` - Delete a movie
/// - `PUT /api/home-config` - Update the home-page layout
///
/// # Example Usage
///
/// ```no_run
/// # use movie_catalog::config::Config;
/// # use movie_catalog::database::{init_db, AppState};
/// # use movie_catalog::route::create_app;
/// # let db = init_db("data.db").unwrap();
/// let state = AppState::new(db, Config::default());
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/{id}", get(get_movie))
        .route("/movies/{id}/link/{index}/click", post(track_link_click))
        .route("/home-config", get(get_home_config));

    let admin_routes = Router::new()
        .route("/movies", post(create_movie))
        .route("/movies/admin/all", get(list_all_movies))
        .route("/movies/{id}", put(update_movie).delete(delete_movie))
        .route("/home-config", put(update_home_config))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health))
        .nest("/api", public_routes.merge(admin_routes))
        .with_state(state)
}
