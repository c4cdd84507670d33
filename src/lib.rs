//! Movie catalog backend
//!
//! A JSON API over an embedded database for managing movies, their download
//! links (shortened through an external provider) and the home-page layout.

pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod links;
pub mod middleware;
pub mod model;
pub mod reconcile;
pub mod route;
pub mod shortener;
pub mod store;
