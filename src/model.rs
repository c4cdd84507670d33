//! Data models for the movie catalog
//!
//! This module defines the records persisted in the database (movies, their
//! download and short links, the home-page layout) and the response shapes
//! sent back to API consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A movie record as stored in the database
///
/// Field names on the wire use the `movie_*` convention; the Rust names are
/// the canonical ones every other module works with. Legacy spellings
/// (`title`, `isActive`, ...) are only ever seen by [`crate::reconcile`] on the
/// way in and [`MovieResponse`] on the way out.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Movie {
    /// Store-assigned identifier
    pub id: String,

    #[serde(rename = "movie_name")]
    pub name: String,

    #[serde(rename = "movie_description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "movie_poster", default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,

    #[serde(rename = "movie_screenshots", default)]
    pub screenshot_urls: Vec<String>,

    #[serde(rename = "movie_year", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(rename = "movie_tags", default)]
    pub tags: Vec<String>,

    /// Whether the movie shows up in public listings
    #[serde(rename = "movie_show", default = "default_visible")]
    pub visible: bool,

    #[serde(default)]
    pub trending: bool,

    #[serde(rename = "movie_genre", default)]
    pub genres: Vec<String>,

    #[serde(rename = "movie_duration", default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(rename = "movie_language", default)]
    pub languages: Vec<String>,

    #[serde(rename = "movie_starcast", default)]
    pub starcast: Vec<String>,

    /// Free-form kind, e.g. "movie" or "series"
    #[serde(rename = "movie_type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(rename = "movie_size", default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Admin-supplied direct links, in display order
    #[serde(default)]
    pub download_links: Vec<DownloadLink>,

    /// Shortened counterparts, index-aligned with `download_links`
    #[serde(default)]
    pub short_links: Vec<ShortLink>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_visible() -> bool {
    true
}

impl Movie {
    /// Builds an unsaved record with the create-time defaults.
    ///
    /// The id and timestamps are placeholders until the store assigns them.
    pub fn draft(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            name,
            description: None,
            poster_url: None,
            screenshot_urls: Vec::new(),
            year: None,
            tags: Vec::new(),
            visible: true,
            trending: false,
            genres: Vec::new(),
            duration: None,
            languages: Vec::new(),
            starcast: Vec::new(),
            kind: None,
            size: None,
            download_links: Vec::new(),
            short_links: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A direct download link attached to a movie
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DownloadLink {
    /// Display label, e.g. "GDrive" (never empty)
    pub label: String,

    /// Target URL, trimmed (never empty)
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Quality tag such as "720p"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,

    /// Number of tracked clicks on this link
    #[serde(default)]
    pub click_count: u64,
}

/// Shortened counterpart of a [`DownloadLink`]
///
/// When the shortening provider could not be reached `url` equals
/// `original_url`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShortLink {
    pub label: String,
    pub url: String,
    pub original_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default)]
    pub click_count: u64,
}

impl ShortLink {
    /// A short link that simply points at the original URL.
    pub fn fallback(link: &DownloadLink) -> Self {
        Self::shortened(link, link.url.clone())
    }

    pub fn shortened(link: &DownloadLink, short_url: String) -> Self {
        Self {
            label: link.label.clone(),
            url: short_url,
            original_url: link.url.clone(),
            size: link.size.clone(),
            click_count: 0,
        }
    }
}

/// Movie as returned by the API
///
/// Serializes every stored field under its `movie_*` name and mirrors the
/// commonly used ones under the names older frontends expect, so both kinds
/// of consumer can read the same payload.
///
/// # Example
/// ```json
/// {
///   "id": "x1Y2z3A4b5C6",
///   "movie_name": "Heat",
///   "movie_show": true,
///   "_id": "x1Y2z3A4b5C6",
///   "title": "Heat",
///   "isActive": true,
///   "downloadLinks": [],
///   "shortLinks": []
/// }
/// ```
#[derive(Serialize, Debug)]
pub struct MovieResponse {
    #[serde(flatten)]
    pub movie: Movie,

    #[serde(rename = "_id")]
    pub legacy_id: String,
    pub title: String,
    #[serde(rename = "posterUrl")]
    pub poster_url: Option<String>,
    pub description: Option<String>,
    pub year: Option<i32>,
    pub tags: Vec<String>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub screenshots: Vec<String>,
    #[serde(rename = "downloadLinks")]
    pub download_links: Vec<DownloadLink>,
    #[serde(rename = "shortLinks")]
    pub short_links: Vec<ShortLink>,
}

impl From<Movie> for MovieResponse {
    fn from(movie: Movie) -> Self {
        Self {
            legacy_id: movie.id.clone(),
            title: movie.name.clone(),
            poster_url: movie.poster_url.clone(),
            description: movie.description.clone(),
            year: movie.year,
            tags: movie.tags.clone(),
            is_active: movie.visible,
            screenshots: movie.screenshot_urls.clone(),
            download_links: movie.download_links.clone(),
            short_links: movie.short_links.clone(),
            movie,
        }
    }
}

/// Home-page layout settings, edited from the admin panel
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HomeConfig {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub show_trending: bool,
    pub show_search: bool,
    pub show_genres: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            hero_title: "Welcome to FilmyCosmo".to_string(),
            hero_subtitle: "Explore the latest movies, discover trending films, and enjoy a \
                            curated selection from around the cosmos."
                .to_string(),
            show_trending: true,
            show_search: true,
            show_genres: true,
            updated_at: None,
        }
    }
}

/// Query parameters for the public movie listing
///
/// # Example
/// Query string: `?trending=true&page=2&limit=20`
#[derive(Deserialize, Debug, Default)]
pub struct ListParams {
    /// Only return movies whose trending flag matches
    pub trending: Option<bool>,

    /// Page number for pagination (starts from 1), only used with `limit`
    pub page: Option<usize>,

    /// Number of items per page, maximum is 100.
    /// When absent the whole listing is returned.
    pub limit: Option<usize>,
}
