//! Catalog operations
//!
//! Write path for a movie: reconcile fields, then (only when the request
//! carries `download_links`) normalize the links and shorten them, then
//! commit through the store. Changes to an existing record (field updates,
//! click counts) are applied inside one store write transaction against the
//! latest stored version; nothing is visible to other readers until that
//! commit succeeds, and a failed write discards it.

use serde_json::Value;

use crate::database::AppState;
use crate::error::AppError;
use crate::links;
use crate::model::{DownloadLink, HomeConfig, ListParams, Movie, ShortLink};
use crate::reconcile::{self, coerce_flag, coerce_text, Payload, DOWNLOAD_LINKS_KEY};
use crate::store::{MovieFilter, SortOrder};

const MAX_PAGE_SIZE: usize = 100;

impl AppState {
    /// Creates a movie from a raw admin payload
    pub async fn create_movie(&self, payload: &Payload) -> Result<Movie, AppError> {
        let mut movie = reconcile::reconcile(payload).into_new_movie()?;
        (movie.download_links, movie.short_links) =
            self.build_links(payload.get(DOWNLOAD_LINKS_KEY)).await;

        let movie = self.store.create(movie)?;
        tracing::info!(
            id = %movie.id,
            name = %movie.name,
            links = movie.download_links.len(),
            "movie created"
        );
        Ok(movie)
    }

    /// Applies a raw admin payload to an existing movie
    ///
    /// Download and short links are only regenerated when the payload has a
    /// `download_links` key; otherwise both lists, click counts included, are
    /// kept as stored. Shortening happens before the record is read for
    /// writing, so clicks tracked during the provider round-trips survive.
    pub async fn update_movie(&self, id: &str, payload: &Payload) -> Result<Movie, AppError> {
        if self.store.find_by_id(id)?.is_none() {
            return Err(AppError::NotFound("Movie"));
        }

        let patch = reconcile::reconcile(payload);
        patch.check_update()?;

        let links = if payload.contains_key(DOWNLOAD_LINKS_KEY) {
            Some(self.build_links(payload.get(DOWNLOAD_LINKS_KEY)).await)
        } else {
            None
        };

        let (movie, ()) = self
            .store
            .update(id, |movie| -> Result<(), AppError> {
                patch.apply_update(movie)?;
                if let Some((download_links, short_links)) = links {
                    movie.download_links = download_links;
                    movie.short_links = short_links;
                }
                Ok(())
            })?
            .ok_or(AppError::NotFound("Movie"))?;

        tracing::info!(id = %movie.id, "movie updated");
        Ok(movie)
    }

    async fn build_links(&self, raw: Option<&Value>) -> (Vec<DownloadLink>, Vec<ShortLink>) {
        let download_links = links::normalize(raw);
        let short_links = self.shortener.shorten(&download_links).await;
        (download_links, short_links)
    }

    pub fn delete_movie(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete_by_id(id)? {
            return Err(AppError::NotFound("Movie"));
        }
        tracing::info!(id = %id, "movie deleted");
        Ok(())
    }

    /// Fetches a movie for public display; hidden movies count as missing.
    pub fn public_movie(&self, id: &str) -> Result<Movie, AppError> {
        self.store
            .find_by_id(id)?
            .filter(|movie| movie.visible)
            .ok_or(AppError::NotFound("Movie"))
    }

    /// Visible movies, newest first, optionally filtered and paginated
    pub fn public_movies(&self, params: &ListParams) -> Result<Vec<Movie>, AppError> {
        let filter = MovieFilter {
            trending: params.trending,
            ..MovieFilter::public()
        };
        let movies = self.store.find_many(filter, SortOrder::NewestFirst)?;

        Ok(match params.limit {
            Some(limit) => {
                let limit = limit.clamp(1, MAX_PAGE_SIZE);
                let skip = params.page.unwrap_or(1).saturating_sub(1).saturating_mul(limit);
                movies.into_iter().skip(skip).take(limit).collect()
            }
            None => movies,
        })
    }

    /// Every movie, hidden ones included, newest first
    pub fn all_movies(&self) -> Result<Vec<Movie>, AppError> {
        Ok(self.store.find_many(MovieFilter::default(), SortOrder::NewestFirst)?)
    }

    /// Counts one click on the download link at `index`
    ///
    /// `index` is taken as raw text from the URL so that non-numeric values
    /// are reported as a bad index rather than a routing failure.
    pub fn record_click(&self, id: &str, index: &str) -> Result<u64, AppError> {
        let (_, click_count) = self
            .store
            .update(id, |movie| -> Result<u64, AppError> {
                let index: usize = index.trim().parse().map_err(|_| AppError::InvalidLinkIndex)?;
                let link = movie
                    .download_links
                    .get_mut(index)
                    .ok_or(AppError::InvalidLinkIndex)?;

                link.click_count += 1;
                Ok(link.click_count)
            })?
            .ok_or(AppError::NotFound("Movie"))?;

        tracing::debug!(id = %id, index, click_count, "download click tracked");
        Ok(click_count)
    }

    pub fn home_config(&self) -> Result<HomeConfig, AppError> {
        Ok(self.store.load_home_config()?)
    }

    /// Applies a partial home-page layout update
    ///
    /// Text fields take any string, blank included, trimmed; toggles use the
    /// same `true`/`"true"` coercion as movie flags. Unknown or unusable values
    /// are ignored.
    pub fn update_home_config(&self, payload: &Payload) -> Result<HomeConfig, AppError> {
        let mut config = self.store.load_home_config()?;

        if let Some(title) = payload.get("heroTitle").and_then(layout_text) {
            config.hero_title = title;
        }
        if let Some(subtitle) = payload.get("heroSubtitle").and_then(layout_text) {
            config.hero_subtitle = subtitle;
        }

        let toggles = [
            ("showTrending", &mut config.show_trending),
            ("showSearch", &mut config.show_search),
            ("showGenres", &mut config.show_genres),
        ];
        for (key, slot) in toggles {
            if let Some(value) = payload.get(key).and_then(coerce_flag) {
                *slot = value;
            }
        }

        config.updated_at = Some(chrono::Utc::now());
        self.store.save_home_config(&config)?;
        tracing::info!("home layout updated");
        Ok(config)
    }
}

/// Home-page text: any string or number, where blank is a legitimate value
fn layout_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        other => coerce_text(other),
    }
}
