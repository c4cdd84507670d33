//! Field reconciliation for movie write requests
//!
//! Clients have sent movie fields under several names over time
//! (`movie_name` vs `title`, `movie_show` vs `isActive`, ...) and with loose
//! types (comma-separated strings instead of arrays, `"true"` instead of
//! `true`). [`reconcile`] resolves all of that once, against [`FIELD_TABLE`],
//! into a [`MoviePatch`] holding canonical values only.

use serde_json::{Map, Value};

use crate::error::AppError;
use crate::model::Movie;

/// Raw JSON object submitted by a client
pub type Payload = Map<String, Value>;

/// Key under which clients submit download links
pub const DOWNLOAD_LINKS_KEY: &str = "download_links";

/// Accepted keys for the movie name, canonical first
const NAME_ALIASES: &[&str] = &["movie_name", "title"];

/// Coerces one submitted value into its patch slot; `false` if unusable
type Resolve = fn(&mut MoviePatch, &Value) -> bool;

struct FieldRule {
    /// Accepted keys, canonical first
    aliases: &'static [&'static str],
    resolve: Resolve,
}

const FIELD_TABLE: &[FieldRule] = &[
    FieldRule { aliases: NAME_ALIASES, resolve: |p, v| fill(&mut p.name, coerce_text(v)) },
    FieldRule { aliases: &["movie_description", "description"], resolve: |p, v| fill(&mut p.description, coerce_clearable_text(v)) },
    FieldRule { aliases: &["movie_poster", "posterUrl"], resolve: |p, v| fill(&mut p.poster_url, coerce_text(v)) },
    FieldRule { aliases: &["movie_screenshots", "screenshots"], resolve: |p, v| fill(&mut p.screenshot_urls, coerce_screenshots(v)) },
    FieldRule { aliases: &["movie_year", "year"], resolve: |p, v| fill(&mut p.year, coerce_integer(v)) },
    FieldRule { aliases: &["movie_tags", "tags"], resolve: |p, v| fill(&mut p.tags, coerce_list(v)) },
    FieldRule { aliases: &["movie_show", "isActive"], resolve: |p, v| fill(&mut p.visible, coerce_flag(v)) },
    FieldRule { aliases: &["trending"], resolve: |p, v| fill(&mut p.trending, coerce_flag(v)) },
    FieldRule { aliases: &["movie_genre", "genre"], resolve: |p, v| fill(&mut p.genres, coerce_list(v)) },
    FieldRule { aliases: &["movie_duration"], resolve: |p, v| fill(&mut p.duration, coerce_text(v)) },
    FieldRule { aliases: &["movie_language", "language"], resolve: |p, v| fill(&mut p.languages, coerce_list(v)) },
    FieldRule { aliases: &["movie_starcast", "starcast"], resolve: |p, v| fill(&mut p.starcast, coerce_list(v)) },
    FieldRule { aliases: &["movie_type", "type"], resolve: |p, v| fill(&mut p.kind, coerce_text(v)) },
    FieldRule { aliases: &["movie_size", "size"], resolve: |p, v| fill(&mut p.size, coerce_text(v)) },
];

fn fill<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    let filled = value.is_some();
    if filled {
        *slot = value;
    }
    filled
}

/// Canonical fields explicitly supplied by one write request
///
/// `None` means "not supplied": the field keeps its stored value on update
/// or its default on create.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MoviePatch {
    pub name: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub poster_url: Option<String>,
    pub screenshot_urls: Option<Vec<String>>,
    pub year: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub visible: Option<bool>,
    pub trending: Option<bool>,
    pub genres: Option<Vec<String>>,
    pub duration: Option<String>,
    pub languages: Option<Vec<String>>,
    pub starcast: Option<Vec<String>>,
    pub kind: Option<String>,
    pub size: Option<String>,

    /// Some name alias was present, even if it resolved to nothing usable
    name_supplied: bool,
}

/// Resolves a raw request body into canonical movie fields
pub fn reconcile(payload: &Payload) -> MoviePatch {
    let mut patch = MoviePatch {
        name_supplied: NAME_ALIASES
            .iter()
            .any(|alias| payload.get(*alias).is_some_and(|v| !v.is_null())),
        ..MoviePatch::default()
    };

    for rule in FIELD_TABLE {
        for value in rule.aliases.iter().filter_map(|alias| payload.get(*alias)) {
            if (rule.resolve)(&mut patch, value) {
                break;
            }
        }
    }

    patch
}

impl MoviePatch {
    /// Builds a new, unsaved movie from the patch and the create defaults.
    pub fn into_new_movie(self) -> Result<Movie, AppError> {
        let name = self
            .name
            .clone()
            .ok_or_else(|| AppError::validation("Movie name is required"))?;

        let mut movie = Movie::draft(name);
        self.apply(&mut movie);
        Ok(movie)
    }

    /// Applies the patch onto a stored movie.
    ///
    /// Rejects requests that send a name alias which resolves to nothing,
    /// since that would clear a required field.
    pub fn apply_update(self, movie: &mut Movie) -> Result<(), AppError> {
        self.check_update()?;
        self.apply(movie);
        Ok(())
    }

    /// The update-time validation of [`MoviePatch::apply_update`], without
    /// touching any record
    pub fn check_update(&self) -> Result<(), AppError> {
        if self.name_supplied && self.name.is_none() {
            return Err(AppError::validation("Movie name cannot be empty"));
        }
        Ok(())
    }

    fn apply(self, movie: &mut Movie) {
        if let Some(v) = self.name {
            movie.name = v;
        }
        if let Some(v) = self.description {
            movie.description = v;
        }
        if let Some(v) = self.poster_url {
            movie.poster_url = Some(v);
        }
        if let Some(v) = self.screenshot_urls {
            movie.screenshot_urls = v;
        }
        if let Some(v) = self.year {
            movie.year = Some(v);
        }
        if let Some(v) = self.tags {
            movie.tags = v;
        }
        if let Some(v) = self.visible {
            movie.visible = v;
        }
        if let Some(v) = self.trending {
            movie.trending = v;
        }
        if let Some(v) = self.genres {
            movie.genres = v;
        }
        if let Some(v) = self.duration {
            movie.duration = Some(v);
        }
        if let Some(v) = self.languages {
            movie.languages = v;
        }
        if let Some(v) = self.starcast {
            movie.starcast = v;
        }
        if let Some(v) = self.kind {
            movie.kind = Some(v);
        }
        if let Some(v) = self.size {
            movie.size = Some(v);
        }
    }
}

/// Trimmed string where blank means "clear"
fn coerce_clearable_text(value: &Value) -> Option<Option<String>> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            Some((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        _ => None,
    }
}

/// Trimmed, non-empty string. Numbers are accepted and rendered as text.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `true`/`false`, either native or as the literal strings.
pub fn coerce_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

fn coerce_integer(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(split_list(s)),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect(),
        ),
        _ => None,
    }
}

/// Like [`coerce_list`], except that a blank string keeps the stored
/// screenshots instead of clearing them
fn coerce_screenshots(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) if s.trim().is_empty() => None,
        other => coerce_list(other),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
