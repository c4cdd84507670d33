//! Movie record store backed by redb
//!
//! Records are stored as JSON strings keyed by id. Each mutating method runs
//! in its own write transaction, so a failed commit leaves the previous
//! version of the record untouched.

use std::sync::Arc;

use chrono::Utc;
use rand::{distr::Alphanumeric, Rng};
use redb::{Database, ReadableDatabase, ReadableTable};

use crate::database::{HOME_CONFIG_KEY, TABLE_MOVIES, TABLE_SETTINGS};
use crate::error::StoreError;
use crate::model::{HomeConfig, Movie};

const ID_LEN: usize = 12;

/// Which movies [`MovieStore::find_many`] returns
#[derive(Debug, Clone, Copy, Default)]
pub struct MovieFilter {
    /// Skip records hidden from the public listing
    pub visible_only: bool,
    /// Only records whose trending flag matches
    pub trending: Option<bool>,
}

impl MovieFilter {
    pub fn public() -> Self {
        Self {
            visible_only: true,
            trending: None,
        }
    }

    fn matches(&self, movie: &Movie) -> bool {
        (!self.visible_only || movie.visible)
            && self.trending.is_none_or(|trending| movie.trending == trending)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Persistence for movies and the home-page layout
#[derive(Clone)]
pub struct MovieStore {
    db: Arc<Database>,
}

impl MovieStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<Movie>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_MOVIES)?;

        let movie = match table.get(id)? {
            Some(value) => Some(serde_json::from_str(value.value())?),
            None => None,
        };
        Ok(movie)
    }

    /// Inserts a new record under a freshly generated id
    ///
    /// The id and both timestamps of `movie` are overwritten.
    pub fn create(&self, mut movie: Movie) -> Result<Movie, StoreError> {
        let now = Utc::now();
        movie.created_at = now;
        movie.updated_at = now;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_MOVIES)?;

            movie.id = loop {
                let candidate = random_id();
                if table.get(candidate.as_str())?.is_none() {
                    break candidate;
                }
            };

            let record_json = serde_json::to_string(&movie)?;
            table.insert(movie.id.as_str(), record_json.as_str())?;
        }
        write_txn.commit()?;

        Ok(movie)
    }

    /// Reads, modifies and writes back one record in a single write transaction
    ///
    /// redb runs one write transaction at a time, so concurrent updates of the
    /// same record are applied one after another and none is lost. Returns
    /// `Ok(None)` when no record has this id. An error from `modify` aborts
    /// the transaction and leaves the stored record untouched. `updated_at`
    /// is stamped on success.
    pub fn update<T, E>(
        &self,
        id: &str,
        modify: impl FnOnce(&mut Movie) -> Result<T, E>,
    ) -> Result<Option<(Movie, T)>, E>
    where
        E: From<StoreError>,
    {
        let write_txn = self.db.begin_write().map_err(StoreError::from)?;
        let updated = {
            let mut table = write_txn.open_table(TABLE_MOVIES).map_err(StoreError::from)?;

            let stored: Option<Movie> = match table.get(id).map_err(StoreError::from)? {
                Some(value) => Some(serde_json::from_str(value.value()).map_err(StoreError::from)?),
                None => None,
            };
            let Some(mut movie) = stored else {
                return Ok(None);
            };

            let outcome = modify(&mut movie)?;
            movie.updated_at = Utc::now();

            let record_json = serde_json::to_string(&movie).map_err(StoreError::from)?;
            table
                .insert(id, record_json.as_str())
                .map_err(StoreError::from)?;
            (movie, outcome)
        };
        write_txn.commit().map_err(StoreError::from)?;

        Ok(Some(updated))
    }

    /// Removes a record, returning whether it existed
    pub fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(TABLE_MOVIES)?;
            let removed = table.remove(id)?;
            removed.is_some()
        };
        write_txn.commit()?;

        Ok(existed)
    }

    /// Lists records matching `filter`, ordered by creation time
    ///
    /// Records that fail to decode are skipped with a warning rather than
    /// failing the whole listing.
    pub fn find_many(&self, filter: MovieFilter, sort: SortOrder) -> Result<Vec<Movie>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_MOVIES)?;

        let mut movies = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            match serde_json::from_str::<Movie>(value.value()) {
                Ok(movie) if filter.matches(&movie) => movies.push(movie),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(id = key.value(), error = %err, "skipping undecodable movie record")
                }
            }
        }

        match sort {
            SortOrder::NewestFirst => movies.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::OldestFirst => movies.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }

        Ok(movies)
    }

    /// Loads the home-page layout, or the defaults if none was saved yet
    pub fn load_home_config(&self) -> Result<HomeConfig, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_SETTINGS)?;

        let config = match table.get(HOME_CONFIG_KEY)? {
            Some(value) => serde_json::from_str(value.value())?,
            None => HomeConfig::default(),
        };
        Ok(config)
    }

    pub fn save_home_config(&self, config: &HomeConfig) -> Result<(), StoreError> {
        let record_json = serde_json::to_string(config)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_SETTINGS)?;
            table.insert(HOME_CONFIG_KEY, record_json.as_str())?;
        }
        write_txn.commit()?;

        Ok(())
    }
}

fn random_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::init_db;
    use tempfile::NamedTempFile;

    fn setup_store() -> (MovieStore, NamedTempFile) {
        let temp_db = NamedTempFile::new().unwrap();
        let db = init_db(temp_db.path().to_str().unwrap()).unwrap();
        (MovieStore::new(Arc::new(db)), temp_db)
    }

    #[test]
    fn create_assigns_id_and_finds_it_again() {
        let (store, _temp_db) = setup_store();

        let created = store.create(Movie::draft("Heat".into())).unwrap();
        assert_eq!(created.id.len(), ID_LEN);

        let found = store.find_by_id(&created.id).unwrap().unwrap();
        assert_eq!(found, created);
        assert!(store.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn delete_reports_whether_record_existed() {
        let (store, _temp_db) = setup_store();
        let created = store.create(Movie::draft("Heat".into())).unwrap();

        assert!(store.delete_by_id(&created.id).unwrap());
        assert!(!store.delete_by_id(&created.id).unwrap());
        assert!(store.find_by_id(&created.id).unwrap().is_none());
    }

    #[test]
    fn update_commits_only_when_modify_succeeds() {
        let (store, _temp_db) = setup_store();
        let created = store.create(Movie::draft("Heat".into())).unwrap();

        let (updated, previous) = store
            .update(&created.id, |movie| {
                let previous = std::mem::replace(&mut movie.name, "Ronin".into());
                Ok::<_, StoreError>(previous)
            })
            .unwrap()
            .unwrap();
        assert_eq!(previous, "Heat");
        assert_eq!(updated.name, "Ronin");
        assert!(updated.updated_at >= created.updated_at);

        let failed = store.update(&created.id, |movie| {
            movie.name = "Thief".into();
            Err::<(), _>(StoreError::Encoding(serde_json::Error::io(std::io::Error::other("rejected"))))
        });
        assert!(failed.is_err());
        assert_eq!(store.find_by_id(&created.id).unwrap().unwrap().name, "Ronin");

        let missing = store.update("missing", |_| Ok::<_, StoreError>(())).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let (store, _temp_db) = setup_store();
        let created = store.create(Movie::draft("Heat".into())).unwrap();

        let threads = 8;
        let per_thread = 25;
        std::thread::scope(|scope| {
            for _ in 0..threads {
                scope.spawn(|| {
                    for _ in 0..per_thread {
                        store
                            .update(&created.id, |movie| {
                                movie.year = Some(movie.year.unwrap_or(0) + 1);
                                Ok::<_, StoreError>(())
                            })
                            .unwrap();
                    }
                });
            }
        });

        let stored = store.find_by_id(&created.id).unwrap().unwrap();
        assert_eq!(stored.year, Some(threads * per_thread));
    }

    #[test]
    fn find_many_filters_and_sorts() {
        let (store, _temp_db) = setup_store();

        let first = store.create(Movie::draft("First".into())).unwrap();
        let mut hidden = Movie::draft("Hidden".into());
        hidden.visible = false;
        store.create(hidden).unwrap();
        let mut trending = Movie::draft("Trending".into());
        trending.trending = true;
        let trending = store.create(trending).unwrap();

        let public = store.find_many(MovieFilter::public(), SortOrder::NewestFirst).unwrap();
        let names: Vec<&str> = public.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Trending", "First"]);

        let all = store.find_many(MovieFilter::default(), SortOrder::OldestFirst).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, first.id);

        let hot = store
            .find_many(
                MovieFilter { visible_only: true, trending: Some(true) },
                SortOrder::NewestFirst,
            )
            .unwrap();
        assert_eq!(hot.len(), 1);
        assert_eq!(hot[0].id, trending.id);
    }

    #[test]
    fn home_config_defaults_until_saved() {
        let (store, _temp_db) = setup_store();
        assert_eq!(store.load_home_config().unwrap(), HomeConfig::default());

        let config = HomeConfig {
            show_search: false,
            ..HomeConfig::default()
        };
        store.save_home_config(&config).unwrap();
        assert_eq!(store.load_home_config().unwrap(), config);
    }
}
