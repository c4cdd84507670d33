//! Database initialization and table definitions
//!
//! This module handles the setup of the embedded redb database and defines
//! the application state shared by every request handler.

use std::sync::Arc;

use redb::{Database, TableDefinition};

use crate::config::Config;
use crate::shortener::LinkShortener;
use crate::store::MovieStore;

/// Main table for movie records
///
/// Key: movie id
/// Value: JSON-serialized [`crate::model::Movie`]
///
/// Example:
/// - Key: "x1Y2z3A4b5C6"
/// - Value: '{"id":"x1Y2z3A4b5C6","movie_name":"Heat",...}'
pub const TABLE_MOVIES: TableDefinition<&str, &str> = TableDefinition::new("movies_v1");

/// Singleton settings records, keyed by name
///
/// Currently holds the home-page layout under [`HOME_CONFIG_KEY`].
pub const TABLE_SETTINGS: TableDefinition<&str, &str> = TableDefinition::new("settings_v1");

pub const HOME_CONFIG_KEY: &str = "home_config";

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub store: MovieStore,
    pub shortener: Arc<LinkShortener>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            store: MovieStore::new(Arc::new(db)),
            shortener: Arc::new(LinkShortener::new(&config.shortener)),
            config: Arc::new(config),
        }
    }
}

/// Initializes the embedded database and creates required tables
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored (e.g., "data.db")
///
/// # Example
///
/// ```no_run
/// # use movie_catalog::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    // Tables must exist before the first read transaction opens them
    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_MOVIES)?;
        write_txn.open_table(TABLE_SETTINGS)?;
    }
    write_txn.commit()?;

    Ok(db)
}
