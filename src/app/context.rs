use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{KindlingError, Result};
use crate::client::HnClient;
use crate::store::sqlite::SqliteStore;

/// Wires the shared components together: one bookmark store opened at
/// process start, one content client with its user-lookup cache.
pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub client: Arc<HnClient>,
}

impl AppContext {
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        Ok(Self {
            store: Arc::new(SqliteStore::new(&db_path)?),
            client: Arc::new(HnClient::new()),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            store: Arc::new(SqliteStore::in_memory()?),
            client: Arc::new(HnClient::new()),
        })
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| KindlingError::Config("Could not find data directory".into()))?;
        let kindling_dir = data_dir.join("kindling");
        std::fs::create_dir_all(&kindling_dir)?;
        Ok(kindling_dir.join("kindling.db"))
    }
}
