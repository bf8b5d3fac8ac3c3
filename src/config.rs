use std::path::PathBuf;

use crate::errors::StoreError;

pub const DEFAULT_DATABASE_PATH: &str = "database.sqlite3";
pub const DEFAULT_TABLE_NAME: &str = "face_data";
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_JSON_LIMIT: usize = 64 * 1024 * 1024;

/// Where records live: the SQLite file and the table inside it.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    pub table_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn new(database_path: impl Into<PathBuf>, table_name: impl Into<String>) -> Self {
        StoreConfig {
            database_path: database_path.into(),
            table_name: table_name.into(),
        }
    }

    /// The table name is spliced into SQL text, so only plain identifiers pass.
    pub fn validate(&self) -> Result<(), StoreError> {
        let name = &self.table_name;
        let first_ok = name
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
        if !first_ok || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StoreError::Validation(format!(
                "invalid table name {:?}",
                name
            )));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(StoreError::Validation("empty database path".to_string()));
        }
        Ok(())
    }

    pub fn database_url(&self) -> String {
        self.database_path.to_string_lossy().into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub store: StoreConfig,
    pub json_limit: usize,
}
