use std::path::PathBuf;

use async_trait::async_trait;

use inspect_utils::{Dataset, InspectResult};

use super::Extractor;
use crate::config::params::{ParamError, Params};
use crate::registry::BuildError;
use crate::store::db::{quote, Database};

pub(crate) const MODULE: &str = module_path!();

/// Reads a whole table, or the result of a query, from a SQLite database.
#[derive(Debug)]
pub struct SqliteExtractor {
    path: PathBuf,
    sql: String,
}

impl SqliteExtractor {
    pub fn table(path: impl Into<PathBuf>, table: &str) -> Self {
        Self {
            path: path.into(),
            sql: format!("SELECT * FROM {}", quote(table)),
        }
    }

    pub fn query(path: impl Into<PathBuf>, sql: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sql: sql.into(),
        }
    }

    pub fn from_params(params: &Params) -> Result<Self, BuildError> {
        params.expect_only(&["path", "table", "query"])?;
        let path = params.require_str("path")?;
        match (params.str("table")?, params.str("query")?) {
            (Some(table), None) => Ok(Self::table(path, table)),
            (None, Some(sql)) => Ok(Self::query(path, sql)),
            _ => Err(ParamError::Invalid {
                name: "table".into(),
                reason: "exactly one of 'table' or 'query' is required".into(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl Extractor for SqliteExtractor {
    async fn extract(&mut self) -> InspectResult<Dataset> {
        let mut db = Database::open(&self.path)?;
        let data = db.query(&self.sql)?;
        tracing::debug!(path = %self.path.display(), rows = data.num_rows(), "read sqlite");
        Ok(data)
    }
}
