use std::path::PathBuf;

use async_trait::async_trait;

use inspect_utils::{Dataset, InspectResult};

use super::Loader;
use crate::config::params::{ParamError, Params};
use crate::registry::BuildError;
use crate::store::{Database, OnConflict};

pub(crate) const MODULE: &str = module_path!();

/// Appends a dataset to a SQLite table, creating the table from the dataset's
/// schema the first time.
///
/// With `unique` set, the table gets a UNIQUE key over those columns and
/// `on_conflict` decides what happens to incoming duplicates. Rows are
/// written in one transaction, so a failed load leaves the table untouched.
#[derive(Debug)]
pub struct SqliteLoader {
    path: PathBuf,
    table: String,
    unique: Vec<String>,
    on_conflict: OnConflict,
}

impl SqliteLoader {
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            table: table.into(),
            unique: Vec::new(),
            on_conflict: OnConflict::default(),
        }
    }

    pub fn unique(mut self, columns: Vec<String>) -> Self {
        self.unique = columns;
        self
    }

    pub fn on_conflict(mut self, on_conflict: OnConflict) -> Self {
        self.on_conflict = on_conflict;
        self
    }

    pub fn from_params(params: &Params) -> Result<Self, BuildError> {
        params.expect_only(&["path", "table", "unique", "on_conflict"])?;
        let on_conflict = match params.str("on_conflict")? {
            Some(s) => s.parse::<OnConflict>().map_err(|reason| ParamError::Invalid {
                name: "on_conflict".into(),
                reason,
            })?,
            None => OnConflict::default(),
        };
        Ok(Self::new(params.require_str("path")?, params.require_str("table")?)
            .unique(params.list("unique")?)
            .on_conflict(on_conflict))
    }
}

#[async_trait]
impl Loader for SqliteLoader {
    async fn load(&mut self, data: Dataset) -> InspectResult<()> {
        // An extraction that found nothing has no columns to build a table from.
        if data.schema().fields().is_empty() {
            tracing::debug!(table = %self.table, "no columns to load, skipping");
            return Ok(());
        }

        let mut db = Database::open(&self.path)?;
        db.create_table(&self.table, data.schema(), &self.unique)?;
        let written = db.insert(&self.table, &data, self.on_conflict)?;
        tracing::debug!(
            table = %self.table,
            rows = data.num_rows(),
            written,
            "loaded sqlite table"
        );
        Ok(())
    }
}
