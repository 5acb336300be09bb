use std::path::PathBuf;

use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use tokio::fs;

use inspect_utils::{Dataset, InspectResult};

use super::Loader;
use crate::config::params::Params;
use crate::registry::BuildError;

pub(crate) const MODULE: &str = module_path!();

/// Writes a dataset to a CSV file with a header row, replacing the file if
/// it exists. Parent directories are created as needed.
#[derive(Debug)]
pub struct CsvLoader {
    path: PathBuf,
    delimiter: u8,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn from_params(params: &Params) -> Result<Self, BuildError> {
        params.expect_only(&["path", "delimiter"])?;
        Ok(Self::new(params.require_str("path")?).delimiter(params.delimiter("delimiter")?.unwrap_or(b',')))
    }

    fn encode(&self, data: &Dataset) -> InspectResult<Vec<u8>> {
        let mut buf = Vec::new();
        {
            let mut writer = WriterBuilder::new()
                .with_header(true)
                .with_delimiter(self.delimiter)
                .build(&mut buf);
            if data.batches().is_empty() {
                // header only
                writer.write(&RecordBatch::new_empty(data.schema().clone()))?;
            }
            for batch in data.batches() {
                writer.write(batch)?;
            }
        }
        Ok(buf)
    }
}

#[async_trait]
impl Loader for CsvLoader {
    async fn load(&mut self, data: Dataset) -> InspectResult<()> {
        let contents = self.encode(&data)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, contents).await?;
        tracing::debug!(path = %self.path.display(), rows = data.num_rows(), "wrote csv");
        Ok(())
    }
}
