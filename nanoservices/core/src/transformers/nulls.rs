use async_trait::async_trait;
use arrow::array::{Array, BooleanArray};
use arrow::compute;
use arrow::record_batch::RecordBatch;

use inspect_utils::{Dataset, InspectResult};

use super::Transformer;
use crate::config::params::Params;
use crate::registry::BuildError;

pub(crate) const MODULE: &str = module_path!();

/// Drop rows containing null values, in any column or only in `columns`.
/// Uses Arrow compute kernels directly.
#[derive(Debug, Default)]
pub struct DropNulls {
    columns: Vec<String>,
}

impl DropNulls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    pub fn from_params(params: &Params) -> Result<Self, BuildError> {
        params.expect_only(&["columns"])?;
        Ok(Self::new().columns(params.list("columns")?))
    }

    fn filter(&self, batch: &RecordBatch) -> InspectResult<RecordBatch> {
        // Build a boolean mask: true where every checked column is non-null
        let num_rows = batch.num_rows();
        let mut mask = vec![true; num_rows];

        let checked: Vec<&dyn Array> = if self.columns.is_empty() {
            batch.columns().iter().map(|c| c.as_ref()).collect()
        } else {
            self.columns
                .iter()
                .map(|name| {
                    batch
                        .column_by_name(name)
                        .map(|c| c.as_ref())
                        .ok_or_else(|| inspect_utils::error::Error::MissingColumn(name.clone()))
                })
                .collect::<InspectResult<_>>()?
        };

        for col in checked {
            if let Some(nulls) = col.logical_nulls() {
                for (i, keep) in mask.iter_mut().enumerate() {
                    if nulls.is_null(i) {
                        *keep = false;
                    }
                }
            }
        }

        let predicate = BooleanArray::from(mask);
        Ok(compute::filter_record_batch(batch, &predicate)?)
    }
}

#[async_trait]
impl Transformer for DropNulls {
    async fn transform(&mut self, data: Dataset) -> InspectResult<Dataset> {
        let before = data.num_rows();
        let out = data.try_map(data.schema().clone(), |batch| self.filter(batch))?;
        tracing::debug!(dropped = before - out.num_rows(), "dropped rows with nulls");
        Ok(out)
    }
}
