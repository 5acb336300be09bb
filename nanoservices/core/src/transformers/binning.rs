use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field};
use async_trait::async_trait;

use inspect_utils::{Dataset, InspectResult};

use super::{upsert_columns, upsert_fields, Transformer};
use crate::config::params::{ParamError, Params};
use crate::registry::BuildError;

pub(crate) const MODULE: &str = module_path!();

pub const OTHER: &str = "other";

/// Collapse rare categories: any value seen fewer than `min_count` times
/// across the whole dataset becomes `other`.
#[derive(Debug)]
pub struct BinCategories {
    column: String,
    min_count: usize,
}

impl BinCategories {
    pub fn new(column: impl Into<String>, min_count: usize) -> Self {
        Self {
            column: column.into(),
            min_count,
        }
    }

    pub fn from_params(params: &Params) -> Result<Self, BuildError> {
        params.expect_only(&["column", "min_count"])?;
        let min_count = params
            .int("min_count")?
            .ok_or_else(|| ParamError::Missing("min_count".into()))?;
        let min_count = usize::try_from(min_count).map_err(|_| ParamError::Invalid {
            name: "min_count".into(),
            reason: format!("must not be negative, got {min_count}"),
        })?;
        Ok(Self::new(params.require_str("column")?, min_count))
    }
}

#[async_trait]
impl Transformer for BinCategories {
    async fn transform(&mut self, data: Dataset) -> InspectResult<Dataset> {
        data.field(&self.column)?;

        let mut texts = Vec::with_capacity(data.batches().len());
        let mut counts: HashMap<String, usize> = HashMap::new();
        for batch in data.batches() {
            let text = cast(batch.column(batch.schema().index_of(&self.column)?), &DataType::Utf8)?;
            for value in text.as_string::<i32>().iter().flatten() {
                *counts.entry(value.to_string()).or_default() += 1;
            }
            texts.push(text);
        }
        let rare = counts.values().filter(|&&n| n < self.min_count).count();
        tracing::debug!(column = %self.column, rare, "binning rare categories");

        let schema = upsert_fields(data.schema(), vec![Field::new(&self.column, DataType::Utf8, true)]);
        let column = self.column.as_str();
        let min_count = self.min_count;
        let mut texts = texts.into_iter();

        data.try_map(schema.clone(), |batch| {
            let text = texts
                .next()
                .ok_or_else(|| inspect_utils::error::Error::component("batch count changed while binning"))?;
            let binned: StringArray = text
                .as_string::<i32>()
                .iter()
                .map(|v| v.map(|s| if counts[s] < min_count { OTHER } else { s }))
                .collect();
            upsert_columns(&schema, batch, vec![(column, Arc::new(binned) as ArrayRef)])
        })
    }
}
