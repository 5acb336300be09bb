use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, Int32Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use async_trait::async_trait;

use inspect_utils::{Dataset, InspectResult};

use super::{upsert_columns, upsert_fields, Transformer};
use crate::config::params::Params;
use crate::registry::BuildError;

pub(crate) const MODULE: &str = module_path!();

/// Ordinal grade for an inspection score: 0 for A, 1 for B, 2 for C.
pub fn grade(score: f64) -> Option<i32> {
    match score {
        s if s > -1.0 && s <= 13.0 => Some(0),
        s if s > 13.0 && s <= 27.0 => Some(1),
        s if s > 27.0 => Some(2),
        _ => None,
    }
}

/// Turn inspection scores into ordinal grades.
#[derive(Debug)]
pub struct GradeScores {
    column: String,
    target: String,
    keep_source: bool,
}

impl Default for GradeScores {
    fn default() -> Self {
        Self {
            column: "score".to_string(),
            target: "grade".to_string(),
            keep_source: false,
        }
    }
}

impl GradeScores {
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn keep_source(mut self, keep: bool) -> Self {
        self.keep_source = keep;
        self
    }

    pub fn from_params(params: &Params) -> Result<Self, BuildError> {
        params.expect_only(&["column", "target", "keep_source"])?;
        let mut grader = Self::default();
        if let Some(column) = params.str("column")? {
            grader = grader.column(column);
        }
        if let Some(target) = params.str("target")? {
            grader = grader.target(target);
        }
        if let Some(keep) = params.bool("keep_source")? {
            grader = grader.keep_source(keep);
        }
        Ok(grader)
    }

    fn drops_source(&self) -> bool {
        !self.keep_source && self.column != self.target
    }
}

#[async_trait]
impl Transformer for GradeScores {
    async fn transform(&mut self, data: Dataset) -> InspectResult<Dataset> {
        data.field(&self.column)?;

        let mut schema = upsert_fields(data.schema(), vec![Field::new(&self.target, DataType::Int32, true)]);
        if self.drops_source() {
            let fields: Vec<Field> = schema
                .fields()
                .iter()
                .filter(|f| f.name() != &self.column)
                .map(|f| f.as_ref().clone())
                .collect();
            schema = Arc::new(Schema::new(fields));
        }

        data.try_map(schema.clone(), |batch| {
            let scores = cast(batch.column(batch.schema().index_of(&self.column)?), &DataType::Float64)?;
            let grades: Int32Array = scores
                .as_primitive::<Float64Type>()
                .iter()
                .map(|s| s.and_then(grade))
                .collect();
            upsert_columns(&schema, batch, vec![(self.target.as_str(), Arc::new(grades) as ArrayRef)])
        })
    }
}
