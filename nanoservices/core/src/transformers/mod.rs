pub mod actions;
pub mod binning;
pub mod dates;
pub mod grades;
pub mod nulls;
pub mod passthrough;
pub mod traits;

pub use traits::Transformer;

use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use inspect_utils::error::Error;
use inspect_utils::InspectResult;

use crate::registry::Registry;

/// Register the built-in transformers under their module paths.
pub fn register(registry: &mut Registry) {
    registry.register_transformer(passthrough::MODULE, "Passthrough", passthrough::Passthrough::from_params);
    registry.register_transformer(nulls::MODULE, "DropNulls", nulls::DropNulls::from_params);
    registry.register_transformer(actions::MODULE, "MapActions", actions::MapActions::from_params);
    registry.register_transformer(binning::MODULE, "BinCategories", binning::BinCategories::from_params);
    registry.register_transformer(dates::MODULE, "CycleDates", dates::CycleDates::from_params);
    registry.register_transformer(grades::MODULE, "GradeScores", grades::GradeScores::from_params);
}

/// `schema` with each of `fields` replacing the column of the same name, or
/// appended when there is none.
pub(crate) fn upsert_fields(schema: &Schema, fields: Vec<Field>) -> SchemaRef {
    let mut out: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    for field in fields {
        match out.iter_mut().find(|f| f.name() == field.name()) {
            Some(existing) => *existing = field,
            None => out.push(field),
        }
    }
    Arc::new(Schema::new(out))
}

/// Assemble a batch for `schema`, taking `columns` where given and the rest
/// from `batch`.
pub(crate) fn upsert_columns(
    schema: &SchemaRef,
    batch: &RecordBatch,
    columns: Vec<(&str, ArrayRef)>,
) -> InspectResult<RecordBatch> {
    let arrays = schema
        .fields()
        .iter()
        .map(|field| {
            columns
                .iter()
                .find(|(name, _)| *name == field.name().as_str())
                .map(|(_, array)| array.clone())
                .or_else(|| batch.column_by_name(field.name()).cloned())
                .ok_or_else(|| Error::MissingColumn(field.name().clone()))
        })
        .collect::<InspectResult<Vec<_>>>()?;
    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    Ok(RecordBatch::try_new_with_options(schema.clone(), arrays, &options)?)
}
