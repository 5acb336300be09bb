pub mod error;

use arrow::array::{new_null_array, ArrayRef};
use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use error::Error;
use std::sync::Arc;

pub type InspectResult<T> = Result<T, Error>;

/// An in-memory table with named columns and ordered rows.
///
/// This is the value handed from extractors to transformers and from
/// transformers to loaders. Cloning shares the underlying batches.
#[derive(Clone, Debug)]
pub struct Dataset {
    schema: SchemaRef,
    batches: Arc<Vec<RecordBatch>>,
}

impl Dataset {
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Dataset {
            schema,
            batches: Arc::new(batches),
        }
    }

    pub fn from_batch(batch: RecordBatch) -> Self {
        Self::new(batch.schema(), vec![batch])
    }

    pub fn empty(schema: SchemaRef) -> Self {
        Self::new(schema, Vec::new())
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.fields().iter().map(|f| f.name().as_str()).collect()
    }

    /// Look up a column definition, failing with `MissingColumn` if absent.
    pub fn field(&self, name: &str) -> InspectResult<&Field> {
        self.schema
            .field_with_name(name)
            .map_err(|_| Error::MissingColumn(name.to_string()))
    }

    /// Rebuild every batch with `f`, producing a dataset with `schema`.
    pub fn try_map<F>(&self, schema: SchemaRef, mut f: F) -> InspectResult<Dataset>
    where
        F: FnMut(&RecordBatch) -> InspectResult<RecordBatch>,
    {
        let batches = self
            .batches
            .iter()
            .map(&mut f)
            .collect::<InspectResult<Vec<_>>>()?;
        Ok(Dataset::new(schema, batches))
    }

    /// Union several datasets into one, keeping rows in source order.
    ///
    /// Columns are matched by name. The merged schema lists columns in the
    /// order they are first seen; a column missing from a source is filled
    /// with nulls for that source's rows.
    pub fn concat(datasets: impl IntoIterator<Item = Dataset>) -> InspectResult<Dataset> {
        let datasets: Vec<Dataset> = datasets.into_iter().collect();

        let mut fields: Vec<Field> = Vec::new();
        for data in &datasets {
            for field in data.schema.fields() {
                match fields.iter_mut().find(|f| f.name() == field.name()) {
                    Some(existing) if existing.data_type() != field.data_type() => {
                        return Err(Error::SchemaMismatch {
                            column: field.name().clone(),
                            left: existing.data_type().clone(),
                            right: field.data_type().clone(),
                        });
                    }
                    Some(existing) => {
                        if field.is_nullable() {
                            *existing = existing.clone().with_nullable(true);
                        }
                    }
                    None => fields.push(field.as_ref().clone()),
                }
            }
        }

        for field in fields.iter_mut() {
            let partial = datasets
                .iter()
                .any(|d| d.schema.field_with_name(field.name()).is_err());
            if partial {
                *field = field.clone().with_nullable(true);
            }
        }

        let schema = Arc::new(Schema::new(fields));
        let mut batches = Vec::new();
        for data in &datasets {
            for batch in data.batches.iter() {
                let columns: Vec<ArrayRef> = schema
                    .fields()
                    .iter()
                    .map(|field| match batch.column_by_name(field.name()) {
                        Some(column) => column.clone(),
                        None => new_null_array(field.data_type(), batch.num_rows()),
                    })
                    .collect();
                let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
                batches.push(RecordBatch::try_new_with_options(
                    schema.clone(),
                    columns,
                    &options,
                )?);
            }
        }

        Ok(Dataset::new(schema, batches))
    }
}
