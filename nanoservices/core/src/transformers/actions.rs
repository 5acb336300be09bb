use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field};
use async_trait::async_trait;

use inspect_utils::{Dataset, InspectResult};

use super::{upsert_columns, upsert_fields, Transformer};
use crate::config::params::Params;
use crate::registry::BuildError;

pub(crate) const MODULE: &str = module_path!();

/// Inspection outcome sentences and the short codes they map to.
const ACTION_CODES: &[(&str, &str)] = &[
    (
        "Violations were cited in the following area(s).",
        "cited_violation",
    ),
    (
        "Establishment Closed by DOHMH. Violations were cited in the following area(s) and those requiring immediate action were addressed.",
        "cited_violations_and_closed",
    ),
    (
        "No violations were recorded at the time of this inspection.",
        "no_violations",
    ),
    ("Establishment re-opened by DOHMH.", "reopened"),
    ("Establishment re-closed by DOHMH.", "reclosed"),
];

pub fn action_code(sentence: &str) -> Option<&'static str> {
    ACTION_CODES
        .iter()
        .find(|(text, _)| *text == sentence.trim())
        .map(|(_, code)| *code)
}

/// Replace inspection action sentences with short codes. Sentences without a
/// code become null.
#[derive(Debug)]
pub struct MapActions {
    column: String,
}

impl Default for MapActions {
    fn default() -> Self {
        Self {
            column: "action".to_string(),
        }
    }
}

impl MapActions {
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn from_params(params: &Params) -> Result<Self, BuildError> {
        params.expect_only(&["column"])?;
        let mapper = Self::default();
        Ok(match params.str("column")? {
            Some(column) => mapper.column(column),
            None => mapper,
        })
    }
}

#[async_trait]
impl Transformer for MapActions {
    async fn transform(&mut self, data: Dataset) -> InspectResult<Dataset> {
        data.field(&self.column)?;
        let schema = upsert_fields(data.schema(), vec![Field::new(&self.column, DataType::Utf8, true)]);
        let column = self.column.as_str();

        data.try_map(schema.clone(), |batch| {
            let index = batch.schema().index_of(column)?;
            let text = cast(batch.column(index), &DataType::Utf8)?;
            let codes: StringArray = text
                .as_string::<i32>()
                .iter()
                .map(|v| v.and_then(action_code))
                .collect();
            upsert_columns(&schema, batch, vec![(column, Arc::new(codes) as ArrayRef)])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use arrow::datatypes::Schema;
    use arrow::record_batch::RecordBatch;

    #[tokio::test]
    async fn maps_known_sentences_and_nulls_the_rest() {
        let schema = Arc::new(Schema::new(vec![Field::new("action", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec![
                Some("No violations were recorded at the time of this inspection."),
                Some("Establishment re-opened by DOHMH."),
                Some("Something new"),
                None,
            ]))],
        )
        .unwrap();

        let out = MapActions::default().transform(Dataset::from_batch(batch)).await.unwrap();
        let codes = out.batches()[0].column(0).as_string::<i32>();
        assert_eq!(codes.value(0), "no_violations");
        assert_eq!(codes.value(1), "reopened");
        assert!(codes.is_null(2));
        assert!(codes.is_null(3));
    }

    #[tokio::test]
    async fn missing_column_fails() {
        let schema = Arc::new(Schema::new(vec![Field::new("camis", DataType::Utf8, true)]));
        let data = Dataset::empty(schema);
        assert!(MapActions::default().transform(data).await.is_err());
    }

    #[test]
    fn codes_cover_every_sentence() {
        assert_eq!(ACTION_CODES.len(), 5);
        assert_eq!(
            action_code("Violations were cited in the following area(s)."),
            Some("cited_violation")
        );
    }
}
