use async_trait::async_trait;
use inspect_utils::{Dataset, InspectResult};

/// A data source that produces one dataset, taking no input.
#[async_trait]
pub trait Extractor: Send {
    /// Extract data from the source
    async fn extract(&mut self) -> InspectResult<Dataset>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int32Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    struct CountingSource {
        calls: usize,
    }

    #[async_trait]
    impl Extractor for CountingSource {
        async fn extract(&mut self) -> InspectResult<Dataset> {
            self.calls += 1;
            let schema = Arc::new(Schema::new(vec![
                Field::new("id", DataType::Int32, false),
            ]));
            let batch = RecordBatch::try_new(
                schema,
                vec![Arc::new(Int32Array::from(vec![1, 2, 3]))],
            )?;
            Ok(Dataset::from_batch(batch))
        }
    }

    #[tokio::test]
    async fn extractor_trait_works_through_a_box() {
        let mut src: Box<dyn Extractor> = Box::new(CountingSource { calls: 0 });
        let data = src.extract().await.unwrap();
        assert_eq!(data.batches().len(), 1);
        assert_eq!(data.num_rows(), 3);
    }
}
