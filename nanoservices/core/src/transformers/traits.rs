use async_trait::async_trait;
use inspect_utils::{Dataset, InspectResult};

/// Maps one dataset to another.
#[async_trait]
pub trait Transformer: Send {
    async fn transform(&mut self, data: Dataset) -> InspectResult<Dataset>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int32Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    struct KeepFirst(usize);

    #[async_trait]
    impl Transformer for KeepFirst {
        async fn transform(&mut self, data: Dataset) -> InspectResult<Dataset> {
            let n = self.0;
            data.try_map(data.schema().clone(), |batch| {
                Ok(batch.slice(0, n.min(batch.num_rows())))
            })
        }
    }

    #[tokio::test]
    async fn transform_trait_works() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Int32Array::from(vec![1, 2, 3]))],
        ).unwrap();

        let mut t: Box<dyn Transformer> = Box::new(KeepFirst(2));
        let result = t.transform(Dataset::from_batch(batch)).await.unwrap();
        assert_eq!(result.num_rows(), 2);
    }
}
