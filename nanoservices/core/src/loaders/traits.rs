use async_trait::async_trait;
use inspect_utils::{Dataset, InspectResult};

/// A data sink. All persistence side effects happen in `load`.
#[async_trait]
pub trait Loader: Send {
    async fn load(&mut self, data: Dataset) -> InspectResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int32Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    struct CountingLoader {
        rows: usize,
    }

    #[async_trait]
    impl Loader for CountingLoader {
        async fn load(&mut self, data: Dataset) -> InspectResult<()> {
            self.rows += data.num_rows();
            Ok(())
        }
    }

    #[tokio::test]
    async fn loader_trait_works() {
        let mut dest = CountingLoader { rows: 0 };

        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Int32Array::from(vec![1, 2, 3]))],
        ).unwrap();
        let data = Dataset::from_batch(batch);

        dest.load(data.clone()).await.unwrap();
        dest.load(data).await.unwrap();
        assert_eq!(dest.rows, 6);
    }
}
