use std::fs::File;
use std::io::Seek;
use std::path::PathBuf;
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use async_trait::async_trait;

use inspect_utils::{Dataset, InspectResult};

use super::Extractor;
use crate::config::params::Params;
use crate::registry::BuildError;

pub(crate) const MODULE: &str = module_path!();

/// Reads a CSV file with a header row.
///
/// Columns are read as text unless `infer_schema` is set, so a file passed
/// straight to a CSV loader comes out unchanged.
#[derive(Debug)]
pub struct CsvExtractor {
    path: PathBuf,
    delimiter: u8,
    infer_schema: bool,
}

impl CsvExtractor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
            infer_schema: false,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn infer_schema(mut self, infer: bool) -> Self {
        self.infer_schema = infer;
        self
    }

    pub fn from_params(params: &Params) -> Result<Self, BuildError> {
        params.expect_only(&["path", "delimiter", "infer_schema"])?;
        Ok(Self::new(params.require_str("path")?)
            .delimiter(params.delimiter("delimiter")?.unwrap_or(b','))
            .infer_schema(params.bool("infer_schema")?.unwrap_or(false)))
    }

    fn read(&self) -> InspectResult<Dataset> {
        let mut file = File::open(&self.path)?;
        let format = Format::default()
            .with_header(true)
            .with_delimiter(self.delimiter);

        let max_records = if self.infer_schema { None } else { Some(1) };
        let (inferred, _) = format.infer_schema(&mut file, max_records)?;
        let schema = if self.infer_schema {
            Arc::new(inferred)
        } else {
            let fields: Vec<Field> = inferred
                .fields()
                .iter()
                .map(|f| Field::new(f.name(), DataType::Utf8, true))
                .collect();
            Arc::new(Schema::new(fields))
        };

        file.rewind()?;
        let reader = ReaderBuilder::new(schema.clone())
            .with_header(true)
            .with_delimiter(self.delimiter)
            .build(file)?;
        let batches = reader.collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(path = %self.path.display(), batches = batches.len(), "read csv");
        Ok(Dataset::new(schema, batches))
    }
}

#[async_trait]
impl Extractor for CsvExtractor {
    async fn extract(&mut self) -> InspectResult<Dataset> {
        self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::params::ParamValue;
    use arrow::array::AsArray;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn reads_every_column_as_text_by_default() {
        let file = write_csv("camis,zipcode,score\n41234567,10001,12\n50012345,11201,\n");
        let mut extractor = CsvExtractor::new(file.path());

        let data = extractor.extract().await.unwrap();
        assert_eq!(data.column_names(), vec!["camis", "zipcode", "score"]);
        assert_eq!(data.num_rows(), 2);
        for field in data.schema().fields() {
            assert_eq!(field.data_type(), &DataType::Utf8);
        }
        let zip = data.batches()[0].column(1).as_string::<i32>();
        assert_eq!(zip.value(0), "10001");
    }

    #[tokio::test]
    async fn infers_types_when_asked() {
        let file = write_csv("camis;score\n41234567;12\n50012345;30\n");
        let params = Params::new()
            .with("path", ParamValue::Str(file.path().display().to_string()))
            .with("delimiter", ParamValue::Str(";".into()))
            .with("infer_schema", ParamValue::Bool(true));
        let mut extractor = CsvExtractor::from_params(&params).unwrap();

        let data = extractor.extract().await.unwrap();
        assert_eq!(data.field("score").unwrap().data_type(), &DataType::Int64);
    }

    #[tokio::test]
    async fn missing_file_fails_at_extract_time() {
        let mut extractor = CsvExtractor::new("/nonexistent/inspect-flow/raw.csv");
        assert!(extractor.extract().await.is_err());
    }

    #[test]
    fn path_is_required() {
        assert!(matches!(
            CsvExtractor::from_params(&Params::new()),
            Err(BuildError::Params(_))
        ));
    }
}
