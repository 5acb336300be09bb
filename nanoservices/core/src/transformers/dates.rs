use std::f64::consts::PI;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int32Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Field};
use arrow::temporal_conversions::date32_to_datetime;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};

use inspect_utils::error::Error;
use inspect_utils::{Dataset, InspectResult};

use super::{upsert_columns, upsert_fields, Transformer};
use crate::config::params::Params;
use crate::registry::BuildError;

pub(crate) const MODULE: &str = module_path!();

const INT_COLUMNS: [&str; 5] = ["year", "month", "dow", "quarter", "is_weekend"];
const CYCLIC_COLUMNS: [&str; 6] = [
    "dow_sin",
    "dow_cos",
    "month_sin",
    "month_cos",
    "quarter_sin",
    "quarter_cos",
];

/// Derive calendar features from a date column.
///
/// Adds `year`, `month`, `dow` (Monday = 0), `quarter` and `is_weekend`,
/// plus sine/cosine encodings of `dow / 7`, `(month - 1) / 12` and
/// `(quarter - 1) / 4` so the models see December next to January.
#[derive(Debug)]
pub struct CycleDates {
    column: String,
}

impl Default for CycleDates {
    fn default() -> Self {
        Self {
            column: "inspection_date".to_string(),
        }
    }
}

impl CycleDates {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn from_params(params: &Params) -> Result<Self, BuildError> {
        params.expect_only(&["column"])?;
        Ok(match params.str("column")? {
            Some(column) => Self::new(column),
            None => Self::default(),
        })
    }

    fn dates(&self, column: &ArrayRef) -> InspectResult<Vec<Option<NaiveDate>>> {
        if let DataType::Utf8 | DataType::LargeUtf8 = column.data_type() {
            let text = cast(column, &DataType::Utf8)?;
            return text
                .as_string::<i32>()
                .iter()
                .map(|v| v.map(|s| parse_date(&self.column, s)).transpose())
                .collect();
        }

        let days = cast(column, &DataType::Date32)?;
        Ok(days
            .as_primitive::<Date32Type>()
            .iter()
            .map(|v| v.and_then(date32_to_datetime).map(|dt| dt.date()))
            .collect())
    }
}

fn parse_date(column: &str, value: &str) -> InspectResult<NaiveDate> {
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| Error::component(format!("column '{column}': cannot parse '{value}' as a date: {e}")))
}

fn cycle(position: f64) -> (f64, f64) {
    let angle = 2.0 * PI * position;
    (angle.sin(), angle.cos())
}

#[async_trait]
impl Transformer for CycleDates {
    async fn transform(&mut self, data: Dataset) -> InspectResult<Dataset> {
        data.field(&self.column)?;

        let mut fields: Vec<Field> = INT_COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Int32, true))
            .collect();
        fields.extend(CYCLIC_COLUMNS.iter().map(|name| Field::new(*name, DataType::Float64, true)));
        let schema = upsert_fields(data.schema(), fields);

        data.try_map(schema.clone(), |batch| {
            let source = batch.column(batch.schema().index_of(&self.column)?);
            let dates = self.dates(source)?;

            let ints: Vec<Int32Array> = vec![
                dates.iter().map(|d| d.map(|d| d.year())).collect(),
                dates.iter().map(|d| d.map(|d| d.month() as i32)).collect(),
                dates.iter().map(|d| d.map(|d| d.weekday().num_days_from_monday() as i32)).collect(),
                dates.iter().map(|d| d.map(|d| d.month0() as i32 / 3 + 1)).collect(),
                dates
                    .iter()
                    .map(|d| d.map(|d| (d.weekday().num_days_from_monday() >= 5) as i32))
                    .collect(),
            ];

            let positions: [Box<dyn Fn(&NaiveDate) -> f64>; 3] = [
                Box::new(|d: &NaiveDate| d.weekday().num_days_from_monday() as f64 / 7.0),
                Box::new(|d: &NaiveDate| d.month0() as f64 / 12.0),
                Box::new(|d: &NaiveDate| (d.month0() / 3) as f64 / 4.0),
            ];
            let mut floats: Vec<Float64Array> = Vec::with_capacity(CYCLIC_COLUMNS.len());
            for position in &positions {
                let (sin, cos): (Vec<Option<f64>>, Vec<Option<f64>>) = dates
                    .iter()
                    .map(|d| match d {
                        Some(d) => {
                            let (s, c) = cycle(position(d));
                            (Some(s), Some(c))
                        }
                        None => (None, None),
                    })
                    .unzip();
                floats.push(Float64Array::from(sin));
                floats.push(Float64Array::from(cos));
            }

            let mut columns: Vec<(&str, ArrayRef)> = INT_COLUMNS
                .iter()
                .zip(ints)
                .map(|(name, array)| (*name, Arc::new(array) as ArrayRef))
                .collect();
            columns.extend(
                CYCLIC_COLUMNS
                    .iter()
                    .zip(floats)
                    .map(|(name, array)| (*name, Arc::new(array) as ArrayRef)),
            );
            upsert_columns(&schema, batch, columns)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::StringArray;
    use arrow::datatypes::Schema;
    use arrow::record_batch::RecordBatch;

    fn column<'a>(data: &'a Dataset, name: &str) -> &'a ArrayRef {
        data.batches()[0].column(data.schema().index_of(name).unwrap())
    }

    #[tokio::test]
    async fn derives_calendar_features() {
        let schema = Arc::new(Schema::new(vec![Field::new("inspection_date", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec![
                Some("2024-01-06T00:00:00.000"), // Saturday
                Some("2023-10-02"),              // Monday
                None,
            ]))],
        )
        .unwrap();

        let out = CycleDates::default().transform(Dataset::from_batch(batch)).await.unwrap();
        assert_eq!(out.column_names().len(), 1 + INT_COLUMNS.len() + CYCLIC_COLUMNS.len());

        let int = |name| column(&out, name).as_primitive::<arrow::datatypes::Int32Type>().clone();
        assert_eq!(int("year").value(0), 2024);
        assert_eq!(int("month").value(1), 10);
        assert_eq!(int("dow").value(0), 5);
        assert_eq!(int("dow").value(1), 0);
        assert_eq!(int("quarter").value(0), 1);
        assert_eq!(int("quarter").value(1), 4);
        assert_eq!(int("is_weekend").value(0), 1);
        assert_eq!(int("is_weekend").value(1), 0);
        assert!(int("year").is_null(2));

        let float = |name| column(&out, name).as_primitive::<arrow::datatypes::Float64Type>().clone();
        // January sits at angle zero
        assert!((float("month_sin").value(0)).abs() < 1e-12);
        assert!((float("month_cos").value(0) - 1.0).abs() < 1e-12);
        // Monday too
        assert!((float("dow_cos").value(1) - 1.0).abs() < 1e-12);
        // Q4 is three quarters round the circle
        assert!((float("quarter_sin").value(1) + 1.0).abs() < 1e-12);
        assert!(float("dow_sin").is_null(2));
    }

    #[tokio::test]
    async fn accepts_date_columns() {
        let schema = Arc::new(Schema::new(vec![Field::new("visited", DataType::Date32, true)]));
        let days = NaiveDate::from_ymd_opt(2024, 7, 4)
            .unwrap()
            .signed_duration_since(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
            .num_days() as i32;
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(arrow::array::Date32Array::from(vec![days]))],
        )
        .unwrap();

        let out = CycleDates::new("visited").transform(Dataset::from_batch(batch)).await.unwrap();
        let quarter = column(&out, "quarter").as_primitive::<arrow::datatypes::Int32Type>();
        assert_eq!(quarter.value(0), 3);
    }

    #[tokio::test]
    async fn unparseable_text_is_an_error() {
        let schema = Arc::new(Schema::new(vec![Field::new("inspection_date", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(vec!["01/06/2024"]))]).unwrap();
        assert!(CycleDates::default().transform(Dataset::from_batch(batch)).await.is_err());
    }
}
