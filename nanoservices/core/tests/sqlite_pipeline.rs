use std::fs;

use arrow::array::AsArray;

use inspect_core::store::Database;
use inspect_core::{parse_config, Registry, Runner};

fn document(csv: &str, db: &str) -> String {
    format!(
        r#"
extractors:
  raw:
    class: inspect_core::extractors::csv::CsvExtractor
    params:
      path: {csv}
  warehouse:
    class: inspect_core::extractors::sqlite::SqliteExtractor
    params:
      path: {db}
      query: SELECT camis, boro FROM inspections ORDER BY camis
transformers:
  drop_unscored:
    class: inspect_core::transformers::nulls::DropNulls
    params:
      columns: score
  boroughs:
    class: inspect_core::transformers::binning::BinCategories
    params:
      column: boro
      min_count: 2
loaders:
  store:
    class: inspect_core::loaders::sqlite::SqliteLoader
    params:
      path: {db}
      table: inspections
      unique: camis, inspection_date
  summary:
    class: inspect_core::loaders::sqlite::SqliteLoader
    params:
      path: {db}
      table: boroughs
pipelines:
  store:
    extractors: [raw]
    transformers: [drop_unscored]
    loaders: [store]
  summarize:
    extractors: [warehouse]
    transformers: [boroughs]
    loaders: [summary]
tasks:
  nightly:
    pipelines: [store, summarize]
"#
    )
}

#[tokio::test]
async fn task_loads_then_reads_back_the_warehouse() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("raw.csv");
    let db = dir.path().join("warehouse.db");
    fs::write(
        &csv,
        "camis,boro,inspection_date,score\n\
         1,Queens,2024-01-01,10\n\
         2,Queens,2024-01-02,\n\
         3,Bronx,2024-01-03,30\n\
         4,Queens,2024-01-04,5\n",
    )
    .unwrap();

    let config = parse_config(&document(&csv.display().to_string(), &db.display().to_string())).unwrap();
    let runner = Runner::new(config, Registry::with_builtins()).unwrap();
    runner.run("nightly").await.unwrap();
    // a second run hits the unique key and adds nothing
    runner.run("store").await.unwrap();

    let mut warehouse = Database::open(&db).unwrap();
    assert_eq!(warehouse.query("SELECT * FROM inspections").unwrap().num_rows(), 3);

    let boroughs = warehouse.query("SELECT boro FROM boroughs ORDER BY boro").unwrap();
    let values: Vec<String> = boroughs.batches()[0]
        .column(0)
        .as_string::<i32>()
        .iter()
        .map(|v| v.unwrap().to_string())
        .collect();
    assert_eq!(values, vec!["Queens", "Queens", "other"]);
}
