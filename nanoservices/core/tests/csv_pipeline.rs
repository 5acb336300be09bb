use std::fs;

use inspect_core::{parse_config, Registry, Runner};

const INPUT: &str = "\
camis,dba,boro,zipcode,cuisine_description,inspection_date,action,score,grade
41234567,JOE'S PIZZA,Manhattan,10001,Pizza,2024-01-06T00:00:00.000,Violations were cited in the following area(s).,12,A
41234568,GOLDEN WOK,Queens,11373,Chinese,2024-01-08T00:00:00.000,Violations were cited in the following area(s).,19,B
41234569,CAFE LUNA,Brooklyn,11201,Coffee/Tea,2024-02-14T00:00:00.000,No violations were recorded at the time of this inspection.,0,A
41234570,TACO LOCO,Bronx,10451,Mexican,2024-03-01T00:00:00.000,Violations were cited in the following area(s).,31,C
41234571,SUSHI ZEN,Manhattan,10016,Japanese,2024-03-15T00:00:00.000,Violations were cited in the following area(s).,9,A
41234572,BAGEL BARN,Staten Island,10301,Bagels/Pretzels,2024-04-02T00:00:00.000,Establishment re-opened by DOHMH.,,
41234573,CURRY HOUSE,Queens,11355,Indian,2024-04-20T00:00:00.000,Violations were cited in the following area(s).,22,B
41234574,\"PHO, INC\",Brooklyn,11220,Vietnamese,2024-05-05T00:00:00.000,Violations were cited in the following area(s).,13,A
41234575,THE DINER,Manhattan,10011,American,2024-06-11T00:00:00.000,Establishment re-closed by DOHMH.,40,
41234576,FALAFEL KING,Bronx,10458,Middle Eastern,2024-07-19T00:00:00.000,Violations were cited in the following area(s).,7,A
";

fn document(input: &str, output: &str) -> String {
    format!(
        r#"
extractors:
  csv_src:
    class: inspect_core::extractors::csv::CsvExtractor
    params:
      path: {input}
transformers:
  noop:
    class: inspect_core::transformers::passthrough::Passthrough
  actions:
    class: inspect_core::transformers::actions::MapActions
  dates:
    class: inspect_core::transformers::dates::CycleDates
  grades:
    class: inspect_core::transformers::grades::GradeScores
    params:
      target: score_grade
loaders:
  csv_sink:
    class: inspect_core::loaders::csv::CsvLoader
    params:
      path: {output}
pipelines:
  daily:
    extractors: [csv_src]
    transformers: [noop]
    loaders: [csv_sink]
    concatenate: false
  features:
    extractors: [csv_src]
    transformers: [actions, dates, grades]
    loaders: [csv_sink]
"#
    )
}

#[tokio::test]
async fn daily_copies_the_csv_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    let output = dir.path().join("out/clean.csv");
    fs::write(&input, INPUT).unwrap();

    let config = parse_config(&document(&input.display().to_string(), &output.display().to_string())).unwrap();
    let runner = Runner::new(config, Registry::with_builtins()).unwrap();
    runner.check("daily").unwrap();
    runner.run("daily").await.unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written.lines().count(), 11);
    assert_eq!(written, INPUT);
}

#[tokio::test]
async fn feature_pipeline_adds_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    let output = dir.path().join("features.csv");
    fs::write(&input, INPUT).unwrap();

    let config = parse_config(&document(&input.display().to_string(), &output.display().to_string())).unwrap();
    Runner::new(config, Registry::with_builtins())
        .unwrap()
        .run("features")
        .await
        .unwrap();

    let written = fs::read_to_string(&output).unwrap();
    let mut lines = written.lines();
    let header: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert!(!header.contains(&"score"));
    for column in ["year", "dow", "is_weekend", "month_sin", "quarter_cos", "score_grade"] {
        assert!(header.contains(&column), "missing {column}");
    }
    assert_eq!(lines.count(), 10);

    let first = written.lines().nth(1).unwrap();
    assert!(first.contains(",cited_violation,"));
}

#[tokio::test]
async fn missing_input_surfaces_as_a_component_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("absent.csv");
    let output = dir.path().join("never.csv");

    let config = parse_config(&document(&input.display().to_string(), &output.display().to_string())).unwrap();
    let err = Runner::new(config, Registry::with_builtins())
        .unwrap()
        .run("daily")
        .await
        .unwrap_err();

    assert!(!err.is_configuration());
    assert!(err.to_string().contains("csv_src"));
    assert!(!output.exists());
}
