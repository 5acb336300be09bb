use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BinaryArray, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction};

use inspect_utils::error::Error;
use inspect_utils::{Dataset, InspectResult};

/// What to do when an inserted row collides with a UNIQUE key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnConflict {
    /// Keep the existing row and skip the new one.
    #[default]
    Ignore,
    Replace,
    /// Fail the whole insert.
    Abort,
}

impl OnConflict {
    fn verb(&self) -> &'static str {
        match self {
            OnConflict::Ignore => "INSERT OR IGNORE",
            OnConflict::Replace => "INSERT OR REPLACE",
            OnConflict::Abort => "INSERT",
        }
    }
}

impl FromStr for OnConflict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" | "do_nothing" => Ok(OnConflict::Ignore),
            "replace" => Ok(OnConflict::Replace),
            "abort" | "fail" => Ok(OnConflict::Abort),
            other => Err(format!("expected ignore, replace or abort, got '{other}'")),
        }
    }
}

/// A SQLite database used as a pipeline source or sink.
///
/// Every read and write runs inside its own transaction, which is committed
/// when the work succeeds and rolled back on any error.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: impl AsRef<Path>) -> InspectResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> InspectResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Run `work` in a transaction.
    pub fn with_transaction<T, F>(&mut self, work: F) -> InspectResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> InspectResult<T>,
    {
        let tx = self.conn.transaction()?;
        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback() {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Run a SELECT and collect the result as a dataset.
    pub fn query(&mut self, sql: &str) -> InspectResult<Dataset> {
        self.with_transaction(|tx| query_dataset(tx, sql))
    }

    /// Create `table` from `schema` unless it already exists.
    pub fn create_table(&mut self, table: &str, schema: &Schema, unique: &[String]) -> InspectResult<()> {
        let sql = create_table_sql(table, schema, unique)?;
        self.with_transaction(|tx| {
            tx.execute_batch(&sql)?;
            Ok(())
        })
    }

    /// Insert every row of `data` into `table`, returning how many rows were
    /// written.
    pub fn insert(&mut self, table: &str, data: &Dataset, on_conflict: OnConflict) -> InspectResult<usize> {
        let fields = data.schema().fields();
        if fields.is_empty() {
            return Ok(0);
        }

        let columns: Vec<String> = fields.iter().map(|f| quote(f.name())).collect();
        let placeholders: Vec<String> = (1..=fields.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "{} INTO {} ({}) VALUES ({})",
            on_conflict.verb(),
            quote(table),
            columns.join(", "),
            placeholders.join(", ")
        );

        self.with_transaction(|tx| {
            let mut stmt = tx.prepare(&sql)?;
            let mut written = 0;
            for batch in data.batches() {
                let columns = batch
                    .columns()
                    .iter()
                    .map(SqlColumn::from_array)
                    .collect::<InspectResult<Vec<_>>>()?;
                for row in 0..batch.num_rows() {
                    written += stmt.execute(params_from_iter(columns.iter().map(|c| c.value(row))))?;
                }
            }
            Ok(written)
        })
    }
}

/// Quote an identifier for SQLite.
pub fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn create_table_sql(table: &str, schema: &Schema, unique: &[String]) -> InspectResult<String> {
    let mut defs: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| format!("{} {}", quote(f.name()), affinity(f.data_type())))
        .collect();

    if !unique.is_empty() {
        for column in unique {
            schema
                .field_with_name(column)
                .map_err(|_| Error::MissingColumn(column.clone()))?;
        }
        let keys: Vec<String> = unique.iter().map(|c| quote(c)).collect();
        defs.push(format!("UNIQUE ({})", keys.join(", ")));
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote(table),
        defs.join(", ")
    ))
}

fn affinity(data_type: &DataType) -> &'static str {
    match data_type {
        DataType::Boolean
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => "INTEGER",
        DataType::Float16 | DataType::Float32 | DataType::Float64 => "REAL",
        DataType::Binary | DataType::LargeBinary => "BLOB",
        _ => "TEXT",
    }
}

/// An Arrow column converted to one of SQLite's storage classes.
enum SqlColumn {
    Int(Int64Array),
    Real(Float64Array),
    Text(StringArray),
    Blob(BinaryArray),
}

impl SqlColumn {
    fn from_array(array: &ArrayRef) -> InspectResult<Self> {
        let column = match affinity(array.data_type()) {
            "INTEGER" => SqlColumn::Int(cast(array, &DataType::Int64)?.as_primitive::<Int64Type>().clone()),
            "REAL" => SqlColumn::Real(cast(array, &DataType::Float64)?.as_primitive::<Float64Type>().clone()),
            "BLOB" => SqlColumn::Blob(cast(array, &DataType::Binary)?.as_binary::<i32>().clone()),
            _ => SqlColumn::Text(cast(array, &DataType::Utf8)?.as_string::<i32>().clone()),
        };
        Ok(column)
    }

    fn value(&self, row: usize) -> Value {
        match self {
            SqlColumn::Int(a) if a.is_valid(row) => Value::Integer(a.value(row)),
            SqlColumn::Real(a) if a.is_valid(row) => Value::Real(a.value(row)),
            SqlColumn::Text(a) if a.is_valid(row) => Value::Text(a.value(row).to_string()),
            SqlColumn::Blob(a) if a.is_valid(row) => Value::Blob(a.value(row).to_vec()),
            _ => Value::Null,
        }
    }
}

fn query_dataset(conn: &Connection, sql: &str) -> InspectResult<Dataset> {
    let mut stmt = conn.prepare(sql)?;
    let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();

    let mut values: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    let mut rows = stmt.query([])?;
    let mut num_rows = 0;
    while let Some(row) = rows.next()? {
        for (i, column) in values.iter_mut().enumerate() {
            column.push(row.get::<_, Value>(i)?);
        }
        num_rows += 1;
    }

    let mut fields = Vec::with_capacity(names.len());
    let mut arrays = Vec::with_capacity(names.len());
    for (name, column) in names.iter().zip(&values) {
        let data_type = column_type(column);
        arrays.push(to_array(&data_type, column));
        fields.push(Field::new(name, data_type, true));
    }

    let schema = Arc::new(Schema::new(fields));
    if num_rows == 0 {
        return Ok(Dataset::empty(schema));
    }
    Ok(Dataset::from_batch(RecordBatch::try_new(schema, arrays)?))
}

/// The narrowest Arrow type that holds every value in a result column.
fn column_type(values: &[Value]) -> DataType {
    let mut found: Option<DataType> = None;
    for value in values {
        let this = match value {
            Value::Null => continue,
            Value::Integer(_) => DataType::Int64,
            Value::Real(_) => DataType::Float64,
            Value::Text(_) => DataType::Utf8,
            Value::Blob(_) => DataType::Binary,
        };
        found = Some(match found {
            None => this,
            Some(prev) if prev == this => prev,
            Some(DataType::Int64) | Some(DataType::Float64)
                if matches!(this, DataType::Int64 | DataType::Float64) =>
            {
                DataType::Float64
            }
            Some(_) => DataType::Utf8,
        });
    }
    found.unwrap_or(DataType::Utf8)
}

fn to_array(data_type: &DataType, values: &[Value]) -> ArrayRef {
    match data_type {
        DataType::Int64 => Arc::new(Int64Array::from_iter(values.iter().map(|v| match v {
            Value::Integer(i) => Some(*i),
            _ => None,
        }))),
        DataType::Float64 => Arc::new(Float64Array::from_iter(values.iter().map(|v| match v {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            _ => None,
        }))),
        DataType::Binary => Arc::new(BinaryArray::from_iter(values.iter().map(|v| match v {
            Value::Blob(b) => Some(b.as_slice()),
            _ => None,
        }))),
        _ => Arc::new(StringArray::from_iter(values.iter().map(|v| match v {
            Value::Null => None,
            Value::Integer(i) => Some(i.to_string()),
            Value::Real(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
        }))),
    }
}
