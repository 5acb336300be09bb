use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use reqwest::Error as ReqwestError;
use std::io::Error as IoError;
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Reqwest Error: {0}")]
    Http(#[from] ReqwestError),

    #[error("Io Error: {0}")]
    Io(#[from] IoError),

    #[error("Arrow Error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Url Error: {0}")]
    UrlParse(#[from] ParseError),

    #[error("Sqlite Error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("column '{column}' has type {left} in one dataset and {right} in another")]
    SchemaMismatch {
        column: String,
        left: DataType,
        right: DataType,
    },

    #[error("{0}")]
    Component(String),
}

impl Error {
    pub fn component(message: impl Into<String>) -> Self {
        Error::Component(message.into())
    }
}
