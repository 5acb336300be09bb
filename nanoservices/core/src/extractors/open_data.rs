use std::sync::Arc;

use arrow::datatypes::Schema;
use arrow_json::reader::infer_json_schema_from_iterator;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, Request};
use serde_json::Value;
use url::Url;

use inspect_utils::error::Error;
use inspect_utils::{Dataset, InspectResult};

use super::Extractor;
use crate::config::params::{ParamError, Params};
use crate::registry::BuildError;

pub(crate) const MODULE: &str = module_path!();

const DEFAULT_DATE_FIELD: &str = "inspection_date";

/// Builds a query against a Socrata open-data endpoint
/// (`https://{domain}/resource/{dataset}.json`).
#[derive(Debug, Default)]
pub struct OpenDataRequestBuilder {
    domain: String,
    dataset: String,
    app_token: Option<String>,
    select: Option<String>,
    filter: Option<String>,
    order: Option<String>,
    limit: Option<i64>,
    years_cutoff: Option<i64>,
    date_field: Option<String>,
}

impl OpenDataRequestBuilder {
    pub fn new(domain: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            dataset: dataset.into(),
            ..Self::default()
        }
    }

    pub fn app_token<T: Into<String>>(mut self, token: Option<T>) -> Self {
        self.app_token = token.map(|t| t.into());
        self
    }

    pub fn select<T: Into<String>>(mut self, select: Option<T>) -> Self {
        self.select = select.map(|s| s.into());
        self
    }

    /// A SoQL `$where` clause.
    pub fn filter<T: Into<String>>(mut self, filter: Option<T>) -> Self {
        self.filter = filter.map(|f| f.into());
        self
    }

    pub fn order<T: Into<String>>(mut self, order: Option<T>) -> Self {
        self.order = order.map(|o| o.into());
        self
    }

    pub fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    /// Only fetch rows whose date field is within the last `years` years.
    pub fn years_cutoff(mut self, years: Option<i64>) -> Self {
        self.years_cutoff = years;
        self
    }

    pub fn date_field<T: Into<String>>(mut self, field: Option<T>) -> Self {
        self.date_field = field.map(|f| f.into());
        self
    }

    fn url(&self) -> InspectResult<Url> {
        let base = if self.domain.contains("://") {
            self.domain.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.domain.trim_end_matches('/'))
        };
        let mut url = Url::parse(&format!("{base}/resource/{}.json", self.dataset))?;

        let mut clauses = Vec::new();
        if let Some(years) = self.years_cutoff {
            let cutoff = Utc::now().naive_utc() - Duration::days(years * 365);
            let field = self.date_field.as_deref().unwrap_or(DEFAULT_DATE_FIELD);
            clauses.push(format!("{field} > '{}'", cutoff.format("%Y-%m-%dT%H:%M:%S")));
        }
        if let Some(filter) = &self.filter {
            clauses.push(filter.clone());
        }

        {
            let mut query = url.query_pairs_mut();
            if let Some(select) = &self.select {
                query.append_pair("$select", select);
            }
            if !clauses.is_empty() {
                query.append_pair("$where", &clauses.join(" AND "));
            }
            if let Some(order) = &self.order {
                query.append_pair("$order", order);
            }
            if let Some(limit) = self.limit {
                query.append_pair("$limit", &limit.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    pub fn build(self) -> InspectResult<OpenDataExtractor> {
        let client = Client::new();
        let mut request = client.get(self.url()?);

        // Socrata throttles anonymous clients, a token lifts the limit.
        if let Some(token) = &self.app_token {
            request = request.header("X-App-Token", token);
        }

        let request = request.build()?;
        Ok(OpenDataExtractor { client, request })
    }
}

/// Fetches inspection records from an open-data portal.
pub struct OpenDataExtractor {
    client: Client,
    request: Request,
}

impl OpenDataExtractor {
    pub fn from_params(params: &Params) -> Result<Self, BuildError> {
        params.expect_only(&[
            "domain",
            "dataset",
            "app_token",
            "select",
            "where",
            "order",
            "limit",
            "years_cutoff",
            "date_field",
        ])?;
        if let Some(limit) = params.int("limit")? {
            if limit <= 0 {
                return Err(ParamError::Invalid {
                    name: "limit".into(),
                    reason: format!("must be positive, got {limit}"),
                }
                .into());
            }
        }

        let extractor = OpenDataRequestBuilder::new(params.require_str("domain")?, params.require_str("dataset")?)
            .app_token(params.str("app_token")?)
            .select(params.str("select")?)
            .filter(params.str("where")?)
            .order(params.str("order")?)
            .limit(params.int("limit")?)
            .years_cutoff(params.int("years_cutoff")?)
            .date_field(params.str("date_field")?)
            .build()?;
        Ok(extractor)
    }

    pub fn url(&self) -> &Url {
        self.request.url()
    }

    fn request(&self) -> InspectResult<Request> {
        self.request
            .try_clone()
            .ok_or_else(|| Error::component("open data request cannot be replayed"))
    }
}

#[async_trait]
impl Extractor for OpenDataExtractor {
    async fn extract(&mut self) -> InspectResult<Dataset> {
        tracing::info!(url = %self.request.url(), "fetching open data");
        let rows: Vec<Value> = self
            .client
            .execute(self.request()?)
            .await?
            .error_for_status()?
            .json()
            .await?;
        records_to_dataset(&rows)
    }
}

/// Decode a JSON array of flat records into a single-batch dataset.
pub fn records_to_dataset(rows: &[Value]) -> InspectResult<Dataset> {
    if rows.is_empty() {
        return Ok(Dataset::empty(Arc::new(Schema::empty())));
    }

    let schema = Arc::new(infer_json_schema_from_iterator(rows.iter().cloned().map(Ok))?);
    let mut decoder = arrow_json::ReaderBuilder::new(schema.clone())
        .with_batch_size(rows.len())
        .build_decoder()?;
    decoder.serialize(rows)?;

    match decoder.flush()? {
        Some(batch) => Ok(Dataset::from_batch(batch)),
        None => Ok(Dataset::empty(schema)),
    }
}
