pub mod apiclient;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::{
    models::notificationmodel::Notification,
    service::{date_range::RangeQuery, error::ServiceError},
    utils::token,
};

pub use apiclient::ApiClient;

/// Who is asking. Handed explicitly to every upstream call.
#[derive(Debug, Clone)]
pub struct BrokerSession {
    pub token: String,
}

impl BrokerSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    pub fn fingerprint(&self) -> String {
        token::fingerprint(&self.token)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PropertyPageQuery {
    pub page: u32,
    pub limit: u32,
    pub range: RangeQuery,
    pub q: Option<String>,
}

impl PropertyPageQuery {
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        pairs.extend(range_pairs(&self.range));
        if let Some(q) = self.q.as_ref().filter(|q| !q.trim().is_empty()) {
            pairs.push(("q", q.trim().to_string()));
        }
        pairs
    }
}

pub fn range_pairs(range: &RangeQuery) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(from) = &range.from {
        pairs.push(("from", from.clone()));
    }
    if let Some(to) = &range.to {
        pairs.push(("to", to.clone()));
    }
    if let Some(month) = range.month {
        pairs.push(("month", month.to_string()));
    }
    if let Some(year) = range.year {
        pairs.push(("year", year.to_string()));
    }
    pairs
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPage {
    pub rows: Vec<Value>,
    pub total: Option<u64>,
}

#[async_trait]
pub trait BrokerApi: Send + Sync {
    async fn broker_stats(
        &self,
        session: &BrokerSession,
        range: &RangeQuery,
    ) -> Result<Value, ServiceError>;

    async fn list_properties(
        &self,
        session: &BrokerSession,
        query: &PropertyPageQuery,
    ) -> Result<PropertyPage, ServiceError>;

    async fn broker_user_count(&self, session: &BrokerSession) -> Result<u64, ServiceError>;

    async fn notifications(&self, session: &BrokerSession) -> Result<Vec<Notification>, ServiceError>;
}

const ROW_KEYS: &[&str] = &["data", "properties", "items", "rows", "notifications"];

/// Rows from either a bare array or an envelope object.
pub fn extract_rows(body: &Value) -> Result<Vec<Value>, ServiceError> {
    if let Some(rows) = body.as_array() {
        return Ok(rows.clone());
    }

    for key in ROW_KEYS {
        match body.get(*key) {
            Some(Value::Array(rows)) => return Ok(rows.clone()),
            Some(nested @ Value::Object(_)) => {
                if let Some(rows) = ROW_KEYS
                    .iter()
                    .find_map(|inner| nested.get(*inner).and_then(Value::as_array))
                {
                    return Ok(rows.clone());
                }
            }
            _ => {}
        }
    }

    Err(ServiceError::Decode("no rows in response body".to_string()))
}

/// Total count wherever the envelope put it.
pub fn extract_total(body: &Value) -> Option<u64> {
    const PATHS: &[&[&str]] = &[
        &["total"],
        &["count"],
        &["totalCount"],
        &["pagination", "total"],
        &["data", "total"],
        &["data", "pagination", "total"],
    ];

    PATHS.iter().find_map(|path| {
        path.iter()
            .try_fold(body, |value, key| value.get(*key))
            .and_then(|value| match value {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
    })
}
