// upstream/apiclient.rs
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    models::notificationmodel::Notification,
    service::{date_range::RangeQuery, error::ServiceError, normalizer},
    upstream::{extract_rows, extract_total, range_pairs, BrokerApi, BrokerSession, PropertyPage, PropertyPageQuery},
};

const MAX_ERROR_BODY: usize = 200;

/// reqwest-backed client for the property REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(
        &self,
        session: &BrokerSession,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Value, ServiceError> {
        let mut url = format!("{}{}", self.base_url, path);
        if !query.is_empty() {
            let encoded = serde_urlencoded::to_string(query)
                .map_err(|e| ServiceError::Other(e.to_string()))?;
            url.push('?');
            url.push_str(&encoded);
        }

        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(
            request_id = %request_id,
            session = %session.fingerprint(),
            "GET {}",
            url
        );

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", session.token))
            .header("X-Request-Id", request_id.as_str())
            .send()
            .await?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);

        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            message.truncate(
                message
                    .char_indices()
                    .nth(MAX_ERROR_BODY)
                    .map(|(i, _)| i)
                    .unwrap_or(message.len()),
            );
            tracing::warn!(request_id = %request_id, %status, "upstream returned an error");
            return Err(ServiceError::UpstreamStatus { status, message });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl BrokerApi for ApiClient {
    async fn broker_stats(
        &self,
        session: &BrokerSession,
        range: &RangeQuery,
    ) -> Result<Value, ServiceError> {
        let body = self
            .get_json(session, "/api/properties/broker/stats", &range_pairs(range))
            .await?;

        // Stats are usually wrapped as { status, data: {...} }
        if let Some(data @ Value::Object(_)) = body.get("data") {
            return Ok(data.clone());
        }
        Ok(body)
    }

    async fn list_properties(
        &self,
        session: &BrokerSession,
        query: &PropertyPageQuery,
    ) -> Result<PropertyPage, ServiceError> {
        let body = self
            .get_json(session, "/api/properties/listproperty", &query.pairs())
            .await?;

        Ok(PropertyPage {
            rows: extract_rows(&body)?,
            total: extract_total(&body),
        })
    }

    async fn broker_user_count(&self, session: &BrokerSession) -> Result<u64, ServiceError> {
        // Unpaged, so counting rows is right when no total is reported.
        let body = self.get_json(session, "/api/broker-users", &[]).await?;

        match extract_total(&body) {
            Some(total) => Ok(total),
            None => Ok(extract_rows(&body)?.len() as u64),
        }
    }

    async fn notifications(&self, session: &BrokerSession) -> Result<Vec<Notification>, ServiceError> {
        let body = self.get_json(session, "/api/notifications", &[]).await?;

        Ok(extract_rows(&body)?
            .iter()
            .map(normalizer::normalize_notification)
            .collect())
    }
}
