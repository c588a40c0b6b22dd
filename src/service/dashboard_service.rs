// service/dashboard_service.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::{
    config::Config,
    dtos::dashboarddtos::{
        DistributionDto, OverviewDto, PropertyRowDto, PropertyTableDto, RangeDto, TrendDto,
    },
    models::propertymodel::PropertyRecord,
    service::{
        aggregator,
        column_filter::{Column, ColumnFilterSet},
        date_range::ResolvedRange,
        error::ServiceError,
        fetch_state::FetchState,
        normalizer,
        paginator::Paginator,
        trailing_window::TrailingWindow,
    },
    upstream::{BrokerApi, BrokerSession, PropertyPageQuery},
    utils::currency::{format_price, CurrencyLocale},
};

const RECENT_COUNT: usize = 5;

/// Runs the property pipeline for one dashboard request:
/// fetch → normalize → date range (mirrored) → column filters → charts / table.
#[derive(Clone)]
pub struct DashboardService {
    api: Arc<dyn BrokerApi>,
    page_size: u32,
    max_pages: u32,
    locale: CurrencyLocale,
}

impl DashboardService {
    pub fn new(api: Arc<dyn BrokerApi>, config: &Config) -> Self {
        Self {
            api,
            page_size: config.upstream_page_size.max(1),
            max_pages: config.upstream_max_pages.max(1),
            locale: config.currency_locale,
        }
    }

    /// Pull every page of raw rows for the range, stopping at a short page,
    /// the reported total, or the page cap.
    async fn fetch_rows(
        &self,
        session: &BrokerSession,
        range: &ResolvedRange,
        search: Option<&str>,
    ) -> Result<Vec<Value>, ServiceError> {
        let mut rows = Vec::new();

        for page in 1..=self.max_pages {
            let query = PropertyPageQuery {
                page,
                limit: self.page_size,
                range: range.query(),
                q: search.map(str::to_string),
            };
            let batch = self.api.list_properties(session, &query).await?;
            let received = batch.rows.len();
            rows.extend(batch.rows);

            let reached_total = batch
                .total
                .map_or(false, |total| rows.len() as u64 >= total);
            if received < self.page_size as usize || reached_total {
                return Ok(rows);
            }
        }

        tracing::warn!(
            session = %session.fingerprint(),
            pages = self.max_pages,
            "property listing truncated at page cap"
        );
        Ok(rows)
    }

    /// Normalized records inside `range`. The range is sent upstream and
    /// applied again here, so an upstream that ignores it changes nothing.
    pub async fn load_properties(
        &self,
        session: &BrokerSession,
        range: &ResolvedRange,
        search: Option<&str>,
    ) -> FetchState<Vec<PropertyRecord>> {
        match self.fetch_rows(session, range, search).await {
            Ok(rows) => {
                let records = normalizer::normalize_all(&rows);
                FetchState::Loaded(range.apply(&records))
            }
            Err(e) => {
                tracing::warn!(session = %session.fingerprint(), "property fetch failed: {}", e);
                FetchState::Errored(e.display_message())
            }
        }
    }

    pub async fn property_table(
        &self,
        session: &BrokerSession,
        range: &ResolvedRange,
        filters: &ColumnFilterSet,
        search: Option<&str>,
        paginator: Paginator,
    ) -> PropertyTableDto {
        let state = self.load_properties(session, range, search).await;
        let filtered = state
            .loaded()
            .map(|records| filters.apply(records))
            .unwrap_or_default();

        PropertyTableDto {
            rows: paginator
                .visible(&filtered)
                .iter()
                .map(|r| PropertyRowDto::from_record(r, self.locale))
                .collect(),
            total: filtered.len(),
            display_limit: paginator.display_limit,
            has_more: paginator.has_more(filtered.len()),
            next_limit: paginator.next_limit(),
            range: RangeDto::from(range),
            state: state.name(),
            message: state.message().map(str::to_string),
        }
    }

    pub async fn distribution(
        &self,
        session: &BrokerSession,
        range: &ResolvedRange,
        filters: &ColumnFilterSet,
        by: Column,
        window: TrailingWindow,
        now: DateTime<Utc>,
    ) -> DistributionDto {
        let state = self.load_properties(session, range, None).await;
        let buckets = state
            .loaded()
            .map(|records| {
                let filtered = filters.apply(records);
                aggregator::windowed_distribution(&filtered, window, now, |r| by.value(r))
            })
            .unwrap_or_default();

        DistributionDto {
            by,
            window,
            total: buckets.iter().map(|b| b.count).sum(),
            buckets,
            range: RangeDto::from(range),
            state: state.name(),
            message: state.message().map(str::to_string),
        }
    }

    /// `year_range` must be a resolved year filter; its year labels the series.
    pub async fn trend(&self, session: &BrokerSession, year_range: &ResolvedRange, year: i32) -> TrendDto {
        let state = self.load_properties(session, year_range, None).await;
        let months = match state.loaded() {
            Some(records) => aggregator::monthly_trend(records, year),
            None => aggregator::monthly_trend(&[], year),
        };

        TrendDto {
            year,
            months,
            state: state.name(),
            message: state.message().map(str::to_string),
        }
    }

    pub async fn overview(
        &self,
        session: &BrokerSession,
        range: &ResolvedRange,
        now: DateTime<Utc>,
    ) -> OverviewDto {
        let range_query = range.query();
        let (stats, users, properties) = tokio::join!(
            self.api.broker_stats(session, &range_query),
            self.api.broker_user_count(session),
            self.load_properties(session, range, None),
        );

        let mut messages = Vec::new();

        let stats = stats.unwrap_or_else(|e| {
            tracing::warn!(session = %session.fingerprint(), "stats fetch failed: {}", e);
            messages.push(e.display_message());
            json!({})
        });
        let broker_users = users.unwrap_or_else(|e| {
            tracing::warn!(session = %session.fingerprint(), "broker users fetch failed: {}", e);
            messages.push(e.display_message());
            0
        });
        if let Some(message) = properties.message() {
            messages.push(message.to_string());
        }

        let records: &[PropertyRecord] = properties.loaded().map(Vec::as_slice).unwrap_or(&[]);
        let summary = aggregator::summary(records, now);

        OverviewDto {
            stats,
            broker_users,
            total_value_display: format_price(Some(summary.total_value), self.locale),
            summary,
            recent: aggregator::recent(records, RECENT_COUNT)
                .iter()
                .map(|r| PropertyRowDto::from_record(r, self.locale))
                .collect(),
            range: RangeDto::from(range),
            messages,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        models::notificationmodel::Notification,
        service::date_range::{DateRangeFilter, RangeQuery},
        upstream::PropertyPage,
    };
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// In-memory stand-in for the property API.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub rows: Vec<Value>,
        pub fail: bool,
        pub notifications: Vec<Notification>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        pub fn with_rows(rows: Vec<Value>) -> Self {
            Self { rows, ..Self::default() }
        }

        pub fn failing() -> Self {
            Self { fail: true, ..Self::default() }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) -> Result<(), ServiceError> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                return Err(ServiceError::UpstreamStatus {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    message: "down".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl BrokerApi for FakeApi {
        async fn broker_stats(&self, _session: &BrokerSession, _range: &RangeQuery) -> Result<Value, ServiceError> {
            self.record("stats".to_string())?;
            Ok(json!({ "totalProperties": self.rows.len() }))
        }

        async fn list_properties(
            &self,
            _session: &BrokerSession,
            query: &PropertyPageQuery,
        ) -> Result<PropertyPage, ServiceError> {
            self.record(format!("list page={}", query.page))?;
            let start = ((query.page - 1) * query.limit) as usize;
            let rows = self
                .rows
                .iter()
                .skip(start)
                .take(query.limit as usize)
                .cloned()
                .collect();
            Ok(PropertyPage { rows, total: None })
        }

        async fn broker_user_count(&self, _session: &BrokerSession) -> Result<u64, ServiceError> {
            self.record("users".to_string())?;
            Ok(4)
        }

        async fn notifications(&self, _session: &BrokerSession) -> Result<Vec<Notification>, ServiceError> {
            self.record("notifications".to_string())?;
            Ok(self.notifications.clone())
        }
    }

    pub(crate) fn test_config() -> Config {
        Config::from_lookup(|name| match name {
            "API_BASE_URL" => Some("http://upstream.test".to_string()),
            "UPSTREAM_PAGE_SIZE" => Some("10".to_string()),
            "UPSTREAM_MAX_PAGES" => Some("5".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 25, 12, 0, 0).unwrap()
    }

    fn all_range() -> ResolvedRange {
        DateRangeFilter::All.resolve(now().naive_utc()).unwrap()
    }

    fn rows(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| {
                json!({
                    "_id": format!("p{}", i),
                    "type": if i % 2 == 0 { "Flat" } else { "Villa" },
                    "status": if i % 3 == 0 { "Sold" } else { "active" },
                    "expected_price": 1000000 + i,
                    "createdAt": format!("2025-01-{:02}T10:00:00Z", (i % 28) + 1),
                })
            })
            .collect()
    }

    fn service(api: FakeApi) -> (DashboardService, Arc<FakeApi>) {
        let api = Arc::new(api);
        (DashboardService::new(api.clone(), &test_config()), api)
    }

    #[tokio::test]
    async fn fetch_pages_until_short_page() {
        let (svc, api) = service(FakeApi::with_rows(rows(25)));
        let state = svc
            .load_properties(&BrokerSession::new("t"), &all_range(), None)
            .await;

        assert_eq!(state.loaded().map(Vec::len), Some(25));
        assert_eq!(api.calls(), vec!["list page=1", "list page=2", "list page=3"]);
    }

    #[tokio::test]
    async fn fetch_stops_at_page_cap() {
        let (svc, api) = service(FakeApi::with_rows(rows(80)));
        let state = svc
            .load_properties(&BrokerSession::new("t"), &all_range(), None)
            .await;

        assert_eq!(state.loaded().map(Vec::len), Some(50));
        assert_eq!(api.calls().len(), 5);
    }

    #[tokio::test]
    async fn range_is_mirrored_locally() {
        let mut data = rows(3);
        data.push(json!({ "_id": "old", "createdAt": "2024-06-01" }));
        data.push(json!({ "_id": "undated" }));
        let (svc, _) = service(FakeApi::with_rows(data));

        let january = DateRangeFilter::Month { value: "2025-01".to_string() }
            .resolve(now().naive_utc())
            .unwrap();
        let state = svc.load_properties(&BrokerSession::new("t"), &january, None).await;

        let ids: Vec<_> = state.loaded().unwrap().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec!["p0", "p1", "p2"]);
    }

    #[tokio::test]
    async fn table_filters_then_paginates() {
        let (svc, _) = service(FakeApi::with_rows(rows(40)));
        let filters = ColumnFilterSet::new().with(Column::Status, "ACTIVE");

        let table = svc
            .property_table(&BrokerSession::new("t"), &all_range(), &filters, None, Paginator::default())
            .await;

        // every third row is sold
        assert_eq!(table.total, 26);
        assert_eq!(table.rows.len(), 10);
        assert!(table.has_more);
        assert_eq!(table.next_limit, 20);
        assert_eq!(table.state, "loaded");
        assert_eq!(table.rows[0].price_display, "₹10,00,001");
    }

    #[tokio::test]
    async fn failed_fetch_degrades_to_empty_table() {
        let (svc, _) = service(FakeApi::failing());
        let table = svc
            .property_table(
                &BrokerSession::new("t"),
                &all_range(),
                &ColumnFilterSet::new(),
                None,
                Paginator::default(),
            )
            .await;

        assert!(table.rows.is_empty());
        assert_eq!(table.total, 0);
        assert!(!table.has_more);
        assert_eq!(table.state, "errored");
        assert_eq!(table.message.as_deref(), Some("Failed to load data"));
    }

    #[tokio::test]
    async fn distribution_respects_filters_and_window() {
        let mut data = rows(6);
        data.push(json!({ "_id": "nodate", "type": "Flat", "status": "active" }));
        let (svc, _) = service(FakeApi::with_rows(data));
        let filters = ColumnFilterSet::new().with(Column::Status, "active");

        let all = svc
            .distribution(&BrokerSession::new("t"), &all_range(), &filters, Column::Type, TrailingWindow::All, now())
            .await;
        let month = svc
            .distribution(&BrokerSession::new("t"), &all_range(), &filters, Column::Type, TrailingWindow::ThisMonth, now())
            .await;

        // active rows: p1 Villa, p2 Flat, p4 Flat, p5 Villa, nodate Flat
        assert_eq!(all.total, 5);
        assert_eq!(all.buckets[0].key, "Flat");
        assert_eq!(all.buckets[0].count, 3);
        assert_eq!(month.total, 4);
    }

    #[tokio::test]
    async fn trend_counts_by_month() {
        let (svc, _) = service(FakeApi::with_rows(rows(5)));
        let range = DateRangeFilter::Year { value: "2025".to_string() }
            .resolve(now().naive_utc())
            .unwrap();

        let trend = svc.trend(&BrokerSession::new("t"), &range, 2025).await;
        assert_eq!(trend.months[0].count, 5);
        assert_eq!(trend.months.iter().map(|m| m.count).sum::<usize>(), 5);
    }

    #[tokio::test]
    async fn overview_zeroes_failed_parts() {
        let (svc, _) = service(FakeApi::failing());
        let overview = svc.overview(&BrokerSession::new("t"), &all_range(), now()).await;

        assert_eq!(overview.stats, json!({}));
        assert_eq!(overview.broker_users, 0);
        assert_eq!(overview.summary.total, 0);
        assert!(overview.recent.is_empty());
        assert_eq!(overview.messages.len(), 3);
    }

    #[tokio::test]
    async fn overview_combines_sources() {
        let (svc, _) = service(FakeApi::with_rows(rows(7)));
        let overview = svc.overview(&BrokerSession::new("t"), &all_range(), now()).await;

        assert_eq!(overview.stats["totalProperties"], 7);
        assert_eq!(overview.broker_users, 4);
        assert_eq!(overview.summary.total, 7);
        assert_eq!(overview.recent.len(), RECENT_COUNT);
        assert_eq!(overview.recent[0].id, "p6");
        assert!(overview.messages.is_empty());
    }
}
