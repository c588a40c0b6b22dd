use std::sync::Arc;

use axum::{extract::Query, response::IntoResponse, routing::get, Extension, Json, Router};
use chrono::{Datelike, Utc};
use serde_json::json;
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    dtos::dashboarddtos::{DashboardQueryDto, NotificationsDto},
    error::HttpError,
    service::{
        date_range::{DateRangeFilter, ResolvedRange},
        error::ServiceError,
    },
    upstream::BrokerSession,
    AppState,
};

pub fn dashboard_handler() -> Router {
    Router::new()
        .route("/properties", get(get_properties))
        .route("/distribution", get(get_distribution))
        .route("/trend", get(get_trend))
        .route("/overview", get(get_overview))
        .route("/notifications", get(get_notifications))
}

/// Validate the query and resolve its date range. Runs before any upstream call.
fn resolve_range(query_params: &DashboardQueryDto) -> Result<ResolvedRange, HttpError> {
    query_params.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let range = query_params
        .date_filter()
        .and_then(|filter| filter.resolve(Utc::now().naive_utc()))
        .map_err(ServiceError::from)?;

    Ok(range)
}

pub async fn get_properties(
    WithRejection(Query(query_params), _): WithRejection<Query<DashboardQueryDto>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<BrokerSession>,
) -> Result<impl IntoResponse, HttpError> {
    let range = resolve_range(&query_params)?;

    let table = app_state.dashboard
        .property_table(
            &session,
            &range,
            &query_params.column_filters(),
            query_params.search(),
            query_params.paginator(),
        )
        .await;

    Ok(Json(json!({
        "status": "success",
        "data": table
    })))
}

pub async fn get_distribution(
    WithRejection(Query(query_params), _): WithRejection<Query<DashboardQueryDto>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<BrokerSession>,
) -> Result<impl IntoResponse, HttpError> {
    let range = resolve_range(&query_params)?;

    let by = query_params.group_by().map_err(ServiceError::from)?;
    let window = query_params.trailing_window().ok_or_else(|| {
        HttpError::bad_request("Window must be one of all, thisMonth, thisYear")
    })?;

    let distribution = app_state.dashboard
        .distribution(&session, &range, &query_params.column_filters(), by, window, Utc::now())
        .await;

    Ok(Json(json!({
        "status": "success",
        "data": distribution
    })))
}

pub async fn get_trend(
    WithRejection(Query(query_params), _): WithRejection<Query<DashboardQueryDto>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<BrokerSession>,
) -> Result<impl IntoResponse, HttpError> {
    let year = query_params
        .year
        .clone()
        .unwrap_or_else(|| Utc::now().year().to_string());

    let range = DateRangeFilter::Year { value: year }
        .resolve(Utc::now().naive_utc())
        .map_err(ServiceError::from)?;
    let year = range.year.unwrap_or_else(|| Utc::now().year());

    let trend = app_state.dashboard.trend(&session, &range, year).await;

    Ok(Json(json!({
        "status": "success",
        "data": trend
    })))
}

pub async fn get_overview(
    WithRejection(Query(query_params), _): WithRejection<Query<DashboardQueryDto>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<BrokerSession>,
) -> Result<impl IntoResponse, HttpError> {
    let range = resolve_range(&query_params)?;

    let overview = app_state.dashboard.overview(&session, &range, Utc::now()).await;

    Ok(Json(json!({
        "status": "success",
        "data": overview
    })))
}

pub async fn get_notifications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<BrokerSession>,
) -> Result<impl IntoResponse, HttpError> {
    let state = app_state.notifications.latest(&session).await;

    Ok(Json(json!({
        "status": "success",
        "data": NotificationsDto::from_state(&state)
    })))
}
