use axum::{extract::Query, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde_json::json;
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    dtos::dashboarddtos::{AreaConvertQueryDto, DashboardQueryDto},
    error::HttpError,
    service::error::ServiceError,
    utils::area::{self, AreaUnit},
};

pub fn tools_handler() -> Router {
    Router::new()
        .route("/date-range", get(resolve_date_range))
        .route("/area-convert", get(convert_area))
}

/// Resolve a range without fetching anything. A 400 here means the
/// selection cannot be applied.
pub async fn resolve_date_range(
    WithRejection(Query(query_params), _): WithRejection<Query<DashboardQueryDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let range = query_params
        .date_filter()
        .and_then(|filter| filter.resolve(Utc::now().naive_utc()))
        .map_err(ServiceError::from)?;

    Ok(Json(json!({
        "status": "success",
        "data": {
            "range": range,
            "query": range.query()
        }
    })))
}

pub async fn convert_area(
    WithRejection(Query(query_params), _): WithRejection<Query<AreaConvertQueryDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    query_params.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let from = AreaUnit::parse(&query_params.from).map_err(ServiceError::from)?;
    let to = AreaUnit::parse(&query_params.to).map_err(ServiceError::from)?;
    let value = area::convert(query_params.value, from, to).map_err(ServiceError::from)?;

    Ok(Json(json!({
        "status": "success",
        "data": {
            "value": query_params.value,
            "from": from,
            "to": to,
            "result": (value * 10_000.0).round() / 10_000.0
        }
    })))
}
