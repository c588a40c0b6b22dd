use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::{
    models::{
        notificationmodel::Notification,
        propertymodel::{PropertyRecord, PLACEHOLDER},
    },
    service::{
        aggregator::{Bucket, MonthBucket, Summary},
        column_filter::{Column, ColumnFilterError, ColumnFilterSet},
        date_range::{DateRangeError, DateRangeFilter, ResolvedRange},
        fetch_state::FetchState,
        paginator::Paginator,
        trailing_window::TrailingWindow,
    },
    utils::currency::{format_price, CurrencyLocale},
};

/// Query string shared by the dashboard endpoints. Each handler reads the
/// parts it needs.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQueryDto {
    // Date range
    pub range: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,

    #[validate(length(max = 100, message = "Search must be at most 100 characters"))]
    pub q: Option<String>,

    #[validate(range(min = 1, max = 1000, message = "Limit must be between 1 and 1000"))]
    pub limit: Option<usize>,

    // Column filters
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub building_type: Option<String>,
    pub property_for: Option<String>,
    pub sale_type: Option<String>,
    pub availability: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,

    // Charts
    pub by: Option<String>,
    pub window: Option<String>,
}

impl DashboardQueryDto {
    pub fn date_filter(&self) -> Result<DateRangeFilter, DateRangeError> {
        DateRangeFilter::from_parts(
            self.range.as_deref(),
            self.month.as_deref(),
            self.year.as_deref(),
            self.from.as_deref(),
            self.to.as_deref(),
        )
    }

    pub fn column_filters(&self) -> ColumnFilterSet {
        let mut set = ColumnFilterSet::new();
        for column in Column::ALL {
            let value = match column {
                Column::Type => &self.property_type,
                Column::BuildingType => &self.building_type,
                Column::PropertyFor => &self.property_for,
                Column::SaleType => &self.sale_type,
                Column::Availability => &self.availability,
                Column::Location => &self.location,
                Column::Status => &self.status,
            };
            set.set(column, value.clone());
        }
        set
    }

    pub fn paginator(&self) -> Paginator {
        self.limit.map(Paginator::with_limit).unwrap_or_default()
    }

    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn group_by(&self) -> Result<Column, ColumnFilterError> {
        match self.by.as_deref() {
            None => Ok(Column::Type),
            Some(key) => Column::parse(key),
        }
    }

    pub fn trailing_window(&self) -> Option<TrailingWindow> {
        match self.window.as_deref() {
            None => Some(TrailingWindow::All),
            Some(value) => TrailingWindow::parse(value),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AreaConvertQueryDto {
    #[validate(range(min = 0.0, message = "Area must be a non-negative number"))]
    pub value: f64,
    #[validate(length(min = 1, message = "Source unit is required"))]
    pub from: String,
    #[validate(length(min = 1, message = "Target unit is required"))]
    pub to: String,
}

/// One table row, with display strings precomputed.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRowDto {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub building_type: String,
    pub property_for: String,
    pub sale_type: String,
    pub availability: String,
    pub status: String,
    pub price: Option<f64>,
    pub price_display: String,
    pub area: Option<f64>,
    pub area_unit: Option<String>,
    pub area_display: String,
    pub location: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PropertyRowDto {
    pub fn from_record(record: &PropertyRecord, locale: CurrencyLocale) -> Self {
        let area_display = match (record.area, record.area_unit.as_deref()) {
            (Some(area), Some(unit)) => format!("{} {}", area, unit),
            (Some(area), None) => area.to_string(),
            (None, _) => PLACEHOLDER.to_string(),
        };
        let location = match record.location() {
            location if location.is_empty() => PLACEHOLDER.to_string(),
            location => location,
        };

        PropertyRowDto {
            id: record.id.clone(),
            title: record.title.clone(),
            property_type: record.property_type.clone(),
            building_type: record.building_type.clone(),
            property_for: record.property_for.clone(),
            sale_type: record.sale_type.clone(),
            availability: record.availability.clone(),
            status: record.status.clone(),
            price: record.price,
            price_display: format_price(record.price, locale),
            area: record.area,
            area_unit: record.area_unit.clone(),
            area_display,
            location,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RangeDto {
    pub label: String,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl From<&ResolvedRange> for RangeDto {
    fn from(range: &ResolvedRange) -> Self {
        RangeDto {
            label: range.label.clone(),
            from: range.from,
            to: range.to,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTableDto {
    pub rows: Vec<PropertyRowDto>,
    pub total: usize,
    pub display_limit: usize,
    pub has_more: bool,
    pub next_limit: usize,
    pub range: RangeDto,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionDto {
    pub by: Column,
    pub window: TrailingWindow,
    pub buckets: Vec<Bucket>,
    pub total: usize,
    pub range: RangeDto,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendDto {
    pub year: i32,
    pub months: Vec<MonthBucket>,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewDto {
    pub stats: Value,
    pub broker_users: u64,
    pub summary: Summary,
    pub total_value_display: String,
    pub recent: Vec<PropertyRowDto>,
    pub range: RangeDto,
    pub messages: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsDto {
    pub notifications: Vec<Notification>,
    pub unread: usize,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NotificationsDto {
    pub fn from_state(state: &FetchState<Vec<Notification>>) -> Self {
        let notifications = state.loaded().cloned().unwrap_or_default();
        NotificationsDto {
            unread: notifications.iter().filter(|n| !n.read).count(),
            notifications,
            state: state.name(),
            message: state.message().map(str::to_string),
        }
    }
}
