// service/column_filter.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::propertymodel::{categorical_value, PropertyRecord};

/// Value meaning "no filter on this column".
pub const ALL_SENTINEL: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Column {
    Type,
    BuildingType,
    PropertyFor,
    SaleType,
    Availability,
    Location,
    Status,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColumnFilterError {
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Type,
        Column::BuildingType,
        Column::PropertyFor,
        Column::SaleType,
        Column::Availability,
        Column::Location,
        Column::Status,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Column::Type => "type",
            Column::BuildingType => "buildingType",
            Column::PropertyFor => "propertyFor",
            Column::SaleType => "saleType",
            Column::Availability => "availability",
            Column::Location => "location",
            Column::Status => "status",
        }
    }

    pub fn parse(key: &str) -> Result<Self, ColumnFilterError> {
        Column::ALL
            .into_iter()
            .find(|c| c.key() == key.trim())
            .ok_or_else(|| ColumnFilterError::UnknownColumn(key.to_string()))
    }

    /// The record's value for this column. Missing fields read as "".
    pub fn value(&self, record: &PropertyRecord) -> String {
        match self {
            Column::Type => categorical_value(&record.property_type).to_string(),
            Column::BuildingType => categorical_value(&record.building_type).to_string(),
            Column::PropertyFor => categorical_value(&record.property_for).to_string(),
            Column::SaleType => categorical_value(&record.sale_type).to_string(),
            Column::Availability => categorical_value(&record.availability).to_string(),
            Column::Location => record.location(),
            Column::Status => categorical_value(&record.status).to_string(),
        }
    }
}

/// Exact-match (case-insensitive) constraints, one per column, ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilterSet {
    filters: BTreeMap<Column, String>,
}

impl ColumnFilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: Column, value: impl Into<String>) -> Self {
        self.set(column, Some(value.into()));
        self
    }

    /// Blank values and the `"All"` sentinel clear the column's filter.
    pub fn set(&mut self, column: Column, value: Option<String>) {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() && !v.eq_ignore_ascii_case(ALL_SENTINEL) => {
                self.filters.insert(column, v);
            }
            _ => {
                self.filters.remove(&column);
            }
        }
    }

    pub fn get(&self, column: Column) -> Option<&str> {
        self.filters.get(&column).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn matches(&self, record: &PropertyRecord) -> bool {
        self.filters.iter().all(|(column, required)| {
            column.value(record).trim().to_lowercase() == required.to_lowercase()
        })
    }

    pub fn apply(&self, records: &[PropertyRecord]) -> Vec<PropertyRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}
