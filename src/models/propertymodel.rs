use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown in place of any categorical attribute the API did not send.
pub const PLACEHOLDER: &str = "—";

/// A property row after normalization. Nothing downstream of the
/// normalizer ever looks at the raw API JSON, only at this shape.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: String,
    pub title: String,

    // Categorical attributes
    #[serde(rename = "type")]
    pub property_type: String,
    pub building_type: String,
    pub property_for: String,
    pub sale_type: String,
    pub availability: String,
    pub status: String,

    pub price: Option<f64>,
    pub area: Option<f64>,
    pub area_unit: Option<String>,

    // Location
    pub locality: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PropertyRecord {
    /// "locality, city, state" with empty fragments skipped.
    pub fn location(&self) -> String {
        [&self.locality, &self.city, &self.state]
            .iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Categorical value as the column filters and buckets see it: the
/// placeholder reads as an empty string.
pub fn categorical_value(value: &str) -> &str {
    let value = value.trim();
    if value == PLACEHOLDER {
        ""
    } else {
        value
    }
}

#[cfg(test)]
pub(crate) fn sample_record(id: &str) -> PropertyRecord {
    PropertyRecord {
        id: id.to_string(),
        title: "Flat in Pune".to_string(),
        property_type: "Flat".to_string(),
        building_type: PLACEHOLDER.to_string(),
        property_for: PLACEHOLDER.to_string(),
        sale_type: PLACEHOLDER.to_string(),
        availability: PLACEHOLDER.to_string(),
        status: PLACEHOLDER.to_string(),
        price: None,
        area: None,
        area_unit: None,
        locality: None,
        city: Some("Pune".to_string()),
        state: None,
        created_at: None,
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_skips_empty_fragments() {
        let mut record = sample_record("1");
        record.locality = Some("Baner".to_string());
        record.city = Some("  ".to_string());
        record.state = Some("Maharashtra".to_string());

        assert_eq!(record.location(), "Baner, Maharashtra");
    }

    #[test]
    fn location_is_empty_without_fragments() {
        let mut record = sample_record("1");
        record.city = None;
        assert_eq!(record.location(), "");
    }

    #[test]
    fn placeholder_reads_as_empty() {
        assert_eq!(categorical_value(PLACEHOLDER), "");
        assert_eq!(categorical_value(" Villa "), "Villa");
    }
}
