// service/normalizer.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::models::{
    notificationmodel::Notification,
    propertymodel::{PropertyRecord, PLACEHOLDER},
};

const ID_KEYS: &[&str] = &["id", "_id", "propertyId", "property_id"];
const TITLE_KEYS: &[&str] = &["title", "property_title"];
const TYPE_KEYS: &[&str] = &["type", "propertyType", "property_type"];
const BUILDING_TYPE_KEYS: &[&str] = &["buildingType", "building_type"];
const PROPERTY_FOR_KEYS: &[&str] = &["propertyFor", "property_for"];
const SALE_TYPE_KEYS: &[&str] = &["saleType", "sale_type"];
const AVAILABILITY_KEYS: &[&str] = &["availability", "availabilityStatus", "availability_status"];
const STATUS_KEYS: &[&str] = &["status"];
const PRICE_KEYS: &[&str] = &["price", "expectedPrice", "expected_price"];
const AREA_KEYS: &[&str] = &["area", "builtUpArea", "built_up_area"];
const AREA_UNIT_KEYS: &[&str] = &["areaUnit", "area_unit"];
const CREATED_KEYS: &[&str] = &["createdAt", "created_at"];
const UPDATED_KEYS: &[&str] = &["updatedAt", "updated_at"];
const MESSAGE_KEYS: &[&str] = &["message", "body", "text"];
const READ_KEYS: &[&str] = &["read", "isRead", "is_read"];

/// Flatten one raw API row into a [`PropertyRecord`].
///
/// Lookups try every top-level spelling before falling back to the nested
/// `features` object, so a top-level value always wins over `features.*`.
/// Missing categorical fields become [`PLACEHOLDER`]; missing or malformed
/// numbers become `None`. Never fails.
pub fn normalize(raw: &Value) -> PropertyRecord {
    let property_type = categorical(raw, TYPE_KEYS);
    let city = text(raw, &["city"]);

    let title = text(raw, TITLE_KEYS).unwrap_or_else(|| {
        let kind = if property_type == PLACEHOLDER {
            "Property"
        } else {
            property_type.as_str()
        };
        match &city {
            Some(city) => format!("{} in {}", kind, city),
            None => kind.to_string(),
        }
    });

    PropertyRecord {
        id: lookup(raw, ID_KEYS).map(scalar_to_string).unwrap_or_default(),
        title,
        property_type,
        building_type: categorical(raw, BUILDING_TYPE_KEYS),
        property_for: categorical(raw, PROPERTY_FOR_KEYS),
        sale_type: categorical(raw, SALE_TYPE_KEYS),
        availability: categorical(raw, AVAILABILITY_KEYS),
        status: categorical(raw, STATUS_KEYS),
        price: lookup(raw, PRICE_KEYS).and_then(number),
        area: lookup(raw, AREA_KEYS).and_then(number),
        area_unit: text(raw, AREA_UNIT_KEYS),
        locality: text(raw, &["locality"]),
        city,
        state: text(raw, &["state"]),
        created_at: lookup(raw, CREATED_KEYS).and_then(timestamp),
        updated_at: lookup(raw, UPDATED_KEYS).and_then(timestamp),
    }
}

pub fn normalize_all(rows: &[Value]) -> Vec<PropertyRecord> {
    rows.iter().map(normalize).collect()
}

/// Notification rows get the same leniency: numeric ids, date-only or epoch
/// timestamps and stringly booleans are all accepted.
pub fn normalize_notification(raw: &Value) -> Notification {
    Notification {
        id: lookup(raw, ID_KEYS).map(scalar_to_string).unwrap_or_default(),
        title: text(raw, TITLE_KEYS).unwrap_or_default(),
        message: text(raw, MESSAGE_KEYS).unwrap_or_default(),
        read: lookup(raw, READ_KEYS).map_or(false, flag),
        created_at: lookup(raw, CREATED_KEYS).and_then(timestamp),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn lookup<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let flat = keys
        .iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| is_present(value));

    flat.or_else(|| {
        let features = raw.get("features")?;
        keys.iter()
            .filter_map(|key| features.get(*key))
            .find(|value| is_present(value))
    })
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn text(raw: &Value, keys: &[&str]) -> Option<String> {
    lookup(raw, keys)
        .map(scalar_to_string)
        .filter(|s| !s.is_empty())
}

fn categorical(raw: &Value, keys: &[&str]) -> String {
    text(raw, keys).unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    }
}

fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => parse_timestamp(s.trim()),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
