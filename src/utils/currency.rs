//! Currency formatting for listing prices.
//!
//! Prices arrive as plain numbers from the property API; the panel shows
//! them rounded to whole units with the locale's digit grouping.
use serde::{Deserialize, Serialize};

use crate::models::propertymodel::PLACEHOLDER;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrencyLocale {
    /// Rupees, lakh/crore grouping: ₹12,34,567
    #[default]
    EnIn,
    /// Dollars, thousands grouping: $1,234,567
    EnUs,
}

impl CurrencyLocale {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "en-in" => Some(CurrencyLocale::EnIn),
            "en-us" => Some(CurrencyLocale::EnUs),
            _ => None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            CurrencyLocale::EnIn => "₹",
            CurrencyLocale::EnUs => "$",
        }
    }
}

/// Insert group separators into a run of ASCII digits.
fn group_digits(digits: &str, locale: CurrencyLocale) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let group = match locale {
        CurrencyLocale::EnIn => 2,
        CurrencyLocale::EnUs => 3,
    };

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(group);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}

/// Format a price, or the placeholder when there is none.
pub fn format_price(price: Option<f64>, locale: CurrencyLocale) -> String {
    let Some(price) = price.filter(|p| p.is_finite()) else {
        return PLACEHOLDER.to_string();
    };
    let rounded = price.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!("{}{}{}", sign, locale.symbol(), group_digits(&digits, locale))
}
