// utils/area.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaUnit {
    SqFt,
    SqM,
    SqYd,
    Acre,
    Hectare,
    Cent,
    Guntha,
    Ground,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AreaError {
    #[error("Unknown area unit '{0}'")]
    UnknownUnit(String),

    #[error("Area must be a non-negative number")]
    InvalidValue,
}

impl AreaUnit {
    pub fn parse(unit: &str) -> Result<Self, AreaError> {
        let normalized: String = unit
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '.')
            .collect();

        let parsed = match normalized.as_str() {
            "sqft" | "squarefeet" | "squarefoot" | "ft2" => AreaUnit::SqFt,
            "sqm" | "sqmt" | "squaremeter" | "squaremeters" | "squaremetre" | "squaremetres" | "m2" => AreaUnit::SqM,
            "sqyd" | "squareyard" | "squareyards" | "gaj" => AreaUnit::SqYd,
            "acre" | "acres" => AreaUnit::Acre,
            "hectare" | "hectares" | "ha" => AreaUnit::Hectare,
            "cent" | "cents" => AreaUnit::Cent,
            "guntha" | "gunthas" => AreaUnit::Guntha,
            "ground" | "grounds" => AreaUnit::Ground,
            _ => return Err(AreaError::UnknownUnit(unit.to_string())),
        };
        Ok(parsed)
    }

    /// How many square feet one unit covers.
    fn square_feet(&self) -> f64 {
        match self {
            AreaUnit::SqFt => 1.0,
            AreaUnit::SqM => 10.763_910_416_709_722,
            AreaUnit::SqYd => 9.0,
            AreaUnit::Acre => 43_560.0,
            AreaUnit::Hectare => 107_639.104_167_097_22,
            AreaUnit::Cent => 435.6,
            AreaUnit::Guntha => 1_089.0,
            AreaUnit::Ground => 2_400.0,
        }
    }
}

pub fn convert(value: f64, from: AreaUnit, to: AreaUnit) -> Result<f64, AreaError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AreaError::InvalidValue);
    }
    if from == to {
        return Ok(value);
    }
    Ok(value * from.square_feet() / to.square_feet())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn converts_common_units() {
        assert!(close(convert(1.0, AreaUnit::Acre, AreaUnit::SqFt).unwrap(), 43_560.0));
        assert!(close(convert(1.0, AreaUnit::Hectare, AreaUnit::Acre).unwrap(), 2.471_053_814_671_653));
        assert!(close(convert(100.0, AreaUnit::SqYd, AreaUnit::SqFt).unwrap(), 900.0));
        assert!(close(convert(1.0, AreaUnit::Acre, AreaUnit::Cent).unwrap(), 100.0));
        assert!(close(convert(1.0, AreaUnit::Acre, AreaUnit::Guntha).unwrap(), 40.0));
    }

    #[test]
    fn same_unit_is_identity() {
        assert_eq!(convert(1234.5, AreaUnit::SqM, AreaUnit::SqM), Ok(1234.5));
    }

    #[test]
    fn rejects_negative_and_nan() {
        assert_eq!(convert(-1.0, AreaUnit::SqFt, AreaUnit::SqM), Err(AreaError::InvalidValue));
        assert_eq!(convert(f64::NAN, AreaUnit::SqFt, AreaUnit::SqM), Err(AreaError::InvalidValue));
    }

    #[test]
    fn parses_aliases() {
        assert_eq!(AreaUnit::parse("Sq. Ft."), Ok(AreaUnit::SqFt));
        assert_eq!(AreaUnit::parse("gaj"), Ok(AreaUnit::SqYd));
        assert_eq!(AreaUnit::parse("square metres"), Ok(AreaUnit::SqM));
        assert_eq!(AreaUnit::parse("bigha"), Err(AreaError::UnknownUnit("bigha".to_string())));
    }
}
