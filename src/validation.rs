//! Intake checks for the raw text a user types into the trip form.
//!
//! Only presence and numeric shape are checked here. Ordering of the
//! odometer readings and positivity of the fuel quantity belong to
//! [`Trip::record`](crate::models::trip::Trip::record).

use serde::Deserialize;
use thiserror::Error;

use crate::models::trip::TripCandidate;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please fill in the {0} field.")]
    MissingField(&'static str),
    #[error("The {field} field must be a number (got \"{value}\").")]
    NotANumber { field: &'static str, value: String },
    #[error("Invalid input. End odometer must be greater than start, and gallons must be positive.")]
    InvalidReadings,
}

/// The trip form exactly as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripForm {
    #[serde(default, rename = "startOdometer")]
    pub start_odometer: String,
    #[serde(default, rename = "endOdometer")]
    pub end_odometer: String,
    #[serde(default)]
    pub gallons: String,
}

impl TripForm {
    pub fn parse(&self) -> Result<TripCandidate, ValidationError> {
        Ok(TripCandidate {
            start_odometer: parse_number("start odometer", &self.start_odometer)?,
            end_odometer: parse_number("end odometer", &self.end_odometer)?,
            gallons: parse_number("gallons", &self.gallons)?,
        })
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::NotANumber {
            field,
            value: trimmed.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(start: &str, end: &str, gallons: &str) -> TripForm {
        TripForm {
            start_odometer: start.into(),
            end_odometer: end.into(),
            gallons: gallons.into(),
        }
    }

    #[test]
    fn parses_trimmed_numbers() {
        let candidate = form(" 50000 ", "50300", "10.5").parse().unwrap();
        assert_eq!(candidate.start_odometer, 50000.0);
        assert_eq!(candidate.end_odometer, 50300.0);
        assert_eq!(candidate.gallons, 10.5);
    }

    #[test]
    fn rejects_empty_fields() {
        assert_eq!(
            form("", "50300", "10").parse(),
            Err(ValidationError::MissingField("start odometer"))
        );
        assert_eq!(
            form("50000", "50300", "   ").parse(),
            Err(ValidationError::MissingField("gallons"))
        );
    }

    #[test]
    fn rejects_garbage_and_non_finite_values() {
        assert!(matches!(
            form("50000", "abc", "10").parse(),
            Err(ValidationError::NotANumber { field: "end odometer", .. })
        ));
        assert!(matches!(
            form("NaN", "50300", "10").parse(),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            form("50000", "50300", "inf").parse(),
            Err(ValidationError::NotANumber { .. })
        ));
    }

    #[test]
    fn leaves_ordering_to_the_trip_model() {
        let candidate = form("50300", "50000", "-1").parse().unwrap();
        assert_eq!(candidate.gallons, -1.0);
    }
}
