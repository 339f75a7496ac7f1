//! Typed inputs with explicit field validation, run at the transport
//! edge before any store access.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::AttendeeAnswer;
use crate::utils::error::AppError;

const TEXT_MIN: usize = 5;
const TEXT_MAX: usize = 255;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventDto {
    pub name: String,
    pub description: String,
    pub when: String,
    pub address: String,
}

impl CreateEventDto {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_name(&self.name)?;
        validate_text_length("description", &self.description)?;
        validate_text_length("address", &self.address)?;
        parse_when(&self.when)?;
        Ok(())
    }
}

/// Absent fields keep their stored values and are never written back
/// as nulls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub when: Option<String>,
    pub address: Option<String>,
}

impl UpdateEventDto {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_text_length("description", description)?;
        }
        if let Some(address) = &self.address {
            validate_text_length("address", address)?;
        }
        if let Some(when) = &self.when {
            parse_when(when)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAttendeeDto {
    #[serde(default)]
    pub answer: AttendeeAnswer,
}

pub fn parse_when(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| AppError::ValidationError(format!("Invalid 'when' date-time '{}': {}", raw, e)))
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::ValidationError(
            "The name must have a value".to_string(),
        ));
    }
    Ok(())
}

fn validate_text_length(field: &str, value: &str) -> Result<(), AppError> {
    let len = value.chars().count();
    if len < TEXT_MIN || len > TEXT_MAX {
        return Err(AppError::ValidationError(format!(
            "The {} must be between {} and {} characters",
            field, TEXT_MIN, TEXT_MAX
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_create() -> CreateEventDto {
        CreateEventDto {
            name: "Launch party".to_string(),
            description: "Celebrating the 1.0 release".to_string(),
            when: "2024-06-01T10:00:00Z".to_string(),
            address: "1 Main Street".to_string(),
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut dto = valid_create();
        dto.name = String::new();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn description_length_bounds_are_inclusive() {
        let mut dto = valid_create();
        dto.description = "x".repeat(4);
        assert!(dto.validate().is_err());
        dto.description = "x".repeat(5);
        assert!(dto.validate().is_ok());
        dto.description = "x".repeat(255);
        assert!(dto.validate().is_ok());
        dto.description = "x".repeat(256);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn malformed_when_is_rejected_before_any_write() {
        let mut dto = valid_create();
        dto.when = "next tuesday".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn when_parses_to_utc() {
        let parsed = parse_when("2024-06-01T12:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn partial_update_validates_only_present_fields() {
        let dto = UpdateEventDto {
            address: Some("5 North Quay".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_ok());

        let dto = UpdateEventDto {
            when: Some("not-a-date".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn attendee_answer_defaults_to_maybe_when_omitted() {
        let dto: CreateAttendeeDto = serde_json::from_str("{}").unwrap();
        assert_eq!(dto.answer, AttendeeAnswer::Maybe);
        let dto: CreateAttendeeDto = serde_json::from_str(r#"{"answer": 1}"#).unwrap();
        assert_eq!(dto.answer, AttendeeAnswer::Accepted);
    }
}
