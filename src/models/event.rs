use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The `attendee_*` fields are derived, not persisted: populated only
/// by the attendee-count query, `None` on every other path. An event
/// with zero attendees reports `Some(0)`, never `None`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub when: DateTime<Utc>,
    pub address: String,
    pub organizer_id: i64,
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_count: Option<i64>,
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_accepted: Option<i64>,
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_maybe: Option<i64>,
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_rejected: Option<i64>,
}

impl Event {
    // Callers must confirm existence first so not-found and forbidden
    // stay distinguishable.
    pub fn is_owner(&self, user_id: i64) -> bool {
        self.organizer_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event(organizer_id: i64) -> Event {
        Event {
            id: 1,
            name: "Team offsite".to_string(),
            description: "Annual planning offsite".to_string(),
            when: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
            address: "12 Harbor Street".to_string(),
            organizer_id,
            attendee_count: None,
            attendee_accepted: None,
            attendee_maybe: None,
            attendee_rejected: None,
        }
    }

    #[test]
    fn is_owner_matches_organizer_id() {
        let event = sample_event(42);
        assert!(event.is_owner(42));
        assert!(!event.is_owner(43));
    }

    #[test]
    fn counts_are_omitted_from_json_when_not_computed() {
        let event = sample_event(1);
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("attendee_count").is_none());
        assert!(json.get("attendee_accepted").is_none());
    }

    #[test]
    fn zero_counts_serialize_as_zero_not_absent() {
        let mut event = sample_event(1);
        event.attendee_count = Some(0);
        event.attendee_accepted = Some(0);
        event.attendee_maybe = Some(0);
        event.attendee_rejected = Some(0);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["attendee_count"], 0);
        assert_eq!(json["attendee_rejected"], 0);
    }
}
