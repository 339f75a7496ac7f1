use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;

/// Stored and transmitted as its numeric discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[repr(i16)]
pub enum AttendeeAnswer {
    Accepted = 1,
    Maybe = 2,
    Rejected = 3,
}

impl Default for AttendeeAnswer {
    fn default() -> Self {
        AttendeeAnswer::Maybe
    }
}

impl AttendeeAnswer {
    pub fn from_wire(value: i16) -> Option<Self> {
        match value {
            1 => Some(AttendeeAnswer::Accepted),
            2 => Some(AttendeeAnswer::Maybe),
            3 => Some(AttendeeAnswer::Rejected),
            _ => None,
        }
    }

    pub fn as_wire(self) -> i16 {
        self as i16
    }
}

impl Serialize for AttendeeAnswer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for AttendeeAnswer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i16::deserialize(deserializer)?;
        AttendeeAnswer::from_wire(value).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "answer must be 1 (accepted), 2 (maybe) or 3 (rejected), got {}",
                value
            ))
        })
    }
}

/// At most one row should exist per (event, user) pair; see
/// `AttendeesService::create_or_update`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attendee {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub answer: AttendeeAnswer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_wire_values_are_stable() {
        assert_eq!(AttendeeAnswer::Accepted.as_wire(), 1);
        assert_eq!(AttendeeAnswer::Maybe.as_wire(), 2);
        assert_eq!(AttendeeAnswer::Rejected.as_wire(), 3);
    }

    #[test]
    fn answer_defaults_to_maybe() {
        assert_eq!(AttendeeAnswer::default(), AttendeeAnswer::Maybe);
    }

    #[test]
    fn answer_round_trips_through_json_as_number() {
        let json = serde_json::to_string(&AttendeeAnswer::Rejected).unwrap();
        assert_eq!(json, "3");
        let back: AttendeeAnswer = serde_json::from_str("1").unwrap();
        assert_eq!(back, AttendeeAnswer::Accepted);
    }

    #[test]
    fn answer_rejects_out_of_range_values() {
        assert!(AttendeeAnswer::from_wire(0).is_none());
        assert!(AttendeeAnswer::from_wire(4).is_none());
        assert!(serde_json::from_str::<AttendeeAnswer>("7").is_err());
    }
}
