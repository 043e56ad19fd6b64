use chrono::NaiveDateTime;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on meetings a single course can carry.
pub const MAX_MEETINGS: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeetingError {
    #[error("course already has {MAX_MEETINGS} meetings")]
    Full,
    #[error("meeting number {0} already exists for this course")]
    DuplicateNumber(i32),
}

/// A single numbered class meeting. Consumed by time-windowed analytics
/// outside this crate; never part of rating aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingSlot {
    pub number: i32,
    pub held_at: NaiveDateTime,
}

/// The bounded, numbered meeting set stored as a JSON column on courses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct MeetingSlots(pub Vec<MeetingSlot>);

impl MeetingSlots {
    pub fn new() -> Self {
        MeetingSlots(Vec::new())
    }

    pub fn push(&mut self, slot: MeetingSlot) -> Result<(), MeetingError> {
        if self.0.len() >= MAX_MEETINGS {
            return Err(MeetingError::Full);
        }
        if self.0.iter().any(|existing| existing.number == slot.number) {
            return Err(MeetingError::DuplicateNumber(slot.number));
        }
        self.0.push(slot);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn slot(number: i32) -> MeetingSlot {
        MeetingSlot {
            number,
            held_at: NaiveDate::from_ymd_opt(2025, 9, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_push_rejects_duplicate_number() {
        let mut meetings = MeetingSlots::new();
        meetings.push(slot(1)).unwrap();
        assert_eq!(
            meetings.push(slot(1)).unwrap_err(),
            MeetingError::DuplicateNumber(1)
        );
        assert_eq!(meetings.len(), 1);
    }

    #[test]
    fn test_push_enforces_bound() {
        let mut meetings = MeetingSlots::new();
        for number in 0..MAX_MEETINGS as i32 {
            meetings.push(slot(number)).unwrap();
        }
        assert_eq!(
            meetings.push(slot(MAX_MEETINGS as i32)).unwrap_err(),
            MeetingError::Full
        );
    }
}
