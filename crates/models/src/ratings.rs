use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest score a single dimension can take
pub const MIN_SCORE: u8 = 1;
/// Highest score a single dimension can take
pub const MAX_SCORE: u8 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("rating dimension '{dimension}' must be between {MIN_SCORE} and {MAX_SCORE}, got {value}")]
pub struct RatingError {
    pub dimension: &'static str,
    pub value: u8,
}

/// A five-dimension rating block. Stored as a JSON column on review-kind
/// records; the same shape is used for teacher reviews, peer reviews, and
/// admin peer reviews.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, Default,
)]
pub struct Ratings {
    pub communication: u8,
    pub collaboration: u8,
    pub ethics: u8,
    pub responsibility: u8,
    pub problem_solving: u8,
}

impl Ratings {
    pub fn new(
        communication: u8,
        collaboration: u8,
        ethics: u8,
        responsibility: u8,
        problem_solving: u8,
    ) -> Self {
        Ratings {
            communication,
            collaboration,
            ethics,
            responsibility,
            problem_solving,
        }
    }

    /// A block with every dimension set to the same score, common in tests
    /// and seed data.
    pub fn uniform(score: u8) -> Self {
        Ratings::new(score, score, score, score, score)
    }

    fn dimensions(&self) -> [(&'static str, u8); 5] {
        [
            ("communication", self.communication),
            ("collaboration", self.collaboration),
            ("ethics", self.ethics),
            ("responsibility", self.responsibility),
            ("problem_solving", self.problem_solving),
        ]
    }

    /// Checks every dimension against the `[MIN_SCORE, MAX_SCORE]` bound.
    /// Must pass before the block is persisted anywhere.
    pub fn validate(&self) -> Result<(), RatingError> {
        for (dimension, value) in self.dimensions() {
            if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                return Err(RatingError { dimension, value });
            }
        }
        Ok(())
    }

    /// Mean of the five dimensions within this single block.
    pub fn row_avg(&self) -> f64 {
        let sum: u32 = self.dimensions().iter().map(|(_, v)| u32::from(*v)).sum();
        f64::from(sum) / 5.0
    }
}

/// Rounds to one decimal place, the precision at which teacher averages are
/// materialized.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(Ratings::uniform(1).validate().is_ok());
        assert!(Ratings::uniform(5).validate().is_ok());
        assert!(Ratings::new(1, 5, 3, 2, 4).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let err = Ratings::uniform(0).validate().unwrap_err();
        assert_eq!(err.dimension, "communication");
        assert_eq!(err.value, 0);

        let err = Ratings::new(3, 3, 3, 3, 6).validate().unwrap_err();
        assert_eq!(err.dimension, "problem_solving");
        assert_eq!(err.value, 6);
    }

    #[test]
    fn test_row_avg() {
        assert_eq!(Ratings::uniform(5).row_avg(), 5.0);
        assert_eq!(Ratings::uniform(1).row_avg(), 1.0);
        assert_eq!(Ratings::new(1, 2, 3, 4, 5).row_avg(), 3.0);
        assert_eq!(Ratings::new(4, 4, 4, 4, 5).row_avg(), 4.2);
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(3.0), 3.0);
        assert_eq!(round_one_decimal(4.25), 4.3);
        assert_eq!(round_one_decimal(2.333333), 2.3);
    }

    #[test]
    fn test_json_round_trip() {
        let ratings = Ratings::new(5, 4, 3, 2, 1);
        let json = serde_json::to_string(&ratings).unwrap();
        let back: Ratings = serde_json::from_str(&json).unwrap();
        assert_eq!(ratings, back);
    }
}
