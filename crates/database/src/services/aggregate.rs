use crate::entities::{reviews, teachers};
use crate::error::ServiceResult;
use crate::services::lookup;
use log::debug;
use models::ratings::{Ratings, round_one_decimal};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
    prelude::Expr,
};
use uuid::Uuid;

/// Aggregate over a set of rating blocks: the one-decimal mean of the
/// per-review row averages plus the review count. Empty set is `(0, 0)`.
pub fn aggregate(ratings: &[Ratings]) -> (f64, i32) {
    if ratings.is_empty() {
        return (0.0, 0);
    }
    let sum: f64 = ratings.iter().map(Ratings::row_avg).sum();
    let avg = round_one_decimal(sum / ratings.len() as f64);
    (avg, ratings.len() as i32)
}

pub struct RatingAggregateService;

impl RatingAggregateService {
    /// Recomputes a teacher's materialized `avg_rating`/`total_reviews`
    /// from the currently active review set and writes both fields.
    ///
    /// The write is a pure function of current state, so the operation is
    /// idempotent and doubles as the manual reconciliation entrypoint after
    /// a partially applied cascade or merge.
    pub async fn recompute(
        db: &DatabaseConnection,
        teacher_id: Uuid,
    ) -> ServiceResult<(f64, i32)> {
        let txn = db.begin().await?;
        let result = Self::recompute_in(&txn, teacher_id).await?;
        txn.commit().await?;
        Ok(result)
    }

    /// Transaction-composable variant for callers that already hold one.
    pub async fn recompute_in<C: ConnectionTrait>(
        db: &C,
        teacher_id: Uuid,
    ) -> ServiceResult<(f64, i32)> {
        let ratings: Vec<Ratings> = reviews::Entity::find()
            .filter(reviews::Column::TeacherId.eq(teacher_id))
            .filter(reviews::Column::Active.eq(true))
            .all(db)
            .await?
            .into_iter()
            .map(|review| review.ratings)
            .collect();

        let (avg_rating, total_reviews) = aggregate(&ratings);
        debug!("recomputed teacher {teacher_id}: avg {avg_rating}, total {total_reviews}");

        teachers::Entity::update_many()
            .col_expr(teachers::Column::AvgRating, Expr::value(avg_rating))
            .col_expr(teachers::Column::TotalReviews, Expr::value(total_reviews))
            .col_expr(teachers::Column::UpdatedAt, Expr::value(lookup::now()))
            .filter(teachers::Column::Id.eq(teacher_id))
            .exec(db)
            .await?;

        Ok((avg_rating, total_reviews))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_empty_set() {
        assert_eq!(aggregate(&[]), (0.0, 0));
    }

    #[test]
    fn test_aggregate_means_of_row_averages() {
        let ratings = [
            Ratings::uniform(5),
            Ratings::uniform(1),
            Ratings::uniform(3),
        ];
        assert_eq!(aggregate(&ratings), (3.0, 3));

        // dropping the all-ones review shifts the mean to 4.0
        let ratings = [Ratings::uniform(5), Ratings::uniform(3)];
        assert_eq!(aggregate(&ratings), (4.0, 2));
    }

    #[test]
    fn test_aggregate_rounds_to_one_decimal() {
        // row averages 5.0 and 4.2 -> mean 4.6
        let ratings = [Ratings::uniform(5), Ratings::new(4, 4, 4, 4, 5)];
        assert_eq!(aggregate(&ratings), (4.6, 2));

        // row averages 1.0, 1.0, 2.0 -> mean 1.3333 -> 1.3
        let ratings = [
            Ratings::uniform(1),
            Ratings::uniform(1),
            Ratings::uniform(2),
        ];
        assert_eq!(aggregate(&ratings), (1.3, 3));
    }
}
