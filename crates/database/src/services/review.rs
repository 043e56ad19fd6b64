use crate::entities::reviews;
use crate::error::{ServiceError, ServiceResult};
use crate::services::{aggregate::RatingAggregateService, lookup};
use models::ratings::Ratings;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

pub struct ReviewService;

impl ReviewService {
    /// Submits a student's rating of a teacher. A second submission for the
    /// same pair updates the existing review in place; a pair whose review
    /// was soft-deleted gets that record resurrected instead of a new row.
    /// The guard and the aggregate recompute commit together.
    pub async fn submit_review(
        db: &DatabaseConnection,
        student_id: Uuid,
        teacher_id: Uuid,
        course_id: Option<Uuid>,
        ratings: Ratings,
    ) -> ServiceResult<reviews::Model> {
        ratings.validate()?;
        lookup::active_user(db, student_id).await?;
        lookup::active_teacher(db, teacher_id).await?;
        if let Some(course_id) = course_id {
            lookup::active_course(db, course_id).await?;
        }

        let txn = db.begin().await?;
        let review = Self::upsert_active(&txn, student_id, teacher_id, course_id, ratings).await?;
        RatingAggregateService::recompute_in(&txn, teacher_id).await?;
        txn.commit().await?;
        Ok(review)
    }

    /// Soft-deletes a review and brings the teacher's aggregate back in
    /// line with the shrunken active set.
    pub async fn delete_review(db: &DatabaseConnection, review_id: Uuid) -> ServiceResult<()> {
        let review = reviews::Entity::find_by_id(review_id)
            .filter(reviews::Column::Active.eq(true))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("review"))?;

        let teacher_id = review.teacher_id;
        let txn = db.begin().await?;

        let mut model: reviews::ActiveModel = review.into();
        model.active = Set(false);
        model.updated_at = Set(lookup::now());
        model.update(&txn).await?;

        RatingAggregateService::recompute_in(&txn, teacher_id).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Three-step uniqueness guard for the (student, teacher) pair:
    /// update the active record, else resurrect the tombstone, else insert.
    async fn upsert_active<C: ConnectionTrait>(
        db: &C,
        student_id: Uuid,
        teacher_id: Uuid,
        course_id: Option<Uuid>,
        ratings: Ratings,
    ) -> ServiceResult<reviews::Model> {
        let pair = reviews::Entity::find()
            .filter(reviews::Column::StudentId.eq(student_id))
            .filter(reviews::Column::TeacherId.eq(teacher_id));

        if let Some(existing) = pair
            .clone()
            .filter(reviews::Column::Active.eq(true))
            .one(db)
            .await?
        {
            let mut model: reviews::ActiveModel = existing.into();
            model.ratings = Set(ratings);
            model.course_id = Set(course_id);
            model.updated_at = Set(lookup::now());
            return Ok(model.update(db).await?);
        }

        if let Some(tombstone) = pair
            .filter(reviews::Column::Active.eq(false))
            .order_by_desc(reviews::Column::UpdatedAt)
            .one(db)
            .await?
        {
            let mut model: reviews::ActiveModel = tombstone.into();
            model.active = Set(true);
            model.ratings = Set(ratings);
            model.course_id = Set(course_id);
            model.updated_at = Set(lookup::now());
            return Ok(model.update(db).await?);
        }

        let now = lookup::now();
        let model = reviews::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            teacher_id: Set(teacher_id),
            course_id: Set(course_id),
            ratings: Set(ratings),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(db).await?)
    }
}
