use crate::entities::peer_reviews;
use crate::error::{ServiceError, ServiceResult};
use crate::services::lookup;
use models::{ratings::Ratings, role::Role};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

pub struct PeerReviewService;

impl PeerReviewService {
    /// Submits a student-to-student review. At least one of the two rating
    /// blocks must be supplied; on resubmission, an omitted block leaves
    /// the stored one untouched. Peer reviews never feed teacher
    /// aggregates, so there is no recompute here.
    pub async fn submit_peer_review(
        db: &DatabaseConnection,
        reviewer_id: Uuid,
        target_id: Uuid,
        ratings: Option<Ratings>,
        teacher_ratings: Option<Ratings>,
        course_id: Option<Uuid>,
    ) -> ServiceResult<peer_reviews::Model> {
        if ratings.is_none() && teacher_ratings.is_none() {
            return Err(ServiceError::Validation(
                "at least one of ratings or teacher_ratings is required".to_string(),
            ));
        }
        if let Some(block) = &ratings {
            block.validate()?;
        }
        if let Some(block) = &teacher_ratings {
            block.validate()?;
        }
        lookup::active_user(db, reviewer_id).await?;
        lookup::active_user_with_role(db, target_id, Role::Student).await?;
        if let Some(course_id) = course_id {
            lookup::active_course(db, course_id).await?;
        }

        let txn = db.begin().await?;
        let review =
            Self::upsert_active(&txn, reviewer_id, target_id, ratings, teacher_ratings, course_id)
                .await?;
        txn.commit().await?;
        Ok(review)
    }

    pub async fn delete_peer_review(db: &DatabaseConnection, review_id: Uuid) -> ServiceResult<()> {
        let review = peer_reviews::Entity::find_by_id(review_id)
            .filter(peer_reviews::Column::Active.eq(true))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("peer review"))?;

        let mut model: peer_reviews::ActiveModel = review.into();
        model.active = Set(false);
        model.updated_at = Set(lookup::now());
        model.update(db).await?;
        Ok(())
    }

    async fn upsert_active<C: ConnectionTrait>(
        db: &C,
        reviewer_id: Uuid,
        target_id: Uuid,
        ratings: Option<Ratings>,
        teacher_ratings: Option<Ratings>,
        course_id: Option<Uuid>,
    ) -> ServiceResult<peer_reviews::Model> {
        let pair = peer_reviews::Entity::find()
            .filter(peer_reviews::Column::ReviewerId.eq(reviewer_id))
            .filter(peer_reviews::Column::TargetId.eq(target_id));

        if let Some(existing) = pair
            .clone()
            .filter(peer_reviews::Column::Active.eq(true))
            .one(db)
            .await?
        {
            // update only the supplied blocks
            let mut model: peer_reviews::ActiveModel = existing.into();
            if ratings.is_some() {
                model.ratings = Set(ratings);
            }
            if teacher_ratings.is_some() {
                model.teacher_ratings = Set(teacher_ratings);
            }
            if course_id.is_some() {
                model.course_id = Set(course_id);
            }
            model.updated_at = Set(lookup::now());
            return Ok(model.update(db).await?);
        }

        if let Some(tombstone) = pair
            .filter(peer_reviews::Column::Active.eq(false))
            .order_by_desc(peer_reviews::Column::UpdatedAt)
            .one(db)
            .await?
        {
            // a resurrected record starts over from this submission's payload
            let mut model: peer_reviews::ActiveModel = tombstone.into();
            model.active = Set(true);
            model.ratings = Set(ratings);
            model.teacher_ratings = Set(teacher_ratings);
            model.course_id = Set(course_id);
            model.updated_at = Set(lookup::now());
            return Ok(model.update(db).await?);
        }

        let now = lookup::now();
        let model = peer_reviews::ActiveModel {
            id: Set(Uuid::new_v4()),
            reviewer_id: Set(reviewer_id),
            target_id: Set(target_id),
            course_id: Set(course_id),
            ratings: Set(ratings),
            teacher_ratings: Set(teacher_ratings),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(db).await?)
    }
}
