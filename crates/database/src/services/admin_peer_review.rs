use crate::entities::admin_peer_reviews;
use crate::error::{ServiceError, ServiceResult};
use crate::services::lookup;
use models::{ratings::Ratings, role::Role};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

pub struct AdminPeerReviewService;

impl AdminPeerReviewService {
    /// Submits an admin-to-admin review. A non-admin target is reported as
    /// not-found, the same answer as a nonexistent user.
    pub async fn submit_admin_peer_review(
        db: &DatabaseConnection,
        reviewer_id: Uuid,
        target_id: Uuid,
        ratings: Ratings,
    ) -> ServiceResult<admin_peer_reviews::Model> {
        ratings.validate()?;
        lookup::active_user(db, reviewer_id).await?;
        lookup::active_user_with_role(db, target_id, Role::Admin).await?;

        let txn = db.begin().await?;
        let review = Self::upsert_active(&txn, reviewer_id, target_id, ratings).await?;
        txn.commit().await?;
        Ok(review)
    }

    pub async fn delete_admin_peer_review(
        db: &DatabaseConnection,
        review_id: Uuid,
    ) -> ServiceResult<()> {
        let review = admin_peer_reviews::Entity::find_by_id(review_id)
            .filter(admin_peer_reviews::Column::Active.eq(true))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("admin peer review"))?;

        let mut model: admin_peer_reviews::ActiveModel = review.into();
        model.active = Set(false);
        model.updated_at = Set(lookup::now());
        model.update(db).await?;
        Ok(())
    }

    async fn upsert_active<C: ConnectionTrait>(
        db: &C,
        reviewer_id: Uuid,
        target_id: Uuid,
        ratings: Ratings,
    ) -> ServiceResult<admin_peer_reviews::Model> {
        let pair = admin_peer_reviews::Entity::find()
            .filter(admin_peer_reviews::Column::ReviewerId.eq(reviewer_id))
            .filter(admin_peer_reviews::Column::TargetId.eq(target_id));

        if let Some(existing) = pair
            .clone()
            .filter(admin_peer_reviews::Column::Active.eq(true))
            .one(db)
            .await?
        {
            let mut model: admin_peer_reviews::ActiveModel = existing.into();
            model.ratings = Set(ratings);
            model.updated_at = Set(lookup::now());
            return Ok(model.update(db).await?);
        }

        if let Some(tombstone) = pair
            .filter(admin_peer_reviews::Column::Active.eq(false))
            .order_by_desc(admin_peer_reviews::Column::UpdatedAt)
            .one(db)
            .await?
        {
            let mut model: admin_peer_reviews::ActiveModel = tombstone.into();
            model.active = Set(true);
            model.ratings = Set(ratings);
            model.updated_at = Set(lookup::now());
            return Ok(model.update(db).await?);
        }

        let now = lookup::now();
        let model = admin_peer_reviews::ActiveModel {
            id: Set(Uuid::new_v4()),
            reviewer_id: Set(reviewer_id),
            target_id: Set(target_id),
            ratings: Set(ratings),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(db).await?)
    }
}
