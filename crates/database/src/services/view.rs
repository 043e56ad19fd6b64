use crate::entities::{admin_peer_reviews, peer_reviews, reviews, users};
use crate::error::ServiceResult;
use chrono::NaiveDateTime;
use models::ratings::Ratings;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Placeholder substituted for the rater's name on every list read.
/// Not a security boundary; it keeps names out of rendered lists while the
/// rater's id and role stay available for filtering and grouping.
pub const ANONYMOUS_RATER: &str = "Anonymous";

#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub id: Uuid,
    pub rater_name: String,
    pub rater_id: Uuid,
    pub rater_role: String,
    pub teacher_id: Uuid,
    pub course_id: Option<Uuid>,
    pub ratings: Ratings,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeerReviewView {
    pub id: Uuid,
    pub rater_name: String,
    pub rater_id: Uuid,
    pub rater_role: String,
    pub target_id: Uuid,
    pub course_id: Option<Uuid>,
    pub ratings: Option<Ratings>,
    pub teacher_ratings: Option<Ratings>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminPeerReviewView {
    pub id: Uuid,
    pub rater_name: String,
    pub rater_id: Uuid,
    pub rater_role: String,
    pub target_id: Uuid,
    pub ratings: Ratings,
    pub created_at: NaiveDateTime,
}

pub struct ReviewViewService;

impl ReviewViewService {
    pub async fn list_reviews_for_teacher(
        db: &DatabaseConnection,
        teacher_id: Uuid,
    ) -> ServiceResult<Vec<ReviewView>> {
        let records = reviews::Entity::find()
            .filter(reviews::Column::TeacherId.eq(teacher_id))
            .filter(reviews::Column::Active.eq(true))
            .order_by_desc(reviews::Column::CreatedAt)
            .all(db)
            .await?;

        let roles = Self::rater_roles(db, records.iter().map(|r| r.student_id)).await?;
        Ok(records
            .into_iter()
            .map(|review| ReviewView {
                id: review.id,
                rater_name: ANONYMOUS_RATER.to_string(),
                rater_id: review.student_id,
                rater_role: roles.get(&review.student_id).cloned().unwrap_or_default(),
                teacher_id: review.teacher_id,
                course_id: review.course_id,
                ratings: review.ratings,
                created_at: review.created_at,
            })
            .collect())
    }

    pub async fn list_peer_reviews_for_user(
        db: &DatabaseConnection,
        target_id: Uuid,
    ) -> ServiceResult<Vec<PeerReviewView>> {
        let records = peer_reviews::Entity::find()
            .filter(peer_reviews::Column::TargetId.eq(target_id))
            .filter(peer_reviews::Column::Active.eq(true))
            .order_by_desc(peer_reviews::Column::CreatedAt)
            .all(db)
            .await?;

        let roles = Self::rater_roles(db, records.iter().map(|r| r.reviewer_id)).await?;
        Ok(records
            .into_iter()
            .map(|review| PeerReviewView {
                id: review.id,
                rater_name: ANONYMOUS_RATER.to_string(),
                rater_id: review.reviewer_id,
                rater_role: roles.get(&review.reviewer_id).cloned().unwrap_or_default(),
                target_id: review.target_id,
                course_id: review.course_id,
                ratings: review.ratings,
                teacher_ratings: review.teacher_ratings,
                created_at: review.created_at,
            })
            .collect())
    }

    pub async fn list_admin_peer_reviews_for_admin(
        db: &DatabaseConnection,
        target_id: Uuid,
    ) -> ServiceResult<Vec<AdminPeerReviewView>> {
        let records = admin_peer_reviews::Entity::find()
            .filter(admin_peer_reviews::Column::TargetId.eq(target_id))
            .filter(admin_peer_reviews::Column::Active.eq(true))
            .order_by_desc(admin_peer_reviews::Column::CreatedAt)
            .all(db)
            .await?;

        let roles = Self::rater_roles(db, records.iter().map(|r| r.reviewer_id)).await?;
        Ok(records
            .into_iter()
            .map(|review| AdminPeerReviewView {
                id: review.id,
                rater_name: ANONYMOUS_RATER.to_string(),
                rater_id: review.reviewer_id,
                rater_role: roles.get(&review.reviewer_id).cloned().unwrap_or_default(),
                target_id: review.target_id,
                ratings: review.ratings,
                created_at: review.created_at,
            })
            .collect())
    }

    /// One batched fetch of rater roles for a page of reviews.
    async fn rater_roles(
        db: &DatabaseConnection,
        rater_ids: impl Iterator<Item = Uuid>,
    ) -> ServiceResult<HashMap<Uuid, String>> {
        let ids: HashSet<Uuid> = rater_ids.collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let raters = users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(db)
            .await?;
        Ok(raters.into_iter().map(|user| (user.id, user.role)).collect())
    }
}
