use models::ratings::Ratings;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student-to-student review. At least one of the two rating blocks is
/// present on every active record; `teacher_ratings` optionally evaluates a
/// shared instructor and is never folded into teacher aggregates.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "peer_reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reviewer_id: Uuid,
    pub target_id: Uuid,
    pub course_id: Option<Uuid>,
    pub ratings: Option<Ratings>,
    pub teacher_ratings: Option<Ratings>,
    pub active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ReviewerId",
        to = "super::users::Column::Id"
    )]
    Reviewer,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TargetId",
        to = "super::users::Column::Id"
    )]
    Target,
}

impl ActiveModelBehavior for ActiveModel {}
