use crate::entities::{courses, teachers, users};
use crate::error::{ServiceError, ServiceResult};
use chrono::{NaiveDateTime, Utc};
use models::role::Role;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Fetches a user that exists and is not soft-deleted.
pub(crate) async fn active_user<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> ServiceResult<users::Model> {
    users::Entity::find_by_id(id)
        .filter(users::Column::Active.eq(true))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("user"))
}

/// Like [`active_user`] but also requires a specific role. A role mismatch
/// is reported as not-found so callers cannot probe for existence.
pub(crate) async fn active_user_with_role<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    role: Role,
) -> ServiceResult<users::Model> {
    let user = active_user(db, id).await?;
    if user.role != role.as_str() {
        return Err(ServiceError::NotFound("user"));
    }
    Ok(user)
}

pub(crate) async fn active_teacher<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> ServiceResult<teachers::Model> {
    teachers::Entity::find_by_id(id)
        .filter(teachers::Column::Active.eq(true))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("teacher"))
}

pub(crate) async fn active_course<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> ServiceResult<courses::Model> {
    courses::Entity::find_by_id(id)
        .filter(courses::Column::Active.eq(true))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("course"))
}
