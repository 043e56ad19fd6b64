use crate::entities::{
    admin_peer_reviews, courses, enrollments, peer_reviews, reviews, teachers, users,
};
use crate::error::{ServiceError, ServiceResult};
use crate::services::{aggregate::RatingAggregateService, lookup};
use log::info;
use models::ids::IdList;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, prelude::Expr,
};
use std::collections::HashSet;
use uuid::Uuid;

/// Soft-delete cascades. Deliberately not wrapped in one transaction: each
/// step is an idempotent function of current state, so a run interrupted
/// partway is completed by invoking the same cascade again (or by calling
/// `RatingAggregateService::recompute` for the affected teachers).
pub struct CascadeService;

impl CascadeService {
    /// Course soft-delete: deactivate the course and its roster, tombstone
    /// dependent enrollments and course-tagged reviews, detach the course
    /// from its teacher, then recompute every teacher whose active review
    /// set shrank.
    pub async fn delete_course(db: &DatabaseConnection, course_id: Uuid) -> ServiceResult<()> {
        // no `active` filter: a retry after a partial run must find the
        // course even though an earlier run already flipped it
        let course = courses::Entity::find_by_id(course_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("course"))?;
        info!("cascading soft-delete of course {course_id}");

        let mut model: courses::ActiveModel = course.clone().into();
        model.active = Set(false);
        model.enrolled_students = Set(IdList::new());
        model.updated_at = Set(lookup::now());
        model.update(db).await?;

        enrollments::Entity::update_many()
            .col_expr(enrollments::Column::Active, Expr::value(false))
            .col_expr(enrollments::Column::UpdatedAt, Expr::value(lookup::now()))
            .filter(enrollments::Column::CourseId.eq(course_id))
            .filter(enrollments::Column::Active.eq(true))
            .exec(db)
            .await?;

        // collect the affected teachers before the reviews disappear from
        // the active set
        let tagged = reviews::Entity::find()
            .filter(reviews::Column::CourseId.eq(course_id))
            .filter(reviews::Column::Active.eq(true))
            .all(db)
            .await?;
        let affected: HashSet<Uuid> = tagged.iter().map(|review| review.teacher_id).collect();

        reviews::Entity::update_many()
            .col_expr(reviews::Column::Active, Expr::value(false))
            .col_expr(reviews::Column::UpdatedAt, Expr::value(lookup::now()))
            .filter(reviews::Column::CourseId.eq(course_id))
            .filter(reviews::Column::Active.eq(true))
            .exec(db)
            .await?;

        if let Some(teacher_id) = course.teacher_id
            && let Some(teacher) = teachers::Entity::find_by_id(teacher_id).one(db).await?
        {
            let mut owned = teacher.courses.clone();
            if owned.remove(course_id) {
                let mut model: teachers::ActiveModel = teacher.into();
                model.courses = Set(owned);
                model.updated_at = Set(lookup::now());
                model.update(db).await?;
            }
        }

        // aggregates last, once the full dependent set has landed
        for teacher_id in affected {
            RatingAggregateService::recompute(db, teacher_id).await?;
        }

        info!("course {course_id} cascade complete");
        Ok(())
    }

    /// User soft-delete: tombstone the user's enrollments, authored
    /// reviews, and peer reviews on either side, fix up course rosters,
    /// recompute affected teachers, and flip the user inactive last so the
    /// cascade's own reads stay self-consistent.
    pub async fn delete_user(db: &DatabaseConnection, user_id: Uuid) -> ServiceResult<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;
        info!("cascading soft-delete of user {user_id}");

        let enrolled = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(user_id))
            .filter(enrollments::Column::Active.eq(true))
            .all(db)
            .await?;
        for enrollment in &enrolled {
            if let Some(course) = courses::Entity::find_by_id(enrollment.course_id)
                .one(db)
                .await?
            {
                let mut roster = course.enrolled_students.clone();
                if roster.remove(user_id) {
                    let mut model: courses::ActiveModel = course.into();
                    model.enrolled_students = Set(roster);
                    model.updated_at = Set(lookup::now());
                    model.update(db).await?;
                }
            }
        }
        enrollments::Entity::update_many()
            .col_expr(enrollments::Column::Active, Expr::value(false))
            .col_expr(enrollments::Column::UpdatedAt, Expr::value(lookup::now()))
            .filter(enrollments::Column::StudentId.eq(user_id))
            .filter(enrollments::Column::Active.eq(true))
            .exec(db)
            .await?;

        let authored = reviews::Entity::find()
            .filter(reviews::Column::StudentId.eq(user_id))
            .filter(reviews::Column::Active.eq(true))
            .all(db)
            .await?;
        let affected: HashSet<Uuid> = authored.iter().map(|review| review.teacher_id).collect();

        reviews::Entity::update_many()
            .col_expr(reviews::Column::Active, Expr::value(false))
            .col_expr(reviews::Column::UpdatedAt, Expr::value(lookup::now()))
            .filter(reviews::Column::StudentId.eq(user_id))
            .filter(reviews::Column::Active.eq(true))
            .exec(db)
            .await?;

        peer_reviews::Entity::update_many()
            .col_expr(peer_reviews::Column::Active, Expr::value(false))
            .col_expr(peer_reviews::Column::UpdatedAt, Expr::value(lookup::now()))
            .filter(
                Condition::any()
                    .add(peer_reviews::Column::ReviewerId.eq(user_id))
                    .add(peer_reviews::Column::TargetId.eq(user_id)),
            )
            .filter(peer_reviews::Column::Active.eq(true))
            .exec(db)
            .await?;

        admin_peer_reviews::Entity::update_many()
            .col_expr(admin_peer_reviews::Column::Active, Expr::value(false))
            .col_expr(
                admin_peer_reviews::Column::UpdatedAt,
                Expr::value(lookup::now()),
            )
            .filter(
                Condition::any()
                    .add(admin_peer_reviews::Column::ReviewerId.eq(user_id))
                    .add(admin_peer_reviews::Column::TargetId.eq(user_id)),
            )
            .filter(admin_peer_reviews::Column::Active.eq(true))
            .exec(db)
            .await?;

        for teacher_id in affected {
            RatingAggregateService::recompute(db, teacher_id).await?;
        }

        let mut model: users::ActiveModel = user.into();
        model.active = Set(false);
        model.updated_at = Set(lookup::now());
        model.update(db).await?;

        info!("user {user_id} cascade complete");
        Ok(())
    }
}
