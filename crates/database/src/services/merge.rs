use crate::entities::{courses, reviews, teachers};
use crate::error::ServiceResult;
use crate::services::{aggregate::RatingAggregateService, lookup};
use futures::future::try_join_all;
use log::info;
use models::ids::IdList;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, prelude::Expr,
};
use uuid::Uuid;

pub struct MergeService;

impl MergeService {
    /// Merges duplicate teacher identities: every review and course
    /// referencing a source id is rewritten to the target, then aggregates
    /// are re-derived for the target and for every source (which settle to
    /// `(0, 0)` once nothing references them). Expressed as rewrite +
    /// recompute, the operation is safe to re-run; a second invocation with
    /// the same arguments finds nothing left to move.
    ///
    /// Returns the number of reassigned references.
    pub async fn merge_teachers(
        db: &DatabaseConnection,
        target_id: Uuid,
        source_ids: &[Uuid],
    ) -> ServiceResult<u64> {
        lookup::active_teacher(db, target_id).await?;

        // tolerate the target showing up in its own source list
        let sources: Vec<Uuid> = source_ids
            .iter()
            .copied()
            .filter(|id| *id != target_id)
            .collect();
        if sources.is_empty() {
            return Ok(0);
        }
        info!("merging teachers {sources:?} into {target_id}");

        // tombstoned references move too, so a later resurrect lands on the
        // surviving identity
        let moved_reviews = reviews::Entity::update_many()
            .col_expr(reviews::Column::TeacherId, Expr::value(target_id))
            .col_expr(reviews::Column::UpdatedAt, Expr::value(lookup::now()))
            .filter(reviews::Column::TeacherId.is_in(sources.clone()))
            .exec(db)
            .await?
            .rows_affected;

        let source_courses = courses::Entity::find()
            .filter(courses::Column::TeacherId.is_in(sources.clone()))
            .all(db)
            .await?;
        let moved_courses = courses::Entity::update_many()
            .col_expr(courses::Column::TeacherId, Expr::value(target_id))
            .col_expr(courses::Column::UpdatedAt, Expr::value(lookup::now()))
            .filter(courses::Column::TeacherId.is_in(sources.clone()))
            .exec(db)
            .await?
            .rows_affected;

        // keep the denormalized course lists in step with the rewrite
        if !source_courses.is_empty()
            && let Some(target) = teachers::Entity::find_by_id(target_id).one(db).await?
        {
            let mut owned = target.courses.clone();
            let mut changed = false;
            for course in &source_courses {
                changed |= owned.insert(course.id);
            }
            if changed {
                let mut model: teachers::ActiveModel = target.into();
                model.courses = Set(owned);
                model.updated_at = Set(lookup::now());
                model.update(db).await?;
            }
        }
        for source_id in &sources {
            if let Some(source) = teachers::Entity::find_by_id(*source_id).one(db).await?
                && !source.courses.is_empty()
            {
                let mut model: teachers::ActiveModel = source.into();
                model.courses = Set(IdList::new());
                model.updated_at = Set(lookup::now());
                model.update(db).await?;
            }
        }

        let recomputes = std::iter::once(target_id)
            .chain(sources.iter().copied())
            .map(|teacher_id| RatingAggregateService::recompute(db, teacher_id));
        try_join_all(recomputes).await?;

        let reassigned = moved_reviews + moved_courses;
        info!("merge into {target_id} reassigned {reassigned} references");
        Ok(reassigned)
    }
}
