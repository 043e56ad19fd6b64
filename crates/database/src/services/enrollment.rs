use crate::entities::{courses, enrollments};
use crate::error::{ServiceError, ServiceResult};
use crate::services::lookup;
use models::enrollment::EnrollmentStatus;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

pub struct EnrollmentService;

impl EnrollmentService {
    /// Enrolls a student in a course. Re-enrolling after an unenroll
    /// resurrects the prior record (same id, fresh `enrolled_at`) rather
    /// than inserting a second row for the pair. The course roster is
    /// updated in the same transaction.
    pub async fn enroll(
        db: &DatabaseConnection,
        student_id: Uuid,
        course_id: Uuid,
    ) -> ServiceResult<enrollments::Model> {
        lookup::active_user(db, student_id).await?;
        let course = lookup::active_course(db, course_id).await?;

        let txn = db.begin().await?;
        let enrollment = Self::upsert_active(&txn, student_id, course_id).await?;

        let mut roster = course.enrolled_students.clone();
        if roster.insert(student_id) {
            let mut model: courses::ActiveModel = course.into();
            model.enrolled_students = Set(roster);
            model.updated_at = Set(lookup::now());
            model.update(&txn).await?;
        }

        txn.commit().await?;
        Ok(enrollment)
    }

    /// Soft-deletes the active enrollment for the pair and drops the
    /// student from the course roster. `status` is left as-is; it records
    /// progress, not existence.
    pub async fn unenroll(
        db: &DatabaseConnection,
        student_id: Uuid,
        course_id: Uuid,
    ) -> ServiceResult<()> {
        let enrollment = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .filter(enrollments::Column::CourseId.eq(course_id))
            .filter(enrollments::Column::Active.eq(true))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("enrollment"))?;

        let txn = db.begin().await?;

        let mut model: enrollments::ActiveModel = enrollment.into();
        model.active = Set(false);
        model.updated_at = Set(lookup::now());
        model.update(&txn).await?;

        // the course may already be soft-deleted; roster upkeep still applies
        if let Some(course) = courses::Entity::find_by_id(course_id).one(&txn).await? {
            let mut roster = course.enrolled_students.clone();
            if roster.remove(student_id) {
                let mut model: courses::ActiveModel = course.into();
                model.enrolled_students = Set(roster);
                model.updated_at = Set(lookup::now());
                model.update(&txn).await?;
            }
        }

        txn.commit().await?;
        Ok(())
    }

    async fn upsert_active<C: ConnectionTrait>(
        db: &C,
        student_id: Uuid,
        course_id: Uuid,
    ) -> ServiceResult<enrollments::Model> {
        let pair = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .filter(enrollments::Column::CourseId.eq(course_id));

        if let Some(existing) = pair
            .clone()
            .filter(enrollments::Column::Active.eq(true))
            .one(db)
            .await?
        {
            // already enrolled; nothing to change
            return Ok(existing);
        }

        if let Some(tombstone) = pair
            .filter(enrollments::Column::Active.eq(false))
            .order_by_desc(enrollments::Column::UpdatedAt)
            .one(db)
            .await?
        {
            let now = lookup::now();
            let mut model: enrollments::ActiveModel = tombstone.into();
            model.active = Set(true);
            model.status = Set(EnrollmentStatus::Active.as_str().to_string());
            model.enrolled_at = Set(now);
            model.updated_at = Set(now);
            return Ok(model.update(db).await?);
        }

        let now = lookup::now();
        let model = enrollments::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            course_id: Set(course_id),
            status: Set(EnrollmentStatus::Active.as_str().to_string()),
            enrolled_at: Set(now),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(db).await?)
    }
}
