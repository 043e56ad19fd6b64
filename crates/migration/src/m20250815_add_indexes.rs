use crate::m20250815_create_all_tables::{
    AdminPeerReviews, Courses, Enrollments, PeerReviews, Reviews,
};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Aggregation fetches reviews by teacher
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_teacher_id")
                    .table(Reviews::Table)
                    .col(Reviews::TeacherId)
                    .to_owned(),
            )
            .await?;

        // Course cascades fetch reviews by tagged course
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_course_id")
                    .table(Reviews::Table)
                    .col(Reviews::CourseId)
                    .to_owned(),
            )
            .await?;

        // User cascades fetch reviews by author
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_student_id")
                    .table(Reviews::Table)
                    .col(Reviews::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrollments_course_id")
                    .table(Enrollments::Table)
                    .col(Enrollments::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrollments_student_id")
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_peer_reviews_target_id")
                    .table(PeerReviews::Table)
                    .col(PeerReviews::TargetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_peer_reviews_target_id")
                    .table(AdminPeerReviews::Table)
                    .col(AdminPeerReviews::TargetId)
                    .to_owned(),
            )
            .await?;

        // Identity merge rewrites course ownership by teacher
        manager
            .create_index(
                Index::create()
                    .name("idx_courses_teacher_id")
                    .table(Courses::Table)
                    .col(Courses::TeacherId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_reviews_teacher_id",
            "idx_reviews_course_id",
            "idx_reviews_student_id",
            "idx_enrollments_course_id",
            "idx_enrollments_student_id",
            "idx_peer_reviews_target_id",
            "idx_admin_peer_reviews_target_id",
            "idx_courses_teacher_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}
