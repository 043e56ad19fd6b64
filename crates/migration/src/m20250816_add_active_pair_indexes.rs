use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Partial unique indexes over the live subset of each relationship pair.
// The service layer's find-or-resurrect logic is the common-case path; these
// are the authoritative backstop against two concurrent first-time
// submissions both passing the lookup and inserting. Raw SQL because the
// index builder has no partial predicate; the statements are valid on both
// Postgres and SQLite.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_enrollments_active_pair \
             ON enrollments (student_id, course_id) WHERE active",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_reviews_active_pair \
             ON reviews (student_id, teacher_id) WHERE active",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_peer_reviews_active_pair \
             ON peer_reviews (reviewer_id, target_id) WHERE active",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_admin_peer_reviews_active_pair \
             ON admin_peer_reviews (reviewer_id, target_id) WHERE active",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        for name in [
            "uq_enrollments_active_pair",
            "uq_reviews_active_pair",
            "uq_peer_reviews_active_pair",
            "uq_admin_peer_reviews_active_pair",
        ] {
            conn.execute_unprepared(&format!("DROP INDEX IF EXISTS {name}"))
                .await?;
        }
        Ok(())
    }
}
