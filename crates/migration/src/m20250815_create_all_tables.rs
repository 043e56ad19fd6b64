use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(
                        ColumnDef::new(Users::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        // Create teachers table
        manager
            .create_table(
                Table::create()
                    .table(Teachers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teachers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Teachers::Name).string().not_null())
                    .col(ColumnDef::new(Teachers::UserId).uuid())
                    .col(
                        ColumnDef::new(Teachers::AvgRating)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Teachers::TotalReviews)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Teachers::Courses).json().not_null())
                    .col(
                        ColumnDef::new(Teachers::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Teachers::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Teachers::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-teachers-user_id")
                            .from(Teachers::Table, Teachers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Courses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(ColumnDef::new(Courses::TeacherId).uuid())
                    .col(ColumnDef::new(Courses::EnrolledStudents).json().not_null())
                    .col(ColumnDef::new(Courses::Meetings).json().not_null())
                    .col(
                        ColumnDef::new(Courses::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Courses::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Courses::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-courses-teacher_id")
                            .from(Courses::Table, Courses::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create enrollments table
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enrollments::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Enrollments::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Enrollments::Status).string().not_null())
                    .col(ColumnDef::new(Enrollments::EnrolledAt).date_time().not_null())
                    .col(
                        ColumnDef::new(Enrollments::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Enrollments::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Enrollments::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollments-student_id")
                            .from(Enrollments::Table, Enrollments::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollments-course_id")
                            .from(Enrollments::Table, Enrollments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create reviews table
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reviews::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Reviews::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::TeacherId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::CourseId).uuid())
                    .col(ColumnDef::new(Reviews::Ratings).json().not_null())
                    .col(
                        ColumnDef::new(Reviews::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Reviews::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Reviews::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reviews-student_id")
                            .from(Reviews::Table, Reviews::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reviews-teacher_id")
                            .from(Reviews::Table, Reviews::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reviews-course_id")
                            .from(Reviews::Table, Reviews::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create peer_reviews table
        manager
            .create_table(
                Table::create()
                    .table(PeerReviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PeerReviews::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PeerReviews::ReviewerId).uuid().not_null())
                    .col(ColumnDef::new(PeerReviews::TargetId).uuid().not_null())
                    .col(ColumnDef::new(PeerReviews::CourseId).uuid())
                    .col(ColumnDef::new(PeerReviews::Ratings).json())
                    .col(ColumnDef::new(PeerReviews::TeacherRatings).json())
                    .col(
                        ColumnDef::new(PeerReviews::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(PeerReviews::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(PeerReviews::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-peer_reviews-reviewer_id")
                            .from(PeerReviews::Table, PeerReviews::ReviewerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-peer_reviews-target_id")
                            .from(PeerReviews::Table, PeerReviews::TargetId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create admin_peer_reviews table
        manager
            .create_table(
                Table::create()
                    .table(AdminPeerReviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminPeerReviews::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AdminPeerReviews::ReviewerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdminPeerReviews::TargetId).uuid().not_null())
                    .col(ColumnDef::new(AdminPeerReviews::Ratings).json().not_null())
                    .col(
                        ColumnDef::new(AdminPeerReviews::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AdminPeerReviews::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdminPeerReviews::UpdatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-admin_peer_reviews-reviewer_id")
                            .from(AdminPeerReviews::Table, AdminPeerReviews::ReviewerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-admin_peer_reviews-target_id")
                            .from(AdminPeerReviews::Table, AdminPeerReviews::TargetId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminPeerReviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PeerReviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teachers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Name,
    Email,
    Role,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Teachers {
    Table,
    Id,
    Name,
    UserId,
    AvgRating,
    TotalReviews,
    Courses,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Courses {
    Table,
    Id,
    Title,
    TeacherId,
    EnrolledStudents,
    Meetings,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Enrollments {
    Table,
    Id,
    StudentId,
    CourseId,
    Status,
    EnrolledAt,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Reviews {
    Table,
    Id,
    StudentId,
    TeacherId,
    CourseId,
    Ratings,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum PeerReviews {
    Table,
    Id,
    ReviewerId,
    TargetId,
    CourseId,
    Ratings,
    TeacherRatings,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum AdminPeerReviews {
    Table,
    Id,
    ReviewerId,
    TargetId,
    Ratings,
    Active,
    CreatedAt,
    UpdatedAt,
}
