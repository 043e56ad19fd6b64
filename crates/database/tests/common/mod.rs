#![allow(dead_code)] // not every test binary uses every fixture

use chrono::{NaiveDateTime, Utc};
use database::entities::{courses, teachers, users};
use migration::{Migrator, MigratorTrait};
use models::{ids::IdList, meeting::MeetingSlots, role::Role};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectOptions, Database, DatabaseConnection, EntityTrait,
};
use uuid::Uuid;

/// Fresh in-memory database with the full migration set applied.
pub async fn setup() -> DatabaseConnection {
    // a single pooled connection, or every checkout would open its own
    // empty in-memory database
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.expect("connect to sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub async fn insert_user(db: &DatabaseConnection, name: &str, role: Role) -> users::Model {
    let ts = now();
    let model = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(format!("{}@example.edu", name.to_lowercase().replace(' ', "."))),
        role: Set(role.as_str().to_string()),
        active: Set(true),
        created_at: Set(ts),
        updated_at: Set(ts),
    };
    model.insert(db).await.expect("insert user")
}

pub async fn insert_teacher(db: &DatabaseConnection, name: &str) -> teachers::Model {
    let ts = now();
    let model = teachers::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        user_id: Set(None),
        avg_rating: Set(0.0),
        total_reviews: Set(0),
        courses: Set(IdList::new()),
        active: Set(true),
        created_at: Set(ts),
        updated_at: Set(ts),
    };
    model.insert(db).await.expect("insert teacher")
}

/// Inserts a course and, when it is owned, records it on the teacher's
/// course list the way the write path does.
pub async fn insert_course(
    db: &DatabaseConnection,
    title: &str,
    teacher_id: Option<Uuid>,
) -> courses::Model {
    let ts = now();
    let model = courses::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title.to_string()),
        teacher_id: Set(teacher_id),
        enrolled_students: Set(IdList::new()),
        meetings: Set(MeetingSlots::new()),
        active: Set(true),
        created_at: Set(ts),
        updated_at: Set(ts),
    };
    let course = model.insert(db).await.expect("insert course");

    if let Some(teacher_id) = teacher_id {
        let teacher = fetch_teacher(db, teacher_id).await;
        let mut owned = teacher.courses.clone();
        owned.insert(course.id);
        let mut model: teachers::ActiveModel = teacher.into();
        model.courses = Set(owned);
        model.update(db).await.expect("update teacher course list");
    }

    course
}

pub async fn fetch_teacher(db: &DatabaseConnection, id: Uuid) -> teachers::Model {
    teachers::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("fetch teacher")
        .expect("teacher exists")
}

pub async fn fetch_course(db: &DatabaseConnection, id: Uuid) -> courses::Model {
    courses::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("fetch course")
        .expect("course exists")
}

pub async fn fetch_user(db: &DatabaseConnection, id: Uuid) -> users::Model {
    users::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("fetch user")
        .expect("user exists")
}
