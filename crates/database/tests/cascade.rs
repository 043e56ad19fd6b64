mod common;

use common::{
    fetch_course, fetch_teacher, fetch_user, insert_course, insert_teacher, insert_user, setup,
};
use database::entities::{enrollments, peer_reviews, reviews};
use database::services::aggregate::RatingAggregateService;
use database::services::cascade::CascadeService;
use database::services::enrollment::EnrollmentService;
use database::services::peer_review::PeerReviewService;
use database::services::review::ReviewService;
use models::{ratings::Ratings, role::Role};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
};

#[tokio::test]
async fn test_course_cascade_deactivates_dependents_and_fixes_aggregate() {
    let db = setup().await;
    let teacher = insert_teacher(&db, "Dr. Chen").await;
    let course = insert_course(&db, "Algorithms", Some(teacher.id)).await;
    let alice = insert_user(&db, "Alice", Role::Student).await;
    let bob = insert_user(&db, "Bob", Role::Student).await;

    EnrollmentService::enroll(&db, alice.id, course.id).await.unwrap();
    EnrollmentService::enroll(&db, bob.id, course.id).await.unwrap();

    // two reviews tagged with the course, one untagged for the same teacher
    ReviewService::submit_review(&db, alice.id, teacher.id, Some(course.id), Ratings::uniform(1))
        .await
        .unwrap();
    ReviewService::submit_review(&db, bob.id, teacher.id, Some(course.id), Ratings::uniform(2))
        .await
        .unwrap();
    let cara = insert_user(&db, "Cara", Role::Student).await;
    ReviewService::submit_review(&db, cara.id, teacher.id, None, Ratings::uniform(5))
        .await
        .unwrap();
    assert_eq!(fetch_teacher(&db, teacher.id).await.total_reviews, 3);

    CascadeService::delete_course(&db, course.id).await.unwrap();

    let course = fetch_course(&db, course.id).await;
    assert!(!course.active);
    assert!(course.enrolled_students.is_empty());

    let live_enrollments = enrollments::Entity::find()
        .filter(enrollments::Column::CourseId.eq(course.id))
        .filter(enrollments::Column::Active.eq(true))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(live_enrollments, 0);

    let live_tagged = reviews::Entity::find()
        .filter(reviews::Column::CourseId.eq(course.id))
        .filter(reviews::Column::Active.eq(true))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(live_tagged, 0);

    // course detached from the owner, aggregate rebuilt from the survivor
    let teacher = fetch_teacher(&db, teacher.id).await;
    assert!(!teacher.courses.contains(course.id));
    assert_eq!(teacher.total_reviews, 1);
    assert_eq!(teacher.avg_rating, 5.0);
}

#[tokio::test]
async fn test_course_cascade_is_rerunnable() {
    let db = setup().await;
    let teacher = insert_teacher(&db, "Dr. Okafor").await;
    let course = insert_course(&db, "Databases", Some(teacher.id)).await;
    let student = insert_user(&db, "Alice", Role::Student).await;
    ReviewService::submit_review(&db, student.id, teacher.id, Some(course.id), Ratings::uniform(4))
        .await
        .unwrap();

    CascadeService::delete_course(&db, course.id).await.unwrap();
    // a second run (the crash-retry path) converges on the same state
    CascadeService::delete_course(&db, course.id).await.unwrap();

    let teacher = fetch_teacher(&db, teacher.id).await;
    assert_eq!(teacher.total_reviews, 0);
    assert_eq!(teacher.avg_rating, 0.0);
}

#[tokio::test]
async fn test_user_cascade_deactivates_everything_and_flips_user_last() {
    let db = setup().await;
    let teacher = insert_teacher(&db, "Dr. Laurent").await;
    let course = insert_course(&db, "Compilers", Some(teacher.id)).await;
    let alice = insert_user(&db, "Alice", Role::Student).await;
    let bob = insert_user(&db, "Bob", Role::Student).await;

    EnrollmentService::enroll(&db, alice.id, course.id).await.unwrap();
    ReviewService::submit_review(&db, alice.id, teacher.id, None, Ratings::uniform(1))
        .await
        .unwrap();
    ReviewService::submit_review(&db, bob.id, teacher.id, None, Ratings::uniform(5))
        .await
        .unwrap();
    PeerReviewService::submit_peer_review(
        &db,
        alice.id,
        bob.id,
        Some(Ratings::uniform(4)),
        None,
        None,
    )
    .await
    .unwrap();
    PeerReviewService::submit_peer_review(
        &db,
        bob.id,
        alice.id,
        Some(Ratings::uniform(3)),
        None,
        None,
    )
    .await
    .unwrap();

    CascadeService::delete_user(&db, alice.id).await.unwrap();

    assert!(!fetch_user(&db, alice.id).await.active);
    assert!(!fetch_course(&db, course.id).await.enrolled_students.contains(alice.id));

    let live_enrollments = enrollments::Entity::find()
        .filter(enrollments::Column::StudentId.eq(alice.id))
        .filter(enrollments::Column::Active.eq(true))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(live_enrollments, 0);

    // peer reviews on either side of the user are gone from the active set
    let live_peer = peer_reviews::Entity::find()
        .filter(peer_reviews::Column::Active.eq(true))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(live_peer, 0);

    // only Bob's review remains in the aggregate
    let teacher = fetch_teacher(&db, teacher.id).await;
    assert_eq!(teacher.total_reviews, 1);
    assert_eq!(teacher.avg_rating, 5.0);
}

#[tokio::test]
async fn test_manual_recompute_reconciles_drift() {
    let db = setup().await;
    let teacher = insert_teacher(&db, "Dr. Webb").await;
    let student = insert_user(&db, "Alice", Role::Student).await;
    ReviewService::submit_review(&db, student.id, teacher.id, None, Ratings::uniform(4))
        .await
        .unwrap();

    // simulate a drifted materialized field (e.g. a crashed cascade)
    let drifted = fetch_teacher(&db, teacher.id).await;
    let mut model: database::entities::teachers::ActiveModel = drifted.into();
    model.avg_rating = Set(1.0);
    model.total_reviews = Set(99);
    model.update(&db).await.unwrap();

    let (avg, total) = RatingAggregateService::recompute(&db, teacher.id)
        .await
        .unwrap();
    assert_eq!((avg, total), (4.0, 1));

    let teacher = fetch_teacher(&db, teacher.id).await;
    assert_eq!(teacher.avg_rating, 4.0);
    assert_eq!(teacher.total_reviews, 1);
}
