mod common;

use common::{fetch_course, fetch_teacher, insert_course, insert_teacher, insert_user, setup};
use database::services::merge::MergeService;
use database::services::review::ReviewService;
use models::{ratings::Ratings, role::Role};
use uuid::Uuid;

#[tokio::test]
async fn test_merge_reassigns_references_and_rederives_aggregates() {
    let db = setup().await;
    let target = insert_teacher(&db, "Dr. Chen").await;
    let duplicate = insert_teacher(&db, "Dr. Chen (dup)").await;
    let course = insert_course(&db, "Algorithms", Some(duplicate.id)).await;

    // two reviews on the surviving identity, three on the duplicate
    for (name, score, teacher_id) in [
        ("Alice", 5, target.id),
        ("Bob", 4, target.id),
        ("Cara", 3, duplicate.id),
        ("Dana", 2, duplicate.id),
        ("Evan", 1, duplicate.id),
    ] {
        let student = insert_user(&db, name, Role::Student).await;
        ReviewService::submit_review(&db, student.id, teacher_id, None, Ratings::uniform(score))
            .await
            .unwrap();
    }

    let reassigned = MergeService::merge_teachers(&db, target.id, &[duplicate.id])
        .await
        .unwrap();
    // three reviews plus one course moved over
    assert_eq!(reassigned, 4);

    let target = fetch_teacher(&db, target.id).await;
    assert_eq!(target.total_reviews, 5);
    // row averages 5, 4, 3, 2, 1 over the union
    assert_eq!(target.avg_rating, 3.0);
    assert!(target.courses.contains(course.id));

    let duplicate = fetch_teacher(&db, duplicate.id).await;
    assert_eq!(duplicate.total_reviews, 0);
    assert_eq!(duplicate.avg_rating, 0.0);
    assert!(duplicate.courses.is_empty());

    assert_eq!(fetch_course(&db, course.id).await.teacher_id, Some(target.id));
}

#[tokio::test]
async fn test_merge_rerun_is_a_noop() {
    let db = setup().await;
    let target = insert_teacher(&db, "Dr. Okafor").await;
    let duplicate = insert_teacher(&db, "Dr. Okafor (dup)").await;
    let student = insert_user(&db, "Alice", Role::Student).await;
    ReviewService::submit_review(&db, student.id, duplicate.id, None, Ratings::uniform(4))
        .await
        .unwrap();

    let first = MergeService::merge_teachers(&db, target.id, &[duplicate.id])
        .await
        .unwrap();
    assert_eq!(first, 1);

    let second = MergeService::merge_teachers(&db, target.id, &[duplicate.id])
        .await
        .unwrap();
    assert_eq!(second, 0);

    let target = fetch_teacher(&db, target.id).await;
    assert_eq!(target.total_reviews, 1);
    assert_eq!(target.avg_rating, 4.0);
}

#[tokio::test]
async fn test_merge_skips_target_in_source_list() {
    let db = setup().await;
    let target = insert_teacher(&db, "Dr. Laurent").await;
    let student = insert_user(&db, "Alice", Role::Student).await;
    ReviewService::submit_review(&db, student.id, target.id, None, Ratings::uniform(5))
        .await
        .unwrap();

    let reassigned = MergeService::merge_teachers(&db, target.id, &[target.id])
        .await
        .unwrap();
    assert_eq!(reassigned, 0);

    let target = fetch_teacher(&db, target.id).await;
    assert_eq!(target.total_reviews, 1);
    assert_eq!(target.avg_rating, 5.0);
}

#[tokio::test]
async fn test_merge_into_unknown_target_is_not_found() {
    let db = setup().await;
    let duplicate = insert_teacher(&db, "Dr. Webb").await;

    let err = MergeService::merge_teachers(&db, Uuid::new_v4(), &[duplicate.id])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
