pub mod admin_peer_reviews;
pub mod courses;
pub mod enrollments;
pub mod peer_reviews;
pub mod reviews;
pub mod teachers;
pub mod users;
