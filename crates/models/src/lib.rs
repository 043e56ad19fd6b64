pub mod enrollment;
pub mod ids;
pub mod meeting;
pub mod ratings;
pub mod role;
