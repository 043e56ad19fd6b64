pub mod admin_peer_review;
pub mod aggregate;
pub mod cascade;
pub mod enrollment;
pub mod lookup;
pub mod merge;
pub mod peer_review;
pub mod review;
pub mod view;
