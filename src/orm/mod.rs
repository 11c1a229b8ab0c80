//! SeaORM entities for every table the API touches.

pub mod comments;
pub mod content_requests;
pub mod email_verifications;
pub mod episodes;
pub mod likes;
pub mod movies;
pub mod password_resets;
pub mod payments;
pub mod series;
pub mod subscriptions;
pub mod trending;
pub mod users;
