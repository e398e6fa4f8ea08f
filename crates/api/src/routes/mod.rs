pub mod admin;
pub mod auth;
pub mod friends;
pub mod notifications;
pub mod tournaments;
pub mod users;
