//! Service layer for tracker use cases.

mod auth_service;
mod tracker;

pub use auth_service::AuthService;
pub use tracker::Tracker;
