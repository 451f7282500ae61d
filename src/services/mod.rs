pub mod activity_service;
pub mod admin_service;
pub mod auth_events;
pub mod auth_service;
pub mod catalog_service;
pub mod dashboard_service;
pub mod identity_service;
pub mod profile_service;
pub mod upload_service;
