pub mod admin;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod swagger;
