//! Onboarding preferences service — save and read a user's first-launch choices.

pub mod auth;
pub mod config;
pub mod error;
pub mod onboarding;
pub mod server;
pub mod store;
