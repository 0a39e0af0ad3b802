//! Punter client: headless core of the punter platform's web client.

pub mod api;
pub mod carousel;
pub mod config;
pub mod error;
pub mod onboarding;
pub mod store;
