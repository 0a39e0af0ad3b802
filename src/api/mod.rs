//! Backend REST API: the three calls the client makes.
//!
//! `PunterApi` is the seam; `HttpPunterApi` talks to the real backend over
//! reqwest, tests plug in stubs.

pub mod http;
pub mod model;

pub use http::HttpPunterApi;
pub use model::{BecomePunterRequest, UserRecord};

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::ApiError;

/// Backend operations consumed by the onboarding form.
#[async_trait]
pub trait PunterApi: Send + Sync {
    /// `POST /client/getUser`: resolve the signed-in user from a token.
    async fn get_user(&self, token: &SecretString) -> Result<UserRecord, ApiError>;

    /// `POST /client/checkUsername`: `true` if the username is free.
    async fn check_username(&self, username: &str) -> Result<bool, ApiError>;

    /// `POST /client/becomePunter`: register the user as a punter.
    async fn become_punter(&self, request: &BecomePunterRequest) -> Result<(), ApiError>;
}
