//! `TokenStore` trait: async access to the persisted auth token.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::StoreError;

/// Well-known key the auth token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Local persistent key-value store for the authentication token.
///
/// The onboarding form only reads the token; writing and clearing belong to
/// the sign-in flow and the CLI.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any.
    async fn get_token(&self) -> Result<Option<SecretString>, StoreError>;

    /// Store (or replace) the token.
    async fn set_token(&self, token: &SecretString) -> Result<(), StoreError>;

    /// Remove the token. Returns whether one was present.
    async fn clear_token(&self) -> Result<bool, StoreError>;
}
