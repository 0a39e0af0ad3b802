//! reqwest implementation of `PunterApi`.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::PunterApi;
use super::model::{
    BecomePunterRequest, CheckUsernameBody, CheckUsernameResponse, ErrorBody, GetUserBody,
    GetUserResponse, UserRecord,
};
use crate::config::ClientConfig;
use crate::error::ApiError;

const GET_USER: &str = "/client/getUser";
const CHECK_USERNAME: &str = "/client/checkUsername";
const BECOME_PUNTER: &str = "/client/becomePunter";

/// Backend client over HTTP.
pub struct HttpPunterApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPunterApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request {
                endpoint: "client".into(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        let base_url: String = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(config.api_base_url.clone(), config.http_timeout)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    /// POST a JSON body and return the raw successful response.
    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let resp = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Request {
                endpoint: endpoint.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        tracing::warn!(endpoint, status = status.as_u16(), %message, "Backend call failed");
        Err(ApiError::Status {
            endpoint: endpoint.into(),
            status: status.as_u16(),
            message,
        })
    }

    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(endpoint, body)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse {
                endpoint: endpoint.into(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl PunterApi for HttpPunterApi {
    async fn get_user(&self, token: &SecretString) -> Result<UserRecord, ApiError> {
        let body = GetUserBody {
            token: token.expose_secret(),
        };
        let resp: GetUserResponse = self.post_json(GET_USER, &body).await?;
        tracing::debug!(user_id = %resp.data.id, "Fetched current user");
        Ok(resp.data)
    }

    async fn check_username(&self, username: &str) -> Result<bool, ApiError> {
        let resp: CheckUsernameResponse = self
            .post_json(CHECK_USERNAME, &CheckUsernameBody { username })
            .await?;
        Ok(resp.is_available)
    }

    async fn become_punter(&self, request: &BecomePunterRequest) -> Result<(), ApiError> {
        self.post(BECOME_PUNTER, request).await?;
        Ok(())
    }
}
