//! Wire types for the backend REST API.

use serde::{Deserialize, Serialize};

use crate::onboarding::category::PrimaryCategory;

/// The signed-in user as returned by `/client/getUser`.
///
/// Only `_id` is required; everything else the backend sends is kept in
/// `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserRecord {
    /// A record carrying only an id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            email: None,
            role: None,
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetUserBody<'a> {
    pub token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetUserResponse {
    pub data: UserRecord,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckUsernameBody<'a> {
    pub username: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckUsernameResponse {
    pub is_available: bool,
}

/// Payload posted to `/client/becomePunter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BecomePunterRequest {
    pub user_id: String,
    pub username: String,
    pub primary_category: PrimaryCategory,
    pub secondary_category: String,
    pub price: f64,
}

/// Error body the backend sends alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_record_keeps_unknown_fields() {
        let json = serde_json::json!({
            "_id": "u1",
            "email": "a@b.c",
            "subscribers": 12
        });
        let user: UserRecord = serde_json::from_value(json).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.email.as_deref(), Some("a@b.c"));
        assert!(user.username.is_none());
        assert_eq!(user.extra["subscribers"], 12);
    }

    #[test]
    fn user_record_requires_id() {
        let json = serde_json::json!({ "email": "a@b.c" });
        assert!(serde_json::from_value::<UserRecord>(json).is_err());
    }

    #[test]
    fn become_punter_payload_field_names() {
        let request = BecomePunterRequest {
            user_id: "u1".into(),
            username: "trader1".into(),
            primary_category: PrimaryCategory::Trading,
            secondary_category: "forex".into(),
            price: 50.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "userId": "u1",
                "username": "trader1",
                "primaryCategory": "trading",
                "secondaryCategory": "forex",
                "price": 50.0
            })
        );
    }

    #[test]
    fn check_username_response_is_camel_case() {
        let parsed: CheckUsernameResponse =
            serde_json::from_str(r#"{"isAvailable": false}"#).unwrap();
        assert!(!parsed.is_available);
    }
}
