//! Become-a-punter form state and validation.
//!
//! Everything here is synchronous bookkeeping. Network calls live in the
//! controller, which mutates a `FormState` before and after each await.

use serde::Serialize;

use super::category::{PrimaryCategory, secondary_options};
use crate::api::{BecomePunterRequest, UserRecord};
use crate::error::ValidationError;

/// Result of the most recent availability check for the current username.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsernameStatus {
    #[default]
    Unset,
    Checking,
    Available,
    Unavailable,
}

/// Parse a weekly price. Valid only for finite numbers greater than zero.
pub fn parse_price(input: &str) -> Option<f64> {
    let value: f64 = input.trim().parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// All fields of the onboarding form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormState {
    pub username: String,
    pub username_status: UsernameStatus,
    pub primary_category: Option<PrimaryCategory>,
    pub secondary_category: String,
    pub price_per_week: String,
    pub agreed_to_terms: bool,
    pub submission_in_progress: bool,
    pub last_error: Option<String>,
    pub current_user: Option<UserRecord>,
}

impl FormState {
    /// Update the username. A real change invalidates any earlier check.
    pub fn set_username(&mut self, username: impl Into<String>) {
        let username = username.into();
        if username != self.username {
            self.username = username;
            self.username_status = UsernameStatus::Unset;
        }
    }

    /// Select (or clear) the primary category. Always clears the secondary.
    pub fn set_primary_category(&mut self, primary: Option<PrimaryCategory>) {
        self.primary_category = primary;
        self.secondary_category.clear();
    }

    /// Select a secondary category from the current option list.
    ///
    /// An empty value clears the selection.
    pub fn set_secondary_category(&mut self, secondary: &str) -> Result<(), ValidationError> {
        let secondary = secondary.trim();
        if secondary.is_empty() {
            self.secondary_category.clear();
            return Ok(());
        }
        if self.primary_category.is_none() {
            return Err(ValidationError::MissingPrimaryCategory);
        }
        if !self.secondary_options().iter().any(|o| *o == secondary) {
            return Err(ValidationError::InvalidSecondaryCategory(
                secondary.to_string(),
            ));
        }
        self.secondary_category = secondary.to_string();
        Ok(())
    }

    pub fn set_price(&mut self, price: impl Into<String>) {
        self.price_per_week = price.into();
    }

    pub fn set_agreed_to_terms(&mut self, agreed: bool) {
        self.agreed_to_terms = agreed;
    }

    /// Options for the secondary dropdown, derived from the primary value.
    pub fn secondary_options(&self) -> &'static [&'static str] {
        secondary_options(self.primary_category)
    }

    /// Username as sent to the backend.
    pub fn trimmed_username(&self) -> &str {
        self.username.trim()
    }

    pub fn price(&self) -> Option<f64> {
        parse_price(&self.price_per_week)
    }

    /// First failing field rule, checked username → category → price → terms.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.trimmed_username().is_empty() {
            return Err(ValidationError::EmptyUsername);
        }
        match self.username_status {
            UsernameStatus::Available => {}
            UsernameStatus::Unavailable => return Err(ValidationError::UsernameUnavailable),
            UsernameStatus::Unset | UsernameStatus::Checking => {
                return Err(ValidationError::UsernameNotVerified);
            }
        }
        if self.primary_category.is_none() {
            return Err(ValidationError::MissingPrimaryCategory);
        }
        if self.secondary_category.is_empty() {
            return Err(ValidationError::MissingSecondaryCategory);
        }
        if self.price().is_none() {
            return Err(ValidationError::InvalidPrice);
        }
        if !self.agreed_to_terms {
            return Err(ValidationError::TermsNotAccepted);
        }
        Ok(())
    }

    /// Whether the submit control is enabled. Requires a signed-in user.
    pub fn can_submit(&self) -> bool {
        !self.submission_in_progress && self.build_request().is_ok()
    }

    /// Whether the check-username control is enabled.
    pub fn can_check_username(&self) -> bool {
        self.username_status != UsernameStatus::Checking && !self.trimmed_username().is_empty()
    }

    /// Validate and compose the registration payload.
    pub fn build_request(&self) -> Result<BecomePunterRequest, ValidationError> {
        self.validate()?;
        let user = self
            .current_user
            .as_ref()
            .ok_or(ValidationError::NotSignedIn)?;
        let primary_category = self
            .primary_category
            .ok_or(ValidationError::MissingPrimaryCategory)?;
        let price = self.price().ok_or(ValidationError::InvalidPrice)?;

        Ok(BecomePunterRequest {
            user_id: user.id.clone(),
            username: self.trimmed_username().to_string(),
            primary_category,
            secondary_category: self.secondary_category.clone(),
            price,
        })
    }
}
