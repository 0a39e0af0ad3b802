//! Error types for the punter client.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Local token store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open store: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Backend REST API errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },

    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

/// Carousel construction and navigation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CarouselError {
    #[error("Carousel needs at least one slide")]
    Empty,

    #[error("Duplicate slide id {0}")]
    DuplicateSlideId(u32),

    #[error("Slide index {index} out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Autoplay task has stopped")]
    Stopped,
}

/// Locally detected form errors. Never sent over the network.
///
/// Variants are listed in the order the form checks them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a username")]
    EmptyUsername,

    #[error("Please check username availability first")]
    UsernameNotVerified,

    #[error("That username is already taken")]
    UsernameUnavailable,

    #[error("Please choose a category")]
    MissingPrimaryCategory,

    #[error("Please choose a sub-category")]
    MissingSecondaryCategory,

    #[error("'{0}' is not an option for the selected category")]
    InvalidSecondaryCategory(String),

    #[error("Please enter a valid price greater than zero")]
    InvalidPrice,

    #[error("You must agree to the terms and conditions")]
    TermsNotAccepted,

    #[error("Could not identify the signed-in user")]
    NotSignedIn,
}

/// Why the current user could not be loaded on mount.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("No authentication token found, please sign in")]
    MissingToken,

    #[error("Current user is not available")]
    NotLoaded,

    #[error("The form was unmounted before the user loaded")]
    Unmounted,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Onboarding workflow errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OnboardingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Api(String),

    #[error("A username check is already in progress")]
    CheckInFlight,

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("The form is no longer mounted")]
    Unmounted,

    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl From<ApiError> for OnboardingError {
    fn from(e: ApiError) -> Self {
        Self::Api(e.to_string())
    }
}
