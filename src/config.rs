//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Client configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend REST API, without trailing slash.
    pub api_base_url: String,
    /// Path of the local libSQL database holding the auth token.
    pub db_path: String,
    /// Per-request timeout for backend calls.
    pub http_timeout: Duration,
    /// Carousel auto-advance interval.
    pub carousel_interval: Duration,
    /// Grace period between a successful registration and navigation.
    pub redirect_delay: Duration,
    /// How long a toast stays visible.
    pub toast_duration: Duration,
    /// Route navigated to after a successful registration.
    pub landing_route: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            db_path: "./data/punter-client.db".to_string(),
            http_timeout: Duration::from_secs(15),
            carousel_interval: Duration::from_millis(3000),
            redirect_delay: Duration::from_millis(3000),
            toast_duration: Duration::from_millis(3000),
            landing_route: "/".to_string(),
        }
    }
}

impl ClientConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup("PUNTER_API_BASE_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.api_base_url);

        let db_path = lookup("PUNTER_DB_PATH").unwrap_or(defaults.db_path);

        let http_timeout = match lookup("PUNTER_HTTP_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_u64("PUNTER_HTTP_TIMEOUT_SECS", &v)?),
            None => defaults.http_timeout,
        };

        let carousel_interval = millis_or(
            &lookup,
            "PUNTER_CAROUSEL_INTERVAL_MS",
            defaults.carousel_interval,
        )?;
        if carousel_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "PUNTER_CAROUSEL_INTERVAL_MS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let redirect_delay =
            millis_or(&lookup, "PUNTER_REDIRECT_DELAY_MS", defaults.redirect_delay)?;
        let toast_duration =
            millis_or(&lookup, "PUNTER_TOAST_DURATION_MS", defaults.toast_duration)?;

        let landing_route = lookup("PUNTER_LANDING_ROUTE").unwrap_or(defaults.landing_route);

        Ok(Self {
            api_base_url,
            db_path,
            http_timeout,
            carousel_interval,
            redirect_delay,
            toast_duration,
            landing_route,
        })
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{value}': {e}"),
    })
}

fn millis_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) => Ok(Duration::from_millis(parse_u64(key, &v)?)),
        None => Ok(default),
    }
}

/// Colour palette shared by every rendering surface.
///
/// Read-only; pass `&Palette::DEFAULT` (or a custom instance) to the renderer.
/// The CLI host styles its output through [`paint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub success: &'static str,
    pub error: &'static str,
}

impl Palette {
    pub const DEFAULT: Palette = Palette {
        primary: "#0B1F3A",
        secondary: "#13315C",
        accent: "#F5B700",
        background: "#0A0F1C",
        surface: "#1B2A41",
        text: "#FFFFFF",
        muted: "#8D99AE",
        success: "#2ECC71",
        error: "#E74C3C",
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Wrap `text` in a 24-bit ANSI foreground colour given as `#RRGGBB`.
///
/// Malformed colours leave the text unstyled.
pub fn paint(colour: &str, text: &str) -> String {
    let rgb = colour
        .strip_prefix('#')
        .filter(|hex| hex.len() == 6 && hex.is_ascii())
        .and_then(|hex| {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some((channel(0)?, channel(2)?, channel(4)?))
        });
    match rgb {
        Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
        None => text.to_string(),
    }
}
