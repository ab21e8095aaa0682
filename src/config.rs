//! Client configuration and credential discovery.

use std::env;
use std::fmt;
use std::time::Duration;

use tracing::Dispatch;

use crate::error::{EveractiveError, Result};

/// Default base URL of the Everactive Data Services API.
pub const DEFAULT_API_URL: &str = "https://api.data.everactive.com/";

/// Token endpoint, relative to the base URL.
pub const TOKEN_PATH: &str = "auth/token";

/// Environment variable holding the API client id.
pub const CLIENT_ID_ENV: &str = "EVERACTIVE_CLIENT_ID";

/// Environment variable holding the API client secret.
pub const CLIENT_SECRET_ENV: &str = "EVERACTIVE_CLIENT_SECRET";

/// Number of times a request is retried after a connection failure.
///
/// Only connection-level failures are retried; HTTP error statuses are not.
pub const CONNECT_RETRIES: u32 = 3;

const USER_AGENT: &str = concat!("everactive-rs/", env!("CARGO_PKG_VERSION"));

/// OAuth2 client credentials for the Everactive API.
///
/// The secret is never included in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Create credentials from explicit values.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Resolve credentials from explicit arguments, falling back to the
    /// `EVERACTIVE_CLIENT_ID` and `EVERACTIVE_CLIENT_SECRET` environment
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns [`EveractiveError::Configuration`] if either value cannot be
    /// found. Empty strings are treated as missing.
    pub fn resolve(client_id: Option<&str>, client_secret: Option<&str>) -> Result<Self> {
        Self::resolve_with(client_id, client_secret, |name| env::var(name).ok())
    }

    /// Like [`Credentials::resolve`], with a caller-supplied environment lookup.
    pub fn resolve_with<F>(
        client_id: Option<&str>,
        client_secret: Option<&str>,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = coalesce(client_id, || lookup(CLIENT_ID_ENV)).ok_or_else(|| {
            EveractiveError::Configuration(format!(
                "client id not found; pass client_id to the constructor \
                 or set the {CLIENT_ID_ENV} environment variable"
            ))
        })?;

        let client_secret =
            coalesce(client_secret, || lookup(CLIENT_SECRET_ENV)).ok_or_else(|| {
                EveractiveError::Configuration(format!(
                    "client secret not found; pass client_secret to the constructor \
                     or set the {CLIENT_SECRET_ENV} environment variable"
                ))
            })?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }

    /// The client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

/// First non-empty value of the explicit argument and the fallback.
fn coalesce<F>(explicit: Option<&str>, fallback: F) -> Option<String>
where
    F: FnOnce() -> Option<String>,
{
    explicit
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| fallback().filter(|v| !v.is_empty()))
}

/// Configuration for the Everactive connection.
///
/// # Example
///
/// ```
/// use everactive::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("my-app/1.0");
/// assert_eq!(config.timeout, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API.
    pub base_url: String,
    /// Token endpoint, relative to `base_url`.
    pub token_path: String,
    /// Total timeout for a single request.
    pub timeout: Duration,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
    /// Refresh the access token this long before it expires.
    pub refresh_buffer: Duration,
    /// Where log events from the connection go.
    pub dispatch: Dispatch,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token_path: TOKEN_PATH.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: USER_AGENT.to_string(),
            refresh_buffer: Duration::from_secs(60),
            dispatch: tracing::dispatcher::get_default(Dispatch::clone),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the token endpoint path.
    pub fn with_token_path(mut self, token_path: impl Into<String>) -> Self {
        self.token_path = token_path.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set how long before expiry the access token is refreshed.
    pub fn with_refresh_buffer(mut self, buffer: Duration) -> Self {
        self.refresh_buffer = buffer;
        self
    }

    /// Send log events to the given dispatcher instead of the current default.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }
}
