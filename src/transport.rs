//! Authenticated transport to the Everactive Data Services API.
//!
//! Low-level blocking HTTP connection that handles authentication, raw GETs
//! and page aggregation. Named resource operations live in
//! [`EveractiveApi`](crate::EveractiveApi).

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn, Dispatch};
use url::Url;

use crate::auth::TokenSession;
use crate::config::{ClientConfig, Credentials, CONNECT_RETRIES};
use crate::error::{EveractiveError, Result};
use crate::pagination::{Envelope, Listing, PageQuery};

/// Authenticated connection to the Everactive API.
///
/// Construction performs the OAuth2 token fetch, so a value of this type
/// always holds a usable session. Every request blocks the calling thread.
/// The underlying HTTP client is released when the connection is dropped
/// or [closed](ApiConnection::close).
///
/// # Example
///
/// ```no_run
/// use everactive::ApiConnection;
///
/// # fn example() -> everactive::Result<()> {
/// // Supply credentials explicitly
/// let connection = ApiConnection::new(Some("client-id"), Some("client-secret"))?;
///
/// // Or discover them from EVERACTIVE_CLIENT_ID / EVERACTIVE_CLIENT_SECRET
/// let connection = ApiConnection::from_env()?;
///
/// let reading = connection.get("ds/v1/eversensors/bc:5e:a1:00:00:01/readings/last")?;
/// let sensors = connection.get_paginated("ds/v1/eversensors", "mac-address", &[("type", "Environmental")], 500)?;
/// # Ok(())
/// # }
/// ```
pub struct ApiConnection {
    http: Client,
    base_url: Url,
    session: TokenSession,
    dispatch: Dispatch,
}

impl fmt::Debug for ApiConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConnection")
            .field("base_url", &self.base_url.as_str())
            .field("client_id", &self.session.client_id())
            .finish_non_exhaustive()
    }
}

impl ApiConnection {
    /// Connect with optional explicit credentials and the default configuration.
    ///
    /// Missing credentials are looked up in `EVERACTIVE_CLIENT_ID` and
    /// `EVERACTIVE_CLIENT_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns [`EveractiveError::Configuration`] if a credential cannot be
    /// found and [`EveractiveError::Authentication`] if the token fetch fails.
    pub fn new(client_id: Option<&str>, client_secret: Option<&str>) -> Result<Self> {
        let credentials = Credentials::resolve(client_id, client_secret)?;
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Connect using credentials from the environment only.
    pub fn from_env() -> Result<Self> {
        Self::new(None, None)
    }

    /// Connect with resolved credentials and a custom configuration.
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let dispatch = config.dispatch.clone();
        tracing::dispatcher::with_default(&dispatch, || Self::connect(credentials, config))
    }

    fn connect(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        // Relative joins need the trailing slash
        let base_url_str = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };
        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| {
                EveractiveError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        let token_url = base_url.join(&config.token_path)?;
        let session = TokenSession::fetch(&http, token_url, credentials, config.refresh_buffer)
            .map_err(|e| {
                error!(error = %e, "Authentication failed");
                e
            })?;

        info!("Authenticated to the Everactive API");

        Ok(Self {
            http,
            base_url,
            session,
            dispatch: config.dispatch,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// When the current access token expires, if the token endpoint said.
    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.session.expires_at()
    }

    /// GET an endpoint and return the `data` field of its response.
    ///
    /// `path` is relative to the base URL, e.g.
    /// `ds/v1/evergateways/{evergateway_id}`.
    ///
    /// # Errors
    ///
    /// Returns [`EveractiveError::Transport`] on network failure,
    /// [`EveractiveError::Api`] on a non-success status, and
    /// [`EveractiveError::UnexpectedResponse`] if the body has no `data` field.
    pub fn get(&self, path: &str) -> Result<Value> {
        self.in_scope(|| self.get_data(path, |request| request))
    }

    /// GET an endpoint with query parameters and return its `data` field.
    pub fn get_with_query<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> Result<Value> {
        self.in_scope(|| self.get_data(path, |request| request.query(query)))
    }

    /// GET every page of a list endpoint and concatenate the records.
    ///
    /// The first request carries `page=1`, `page-size`, `sort-by` and the
    /// caller's `query`. A `page-size` or `sort-by` in `query` replaces the
    /// default instead of being sent twice. If the response has
    /// `paginationInfo`, pages `2..=totalPages` are fetched one after another
    /// with the same parameters. A response without `paginationInfo` is returned as
    /// [`Listing::Unpaginated`].
    ///
    /// # Errors
    ///
    /// Any failed page fails the whole call; records from earlier pages are
    /// discarded. The error carries the failing page number.
    pub fn get_paginated<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        sort_by: &str,
        query: &Q,
        page_size: u32,
    ) -> Result<Listing> {
        self.in_scope(|| self.collect_pages(path, sort_by, query, page_size))
    }

    /// Release the connection.
    pub fn close(self) {
        self.in_scope(|| debug!(base_url = %self.base_url, "Closing connection"));
    }

    /// Run `f` with this connection's dispatcher as the default.
    pub(crate) fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    #[tracing::instrument(skip(self, apply))]
    fn get_data<F>(&self, path: &str, apply: F) -> Result<Value>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = self.base_url.join(path)?;
        Ok(self.fetch(&url, None, apply)?.into_data())
    }

    #[tracing::instrument(skip(self, query))]
    fn collect_pages<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        sort_by: &str,
        query: &Q,
        page_size: u32,
    ) -> Result<Listing> {
        let url = self.base_url.join(path)?;
        let params = PageQuery::new(page_size, sort_by, self.query_pairs(&url, query)?);

        let first = self.fetch(&url, Some(1), |request| {
            request.query(&params.for_page(1))
        })?;

        let (mut records, info) = match first {
            Envelope::Flat { data } => {
                warn!(%url, "Response has no paginationInfo, treating endpoint as unpaginated");
                return Ok(Listing::Unpaginated(data));
            }
            Envelope::Paged {
                data,
                pagination_info,
            } => (data, pagination_info),
        };

        debug!(
            page = info.page,
            total_pages = info.total_pages,
            total_items = info.total_items,
            "Fetched page"
        );

        if info.continues() {
            for page in 2..=info.total_pages {
                let envelope = self.fetch(&url, Some(page), |request| {
                    request.query(&params.for_page(page))
                })?;

                match envelope {
                    Envelope::Paged {
                        data,
                        pagination_info,
                    } => {
                        debug!(
                            page = pagination_info.page,
                            total_pages = pagination_info.total_pages,
                            "Fetched page"
                        );
                        records.extend(data);
                    }
                    Envelope::Flat { .. } => {
                        let err = EveractiveError::UnexpectedResponse {
                            url: url.to_string(),
                            page: Some(page),
                            reason: "page is missing paginationInfo".to_string(),
                        };
                        error!(%url, page, "Error requesting url");
                        return Err(err);
                    }
                }
            }
        }

        Ok(Listing::Paginated(records))
    }

    /// Encode the caller's query into name/value pairs.
    fn query_pairs<Q: Serialize + ?Sized>(
        &self,
        url: &Url,
        query: &Q,
    ) -> Result<Vec<(String, String)>> {
        let request = self.http.get(url.clone()).query(query).build().map_err(|e| {
            EveractiveError::InvalidArgument(format!("query parameters cannot be encoded: {e}"))
        })?;
        Ok(request.url().query_pairs().into_owned().collect())
    }

    /// One authenticated GET, decoded into an [`Envelope`].
    fn fetch<F>(&self, url: &Url, page: Option<u32>, apply: F) -> Result<Envelope>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        self.fetch_inner(url, page, apply).map_err(|e| {
            error!(%url, page, error = %e, "Error requesting url");
            e
        })
    }

    fn fetch_inner<F>(&self, url: &Url, page: Option<u32>, apply: F) -> Result<Envelope>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let token = self.session.bearer(&self.http)?;

        let transport_error = |source| EveractiveError::Transport {
            url: url.to_string(),
            page,
            source,
        };

        let response = send_with_retries(|| apply(self.http.get(url.clone()).bearer_auth(&token)))
            .map_err(transport_error)?;

        debug!(url = %response.url(), status = %response.status(), "Requested URL");
        let response = check_response(url, response)?;
        let body = response.text().map_err(transport_error)?;

        serde_json::from_str(&body).map_err(|e| EveractiveError::UnexpectedResponse {
            url: url.to_string(),
            page,
            reason: format!("expected a JSON object with a `data` field: {e}"),
        })
    }
}

/// Send a request, retrying connection failures up to [`CONNECT_RETRIES`] times.
///
/// `build` is called once per attempt. Responses with error statuses and
/// timeouts after the connection was established are returned as they are.
pub(crate) fn send_with_retries<F>(build: F) -> reqwest::Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 0;
    loop {
        match build().send() {
            Err(err) if err.is_connect() && attempt < CONNECT_RETRIES => {
                attempt += 1;
                warn!(attempt, max_retries = CONNECT_RETRIES, error = %err, "Connection failed, retrying");
            }
            result => return result,
        }
    }
}

/// Check response status and convert errors.
fn check_response(url: &Url, response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = error_message(response, status);
    Err(EveractiveError::Api {
        url: url.to_string(),
        status: status.as_u16(),
        message,
    })
}

/// Extract error message from a failed response.
pub(crate) fn error_message(response: Response, status: StatusCode) -> String {
    let body = match response.text() {
        Ok(b) if !b.is_empty() => b,
        _ => return format!("HTTP {status}"),
    };

    // Try to parse as JSON and extract message field
    if let Ok(json) = serde_json::from_str::<Value>(&body) {
        for key in ["message", "error_description", "error"] {
            if let Some(msg) = json.get(key).and_then(|m| m.as_str()) {
                return msg.to_string();
            }
        }
    }

    body
}
