//! Shared wiremock fixtures for the integration tests.
//!
//! The client is blocking, so tests drive it from `spawn_blocking` while the
//! mock server keeps running on the tokio runtime.

#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use everactive::{ApiConnection, ClientConfig, Credentials, EveractiveApi};
use serde_json::{json, Value};
use tracing::field::{Field, Visit};
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ACCESS_TOKEN: &str = "test-token";

/// Mount a token endpoint that grants [`ACCESS_TOKEN`] for an hour.
pub async fn mount_token(server: &MockServer) {
    mount_token_expiring(server, 3600, None).await;
}

/// Mount a token endpoint with a given lifetime and optional call count.
pub async fn mount_token_expiring(server: &MockServer, expires_in: u64, expect: Option<u64>) {
    let mock = Mock::given(method("POST"))
        .and(path("/auth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=test-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": expires_in
        })));

    match expect {
        Some(n) => mock.expect(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

/// Client configuration pointed at the mock server.
pub fn config(base_url: &str) -> ClientConfig {
    ClientConfig::default()
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5))
}

pub fn credentials() -> Credentials {
    Credentials::new("test-id", "test-secret")
}

/// Connect to the mock server. Must be called from a blocking context.
pub fn connect(base_url: &str) -> ApiConnection {
    ApiConnection::with_config(credentials(), config(base_url)).unwrap()
}

/// Resource client on the mock server. Must be called from a blocking context.
pub fn api(base_url: &str) -> EveractiveApi {
    EveractiveApi::new(connect(base_url))
}

/// One page of a paginated listing.
pub fn page_body(page: u32, total_pages: u32, data: Value) -> Value {
    let total_items = data.as_array().map_or(0, Vec::len) as u32 * total_pages;
    json!({
        "data": data,
        "paginationInfo": {
            "page": page,
            "totalPages": total_pages,
            "totalItems": total_items
        }
    })
}

/// Run blocking client code off the async runtime.
pub async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

/// Counts log events whose message equals a given text.
#[derive(Clone)]
pub struct MessageCounter {
    message: &'static str,
    count: Arc<AtomicUsize>,
}

impl MessageCounter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

struct MessageVisitor(Option<String>);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for MessageCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if visitor.0.as_deref() == Some(self.message) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// A dispatcher that counts events logged with `message`.
pub fn counting_dispatch(message: &'static str) -> (Dispatch, MessageCounter) {
    let counter = MessageCounter {
        message,
        count: Arc::new(AtomicUsize::new(0)),
    };
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    (Dispatch::new(subscriber), counter)
}
