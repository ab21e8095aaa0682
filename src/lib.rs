//! Everactive Data Services API client library.
//!
//! A blocking Rust client for the Everactive environmental sensor cloud,
//! covering Eversensors (identified by MAC address) and Evergateways.
//!
//! # Quick Start
//!
//! ```no_run
//! use everactive::{ApiConnection, EveractiveApi};
//!
//! fn main() -> everactive::Result<()> {
//!     // Credentials from EVERACTIVE_CLIENT_ID / EVERACTIVE_CLIENT_SECRET
//!     let api = EveractiveApi::new(ApiConnection::from_env()?);
//!
//!     // All developer-kit environmental sensors
//!     let sensors = api.list_sensors("json")?;
//!     println!("Found {} sensors", sensors.len());
//!
//!     // One hour of readings, flattened into a table
//!     let readings = api.get_readings("bc:5e:a1:00:00:01", 1_700_000_000, 1_700_003_600, "table")?;
//!     if let Some(table) = readings.as_table() {
//!         println!("{table}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`ApiConnection`] - OAuth2 client-credentials session, raw GETs and
//!   page aggregation
//! - [`EveractiveApi`] - named sensor and gateway operations
//! - [`normalize_reading`] - rewrites the two rail/load count schemas of
//!   sensor readings into one
//! - [`Output`] - row-oriented or flattened tabular results
//!
//! # Configuration
//!
//! - `EVERACTIVE_CLIENT_ID`, `EVERACTIVE_CLIENT_SECRET` - API credentials,
//!   used when none are passed explicitly
//! - `LOG_LEVEL` - verbosity of [`logging::dispatch_from_env`] (default `info`)

mod api;
mod auth;
mod config;
mod error;
mod output;
mod pagination;
mod palette;
mod readings;
mod transport;

pub mod cli;
pub mod logging;

// Re-export core types
pub use config::{
    ClientConfig, Credentials, CLIENT_ID_ENV, CLIENT_SECRET_ENV, CONNECT_RETRIES,
    DEFAULT_API_URL, TOKEN_PATH,
};
pub use error::{EveractiveError, Result};
pub use pagination::{Envelope, Listing, PaginationInfo, DEFAULT_PAGE_SIZE};
pub use transport::ApiConnection;

// Re-export the resource client
pub use api::{EveractiveApi, SensorListQuery};

// Re-export readings normalization
pub use readings::{
    normalize_reading, rail_name, CountSchema, LoadCount, RailCount, RailCounts, RailReading,
    RAIL_NAMES,
};

// Re-export output and palette types
pub use output::{IntoOutputFormat, Output, OutputFormat, Table};
pub use palette::{Color, DEFAULT_INTENSITY, INTENSITIES};
