//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the everactive binary.

use std::time::Duration;

use chrono::DateTime;
use clap::{Parser, Subcommand};

/// Everactive Data Services command-line interface.
#[derive(Parser, Debug)]
#[command(name = "everactive", about = "Everactive Data Services CLI", version)]
pub struct Cli {
    /// Output format: "json" (records) or "table" (flattened columns).
    #[arg(long, global = true, default_value = "json")]
    pub format: String,

    /// API client id (falls back to EVERACTIVE_CLIENT_ID).
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// API client secret (falls back to EVERACTIVE_CLIENT_SECRET).
    #[arg(long, global = true)]
    pub client_secret: Option<String>,

    /// Base URL of the API.
    #[arg(long, global = true, env = "EVERACTIVE_API_URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, default_value = "30")]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List Eversensors.
    #[command(alias = "eversensors")]
    Sensors {
        /// Include every sensor, not only developer-kit environmental ones.
        #[arg(long)]
        all: bool,
    },

    /// Fetch readings of one Eversensor over a time window (24 hours at most).
    Readings {
        /// MAC address of the Eversensor.
        mac_address: String,

        /// Start of the window, as unix seconds or RFC 3339.
        #[arg(long, value_parser = parse_timestamp)]
        start: i64,

        /// End of the window, as unix seconds or RFC 3339.
        #[arg(long, value_parser = parse_timestamp)]
        end: i64,
    },

    /// Fetch the most recent reading of one Eversensor.
    LastReading {
        /// MAC address of the Eversensor.
        mac_address: String,
    },

    /// List Evergateways.
    #[command(alias = "evergateways")]
    Gateways,

    /// Fetch metadata of one Evergateway.
    Gateway {
        /// Identifier of the Evergateway.
        gateway_identifier: String,
    },

    /// Look up a palette color.
    Color {
        /// Palette color name, e.g. violet or dark_teal.
        name: String,

        /// Intensity percentage (20, 25, 33, 40, 50, 60, 67, 75, 80, 100).
        #[arg(long)]
        intensity: Option<u8>,
    },
}

/// Parse a timestamp given as unix seconds or RFC 3339.
pub fn parse_timestamp(value: &str) -> Result<i64, String> {
    if let Ok(secs) = value.parse::<i64>() {
        return Ok(secs);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp())
        .map_err(|e| format!("expected unix seconds or an RFC 3339 timestamp: {e}"))
}
