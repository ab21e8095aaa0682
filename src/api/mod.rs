//! Named operations over the Everactive Data Services API.
//!
//! [`EveractiveApi`] maps each endpoint onto an [`ApiConnection`] call and
//! shapes the result into the requested [`Output`](crate::Output).

mod gateways;
mod sensors;

pub use sensors::SensorListQuery;

use serde_json::Value;

use crate::output::{Output, OutputFormat};
use crate::transport::ApiConnection;
use crate::Result;

/// Client for Eversensor and Evergateway endpoints.
///
/// Every operation takes an output format (`"json"`, `"table"`, or an
/// [`OutputFormat`](crate::OutputFormat)) and rejects unrecognized names
/// before making a request.
///
/// # Example
///
/// ```no_run
/// use everactive::{ApiConnection, EveractiveApi, OutputFormat};
///
/// # fn example() -> everactive::Result<()> {
/// let api = EveractiveApi::new(ApiConnection::from_env()?);
///
/// let sensors = api.list_sensors("json")?;
/// let readings = api.get_readings("bc:5e:a1:00:00:01", 1_700_000_000, 1_700_003_600, OutputFormat::Table)?;
/// println!("{} sensors, {} readings", sensors.len(), readings.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EveractiveApi {
    connection: ApiConnection,
}

impl EveractiveApi {
    /// Wrap an authenticated connection.
    pub fn new(connection: ApiConnection) -> Self {
        Self { connection }
    }

    /// Connect using credentials from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ApiConnection::from_env()?))
    }

    /// The underlying connection.
    pub fn connection(&self) -> &ApiConnection {
        &self.connection
    }

    /// Give back the underlying connection.
    pub fn into_connection(self) -> ApiConnection {
        self.connection
    }

    /// Apply the output format, logging through the connection's dispatcher.
    fn shape(&self, format: OutputFormat, records: Vec<Value>) -> Output {
        self.connection.in_scope(|| format.apply(records))
    }
}

/// Percent-encode one path segment.
///
/// Colons are legal in path segments and MAC addresses are made of them, so
/// they stay as they are.
fn segment(value: &str) -> String {
    urlencoding::encode(value).replace("%3A", ":")
}
