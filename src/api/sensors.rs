//! Eversensor endpoints.

use serde::Serialize;
use tracing::debug;

use super::{segment, EveractiveApi};
use crate::output::{IntoOutputFormat, Output};
use crate::pagination::{records_from, DEFAULT_PAGE_SIZE};
use crate::readings::normalize_reading;
use crate::Result;

const SENSORS_PATH: &str = "ds/v1/eversensors";
const SENSORS_SORT_BY: &str = "mac-address";

/// Filter for listing Eversensors.
///
/// The default matches the bundled developer-kit environmental sensors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorListQuery {
    /// Only sensors bundled with a developer kit.
    #[serde(rename = "devkitBundled", skip_serializing_if = "Option::is_none")]
    pub devkit_bundled: Option<bool>,

    /// Sensor type, e.g. `Environmental`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub sensor_type: Option<String>,
}

impl Default for SensorListQuery {
    fn default() -> Self {
        Self {
            devkit_bundled: Some(true),
            sensor_type: Some("Environmental".to_string()),
        }
    }
}

impl SensorListQuery {
    /// No filter: every sensor visible to the credentials.
    pub fn all() -> Self {
        Self {
            devkit_bundled: None,
            sensor_type: None,
        }
    }
}

/// Bounds of a readings request, in unix seconds.
#[derive(Debug, Serialize)]
struct ReadingsWindow {
    #[serde(rename = "start-time")]
    start_time: i64,
    #[serde(rename = "end-time")]
    end_time: i64,
}

impl EveractiveApi {
    /// List the developer-kit environmental Eversensors, sorted by MAC address.
    pub fn list_sensors(&self, output_format: impl IntoOutputFormat) -> Result<Output> {
        self.list_sensors_with_query(&SensorListQuery::default(), output_format)
    }

    /// List Eversensors matching `query`, sorted by MAC address.
    pub fn list_sensors_with_query(
        &self,
        query: &SensorListQuery,
        output_format: impl IntoOutputFormat,
    ) -> Result<Output> {
        let format = output_format.into_output_format()?;

        let records = self
            .connection
            .get_paginated(SENSORS_PATH, SENSORS_SORT_BY, query, DEFAULT_PAGE_SIZE)?
            .into_records();

        Ok(self.shape(format, records))
    }

    /// Readings of one Eversensor between `start_time` and `end_time` (unix seconds).
    ///
    /// The API serves at most 24 hours of readings per call; a wider window
    /// is reported by the API, not checked here. Each reading's rail or load
    /// counts are normalized with [`normalize_reading`].
    ///
    /// # Errors
    ///
    /// Besides request failures, returns
    /// [`EveractiveError::Normalization`](crate::EveractiveError::Normalization)
    /// if a reading has an unexpected count shape.
    pub fn get_readings(
        &self,
        mac_address: &str,
        start_time: i64,
        end_time: i64,
        output_format: impl IntoOutputFormat,
    ) -> Result<Output> {
        let format = output_format.into_output_format()?;

        let path = format!("{SENSORS_PATH}/{}/readings", segment(mac_address));
        let window = ReadingsWindow {
            start_time,
            end_time,
        };
        let data = self.connection.get_with_query(&path, &window)?;

        let readings = self.connection.in_scope(|| {
            let readings = records_from(data)
                .into_iter()
                .map(normalize_reading)
                .collect::<Result<Vec<_>>>()?;
            debug!(mac_address, count = readings.len(), "Normalized readings");
            Ok::<_, crate::EveractiveError>(readings)
        })?;

        Ok(self.shape(format, readings))
    }

    /// The most recent reading of one Eversensor.
    ///
    /// Unlike [`get_readings`](Self::get_readings), the reading is returned
    /// as the API sent it, without count normalization. Pass it through
    /// [`normalize_reading`] for the canonical `railCounts` shape.
    pub fn get_last_reading(
        &self,
        mac_address: &str,
        output_format: impl IntoOutputFormat,
    ) -> Result<Output> {
        let format = output_format.into_output_format()?;

        let path = format!("{SENSORS_PATH}/{}/readings/last", segment(mac_address));
        let data = self.connection.get(&path)?;

        Ok(self.shape(format, records_from(data)))
    }
}
