//! Evergateway endpoints.

use super::{segment, EveractiveApi};
use crate::output::{IntoOutputFormat, Output};
use crate::pagination::{records_from, DEFAULT_PAGE_SIZE};
use crate::Result;

const GATEWAYS_PATH: &str = "ds/v1/evergateways";
const GATEWAYS_SORT_BY: &str = "serial-number";
const NO_FILTER: [(&str, &str); 0] = [];

impl EveractiveApi {
    /// List all Evergateways visible to the credentials, sorted by serial number.
    pub fn list_gateways(&self, output_format: impl IntoOutputFormat) -> Result<Output> {
        let format = output_format.into_output_format()?;

        let records = self
            .connection
            .get_paginated(GATEWAYS_PATH, GATEWAYS_SORT_BY, &NO_FILTER, DEFAULT_PAGE_SIZE)?
            .into_records();

        Ok(self.shape(format, records))
    }

    /// Metadata of one Evergateway.
    pub fn get_gateway(
        &self,
        gateway_identifier: &str,
        output_format: impl IntoOutputFormat,
    ) -> Result<Output> {
        let format = output_format.into_output_format()?;

        let path = format!("{GATEWAYS_PATH}/{}", segment(gateway_identifier));
        let data = self.connection.get(&path)?;

        Ok(self.shape(format, records_from(data)))
    }
}
