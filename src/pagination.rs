//! Pagination types for Everactive API responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    /// Current page number (1-indexed).
    pub page: u32,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of items across all pages.
    #[serde(default)]
    pub total_items: u64,
}

impl PaginationInfo {
    /// Whether the aggregation loop should go on past this page.
    ///
    /// Uses `total_pages >= page`: the remaining page range `2..=total_pages`
    /// is empty exactly when there is a single page.
    pub fn continues(&self) -> bool {
        self.total_pages >= self.page
    }
}

/// Response body of an Everactive endpoint, decoded by shape.
///
/// List endpoints wrap their records with `paginationInfo`; single-resource
/// endpoints return a flat `data` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    /// A page of a list endpoint.
    Paged {
        data: Vec<Value>,
        #[serde(rename = "paginationInfo")]
        pagination_info: PaginationInfo,
    },
    /// A non-paginated response.
    Flat { data: Value },
}

impl Envelope {
    /// The pagination metadata, if this is a page.
    pub fn pagination_info(&self) -> Option<&PaginationInfo> {
        match self {
            Self::Paged {
                pagination_info, ..
            } => Some(pagination_info),
            Self::Flat { .. } => None,
        }
    }

    /// Consume the envelope, returning its `data` payload.
    pub fn into_data(self) -> Value {
        match self {
            Self::Paged { data, .. } => Value::Array(data),
            Self::Flat { data } => data,
        }
    }
}

/// Result of a paginated GET.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    /// Records of every page, concatenated in page order.
    Paginated(Vec<Value>),
    /// The endpoint answered without `paginationInfo`; this is its `data`
    /// payload, unmodified.
    Unpaginated(Value),
}

impl Listing {
    /// Whether the response carried pagination metadata.
    pub fn is_paginated(&self) -> bool {
        matches!(self, Self::Paginated(_))
    }

    /// Flatten into a list of records.
    ///
    /// An unpaginated array yields its elements, `null` yields nothing, and
    /// any other value is a single record.
    pub fn into_records(self) -> Vec<Value> {
        match self {
            Self::Paginated(records) => records,
            Self::Unpaginated(data) => records_from(data),
        }
    }
}

/// Turn a `data` payload into a list of records.
pub(crate) fn records_from(data: Value) -> Vec<Value> {
    match data {
        Value::Array(records) => records,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

const PAGE: &str = "page";
const PAGE_SIZE: &str = "page-size";
const SORT_BY: &str = "sort-by";

/// Query parameters of a paginated request.
///
/// Caller parameters named `page-size` or `sort-by` replace the defaults
/// instead of being sent a second time. `page` is always set by the
/// pagination loop, so a caller-supplied `page` is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageQuery {
    page_size: String,
    sort_by: String,
    extra: Vec<(String, String)>,
}

impl PageQuery {
    pub(crate) fn new(page_size: u32, sort_by: &str, caller: Vec<(String, String)>) -> Self {
        let mut query = Self {
            page_size: page_size.to_string(),
            sort_by: sort_by.to_string(),
            extra: Vec::new(),
        };
        for (key, value) in caller {
            match key.as_str() {
                PAGE => {}
                PAGE_SIZE => query.page_size = value,
                SORT_BY => query.sort_by = value,
                _ => query.extra.push((key, value)),
            }
        }
        query
    }

    /// Parameters for one page, defaults first.
    pub(crate) fn for_page(&self, page: u32) -> Vec<(&str, String)> {
        let mut params = vec![
            (PAGE, page.to_string()),
            (PAGE_SIZE, self.page_size.clone()),
            (SORT_BY, self.sort_by.clone()),
        ];
        params.extend(self.extra.iter().map(|(k, v)| (k.as_str(), v.clone())));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_paged() {
        let envelope: Envelope = serde_json::from_value(json!({
            "data": [{"macAddress": "bc:5e:a1:00:00:01"}],
            "paginationInfo": {"page": 1, "totalPages": 3, "totalItems": 7}
        }))
        .unwrap();

        let info = envelope.pagination_info().copied().unwrap();
        assert_eq!(info.total_pages, 3);
        assert_eq!(info.total_items, 7);
        assert!(info.continues());
    }

    #[test]
    fn test_envelope_flat() {
        let envelope: Envelope =
            serde_json::from_value(json!({"data": {"serialNumber": "gw-1"}})).unwrap();
        assert!(envelope.pagination_info().is_none());
        assert_eq!(envelope.into_data(), json!({"serialNumber": "gw-1"}));
    }

    #[test]
    fn test_envelope_without_data_is_rejected() {
        let result: Result<Envelope, _> = serde_json::from_value(json!({"message": "nope"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_single_page_continues() {
        let info = PaginationInfo {
            page: 1,
            total_pages: 1,
            total_items: 4,
        };
        assert!(info.continues());

        let empty = PaginationInfo {
            page: 1,
            total_pages: 0,
            total_items: 0,
        };
        assert!(!empty.continues());
    }

    #[test]
    fn test_listing_into_records() {
        assert_eq!(
            Listing::Unpaginated(json!([{"a": 1}, {"a": 2}])).into_records().len(),
            2
        );
        assert!(Listing::Unpaginated(Value::Null).into_records().is_empty());
        assert_eq!(
            Listing::Unpaginated(json!({"a": 1})).into_records(),
            vec![json!({"a": 1})]
        );
    }

    fn pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery::new(500, "mac-address", pairs(&[("type", "Environmental")]));
        assert_eq!(
            query.for_page(2),
            vec![
                ("page", "2".to_string()),
                ("page-size", "500".to_string()),
                ("sort-by", "mac-address".to_string()),
                ("type", "Environmental".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_query_caller_overrides_defaults() {
        let query = PageQuery::new(
            500,
            "serial-number",
            pairs(&[("page-size", "10"), ("sort-by", "name"), ("page", "9")]),
        );
        assert_eq!(
            query.for_page(1),
            vec![
                ("page", "1".to_string()),
                ("page-size", "10".to_string()),
                ("sort-by", "name".to_string()),
            ]
        );
    }
}
