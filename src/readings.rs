//! Normalization of Eversensor reading records.
//!
//! Readings report per-rail event counts in one of two schemas:
//!
//! - v2: `"railCounts": {"counts": [{"index": 0, "count": 5, "overflow": false}, ...]}`
//! - v1: `"loadCounts": [{"count": 7}]`
//!
//! [`normalize_reading`] rewrites both into a single shape,
//! `"railCounts": {"PV_IN": {"count": 5, "overflow": false}, ...}`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EveractiveError, Result};

const RAIL_COUNTS: &str = "railCounts";
const LOAD_COUNTS: &str = "loadCounts";

/// Canonical rail names, indexed by the `index` field of v2 rail counts.
pub const RAIL_NAMES: [&str; 8] = [
    "PV_IN", "TEG_IN", "VCAP_SRC", "VCAP_LD", "1P8", "1P2", "0P9", "VADJ",
];

/// Canonical name of the rail at `index`.
pub fn rail_name(index: usize) -> Option<&'static str> {
    RAIL_NAMES.get(index).copied()
}

/// One entry of a v2 `railCounts.counts` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RailCount {
    pub index: usize,
    pub count: u64,
    #[serde(default)]
    pub overflow: Option<bool>,
}

/// The v2 `railCounts` object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RailCounts {
    pub counts: Vec<RailCount>,
}

/// One entry of a v1 `loadCounts` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoadCount {
    pub count: u64,
}

/// Normalized count for one rail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RailReading {
    pub count: u64,
    /// Always `None` for readings converted from v1 load counts.
    pub overflow: Option<bool>,
}

/// Which count schema a reading record uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountSchema {
    /// v2 per-rail counts.
    Rails(RailCounts),
    /// v1 single load count.
    Load(Vec<LoadCount>),
    /// Neither field is present.
    Absent,
}

impl CountSchema {
    /// Decode the count schema of a reading record.
    ///
    /// # Errors
    ///
    /// Returns [`EveractiveError::Normalization`] if the record is not an
    /// object, carries both fields, or a field has an unexpected shape.
    pub fn of(record: &Value) -> Result<Self> {
        let object = record.as_object().ok_or_else(|| {
            EveractiveError::Normalization("reading record is not a JSON object".to_string())
        })?;

        match (object.get(RAIL_COUNTS), object.get(LOAD_COUNTS)) {
            (Some(_), Some(_)) => Err(EveractiveError::Normalization(
                "reading has both railCounts and loadCounts".to_string(),
            )),
            (Some(rails), None) => RailCounts::deserialize(rails)
                .map(Self::Rails)
                .map_err(|e| {
                    EveractiveError::Normalization(format!("malformed railCounts: {e}"))
                }),
            (None, Some(load)) => Vec::<LoadCount>::deserialize(load)
                .map(Self::Load)
                .map_err(|e| {
                    EveractiveError::Normalization(format!("malformed loadCounts: {e}"))
                }),
            (None, None) => Ok(Self::Absent),
        }
    }

    /// The canonical `railCounts` mapping, or `None` for [`CountSchema::Absent`].
    ///
    /// # Errors
    ///
    /// Returns [`EveractiveError::Normalization`] for a rail index outside
    /// [`RAIL_NAMES`], a rail index given twice, or empty load counts.
    pub fn into_rail_readings(self) -> Result<Option<Map<String, Value>>> {
        let readings = match self {
            Self::Absent => return Ok(None),
            Self::Rails(rails) => {
                let mut seen = HashSet::new();
                rails
                    .counts
                    .into_iter()
                    .map(|rail| {
                        if !seen.insert(rail.index) {
                            return Err(EveractiveError::Normalization(format!(
                                "duplicate rail index {}",
                                rail.index
                            )));
                        }
                        let name = rail_name(rail.index).ok_or_else(|| {
                            EveractiveError::Normalization(format!(
                                "unknown rail index {}",
                                rail.index
                            ))
                        })?;
                        Ok((
                            name,
                            RailReading {
                                count: rail.count,
                                overflow: rail.overflow,
                            },
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?
            }
            Self::Load(loads) => {
                let load = loads.first().ok_or_else(|| {
                    EveractiveError::Normalization("loadCounts is empty".to_string())
                })?;
                vec![(
                    RAIL_NAMES[0],
                    RailReading {
                        count: load.count,
                        overflow: None,
                    },
                )]
            }
        };

        let mut mapping = Map::new();
        for (name, reading) in readings {
            let value = serde_json::to_value(reading)
                .map_err(|e| EveractiveError::Normalization(e.to_string()))?;
            mapping.insert(name.to_string(), value);
        }
        Ok(Some(mapping))
    }
}

/// Rewrite a reading's rail or load counts into the canonical `railCounts` mapping.
///
/// Records with neither field are returned unchanged. A converted v1 record
/// loses its `loadCounts` field.
///
/// # Example
///
/// ```
/// use serde_json::json;
///
/// let reading = json!({"railCounts": {"counts": [{"index": 4, "count": 2, "overflow": true}]}});
/// let normalized = everactive::normalize_reading(reading).unwrap();
/// assert_eq!(normalized["railCounts"]["1P8"], json!({"count": 2, "overflow": true}));
/// ```
pub fn normalize_reading(mut record: Value) -> Result<Value> {
    let Some(mapping) = CountSchema::of(&record)?.into_rail_readings()? else {
        return Ok(record);
    };

    if let Some(object) = record.as_object_mut() {
        object.remove(LOAD_COUNTS);
        object.insert(RAIL_COUNTS.to_string(), Value::Object(mapping));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rail_counts_rekeyed_by_name() {
        let reading = json!({
            "timestamp": 1_700_000_000,
            "railCounts": {"counts": [
                {"index": 0, "count": 5, "overflow": false},
                {"index": 4, "count": 2, "overflow": true}
            ]}
        });

        let normalized = normalize_reading(reading).unwrap();

        assert_eq!(
            normalized["railCounts"],
            json!({
                "PV_IN": {"count": 5, "overflow": false},
                "1P8": {"count": 2, "overflow": true}
            })
        );
        assert_eq!(normalized["railCounts"].as_object().unwrap().len(), 2);
        assert_eq!(normalized["timestamp"], 1_700_000_000);
    }

    #[test]
    fn test_load_counts_become_pv_in() {
        let reading = json!({"loadCounts": [{"count": 7}]});

        let normalized = normalize_reading(reading).unwrap();

        assert_eq!(
            normalized["railCounts"],
            json!({"PV_IN": {"count": 7, "overflow": null}})
        );
        assert!(normalized.get("loadCounts").is_none());
    }

    #[test]
    fn test_reading_without_counts_passes_through() {
        let reading = json!({"temperature": {"value": 21.5}, "humidity": 40});
        assert_eq!(normalize_reading(reading.clone()).unwrap(), reading);
    }

    #[test]
    fn test_every_rail_index_has_a_name() {
        let counts: Vec<Value> = (0..8)
            .map(|i| json!({"index": i, "count": i, "overflow": false}))
            .collect();
        let normalized = normalize_reading(json!({"railCounts": {"counts": counts}})).unwrap();

        let names: Vec<&str> = normalized["railCounts"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, RAIL_NAMES);
    }

    #[test]
    fn test_unknown_rail_index_is_an_error() {
        let reading = json!({"railCounts": {"counts": [{"index": 8, "count": 1, "overflow": false}]}});
        let err = normalize_reading(reading).unwrap_err();
        assert!(matches!(err, EveractiveError::Normalization(_)));
        assert!(err.to_string().contains("unknown rail index 8"));
    }

    #[test]
    fn test_duplicate_rail_index_is_an_error() {
        let reading = json!({"railCounts": {"counts": [
            {"index": 2, "count": 1, "overflow": false},
            {"index": 2, "count": 9, "overflow": true}
        ]}});
        let err = normalize_reading(reading).unwrap_err();
        assert!(matches!(err, EveractiveError::Normalization(_)));
        assert!(err.to_string().contains("duplicate rail index 2"));
    }

    #[test]
    fn test_rail_counts_without_counts_array_is_an_error() {
        let reading = json!({"railCounts": [{"index": 0, "count": 1}]});
        assert!(matches!(
            normalize_reading(reading),
            Err(EveractiveError::Normalization(_))
        ));
    }

    #[test]
    fn test_empty_load_counts_is_an_error() {
        let reading = json!({"loadCounts": []});
        assert!(matches!(
            normalize_reading(reading),
            Err(EveractiveError::Normalization(_))
        ));
    }

    #[test]
    fn test_both_schemas_is_an_error() {
        let reading = json!({
            "railCounts": {"counts": []},
            "loadCounts": [{"count": 1}]
        });
        assert!(matches!(
            CountSchema::of(&reading),
            Err(EveractiveError::Normalization(_))
        ));
    }

    #[test]
    fn test_non_object_reading_is_an_error() {
        assert!(matches!(
            normalize_reading(json!([1, 2, 3])),
            Err(EveractiveError::Normalization(_))
        ));
    }

    #[test]
    fn test_count_schema_detection() {
        assert_eq!(CountSchema::of(&json!({})).unwrap(), CountSchema::Absent);
        assert!(matches!(
            CountSchema::of(&json!({"loadCounts": [{"count": 3}]})).unwrap(),
            CountSchema::Load(_)
        ));
    }
}
