//! Parameter serialization helpers.
//!
//! Built-in filters keep their configuration in a plain serde struct whose
//! field names are the stable property names used in pipeline files. These
//! helpers move such a struct in and out of the JSON object a filter is
//! stored under. Unknown keys in the object (the `Filter_*` metadata, for
//! instance) are ignored; missing keys take the struct's defaults.

use crate::pipeline::error::{PipelineError, PipelineResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Deserialize `P` from the properties in `json`.
pub fn read_params<P: DeserializeOwned>(filter: &str, json: &Map<String, Value>) -> PipelineResult<P> {
    serde_json::from_value(Value::Object(json.clone())).map_err(|e| PipelineError::Parameter {
        filter: filter.to_string(),
        name: field_from_error(&e),
        message: e.to_string(),
    })
}

/// Serialize `params` and merge its properties into `json`.
pub fn write_params<P: Serialize>(params: &P, json: &mut Map<String, Value>) {
    match serde_json::to_value(params) {
        Ok(Value::Object(map)) => json.extend(map),
        Ok(other) => tracing::warn!("Filter parameters serialized to non-object {}", other),
        Err(e) => tracing::warn!("Failed to serialize filter parameters: {}", e),
    }
}

/// Best-effort extraction of the offending property name from a serde error.
fn field_from_error(err: &serde_json::Error) -> String {
    let text = err.to_string();
    text.split('`')
        .nth(1)
        .map(str::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DataArrayPath;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Default)]
    #[serde(default)]
    struct Params {
        #[serde(rename = "SelectedArrayPath")]
        selected: DataArrayPath,
        #[serde(rename = "NewArrayName")]
        new_name: String,
    }

    #[test]
    fn test_round_trip_through_object() {
        let params = Params {
            selected: DataArrayPath::new("DC", "AM", "A"),
            new_name: "B".into(),
        };
        let mut json = Map::new();
        json.insert("Filter_Name".into(), Value::from("Whatever"));
        write_params(&params, &mut json);
        assert_eq!(json["NewArrayName"], "B");
        assert_eq!(json["SelectedArrayPath"]["Data Array Name"], "A");
        let back: Params = read_params("Test", &json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let back: Params = read_params("Test", &Map::new()).unwrap();
        assert_eq!(back, Params::default());
    }

    #[test]
    fn test_wrong_type_reports_parameter_error() {
        let mut json = Map::new();
        json.insert("NewArrayName".into(), Value::from(5));
        let err = read_params::<Params>("Test", &json).unwrap_err();
        assert!(matches!(err, PipelineError::Parameter { ref filter, .. } if filter == "Test"));
    }
}
