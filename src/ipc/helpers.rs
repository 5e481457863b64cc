//! Param extraction shared by the handler families.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{PortalError, PortalResult};

pub fn required_str<'a>(params: &'a Value, key: &str) -> PortalResult<&'a str> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| PortalError::bad_params(format!("missing params.{key}")))
}

pub fn optional_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

/// Deserializes the whole params object; a missing object reads as `{}`.
pub fn parse_params<T: DeserializeOwned>(params: &Value) -> PortalResult<T> {
    let source = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params.clone()
    };
    serde_json::from_value(source).map_err(|e| PortalError::bad_params(e.to_string()))
}

pub fn to_value<T: Serialize>(v: &T) -> PortalResult<Value> {
    serde_json::to_value(v).map_err(|e| PortalError::Storage(e.into()))
}

/// Trimmed text, or `None` when absent or blank.
pub fn non_blank(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct P {
        course_id: String,
        #[serde(default)]
        note: Option<String>,
    }

    #[test]
    fn required_and_optional() {
        let p = json!({ "path": "/tmp/x", "n": 3 });
        assert_eq!(required_str(&p, "path").expect("path"), "/tmp/x");
        assert_eq!(required_str(&p, "n").unwrap_err().code(), "bad_params");
        assert_eq!(optional_str(&p, "missing"), None);
    }

    #[test]
    fn parse_params_reports_bad_shapes() {
        let p: P = parse_params(&json!({ "courseId": "c1" })).expect("parse");
        assert_eq!(p.course_id, "c1");
        assert_eq!(p.note, None);
        let e = parse_params::<P>(&Value::Null).err().expect("missing field");
        assert_eq!(e.code(), "bad_params");
    }

    #[test]
    fn blank_strings_are_none() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" a ")), Some("a".to_string()));
    }
}
