//! Wire shapes of the task manifest (`package_info_record.url_info`).

use serde::Deserialize;
use serde_json::{Map, Value};

/// Root manifest object. Only `list` is required; other sections are ignored.
/// Units stay untyped here so one odd unit is skipped instead of failing the document.
#[derive(Debug, Deserialize)]
pub struct RawManifest {
    #[serde(default)]
    pub global: Option<Map<String, Value>>,
    pub list: Vec<Value>,
}

/// One mesh (unit) and the resource groups it references.
#[derive(Debug, Deserialize)]
pub struct RawUnit {
    #[serde(default)]
    pub mesh_id: Option<Value>,
    #[serde(default)]
    pub refer_url: Option<Map<String, Value>>,
}

/// Renders an identifier that may be a JSON string or number.
/// Empty strings, null, and other shapes yield None.
pub fn ident(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A key becomes a file name in the work dir, so it must be a single plain path component.
pub fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && !key.contains("..")
        && !key.chars().any(|c| c == '/' || c == '\\' || c == '\0')
}
