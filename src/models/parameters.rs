use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form key/value record captured on the parameters screen
/// (operator, machine id, spec tension, tolerance, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SessionParameters(BTreeMap<String, String>);

impl SessionParameters {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Numeric view of a parameter; `None` when absent or not a number.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Decodes an untyped form payload. Scalars become strings, `null`
    /// becomes an empty value and nested structures are dropped.
    pub fn from_json(payload: &Value) -> Self {
        let mut parameters = Self::default();
        let Some(fields) = payload.as_object() else {
            warn!("Ignoring non-object parameter payload");
            return parameters;
        };

        for (key, value) in fields {
            let text = match value {
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    warn!("Dropping nested parameter field '{key}'");
                    continue;
                }
            };
            parameters.insert(key.clone(), text);
        }

        parameters
    }
}
