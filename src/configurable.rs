//! Shallow-merge configuration, used both for construction-time defaults and later partial updates

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A JSON object, i.e. a set of named properties
pub type Properties = Map<String, Value>;

/// Copy every property of every source into `target`, later sources overwriting earlier ones.
///
/// Absent sources are skipped. This is a shallow merge: nested objects are replaced, not merged.
pub fn extend<'a, I>(target: &mut Properties, sources: I) -> &mut Properties
where
    I: IntoIterator<Item = Option<&'a Properties>>,
{
    for source in sources.into_iter().flatten() {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    target
}

/// Build a `Properties` from a JSON value, or `None` if this value is not an object
pub fn as_properties(value: &Value) -> Option<&Properties> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Structures that can be partially updated from a set of properties
pub trait Configurable: Serialize + DeserializeOwned {
    /// Shallow-merge `source` into this value. Properties absent from `source` are left untouched.
    fn configure(&mut self, source: &Properties) -> Result<&mut Self, serde_json::Error> {
        let mut target = match serde_json::to_value(&*self)? {
            Value::Object(map) => map,
            _ => Properties::new(),
        };
        extend(&mut target, [Some(source)]);
        *self = serde_json::from_value(Value::Object(target))?;
        Ok(self)
    }
}
