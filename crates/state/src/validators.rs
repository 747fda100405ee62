//! Runtime shape validators for persisted state.
//!
//! A validator inspects the parsed JSON payload and either produces the
//! typed value or a reason for rejecting it. Rejection is all-or-nothing:
//! one bad element rejects the whole payload.

use hwt_shared::Validation;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// Boxed validator for a state cell of type `T`.
pub type Validator<T> = Box<dyn Fn(&Value) -> Validation<T> + Send + Sync>;

/// Decode `value` into `T` with serde, no extra shape checks.
pub fn decode<T: DeserializeOwned>(value: &Value) -> Validation<T> {
    serde_json::from_value::<T>(value.clone()).into()
}

/// Accept an array whose elements are all JSON strings.
pub fn string_array<T: DeserializeOwned>(value: &Value) -> Validation<Vec<T>> {
    let Value::Array(items) = value else {
        return Validation::invalid(format!("expected an array, found {}", kind_of(value)));
    };
    if let Some((index, item)) = items.iter().enumerate().find(|(_, item)| !item.is_string()) {
        return Validation::invalid(format!(
            "element {index} is {}, expected a string",
            kind_of(item)
        ));
    }
    decode(value)
}

/// Accept a JSON object, validating every value with `value_validator`.
pub fn object_of<V, F>(value_validator: F) -> impl Fn(&Value) -> Validation<BTreeMap<String, V>>
where
    F: Fn(&Value) -> Validation<V>,
{
    move |value| {
        let Value::Object(entries) = value else {
            return Validation::invalid(format!("expected an object, found {}", kind_of(value)));
        };
        let mut decoded = BTreeMap::new();
        for (key, entry) in entries {
            match value_validator(entry) {
                Validation::Valid(item) => {
                    decoded.insert(key.clone(), item);
                },
                Validation::Invalid(reason) => {
                    return Validation::invalid(format!("entry {key:?}: {reason}"));
                },
            }
        }
        Validation::Valid(decoded)
    }
}

/// Accept any JSON number.
pub fn number(value: &Value) -> Validation<f64> {
    value.as_f64().map_or_else(
        || Validation::invalid(format!("expected a number, found {}", kind_of(value))),
        Validation::Valid,
    )
}

/// Accept an integral JSON number.
pub fn integer(value: &Value) -> Validation<i64> {
    value.as_i64().map_or_else(
        || Validation::invalid(format!("expected an integer, found {}", kind_of(value))),
        Validation::Valid,
    )
}

/// Accept a JSON string.
pub fn string(value: &Value) -> Validation<String> {
    value.as_str().map_or_else(
        || Validation::invalid(format!("expected a string, found {}", kind_of(value))),
        |text| Validation::Valid(text.to_owned()),
    )
}

/// Accept a JSON boolean.
pub fn boolean(value: &Value) -> Validation<bool> {
    value.as_bool().map_or_else(
        || Validation::invalid(format!("expected a boolean, found {}", kind_of(value))),
        Validation::Valid,
    )
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
