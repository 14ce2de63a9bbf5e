//! Diff policy: is the expected object already contained in the observed one?
//!
//! The check is one-directional. Every field set on the expected side must
//! match on the observed side; anything only the observed side carries
//! (server defaults, allocator-assigned ports, fields added by other actors)
//! is ignored. `null` and empty strings on the expected side count as unset.
//! The API server omits `false` and `0` when it stores an object, so an
//! expected zero value matches an absent observed field.
//!
//! Lists of keyed objects (containers, volumes, env vars, mounts, ports) are
//! compared as sets keyed by their merge key, so a reordering alone never
//! triggers an update. Lists of scalars, such as commands, keep their order.
//! Resource quantities compare by value.

use crds::quantity::quantities_equal;
use serde_json::Value;

/// Merge keys tried, in order, to match list elements.
const LIST_KEYS: &[&str] = &["name", "port", "containerPort", "mountPath"];

/// Object keys whose values are maps of resource quantities.
const QUANTITY_MAPS: &[&str] = &["requests", "limits"];

/// Object keys whose values are single quantities.
const QUANTITY_FIELDS: &[&str] = &["sizeLimit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Plain,
    QuantityMap,
    Quantity,
}

/// Whether an update is needed to bring `observed` to `expected`.
pub fn needs_update(expected: &Value, observed: &Value) -> bool {
    !is_derivative(expected, observed)
}

/// Whether every set field of `expected` already matches in `observed`.
pub fn is_derivative(expected: &Value, observed: &Value) -> bool {
    derive(expected, observed, Context::Plain)
}

fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// `false` or numeric zero: omitted from stored objects by the API server.
fn is_zero(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn derive(expected: &Value, observed: &Value, context: Context) -> bool {
    if is_unset(expected) || (observed.is_null() && is_zero(expected)) {
        return true;
    }
    match expected {
        Value::Object(fields) => {
            let Some(observed) = observed.as_object() else {
                return fields.values().all(is_unset);
            };
            fields.iter().all(|(key, value)| {
                let child = match context {
                    Context::QuantityMap => Context::Quantity,
                    _ if QUANTITY_MAPS.contains(&key.as_str()) => Context::QuantityMap,
                    _ if QUANTITY_FIELDS.contains(&key.as_str()) => Context::Quantity,
                    _ => Context::Plain,
                };
                derive(value, observed.get(key).unwrap_or(&Value::Null), child)
            })
        }
        Value::Array(items) => {
            if items.is_empty() {
                return true;
            }
            let Some(observed) = observed.as_array() else {
                return false;
            };
            if items.len() != observed.len() {
                return false;
            }
            match list_key(items) {
                Some(key) => items.iter().all(|item| {
                    observed
                        .iter()
                        .find(|candidate| candidate.get(key) == item.get(key))
                        .is_some_and(|candidate| derive(item, candidate, Context::Plain))
                }),
                None => items
                    .iter()
                    .zip(observed)
                    .all(|(item, candidate)| derive(item, candidate, Context::Plain)),
            }
        }
        Value::String(s) if context == Context::Quantity => match observed {
            Value::String(o) => quantities_equal(s, o),
            Value::Number(n) => quantities_equal(s, &n.to_string()),
            _ => false,
        },
        _ => expected == observed,
    }
}

/// The merge key shared by every element of `items`, if they are all objects
/// carrying one.
fn list_key(items: &[Value]) -> Option<&'static str> {
    LIST_KEYS.iter().copied().find(|key| {
        items
            .iter()
            .all(|item| item.get(*key).is_some_and(|v| !is_unset(v)))
    })
}

#[cfg(test)]
#[path = "diff_test.rs"]
mod diff_test;
