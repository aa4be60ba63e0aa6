//! Bound parameter values and the binding step itself.

use super::{ParamKind, ParamSpec, ParamSpecs};
use crate::types::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Verified claims per auth service name.
pub type Claims = HashMap<String, Map<String, Value>>;

/// A value that passed validation for its declared kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<ParamValue>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::Int(i) => Value::from(*i),
            ParamValue::Float(f) => Value::from(*f),
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Bound values in declaration order. Parameters that were neither supplied
/// nor defaulted are absent, not zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamValues(Vec<(String, ParamValue)>);

impl ParamValues {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    /// Bound string that is also non-empty; empty strings are never filters.
    pub fn non_empty_str(&self, name: &str) -> Option<&str> {
        self.get_str(name).filter(|s| !s.is_empty())
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    pub fn get_string_list(&self, name: &str) -> Option<Vec<String>> {
        self.get(name).and_then(ParamValue::as_array).map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(n, v)| (n.clone(), v.to_json()))
            .collect()
    }
}

/// Bind raw arguments (and claims) against the declared specs.
///
/// JSON `null` counts as absent. Arguments with no matching spec are ignored.
pub fn parse_params(
    specs: &ParamSpecs,
    args: &Map<String, Value>,
    claims: &Claims,
) -> Result<ParamValues> {
    let mut bound = ParamValues::new();

    for spec in specs {
        let raw = if spec.is_auth_bound() {
            Some(claim_value(spec, claims)?)
        } else {
            args.get(&spec.name).filter(|v| !v.is_null())
        };

        match raw {
            Some(value) => {
                let value = coerce(spec, value).map_err(|reason| Error::parameter(&spec.name, reason))?;
                bound.insert(spec.name.clone(), value);
            }
            None => {
                if let Some(default) = &spec.default {
                    bound.insert(spec.name.clone(), default.clone());
                } else if spec.is_required() {
                    return Err(Error::parameter(&spec.name, "parameter is required"));
                }
            }
        }
    }

    for key in args.keys().filter(|k| specs.get(k).is_none()) {
        debug!(parameter = %key, "ignoring undeclared parameter");
    }

    Ok(bound)
}

fn claim_value<'a>(spec: &ParamSpec, claims: &'a Claims) -> Result<&'a Value> {
    spec.auth_services
        .iter()
        .find_map(|svc| claims.get(&svc.name).and_then(|c| c.get(&svc.field)))
        .ok_or_else(|| {
            Error::parameter(
                &spec.name,
                "missing or invalid authentication header for auth-bound parameter",
            )
        })
}

fn coerce(spec: &ParamSpec, value: &Value) -> std::result::Result<ParamValue, String> {
    match &spec.kind {
        ParamKind::String => value
            .as_str()
            .map(|s| ParamValue::String(s.to_string()))
            .ok_or_else(|| format!("expected string, got {}", value_type_name(value))),
        ParamKind::Int => {
            if let Some(i) = value.as_i64() {
                return Ok(ParamValue::Int(i));
            }
            match value.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                    Ok(ParamValue::Int(f as i64))
                }
                _ => Err(format!("expected integer, got {}", value_type_name(value))),
            }
        }
        ParamKind::Float => value
            .as_f64()
            .map(ParamValue::Float)
            .ok_or_else(|| format!("expected number, got {}", value_type_name(value))),
        ParamKind::Bool => value
            .as_bool()
            .map(ParamValue::Bool)
            .ok_or_else(|| format!("expected boolean, got {}", value_type_name(value))),
        ParamKind::Array(item) => {
            let items = value
                .as_array()
                .ok_or_else(|| format!("expected array, got {}", value_type_name(value)))?;
            items
                .iter()
                .enumerate()
                .map(|(i, v)| coerce(item, v).map_err(|e| format!("item {}: {}", i, e)))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(ParamValue::Array)
        }
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
