//! Canonical value model for attempt outputs.
//!
//! Every "output" field in the pipeline is a [`CanonicalValue`]: an explicit
//! tagged union over the JSON-like value space. Two outputs are
//! *output-equal* iff their canonical forms match -- object key order is
//! irrelevant, array element order is significant.
//!
//! [`CanonicalValue::canonical_key`] is the pure recursive serializer the
//! ensemble voter groups ballots by: object keys sorted (implicit in the
//! `BTreeMap` representation), array order preserved, numbers in Rust's
//! shortest-roundtrip form (`15.0` renders as `15`). The key format is the
//! contract for every weight map keyed by output in this crate.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// A JSON-like value with a deterministic ordering key.
///
/// Objects are stored in a `BTreeMap`, so two objects built with different
/// key insertion orders are structurally identical. Numbers are `f64`;
/// integer-valued floats and integers constructed via [`From<i64>`] share
/// one canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanonicalValue {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number (integers are widened to `f64`).
    Number(f64),
    /// JSON string.
    String(String),
    /// JSON array; element order is significant.
    Array(Vec<CanonicalValue>),
    /// JSON object; key order is irrelevant.
    Object(BTreeMap<String, CanonicalValue>),
}

impl CanonicalValue {
    /// Derive the stable string key for this value.
    ///
    /// The key is deterministic: equal values (under output-equality) always
    /// produce byte-identical keys, and unequal values produce distinct keys
    /// except for the usual `f64` printing limits.
    pub fn canonical_key(&self) -> String {
        let mut out = String::new();
        self.write_key(&mut out);
        out
    }

    fn write_key(&self, out: &mut String) {
        match self {
            CanonicalValue::Null => out.push_str("null"),
            CanonicalValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            // f64 Display is shortest-roundtrip; 15.0 renders as "15".
            CanonicalValue::Number(n) => {
                let _ = write!(out, "{n}");
            }
            CanonicalValue::String(s) => out.push_str(&escape_json_string(s)),
            CanonicalValue::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_key(out);
                }
                out.push(']');
            }
            CanonicalValue::Object(map) => {
                out.push('{');
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&escape_json_string(key));
                    out.push(':');
                    value.write_key(out);
                }
                out.push('}');
            }
        }
    }

    /// Whether this value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, CanonicalValue::Null)
    }

    /// A rough structural size: scalar values count 1, containers count
    /// themselves plus their contents. Used by validation heuristics.
    pub fn structural_size(&self) -> usize {
        match self {
            CanonicalValue::Null | CanonicalValue::Bool(_) | CanonicalValue::Number(_) => 1,
            CanonicalValue::String(s) => s.chars().count(),
            CanonicalValue::Array(items) => {
                1 + items.iter().map(CanonicalValue::structural_size).sum::<usize>()
            }
            CanonicalValue::Object(map) => {
                1 + map.values().map(CanonicalValue::structural_size).sum::<usize>()
            }
        }
    }
}

/// JSON-escape a string, including the surrounding quotes.
fn escape_json_string(s: &str) -> String {
    // serde_json's string escaping is the reference behavior.
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

impl From<bool> for CanonicalValue {
    fn from(b: bool) -> Self {
        CanonicalValue::Bool(b)
    }
}

impl From<i64> for CanonicalValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        CanonicalValue::Number(n as f64)
    }
}

impl From<f64> for CanonicalValue {
    fn from(n: f64) -> Self {
        CanonicalValue::Number(n)
    }
}

impl From<&str> for CanonicalValue {
    fn from(s: &str) -> Self {
        CanonicalValue::String(s.to_string())
    }
}

impl From<String> for CanonicalValue {
    fn from(s: String) -> Self {
        CanonicalValue::String(s)
    }
}

impl<T: Into<CanonicalValue>> From<Vec<T>> for CanonicalValue {
    fn from(items: Vec<T>) -> Self {
        CanonicalValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for CanonicalValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CanonicalValue::Null,
            serde_json::Value::Bool(b) => CanonicalValue::Bool(b),
            serde_json::Value::Number(n) => {
                CanonicalValue::Number(n.as_f64().unwrap_or(f64::NAN))
            }
            serde_json::Value::String(s) => CanonicalValue::String(s),
            serde_json::Value::Array(items) => {
                CanonicalValue::Array(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => CanonicalValue::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl From<CanonicalValue> for serde_json::Value {
    fn from(value: CanonicalValue) -> Self {
        match value {
            CanonicalValue::Null => serde_json::Value::Null,
            CanonicalValue::Bool(b) => serde_json::Value::Bool(b),
            CanonicalValue::Number(n) => serde_json::Number::from_f64(n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            CanonicalValue::String(s) => serde_json::Value::String(s),
            CanonicalValue::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            CanonicalValue::Object(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}
