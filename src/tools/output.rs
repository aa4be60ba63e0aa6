//! Normalized tool results.

use serde::Serialize;
use serde_json::{Map, Value};

/// One output record. Keys are the fixed per-kind names; absent vendor
/// fields are omitted rather than serialized as null.
pub type Record = Map<String, Value>;

/// Result of a successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Record(Record),
    Records(Vec<Record>),
}

impl ToolOutput {
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            ToolOutput::Record(r) => Some(r),
            ToolOutput::Records(_) => None,
        }
    }

    pub fn as_records(&self) -> Option<&[Record]> {
        match self {
            ToolOutput::Records(r) => Some(r),
            ToolOutput::Record(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ToolOutput::Record(r) => Value::Object(r.clone()),
            ToolOutput::Records(rs) => {
                Value::Array(rs.iter().cloned().map(Value::Object).collect())
            }
        }
    }
}

/// Builds a [`Record`], skipping fields the vendor left unset.
#[derive(Debug, Default)]
pub struct RecordBuilder(Record);

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.0.insert(key.to_string(), v.into());
        }
        self
    }

    pub fn build(self) -> Record {
        self.0
    }
}
