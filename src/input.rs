//! Key-value access to inbound request fields

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Field name carrying the callback signature
pub const SIGNATURE_FIELD: &str = "md5Info";

/// Read-only view over the fields of an inbound request
pub trait InputSource {
    /// Value of `key`, if present and textual
    fn input(&self, key: &str) -> Option<&str>;
}

impl InputSource for HashMap<String, String> {
    fn input(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl InputSource for BTreeMap<String, String> {
    fn input(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl InputSource for Value {
    fn input(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

impl InputSource for [(String, String)] {
    fn input(&self, key: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl InputSource for Vec<(String, String)> {
    fn input(&self, key: &str) -> Option<&str> {
        self.as_slice().input(key)
    }
}
