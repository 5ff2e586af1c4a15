//! # Web Service Parameters
//!
//! Ordered key/value parameters for REST-style web service calls.
//!
//! The REST protocol flattens every value to a string and encodes
//! collections as indexed keys (`courseids[0]`, `courseids[1]`, ...),
//! so parameters are kept as a flat, insertion-ordered pair list
//! rather than a map.

/// Ordered parameter list sent with a single web service call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WsParams {
    pairs: Vec<(String, String)>,
}

impl WsParams {
    /// Create an empty parameter list.
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a single scalar parameter.
    ///
    /// Values are stringified the way the REST endpoint expects them
    /// (`true` stays `true`, numbers keep their decimal form).
    pub fn add(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    /// Append a collection parameter as indexed keys.
    ///
    /// `add_array("courseids", [3, 7])` produces `courseids[0]=3` and
    /// `courseids[1]=7`, preserving the iteration order.
    pub fn add_array<T: ToString>(
        &mut self,
        key: &str,
        values: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        for (index, value) in values.into_iter().enumerate() {
            self.pairs.push((format!("{key}[{index}]"), value.to_string()));
        }
        self
    }

    /// All pairs in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Value of the first pair with the given key, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}
