//! # Message Catalog
//!
//! User-facing strings for error reporting. Each component ships a set
//! of default strings and the embedding application may override them
//! from its own localization layer. Unknown keys echo the key itself,
//! so a missing translation never produces an empty message.

use std::collections::HashMap;

/// Translated user-facing strings, keyed `component:identifier`
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-filled with the given default strings.
    pub fn with_defaults(defaults: &[(&str, &str)]) -> Self {
        let messages = defaults
            .iter()
            .map(|(key, text)| (key.to_string(), text.to_string()))
            .collect();
        Self { messages }
    }

    /// Insert or replace the string under `key`.
    pub fn set(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.messages.insert(key.into(), text.into());
    }

    /// String under `key`, or the key itself when none is registered.
    pub fn text(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_owned())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }
}
