use std::collections::HashMap;

/// Localized string table with per-lookup fallbacks.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    table: HashMap<String, String>,
}

impl Messages {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self { table }
    }

    /// Look up `key`, returning `fallback` when missing or empty.
    pub fn t<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.table
            .get(key)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback)
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
