//! String tables shipped with the binary.

use std::collections::HashMap;

const EN: &[(&str, &str)] = &[("copied", "Copied!"), ("cleared", "Cleared")];

const JA: &[(&str, &str)] = &[("copied", "コピーしました"), ("cleared", "クリアしました")];

/// All built-in tables keyed by normalized locale code.
pub fn builtin() -> Vec<(&'static str, HashMap<String, String>)> {
    [("en", EN), ("ja", JA)]
        .into_iter()
        .map(|(code, entries)| {
            let table = entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            (code, table)
        })
        .collect()
}
