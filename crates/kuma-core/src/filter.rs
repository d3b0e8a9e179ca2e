//! Ignore-pattern matching
//!
//! Wildcard patterns exclude names from creation and mark already-present
//! monitors for deletion. `*` matches any run of characters; matching is
//! case-sensitive and anchored over the whole name.

use crate::error::{Error, Result};
use regex::Regex;

/// An ordered set of compiled wildcard patterns
#[derive(Debug, Clone, Default)]
pub struct IgnorePatterns {
    patterns: Vec<(String, Regex)>,
}

impl IgnorePatterns {
    /// Compile a list of wildcard strings; blank entries are dropped
    pub fn compile<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            let regex = Regex::new(&wildcard_to_regex(pattern))
                .map_err(|e| Error::config(format!("invalid ignore pattern '{pattern}': {e}")))?;
            compiled.push((pattern.to_string(), regex));
        }
        Ok(Self { patterns: compiled })
    }

    /// Whether `name` matches any configured pattern; first match wins
    pub fn is_ignored(&self, name: &str) -> bool {
        self.patterns.iter().any(|(_, regex)| regex.is_match(name))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Original pattern strings, in configured order
    pub fn as_strings(&self) -> Vec<&str> {
        self.patterns.iter().map(|(p, _)| p.as_str()).collect()
    }
}

/// Translate a wildcard pattern into an anchored regex
fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    out.push('^');
    for (i, part) in pattern.split('*').enumerate() {
        if i > 0 {
            out.push_str(".*");
        }
        out.push_str(&regex::escape(part));
    }
    out.push('$');
    out
}
