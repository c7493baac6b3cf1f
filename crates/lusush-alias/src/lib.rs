//! Textual alias substitution, per spec.md §4.4.
//!
//! The scanner consults [`AliasMap`] whenever it yields a WORD in command
//! position. [`AliasExpander`] tracks which names are currently being
//! expanded so a self-referential alias (`alias ls='ls --color'`) doesn't
//! recurse forever, and reports whether the replacement text ends in
//! whitespace — if it does, the *next* word is also alias-eligible.

use std::collections::HashMap;

/// Insertion-ordered name -> replacement-text mapping. Order is preserved
/// (but not otherwise used by expansion) so a future `alias` built-in can
/// list definitions in declaration order.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    replacements: HashMap<String, String>,
    order: Vec<String>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>, replacement: impl Into<String>) {
        let name = name.into();
        if !self.replacements.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.replacements.insert(name, replacement.into());
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.order.retain(|n| n != name);
        self.replacements.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.replacements.get(name).map(String::as_str)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.replacements.contains_key(name)
    }

    /// Definitions in declaration order, for an `alias` built-in listing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .map(move |name| (name.as_str(), self.replacements[name].as_str()))
    }
}

/// The result of successfully expanding one word against the alias map.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasExpansion {
    pub replacement: String,
    /// Rule (b): if the replacement ends in whitespace, the word that
    /// follows the (re-scanned) replacement is also alias-eligible.
    pub trailing_whitespace: bool,
}

/// Tracks which alias names are mid-expansion to block infinite recursion
/// (rule (a)). The scanner drives this with matched `begin`/`end` calls
/// bracketing the re-scan of one alias's replacement text.
#[derive(Debug, Default)]
pub struct AliasExpander {
    active: Vec<String>,
}

impl AliasExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `word` in `map`. Returns `None` if there is no definition,
    /// or if `word` is already being expanded on the active stack (rule
    /// (a)) — aliases never expand inside quoted strings, which the
    /// scanner enforces by only calling this for a WORD scanned outside
    /// any quoting context (rule (c)).
    pub fn expand(&self, word: &str, map: &AliasMap) -> Option<AliasExpansion> {
        if self.active.iter().any(|n| n == word) {
            return None;
        }
        let replacement = map.get(word)?;
        tracing::debug!(
            alias = word,
            replacement,
            "expanding alias in command position"
        );
        Some(AliasExpansion {
            replacement: replacement.to_string(),
            trailing_whitespace: replacement.ends_with(|c: char| c.is_whitespace()),
        })
    }

    /// Mark `name` as being expanded. Must be paired with [`Self::end`]
    /// once the scanner has fully re-scanned and consumed the replacement
    /// text for `name`.
    pub fn begin(&mut self, name: impl Into<String>) {
        self.active.push(name.into());
    }

    pub fn end(&mut self, name: &str) {
        if let Some(pos) = self.active.iter().rposition(|n| n == name) {
            self.active.remove(pos);
        }
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.iter().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_simple_alias() {
        let mut map = AliasMap::new();
        map.define("ll", "ls -l");
        let expander = AliasExpander::new();
        let expansion = expander.expand("ll", &map).unwrap();
        assert_eq!(expansion.replacement, "ls -l");
        assert!(!expansion.trailing_whitespace);
    }

    #[test]
    fn trailing_whitespace_flags_next_word_eligible() {
        let mut map = AliasMap::new();
        map.define("sudo", "sudo ");
        let expander = AliasExpander::new();
        let expansion = expander.expand("sudo", &map).unwrap();
        assert!(expansion.trailing_whitespace);
    }

    #[test]
    fn self_referential_alias_does_not_recurse() {
        let mut map = AliasMap::new();
        map.define("ls", "ls --color");
        let mut expander = AliasExpander::new();
        let first = expander.expand("ls", &map).unwrap();
        assert_eq!(first.replacement, "ls --color");
        expander.begin("ls");
        // Re-scanning "ls --color" encounters "ls" again in command
        // position; it must not expand a second time.
        assert!(expander.expand("ls", &map).is_none());
        expander.end("ls");
        // Once the first expansion's re-scan is done, "ls" is eligible again.
        assert!(expander.expand("ls", &map).is_some());
    }

    #[test]
    fn undefined_name_does_not_expand() {
        let map = AliasMap::new();
        let expander = AliasExpander::new();
        assert!(expander.expand("nope", &map).is_none());
    }
}
