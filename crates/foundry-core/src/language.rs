//! Localized text lookup, used to name spawned soldiers.

use std::collections::HashMap;

pub trait Language {
    /// Translated text for `key`.
    fn get_string(&self, key: &str) -> String;
}

/// Map-backed translations. Unknown keys translate to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translations {
    strings: HashMap<String, String>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.strings.insert(key.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl FromIterator<(String, String)> for Translations {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            strings: iter.into_iter().collect(),
        }
    }
}

impl Language for Translations {
    fn get_string(&self, key: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_key_translates() {
        let mut lang = Translations::new();
        lang.insert("STR_CLONE_NAME", "Clone Trooper");
        assert_eq!(lang.get_string("STR_CLONE_NAME"), "Clone Trooper");
    }

    #[test]
    fn unknown_key_falls_back() {
        let lang = Translations::new();
        assert_eq!(lang.get_string("STR_MISSING"), "STR_MISSING");
    }
}
