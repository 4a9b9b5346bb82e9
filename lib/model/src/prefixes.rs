use std::collections::BTreeMap;

/// Namespace used for terms whose prefix is unknown or missing.
pub const DEFAULT_NAMESPACE: &str = "http://graphdesk.local/ns#";

/// The mapping from short prefixes to namespace IRIs.
///
/// The table always carries a default namespace in addition to its entries.
/// Terms referencing an unregistered prefix resolve against the default
/// namespace instead of failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixTable {
    default_namespace: String,
    entries: BTreeMap<String, String>,
}

impl PrefixTable {
    pub fn new(default_namespace: impl Into<String>) -> Self {
        Self {
            default_namespace: default_namespace.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn from_entries(
        default_namespace: impl Into<String>,
        entries: BTreeMap<String, String>,
    ) -> Self {
        Self {
            default_namespace: default_namespace.into(),
            entries,
        }
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.entries.get(prefix).map(String::as_str)
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.entries.contains_key(prefix)
    }

    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.entries.insert(prefix.into(), namespace.into());
    }

    pub fn remove(&mut self, prefix: &str) -> Option<String> {
        self.entries.remove(prefix)
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expands `prefix:local` to a full IRI string.
    ///
    /// The namespace and local part are concatenated byte for byte. Unknown
    /// prefixes expand against the default namespace.
    pub fn expand(&self, prefix: &str, local: &str) -> String {
        match self.namespace(prefix) {
            Some(namespace) => format!("{namespace}{local}"),
            None => format!("{}{}", self.default_namespace, local),
        }
    }

    /// Maps a full IRI back to a prefixed name, if any registered namespace
    /// is a prefix of it.
    ///
    /// Candidate namespaces are tried in the table's iteration order, so the
    /// alphabetically first matching prefix wins when namespaces overlap.
    pub fn compact(&self, iri: &str) -> Option<String> {
        for (prefix, namespace) in &self.entries {
            if let Some(local) = iri.strip_prefix(namespace.as_str()) {
                return Some(format!("{prefix}:{local}"));
            }
        }
        None
    }
}

impl Default for PrefixTable {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_concatenates_namespace_and_local() {
        let mut table = PrefixTable::default();
        table.insert("ex", "http://ex.org/");
        assert_eq!(table.expand("ex", "name"), "http://ex.org/name");
    }

    #[test]
    fn expand_falls_back_to_default_namespace() {
        let table = PrefixTable::new("http://fallback.org/");
        assert_eq!(table.expand("nope", "thing"), "http://fallback.org/thing");
    }

    #[test]
    fn compact_reverses_expand() {
        let mut table = PrefixTable::default();
        table.insert("ex", "http://ex.org/");
        assert_eq!(table.compact("http://ex.org/name"), Some("ex:name".to_owned()));
        assert_eq!(table.compact("http://other.org/name"), None);
    }
}
