//! Ordered string properties attached to deployed artifacts.
//!
//! Properties become Artifactory matrix parameters, so their order is
//! visible on the wire. Re-inserting a key replaces its value in place.

use std::fmt;

/// An insertion-ordered `String -> String` map.
///
/// # Examples
///
/// ```
/// use artifactory_deployer::artifact::ArtifactProperties;
///
/// let mut properties = ArtifactProperties::new();
/// properties.insert("build.name", "my-build");
/// properties.insert("build.number", "1");
/// properties.insert("build.name", "renamed");
///
/// let keys: Vec<_> = properties.iter().map(|(key, _)| key).collect();
/// assert_eq!(keys, ["build.name", "build.number"]);
/// assert_eq!(properties.get("build.name"), Some("renamed"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactProperties {
    entries: Vec<(String, String)>,
}

impl ArtifactProperties {
    /// Create an empty property bag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace a property, keeping the original position of an
    /// existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Insert every entry of `other`, in order.
    pub fn extend_from(&mut self, other: &Self) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    /// Look up a property value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when there are no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ArtifactProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Self::new();
        for (key, value) in iter {
            properties.insert(key, value);
        }
        properties
    }
}

impl fmt::Display for ArtifactProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (key, value)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_overrides_values_without_reordering() {
        let mut base: ArtifactProperties =
            [("build.name", "b"), ("build.number", "1")].into_iter().collect();
        let overrides: ArtifactProperties =
            [("extra", "x"), ("build.name", "override")].into_iter().collect();

        base.extend_from(&overrides);

        let entries: Vec<_> = base.iter().collect();
        assert_eq!(
            entries,
            [
                ("build.name", "override"),
                ("build.number", "1"),
                ("extra", "x")
            ]
        );
    }

    #[test]
    fn display_lists_entries_in_order() {
        let properties: ArtifactProperties = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(properties.to_string(), "{a=1, b=2}");
        assert_eq!(ArtifactProperties::new().to_string(), "{}");
    }
}
