use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Appended to a module name to form the capability of its test fixtures variant.
pub const TEST_FIXTURES_CAPABILITY_APPENDIX: &str = "-test-fixtures";

/// A `(group, name, version)` marker the resolver uses to pick a variant of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Capability {
    pub group: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<String>,
}

impl Capability {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: Option<String>,
    ) -> Capability {
        Capability {
            group: group.into(),
            name: name.into(),
            version,
        }
    }

    /// The test fixtures capability of the module `group:name`.
    pub fn test_fixtures_of(group: &str, name: &str) -> Capability {
        Capability::new(
            group,
            format!("{}{}", name, TEST_FIXTURES_CAPABILITY_APPENDIX),
            None,
        )
    }

    fn has_key(&self, group: &str, name: &str) -> bool {
        self.group == group && self.name == name
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}:{}", self.group, self.name, version),
            None => write!(f, "{}:{}", self.group, self.name),
        }
    }
}

/// Capabilities requested by a dependency, keyed by `(group, name)`.
///
/// Insertion order is kept since it is the order requirements were declared in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet {
    capabilities: Vec<Capability>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `capability` unless one with the same `(group, name)` is already required.
    ///
    /// Returns whether the set changed. An existing requirement is never replaced.
    pub fn require_capability(&mut self, capability: Capability) -> bool {
        if self.contains(&capability.group, &capability.name) {
            false
        } else {
            self.capabilities.push(capability);
            true
        }
    }

    pub fn contains(&self, group: &str, name: &str) -> bool {
        self.get(group, name).is_some()
    }

    pub fn get(&self, group: &str, name: &str) -> Option<&Capability> {
        self.capabilities.iter().find(|c| c.has_key(group, name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::new();
        for capability in iter {
            set.require_capability(capability);
        }
        set
    }
}

impl<'a> IntoIterator for &'a CapabilitySet {
    type Item = &'a Capability;
    type IntoIter = std::slice::Iter<'a, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.capabilities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_fixtures_capability_name() {
        assert_eq!(
            Capability::test_fixtures_of("com.example", "mylib"),
            Capability {
                group: "com.example".to_owned(),
                name: "mylib-test-fixtures".to_owned(),
                version: None,
            }
        );
    }

    #[test]
    fn require_capability_is_keyed_by_group_and_name() {
        let mut set = CapabilitySet::new();
        let versioned = Capability::new("org", "feature", Some("1.0".into()));
        let unversioned = Capability::new("org", "feature", None);
        let other = Capability::new("org", "other", None);
        assert!(set.require_capability(versioned));
        assert!(!set.require_capability(unversioned));
        assert!(set.require_capability(other));

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.get("org", "feature").and_then(|c| c.version.as_deref()),
            Some("1.0")
        );
    }

    #[test]
    fn collect_deduplicates() {
        let set = [
            Capability::test_fixtures_of("g", "n"),
            Capability::test_fixtures_of("g", "n"),
        ]
        .into_iter()
        .collect::<CapabilitySet>();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn display() {
        assert_eq!(Capability::new("g", "n", None).to_string(), "g:n");
        assert_eq!(
            Capability::new("g", "n", Some("2".into())).to_string(),
            "g:n:2"
        );
    }
}
