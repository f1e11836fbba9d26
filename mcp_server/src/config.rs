//! Process-wide default values for tool parameters.
//!
//! Captured once at startup from flags and environment, handed to the
//! registry at construction, and never mutated while the server runs.

/// Configured values a parameter may name as its fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultKey {
    Project,
    Location,
    Organization,
}

/// Immutable per-process defaults.
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    /// The GCP project name.
    pub project: Option<String>,
    /// The GCP location, e.g. `europe-west1`.
    pub location: Option<String>,
    /// The GCP organization ID.
    pub organization: Option<String>,
}

impl Defaults {
    /// Look up a configured value by key.
    pub fn get(&self, key: DefaultKey) -> Option<&str> {
        match key {
            DefaultKey::Project => self.project.as_deref(),
            DefaultKey::Location => self.location.as_deref(),
            DefaultKey::Organization => self.organization.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_key() {
        let defaults = Defaults {
            project: Some("demo".to_string()),
            location: None,
            organization: Some("1234".to_string()),
        };
        assert_eq!(defaults.get(DefaultKey::Project), Some("demo"));
        assert_eq!(defaults.get(DefaultKey::Location), None);
        assert_eq!(defaults.get(DefaultKey::Organization), Some("1234"));
    }
}
