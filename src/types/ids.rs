//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different identifiers (e.g., passing a
//! wave id where a deployment name is expected) and make signatures self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The name of a deployment within the watched namespace.
///
/// Ordered lexically so that traversals over sets of names are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentName(pub String);

impl DeploymentName {
    pub fn new(s: impl Into<String>) -> Self {
        DeploymentName(s.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeploymentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeploymentName {
    fn from(s: String) -> Self {
        DeploymentName(s)
    }
}

impl From<&str> for DeploymentName {
    fn from(s: &str) -> Self {
        DeploymentName(s.to_string())
    }
}

impl AsRef<str> for DeploymentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier shared by every restart issued for a single cascade.
///
/// Written to the `restart-controller/restart-wave` annotation so an observer can
/// correlate the deployments restarted by one root event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaveId(pub Uuid);

impl WaveId {
    /// Generates a fresh random wave id.
    pub fn generate() -> Self {
        WaveId(Uuid::new_v4())
    }
}

impl fmt::Display for WaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for WaveId {
    fn from(id: Uuid) -> Self {
        WaveId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod deployment_name {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn display_matches_inner(s in "[a-z][a-z0-9-]{0,40}") {
                let name = DeploymentName::new(&s);
                prop_assert_eq!(format!("{}", name), s);
            }

            #[test]
            fn ordering_matches_underlying(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
                let name_a = DeploymentName::new(&a);
                let name_b = DeploymentName::new(&b);
                prop_assert_eq!(name_a.cmp(&name_b), a.cmp(&b));
            }
        }

        #[test]
        fn serializes_as_plain_string() {
            let name = DeploymentName::from("api");
            assert_eq!(serde_json::to_string(&name).unwrap(), "\"api\"");
        }
    }

    mod wave_id {
        use super::*;

        #[test]
        fn generated_ids_are_distinct() {
            assert_ne!(WaveId::generate(), WaveId::generate());
        }

        #[test]
        fn display_is_hyphenated_uuid() {
            let id = WaveId::generate();
            let shown = id.to_string();
            assert_eq!(shown.len(), 36);
            assert_eq!(Uuid::parse_str(&shown).unwrap(), id.0);
        }
    }
}
