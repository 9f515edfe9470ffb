//! ReplicaSet to Deployment resolution with caching.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::effects::ReplicaSetOwners;
use crate::types::DeploymentName;

/// Upper bound on cached ReplicaSets. Every rollout creates a new ReplicaSet,
/// so the cache is cleared once it grows past this.
pub const MAX_CACHED_REPLICA_SETS: usize = 1024;

/// Resolves the deployment owning a ReplicaSet, remembering the answer.
///
/// A ReplicaSet's owner never changes, so successful lookups are cached,
/// including "no deployment owner". Failed lookups are not cached.
#[derive(Debug)]
pub struct OwnerResolver<L> {
    lookup: L,
    cache: HashMap<String, Option<DeploymentName>>,
}

impl<L: ReplicaSetOwners> OwnerResolver<L> {
    pub fn new(lookup: L) -> Self {
        OwnerResolver {
            lookup,
            cache: HashMap::new(),
        }
    }

    /// Returns the deployment owning `replica_set`, or `None` if it has no
    /// deployment owner or the lookup failed.
    pub async fn resolve(&mut self, replica_set: &str) -> Option<DeploymentName> {
        if let Some(cached) = self.cache.get(replica_set) {
            return cached.clone();
        }

        match self.lookup.deployment_owner(replica_set).await {
            Ok(owner) => {
                if self.cache.len() >= MAX_CACHED_REPLICA_SETS {
                    debug!(entries = self.cache.len(), "Clearing ReplicaSet owner cache");
                    self.cache.clear();
                }
                self.cache.insert(replica_set.to_string(), owner.clone());
                owner
            }
            Err(e) => {
                warn!(replica_set, error = %e, "Failed to look up ReplicaSet");
                None
            }
        }
    }

    /// Returns the number of cached ReplicaSets.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
