//! Descendant collection.
//!
//! Pure functions for walking a [`DependencyTree`] from one or more roots and
//! producing the set of deployments that must be restarted.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::types::DeploymentName;

use super::topology::DependencyTree;

/// A deployment reached by a cascade, together with the deployment it was
/// reached through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeTarget {
    pub deployment: DeploymentName,

    /// The immediate parent the traversal followed to reach `deployment`.
    pub via: DeploymentName,
}

/// Collects every deployment reachable from `roots` by one or more
/// parent -> child edges.
///
/// Each deployment appears at most once, and always after the deployment it was
/// reached through. Roots are visited in lexical order and children in lexical
/// order, so the result is deterministic. A root is only included if it is
/// itself a descendant of another root. Unknown roots contribute nothing.
pub fn collect_cascade<'a, I>(tree: &DependencyTree, roots: I) -> Vec<CascadeTarget>
where
    I: IntoIterator<Item = &'a DeploymentName>,
{
    let roots: BTreeSet<&DeploymentName> = roots.into_iter().collect();

    let mut result = Vec::new();
    let mut included: HashSet<&DeploymentName> = HashSet::new();
    let mut expanded: HashSet<&DeploymentName> = HashSet::new();
    let mut queue: VecDeque<&DeploymentName> = roots.iter().copied().collect();

    while let Some(node) = queue.pop_front() {
        if !expanded.insert(node) {
            continue;
        }
        for child in tree.children(node) {
            if included.insert(child) {
                result.push(CascadeTarget {
                    deployment: child.clone(),
                    via: node.clone(),
                });
                queue.push_back(child);
            }
        }
    }

    result
}

/// Like [`collect_cascade`], but returns only the deployment names.
pub fn collect_descendants<'a, I>(tree: &DependencyTree, roots: I) -> Vec<DeploymentName>
where
    I: IntoIterator<Item = &'a DeploymentName>,
{
    collect_cascade(tree, roots)
        .into_iter()
        .map(|t| t.deployment)
        .collect()
}
