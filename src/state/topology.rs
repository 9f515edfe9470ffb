//! Dependency tree construction and validation.
//!
//! Pure functions for turning parent declarations into a parent -> children
//! adjacency, rejecting graphs with cycles or dangling parent references.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::types::DeploymentName;

/// Parent declarations keyed by deployment, as read from the
/// `restart-controller/parent` annotation. `None` marks a root.
pub type ParentDeclarations = BTreeMap<DeploymentName, Option<DeploymentName>>;

static NO_NEIGHBOURS: BTreeSet<DeploymentName> = BTreeSet::new();

/// The parent declarations do not form a forest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedGraphError {
    /// A deployment names a parent that is not a known deployment.
    #[error("deployment {child} declares unknown parent {parent}")]
    UnknownParent {
        child: DeploymentName,
        parent: DeploymentName,
    },

    /// Following parent links from a deployment leads back to it.
    #[error("cycle detected in dependency graph: {}", format_cycle(.cycle))]
    Cycle { cycle: Vec<DeploymentName> },
}

fn format_cycle(cycle: &[DeploymentName]) -> String {
    let mut names: Vec<&str> = cycle.iter().map(DeploymentName::as_str).collect();
    if let Some(first) = cycle.first() {
        names.push(first.as_str());
    }
    names.join(" -> ")
}

/// Immutable parent -> children adjacency over a set of deployments.
///
/// Every known deployment is present as a node, including leaves and isolated
/// roots. Children and parents are kept in ordered sets so traversals are
/// reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyTree {
    children: BTreeMap<DeploymentName, BTreeSet<DeploymentName>>,
    parents: BTreeMap<DeploymentName, BTreeSet<DeploymentName>>,
}

impl DependencyTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from child -> parent declarations.
    ///
    /// # Errors
    ///
    /// - `UnknownParent` if a declared parent is not itself a key of `parent_of`
    /// - `Cycle` if following parent links from any deployment returns to it
    pub fn build(parent_of: &ParentDeclarations) -> Result<Self, MalformedGraphError> {
        for (child, parent) in parent_of {
            if let Some(parent) = parent
                && !parent_of.contains_key(parent)
            {
                return Err(MalformedGraphError::UnknownParent {
                    child: child.clone(),
                    parent: parent.clone(),
                });
            }
        }

        let parent_edges: BTreeMap<DeploymentName, BTreeSet<DeploymentName>> = parent_of
            .iter()
            .map(|(child, parent)| (child.clone(), parent.iter().cloned().collect()))
            .collect();

        if let Some(cycle) = detect_cycle(&parent_edges) {
            return Err(MalformedGraphError::Cycle { cycle });
        }

        let mut children: BTreeMap<DeploymentName, BTreeSet<DeploymentName>> = parent_of
            .keys()
            .map(|name| (name.clone(), BTreeSet::new()))
            .collect();
        for (child, parent) in parent_of {
            if let Some(parent) = parent {
                children
                    .entry(parent.clone())
                    .or_default()
                    .insert(child.clone());
            }
        }

        Ok(Self::from_children(children))
    }

    /// Registers `children` as direct children of `parent`.
    ///
    /// Unknown names become new nodes and duplicate edges are merged. The tree
    /// is left unchanged if the new edges would close a cycle.
    ///
    /// Unlike [`DependencyTree::build`], this allows a deployment to gain more
    /// than one parent.
    pub fn add<I>(&mut self, parent: DeploymentName, children: I) -> Result<(), MalformedGraphError>
    where
        I: IntoIterator<Item = DeploymentName>,
    {
        let mut candidate = self.children.clone();
        let mut new_children = BTreeSet::new();
        for child in children {
            candidate.entry(child.clone()).or_default();
            new_children.insert(child);
        }
        candidate.entry(parent).or_default().extend(new_children);

        if let Some(cycle) = detect_cycle(&candidate) {
            return Err(MalformedGraphError::Cycle { cycle });
        }

        *self = Self::from_children(candidate);
        Ok(())
    }

    fn from_children(children: BTreeMap<DeploymentName, BTreeSet<DeploymentName>>) -> Self {
        let mut parents: BTreeMap<DeploymentName, BTreeSet<DeploymentName>> = children
            .keys()
            .map(|name| (name.clone(), BTreeSet::new()))
            .collect();
        for (parent, kids) in &children {
            for child in kids {
                parents
                    .entry(child.clone())
                    .or_default()
                    .insert(parent.clone());
            }
        }
        DependencyTree { children, parents }
    }

    /// Returns the direct children of a deployment (empty if unknown).
    pub fn children(&self, name: &DeploymentName) -> &BTreeSet<DeploymentName> {
        self.children.get(name).unwrap_or(&NO_NEIGHBOURS)
    }

    /// Returns the direct parents of a deployment (empty for roots and unknown names).
    pub fn parents(&self, name: &DeploymentName) -> &BTreeSet<DeploymentName> {
        self.parents.get(name).unwrap_or(&NO_NEIGHBOURS)
    }

    /// Returns true if the deployment is a node of the tree.
    pub fn contains(&self, name: &DeploymentName) -> bool {
        self.children.contains_key(name)
    }

    /// Iterates over all known deployments in lexical order.
    pub fn nodes(&self) -> impl Iterator<Item = &DeploymentName> {
        self.children.keys()
    }

    /// Returns the number of deployments in the tree.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if the tree has no deployments.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the number of parent -> child edges.
    pub fn edge_count(&self) -> usize {
        self.children.values().map(BTreeSet::len).sum()
    }
}

/// Detects a cycle in a directed graph given as node -> successors.
///
/// Returns `Some(cycle)` with the nodes of the cycle in edge order, or `None`
/// if the graph is acyclic. Successors that are not keys of `edges` are treated
/// as sinks.
///
/// Uses depth-first search with three-color marking:
/// - White (unvisited): not yet processed
/// - Gray (in progress): on the current DFS path
/// - Black (finished): fully explored
///
/// A back edge to a gray node indicates a cycle.
pub fn detect_cycle(
    edges: &BTreeMap<DeploymentName, BTreeSet<DeploymentName>>,
) -> Option<Vec<DeploymentName>> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    fn dfs<'a>(
        node: &'a DeploymentName,
        edges: &'a BTreeMap<DeploymentName, BTreeSet<DeploymentName>>,
        colors: &mut BTreeMap<&'a DeploymentName, Color>,
        path: &mut Vec<&'a DeploymentName>,
    ) -> Option<Vec<DeploymentName>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for next in edges.get(node).unwrap_or(&NO_NEIGHBOURS) {
            match colors.get(next).copied().unwrap_or(Color::White) {
                Color::Gray => {
                    if let Some(pos) = path.iter().position(|&p| p == next) {
                        return Some(path[pos..].iter().map(|&n| n.clone()).collect());
                    }
                }
                Color::White => {
                    if let Some(cycle) = dfs(next, edges, colors, path) {
                        return Some(cycle);
                    }
                }
                Color::Black => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    let mut colors: BTreeMap<&DeploymentName, Color> = BTreeMap::new();
    for node in edges.keys() {
        if colors.get(node).copied().unwrap_or(Color::White) == Color::White {
            let mut path = Vec::new();
            if let Some(cycle) = dfs(node, edges, &mut colors, &mut path) {
                return Some(cycle);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{arb_forest, declarations, name};
    use proptest::prelude::*;

    mod build_tests {
        use super::*;

        #[test]
        fn empty_declarations_build_empty_tree() {
            let tree = DependencyTree::build(&ParentDeclarations::new()).unwrap();
            assert!(tree.is_empty());
            assert!(tree.children(&name("anything")).is_empty());
        }

        #[test]
        fn chain_builds_single_child_sets() {
            let tree = DependencyTree::build(&declarations(&[
                ("db", None),
                ("api", Some("db")),
                ("frontend", Some("api")),
            ]))
            .unwrap();

            assert_eq!(tree.children(&name("db")), &BTreeSet::from([name("api")]));
            assert_eq!(
                tree.children(&name("api")),
                &BTreeSet::from([name("frontend")])
            );
            assert!(tree.children(&name("frontend")).is_empty());
            assert_eq!(tree.edge_count(), 2);
        }

        #[test]
        fn siblings_share_parent() {
            let tree = DependencyTree::build(&declarations(&[
                ("db", None),
                ("api", Some("db")),
                ("worker", Some("db")),
            ]))
            .unwrap();

            assert_eq!(
                tree.children(&name("db")),
                &BTreeSet::from([name("api"), name("worker")])
            );
            assert_eq!(tree.parents(&name("worker")), &BTreeSet::from([name("db")]));
        }

        #[test]
        fn undeclared_deployments_are_isolated_nodes() {
            let tree =
                DependencyTree::build(&declarations(&[("app1", None), ("app2", None)])).unwrap();

            assert_eq!(tree.len(), 2);
            assert!(tree.contains(&name("app1")));
            assert!(tree.children(&name("app1")).is_empty());
            assert!(tree.parents(&name("app2")).is_empty());
        }

        #[test]
        fn unknown_parent_is_rejected() {
            let err = DependencyTree::build(&declarations(&[("api", Some("db"))])).unwrap_err();

            assert_eq!(
                err,
                MalformedGraphError::UnknownParent {
                    child: name("api"),
                    parent: name("db"),
                }
            );
        }

        #[test]
        fn two_node_cycle_is_rejected() {
            let err =
                DependencyTree::build(&declarations(&[("a", Some("b")), ("b", Some("a"))]))
                    .unwrap_err();

            match err {
                MalformedGraphError::Cycle { cycle } => {
                    assert_eq!(cycle.len(), 2);
                    assert!(cycle.contains(&name("a")));
                    assert!(cycle.contains(&name("b")));
                }
                other => panic!("expected cycle, got {other:?}"),
            }
        }

        #[test]
        fn self_parent_is_a_cycle() {
            let err = DependencyTree::build(&declarations(&[("a", Some("a"))])).unwrap_err();
            assert_eq!(
                err,
                MalformedGraphError::Cycle {
                    cycle: vec![name("a")]
                }
            );
        }

        #[test]
        fn cycle_below_a_valid_root_is_rejected() {
            let err = DependencyTree::build(&declarations(&[
                ("root", None),
                ("x", Some("z")),
                ("y", Some("x")),
                ("z", Some("y")),
            ]))
            .unwrap_err();

            assert!(matches!(err, MalformedGraphError::Cycle { ref cycle } if cycle.len() == 3));
        }

        #[test]
        fn cycle_error_message_closes_the_loop() {
            let err = MalformedGraphError::Cycle {
                cycle: vec![name("a"), name("b")],
            };
            assert_eq!(
                err.to_string(),
                "cycle detected in dependency graph: a -> b -> a"
            );
        }
    }

    mod add_tests {
        use super::*;

        #[test]
        fn add_registers_children() {
            let mut tree = DependencyTree::new();
            tree.add(name("a"), [name("b"), name("c"), name("d")]).unwrap();

            assert_eq!(
                tree.children(&name("a")),
                &BTreeSet::from([name("b"), name("c"), name("d")])
            );
            assert!(tree.contains(&name("d")));
        }

        #[test]
        fn duplicate_children_are_merged() {
            let mut tree = DependencyTree::new();
            tree.add(name("a"), [name("b"), name("b"), name("c")]).unwrap();
            tree.add(name("a"), [name("c"), name("d")]).unwrap();

            assert_eq!(
                tree.children(&name("a")),
                &BTreeSet::from([name("b"), name("c"), name("d")])
            );
        }

        #[test]
        fn add_allows_multiple_parents() {
            let mut tree = DependencyTree::new();
            tree.add(name("r"), [name("a"), name("b")]).unwrap();
            tree.add(name("a"), [name("c")]).unwrap();
            tree.add(name("b"), [name("c")]).unwrap();

            assert_eq!(
                tree.parents(&name("c")),
                &BTreeSet::from([name("a"), name("b")])
            );
        }

        #[test]
        fn add_closing_a_cycle_leaves_tree_unchanged() {
            let mut tree = DependencyTree::new();
            tree.add(name("a"), [name("b")]).unwrap();
            tree.add(name("b"), [name("c")]).unwrap();
            let before = tree.clone();

            let err = tree.add(name("c"), [name("a")]).unwrap_err();

            assert!(matches!(err, MalformedGraphError::Cycle { .. }));
            assert_eq!(tree, before);
        }
    }

    mod detect_cycle_tests {
        use super::*;

        #[test]
        fn acyclic_graph_has_no_cycle() {
            let edges = BTreeMap::from([
                (name("a"), BTreeSet::from([name("b"), name("c")])),
                (name("b"), BTreeSet::from([name("c")])),
            ]);
            assert_eq!(detect_cycle(&edges), None);
        }

        #[test]
        fn returns_cycle_in_edge_order() {
            let edges = BTreeMap::from([
                (name("a"), BTreeSet::from([name("b")])),
                (name("b"), BTreeSet::from([name("c")])),
                (name("c"), BTreeSet::from([name("a")])),
            ]);
            assert_eq!(
                detect_cycle(&edges),
                Some(vec![name("a"), name("b"), name("c")])
            );
        }
    }

    mod property_tests {
        use super::*;

        proptest! {
            /// Every declared child appears in its parent's child set exactly
            /// once, and nowhere else.
            #[test]
            fn forest_declarations_always_build(parent_of in arb_forest(12)) {
                let tree = DependencyTree::build(&parent_of).unwrap();

                prop_assert_eq!(tree.len(), parent_of.len());
                for (child, parent) in &parent_of {
                    let holders: Vec<_> = tree
                        .nodes()
                        .filter(|n| tree.children(n).contains(child))
                        .collect();
                    match parent {
                        Some(parent) => prop_assert_eq!(holders, vec![parent]),
                        None => prop_assert!(holders.is_empty()),
                    }
                }
                let declared = parent_of.values().filter(|p| p.is_some()).count();
                prop_assert_eq!(tree.edge_count(), declared);
            }

            /// Rebuilding from the same declarations yields the same child sets.
            #[test]
            fn rebuild_is_idempotent(parent_of in arb_forest(12)) {
                let first = DependencyTree::build(&parent_of).unwrap();
                let second = DependencyTree::build(&parent_of).unwrap();

                for node in first.nodes() {
                    prop_assert_eq!(first.children(node), second.children(node));
                }
                prop_assert_eq!(first, second);
            }

            /// Pointing any root at one of its own descendants (or itself)
            /// always produces a cycle error.
            #[test]
            fn closing_a_loop_is_always_rejected(
                parent_of in arb_forest(12),
                pick in any::<prop::sample::Index>(),
            ) {
                let tree = DependencyTree::build(&parent_of).unwrap();
                let roots: Vec<_> = parent_of
                    .iter()
                    .filter(|(_, p)| p.is_none())
                    .map(|(n, _)| n.clone())
                    .collect();
                let root = pick.get(&roots).clone();

                let mut subtree = vec![root.clone()];
                let mut i = 0;
                while i < subtree.len() {
                    let kids: Vec<_> = tree.children(&subtree[i]).iter().cloned().collect();
                    subtree.extend(kids);
                    i += 1;
                }
                let leaf = subtree.last().cloned().unwrap_or_else(|| root.clone());

                let mut looped = parent_of.clone();
                looped.insert(root, Some(leaf));

                let is_cycle = matches!(
                    DependencyTree::build(&looped),
                    Err(MalformedGraphError::Cycle { .. })
                );
                prop_assert!(is_cycle);
            }
        }
    }
}
