//! Shared test utilities and arbitrary generators for property-based testing.

use crate::state::{DependencyTree, ParentDeclarations};
use crate::types::DeploymentName;
use proptest::prelude::*;

pub fn name(s: &str) -> DeploymentName {
    DeploymentName::from(s)
}

/// Builds parent declarations from `(child, parent)` pairs.
pub fn declarations(pairs: &[(&str, Option<&str>)]) -> ParentDeclarations {
    pairs
        .iter()
        .map(|(child, parent)| (name(child), parent.map(name)))
        .collect()
}

/// Builds a tree from `(parent, children)` pairs via incremental adds.
pub fn tree_from_edges(edges: &[(&str, &[&str])]) -> DependencyTree {
    let mut tree = DependencyTree::new();
    for (parent, children) in edges {
        tree.add(name(parent), children.iter().map(|c| name(c)))
            .unwrap();
    }
    tree
}

fn shuffled_names(n: usize) -> impl Strategy<Value = Vec<DeploymentName>> {
    Just(
        (0..n)
            .map(|i| DeploymentName::new(format!("svc-{i:02}")))
            .collect::<Vec<_>>(),
    )
    .prop_shuffle()
}

/// Generates well-formed parent declarations (a forest) with 1..=max_nodes
/// deployments.
///
/// Names are shuffled so lexical order is unrelated to depth.
pub fn arb_forest(max_nodes: usize) -> impl Strategy<Value = ParentDeclarations> {
    (1..=max_nodes.max(1))
        .prop_flat_map(|n| {
            let parents: Vec<BoxedStrategy<Option<usize>>> = (0..n)
                .map(|i| {
                    if i == 0 {
                        Just(None::<usize>).boxed()
                    } else {
                        prop::option::of(0..i).boxed()
                    }
                })
                .collect();
            (parents, shuffled_names(n))
        })
        .prop_map(|(parents, names)| {
            parents
                .iter()
                .enumerate()
                .map(|(i, parent)| (names[i].clone(), parent.map(|j| names[j].clone())))
                .collect::<ParentDeclarations>()
        })
}

/// Generates an acyclic tree in which deployments may have several parents.
///
/// Edges only run from lower to higher generation index, so any subset of
/// them is acyclic.
pub fn arb_dag(max_nodes: usize) -> impl Strategy<Value = DependencyTree> {
    (1..=max_nodes.max(1))
        .prop_flat_map(|n| {
            let pairs = n * (n - 1) / 2;
            (
                Just(n),
                prop::collection::vec(any::<bool>(), pairs),
                shuffled_names(n),
            )
        })
        .prop_map(|(n, include, names)| {
            let mut tree = DependencyTree::new();
            let mut flags = include.into_iter();
            for i in 0..n {
                let mut children = Vec::new();
                for j in (i + 1)..n {
                    if flags.next().unwrap_or(false) {
                        children.push(names[j].clone());
                    }
                }
                tree.add(names[i].clone(), children).unwrap();
            }
            tree
        })
}
