// Copyright 2025 Cowboy AI, LLC.

//! Topological ordering of trait dependency graphs
//!
//! Two interchangeable sorters produce one canonical ordering:
//!
//! - [`topological_sort`] counts down each node's remaining dependency
//!   count through a reverse dependents index, re-sorting the ready queue
//!   lexicographically before every pop. This is the canonical sorter the
//!   compositor uses: the tie-break makes the ordering reproducible across
//!   runs and ports.
//! - [`topological_sort_dfs`] visits nodes and their dependencies in
//!   lexicographic order and appends post-order, detecting cycles via the
//!   active-path set. It exists as an independent cross-check and yields
//!   the same order whenever no lexicographically-early root depends on a
//!   lexicographically-late leaf.

use indexmap::IndexMap;

use crate::errors::{CompositionError, CompositionResult};
use crate::graph::DependencyGraph;

/// Canonical degree-counting sort with lexicographic tie-break
///
/// A node's remaining count starts at its dependency-list length,
/// duplicates included; a reverse dependents index is built from the raw
/// lists so that emitting a node decrements each listing node once per
/// mention. Self-referential declarations therefore never become ready
/// and surface through cycle detection.
pub fn topological_sort(graph: &DependencyGraph) -> CompositionResult<Vec<String>> {
    let mut remaining: IndexMap<&str, usize> = IndexMap::new();
    let mut dependents: IndexMap<&str, Vec<&str>> = IndexMap::new();

    for name in graph.trait_names() {
        let deps = graph.dependencies_of(name).unwrap_or(&[]);
        remaining.insert(name, deps.len());
        for dep in deps {
            dependents.entry(dep.as_str()).or_default().push(name);
        }
    }

    let mut ready: Vec<&str> = remaining
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| *name)
        .collect();

    let mut order: Vec<String> = Vec::with_capacity(graph.len());

    while !ready.is_empty() {
        // The tie-break is mandatory: without it multiple valid orders
        // exist and output is not reproducible.
        ready.sort_unstable();
        let node = ready.remove(0);
        order.push(node.to_string());

        if let Some(listeners) = dependents.get(node) {
            for &listener in listeners {
                if let Some(count) = remaining.get_mut(listener) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.push(listener);
                    }
                }
            }
        }
    }

    if order.len() < graph.len() {
        return Err(unsortable_error(graph, &order));
    }

    Ok(order)
}

/// DFS post-order sort with lexicographic visiting
///
/// Equivalent to [`topological_sort`] on the supported graph corpus; the
/// compositor always uses the degree-counting sorter as canonical.
pub fn topological_sort_dfs(graph: &DependencyGraph) -> CompositionResult<Vec<String>> {
    let mut states: IndexMap<&str, VisitState> = IndexMap::new();
    let mut order: Vec<String> = Vec::with_capacity(graph.len());
    let mut path: Vec<&str> = Vec::new();

    let mut names: Vec<&str> = graph.trait_names().collect();
    names.sort_unstable();

    for name in names {
        visit(graph, name, &mut states, &mut path, &mut order)?;
    }

    Ok(order)
}

fn visit<'a>(
    graph: &'a DependencyGraph,
    node: &'a str,
    states: &mut IndexMap<&'a str, VisitState>,
    path: &mut Vec<&'a str>,
    order: &mut Vec<String>,
) -> CompositionResult<()> {
    match states.get(node) {
        Some(VisitState::Done) => return Ok(()),
        Some(VisitState::Active) => {
            let start = path.iter().position(|n| *n == node).unwrap_or(0);
            let cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
            return Err(CompositionError::DependencyError {
                message: format!("circular dependency: {}", cycle.join(" -> ")),
                details: cycle,
            });
        }
        None => {}
    }

    states.insert(node, VisitState::Active);
    path.push(node);

    if let Some(deps) = graph.dependencies_of(node) {
        let mut sorted: Vec<&str> = deps.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted.dedup();
        for dep in sorted {
            if graph.contains(dep) {
                visit(graph, dep, states, path, order)?;
            }
        }
    }

    path.pop();
    states.insert(node, VisitState::Done);
    order.push(node.to_string());
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum VisitState {
    Active,
    Done,
}

/// Build the precise error for a sort that emitted fewer nodes than exist
///
/// Re-runs cycle detection for an exact report rather than a generic
/// leftover message; the generic form remains as the fallback for stalls
/// that are not cycles (e.g. dependencies on unregistered traits when
/// validation was skipped).
fn unsortable_error(graph: &DependencyGraph, order: &[String]) -> CompositionError {
    if let Some(cycle) = graph.detect_circular_dependencies() {
        return CompositionError::DependencyError {
            message: format!("circular dependency: {}", cycle.join(" -> ")),
            details: cycle,
        };
    }

    let mut leftover: Vec<String> = graph
        .trait_names()
        .filter(|name| !order.iter().any(|o| o == name))
        .map(str::to_string)
        .collect();
    leftover.sort_unstable();

    CompositionError::DependencyError {
        message: format!("unable to order traits: {}", leftover.join(", ")),
        details: leftover,
    }
}
