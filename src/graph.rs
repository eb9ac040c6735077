//! Dependency graph over trait names
//!
//! Directed graph keyed by trait name, answering existence, cycle, and
//! dependents queries. The graph is a scratch structure: it lives only
//! for the duration of one composition call.

use indexmap::IndexMap;

use crate::errors::{CompositionError, CompositionResult};
use crate::trait_def::TraitDefinition;

/// A directed dependency graph keyed by trait name
///
/// Nodes are registered with their declared dependency-name lists.
/// Dependency lists are stored as declared, duplicates included, because
/// the sorter's count-down bookkeeping consumes one count per mention.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: IndexMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
        }
    }

    /// Build a graph from a trait list
    ///
    /// Later traits with the same name overwrite earlier ones, matching
    /// [`add_trait`](Self::add_trait).
    pub fn from_traits(traits: &[TraitDefinition]) -> Self {
        let mut graph = Self::new();
        for trait_def in traits {
            graph.add_trait(trait_def.name.clone(), trait_def.dependency_names());
        }
        graph
    }

    /// Register a node keyed by name with its dependency-name list
    ///
    /// Re-adding the same name overwrites the previous registration.
    pub fn add_trait(&mut self, name: impl Into<String>, dependencies: Vec<String>) {
        self.nodes.insert(name.into(), dependencies);
    }

    /// Whether a trait is registered
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Number of registered traits
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Registered trait names in insertion order
    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// The declared dependency list of a trait, duplicates included
    pub fn dependencies_of(&self, name: &str) -> Option<&[String]> {
        self.nodes.get(name).map(Vec::as_slice)
    }

    /// Traits that list `name` as a dependency, each reported once
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, deps)| deps.iter().any(|d| d == name))
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Verify every referenced dependency is present as a node
    ///
    /// Returns a dependency error naming every dependency referenced but
    /// not registered. Must run before sorting.
    pub fn validate_dependencies_exist(&self) -> CompositionResult<()> {
        let mut missing: Vec<String> = Vec::new();
        let mut details: Vec<String> = Vec::new();

        for (name, deps) in &self.nodes {
            for dep in deps {
                if !self.nodes.contains_key(dep) {
                    if !missing.contains(dep) {
                        missing.push(dep.clone());
                    }
                    details.push(format!("{dep} (required by {name})"));
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CompositionError::DependencyError {
                message: format!("missing dependencies: {}", missing.join(", ")),
                details,
            })
        }
    }

    /// Find a dependency cycle, if any
    ///
    /// Walks the graph depth-first with an active-path stack, visiting
    /// names lexicographically so the reported cycle is deterministic.
    /// Returns the minimal cycle as a contiguous trait-name sequence,
    /// e.g. `["A", "B"]` for A -> B -> A, or `["A"]` for a
    /// self-referential declaration.
    pub fn detect_circular_dependencies(&self) -> Option<Vec<String>> {
        let mut states: IndexMap<&str, VisitState> = IndexMap::new();
        let mut path: Vec<&str> = Vec::new();

        let mut names: Vec<&str> = self.trait_names().collect();
        names.sort_unstable();

        for name in names {
            if let Some(cycle) = self.visit(name, &mut states, &mut path) {
                return Some(cycle);
            }
        }
        None
    }

    fn visit<'a>(
        &'a self,
        node: &'a str,
        states: &mut IndexMap<&'a str, VisitState>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        match states.get(node) {
            Some(VisitState::Done) => return None,
            Some(VisitState::Active) => {
                let start = path.iter().position(|n| *n == node).unwrap_or(0);
                return Some(path[start..].iter().map(|n| n.to_string()).collect());
            }
            None => {}
        }

        states.insert(node, VisitState::Active);
        path.push(node);

        if let Some(deps) = self.nodes.get(node) {
            let mut sorted: Vec<&str> = deps.iter().map(String::as_str).collect();
            sorted.sort_unstable();
            sorted.dedup();
            for dep in sorted {
                // Missing dependencies are validate_dependencies_exist's concern
                if self.nodes.contains_key(dep) {
                    if let Some(cycle) = self.visit(dep, states, path) {
                        return Some(cycle);
                    }
                }
            }
        }

        path.pop();
        states.insert(node, VisitState::Done);
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum VisitState {
    Active,
    Done,
}
