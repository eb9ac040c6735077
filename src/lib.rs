// Copyright 2025 Cowboy AI, LLC.

//! # CIM Compose
//!
//! Deterministic trait composition for the Composable Information Machine.
//!
//! Many loosely-coupled modules contribute partial schemas, semantic
//! hints, design tokens, UI extensions, actions, and at most one state
//! machine to a single domain object. This crate merges those fragments
//! into one composed object, resolved purely from declared inter-trait
//! dependencies, regardless of input ordering:
//!
//! - **Trait/Object model**: read-only input data ([`TraitDefinition`],
//!   optional [`BaseObjectDefinition`])
//! - **Dependency Graph**: directed graph keyed by trait name, answering
//!   existence, cycle, and dependents queries
//! - **Topological Sorter**: two interchangeable algorithms producing one
//!   canonical ordering or a precise cycle report
//! - **Collision Resolver**: merges two conflicting field definitions
//!   under a fixed policy (type strictness, enum union, required-wins,
//!   manual override) with a structured report
//! - **Merge Reducers**: five independent folds, one per trait aspect
//! - **Compositor**: the single `compose()` entry point external callers
//!   use
//!
//! ## Design Principles
//!
//! 1. **Determinism**: lexicographic tie-breaking in the sorter plus
//!    strictly sequential merges make output byte-for-byte reproducible
//! 2. **Hermetic calls**: each `compose()` builds its own scratch graph
//!    and accumulator; nothing crosses calls
//! 3. **Read-only inputs**: definitions are never mutated, so concurrent
//!    calls over overlapping trait sets are safe
//! 4. **Terminal errors**: no partial composed object is ever visible on
//!    failure
//!
//! ## Example
//!
//! ```
//! use cim_compose::{Compositor, SchemaField, TraitDefinition};
//!
//! let identified = TraitDefinition::new("Identified", "1.0.0")
//!     .with_field("id", SchemaField::new("uuid").required());
//! let titled = TraitDefinition::new("Titled", "1.0.0")
//!     .with_dependency("Identified")
//!     .with_field("title", SchemaField::new("string"));
//!
//! let object = Compositor::new()
//!     .compose(&[titled, identified], None)
//!     .expect("composition succeeds");
//!
//! // Dependency order, not input order
//! assert_eq!(object.traits, vec!["Identified".to_string(), "Titled".to_string()]);
//! assert!(object.has_field("id"));
//! assert!(object.has_field("title"));
//! ```

#![warn(missing_docs)]

mod collision;
mod composed;
mod compositor;
mod errors;
mod graph;
mod reducers;
mod sort;
mod trait_def;

// Re-export core types
pub use collision::{
    resolve_collision, type_rank, ManualOverride, OverrideStrategy, ResolvedCollision,
};
pub use composed::{
    CollisionInfo, CollisionResolution, ComposedObject, CompositionMetadata, FieldProvenance,
    PerformanceCounters, ProvenanceLayer,
};
pub use compositor::{CompositionOptions, Compositor};
pub use errors::{CompositionError, CompositionErrorKind, CompositionResult};
pub use graph::DependencyGraph;
pub use reducers::{
    merge_actions, merge_schema, merge_semantics, merge_tokens, merge_view_extensions,
    SchemaMergeOutcome,
};
pub use sort::{topological_sort, topological_sort_dfs};
pub use trait_def::{
    ActionDefinition, BaseObjectDefinition, FieldValidation, ParameterDeclaration, SchemaField,
    StateMachineDefinition, StateTransitionDef, TraitDefinition, TraitDependency, ViewContext,
    ViewExtension,
};
