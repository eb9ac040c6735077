// Copyright 2025 Cowboy AI, LLC.

//! Composition orchestration
//!
//! The [`Compositor`] is the single entry point external callers use:
//! one `compose()` call builds the dependency graph, validates it, orders
//! the traits, seeds from an optional base object, applies every trait's
//! aspects in topological order, and either returns the finished
//! [`ComposedObject`] or a terminal error. No intermediate state survives
//! the call; inputs are treated as read-only, so concurrent calls over
//! overlapping trait sets are safe.

use std::fmt::Write as _;
use std::time::Instant;

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::collision::ManualOverride;
use crate::composed::{
    ComposedObject, CompositionMetadata, FieldProvenance, PerformanceCounters, ProvenanceLayer,
};
use crate::errors::{CompositionError, CompositionResult};
use crate::graph::DependencyGraph;
use crate::reducers::{
    merge_actions, merge_schema, merge_semantics, merge_tokens, merge_view_extensions,
};
use crate::sort::topological_sort;
use crate::trait_def::{BaseObjectDefinition, SchemaField, TraitDefinition};

/// Options controlling a composition run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionOptions {
    /// Record per-field provenance in the output metadata
    pub track_provenance: bool,

    /// Let a later trait take over the state machine instead of failing
    pub allow_multiple_state_machines: bool,

    /// Manual collision overrides keyed by field name
    pub collision_resolutions: IndexMap<String, ManualOverride>,

    /// Fail the composition when any warning is produced
    pub strict_mode: bool,

    /// Record wall-clock counters in the output metadata
    pub track_performance: bool,
}

impl Default for CompositionOptions {
    fn default() -> Self {
        Self {
            track_provenance: true,
            allow_multiple_state_machines: false,
            collision_resolutions: IndexMap::new(),
            strict_mode: false,
            track_performance: false,
        }
    }
}

/// The deterministic trait compositor
///
/// Composition is a pure function of its inputs: the same trait set
/// produces the same trait order, schema, provenance, and collisions
/// regardless of input-array order. Determinism rests on the sorter's
/// lexicographic tie-break and on strictly sequential, order-preserving
/// application of per-trait merges.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    options: CompositionOptions,
}

impl Compositor {
    /// Create a compositor with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compositor with the given options
    pub fn with_options(options: CompositionOptions) -> Self {
        Self { options }
    }

    /// The options this compositor runs with
    pub fn options(&self) -> &CompositionOptions {
        &self.options
    }

    /// Compose a trait set, optionally seeded by a base object
    ///
    /// Dependency validation, cycle detection, and ordering run before
    /// any merging; merge failures discard all accumulated work. On
    /// success the returned object's `traits` list is the computed
    /// topological order, never the input order.
    pub fn compose(
        &self,
        traits: &[TraitDefinition],
        base: Option<&BaseObjectDefinition>,
    ) -> CompositionResult<ComposedObject> {
        let started = Instant::now();

        let graph = DependencyGraph::from_traits(traits);
        graph.validate_dependencies_exist()?;
        if let Some(cycle) = graph.detect_circular_dependencies() {
            return Err(CompositionError::DependencyError {
                message: format!("circular dependency: {}", cycle.join(" -> ")),
                details: cycle,
            });
        }
        // Defensive: the two checks above make an unsortable graph
        // unreachable here
        let order = topological_sort(&graph)?;
        let sort_ms = elapsed_ms(started);

        debug!(trait_count = order.len(), "dependency order resolved");

        // Later duplicate definitions overwrite earlier ones, matching
        // the graph's re-add semantics
        let mut registry: IndexMap<&str, &TraitDefinition> = IndexMap::new();
        for trait_def in traits {
            registry.insert(trait_def.name.as_str(), trait_def);
        }

        let merge_started = Instant::now();
        let mut object = self.seed(base);
        let mut provenance: IndexMap<String, FieldProvenance> = IndexMap::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut collisions = Vec::new();
        let mut fields_merged = 0usize;

        if let Some(base_def) = base {
            let outcome = merge_schema(
                &mut object.schema,
                &mut provenance,
                &base_def.schema,
                "base",
                0,
                ProvenanceLayer::Base,
                &self.options.collision_resolutions,
            )?;
            fields_merged += outcome.fields_merged;
        }

        for (index, name) in order.iter().enumerate() {
            let trait_def = registry.get(name.as_str()).copied().ok_or_else(|| {
                CompositionError::invalid_trait(format!(
                    "trait '{name}' missing from the input set after ordering"
                ))
            })?;

            trace!(trait_name = %name, order = index, "applying trait");

            let outcome = merge_schema(
                &mut object.schema,
                &mut provenance,
                &trait_def.schema,
                name,
                index,
                ProvenanceLayer::Trait,
                &self.options.collision_resolutions,
            )?;
            warnings.extend(outcome.warnings);
            collisions.extend(outcome.collisions);
            fields_merged += outcome.fields_merged;

            merge_semantics(&mut object.semantics, &trait_def.semantics);
            merge_tokens(&mut object.tokens, &trait_def.tokens);
            merge_view_extensions(&mut object.view_extensions, &trait_def.view_extensions);
            merge_actions(&mut object.actions, &trait_def.actions);

            if let Some(state_machine) = &trait_def.state_machine {
                if let Some(owner) = &object.state_machine_owner {
                    if !self.options.allow_multiple_state_machines {
                        return Err(CompositionError::MultipleStateMachines {
                            conflicting_traits: vec![owner.clone(), name.clone()],
                        });
                    }
                    debug!(previous = %owner, new = %name, "state machine ownership transferred");
                }
                object.state_machine = Some(state_machine.clone());
                object.state_machine_owner = Some(name.clone());
            }
        }

        object.traits = order.clone();
        object.metadata = CompositionMetadata {
            composed_at: Utc::now(),
            trait_order: order,
            trait_count: object.traits.len(),
            provenance: if self.options.track_provenance {
                provenance
            } else {
                IndexMap::new()
            },
            collisions,
            warnings: warnings.clone(),
            performance: self.options.track_performance.then(|| PerformanceCounters {
                total_ms: elapsed_ms(started),
                sort_ms,
                merge_ms: elapsed_ms(merge_started),
                traits_processed: object.traits.len(),
                fields_merged,
            }),
        };

        if self.options.strict_mode && !warnings.is_empty() {
            return Err(CompositionError::UnresolvedCollision { warnings });
        }

        debug!(
            object = %object.name,
            fields = object.schema.len(),
            collisions = object.metadata.collisions.len(),
            "composition succeeded"
        );

        Ok(object)
    }

    /// Compose and return only the merged schema, or None on any failure
    pub fn compose_schema(
        &self,
        traits: &[TraitDefinition],
    ) -> Option<IndexMap<String, SchemaField>> {
        self.compose(traits, None).ok().map(|object| object.schema)
    }

    /// Render a human-readable diagnostic report over a composed object
    pub fn composition_report(&self, object: &ComposedObject) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "Composition report: {} ({})", object.name, object.id);
        let _ = writeln!(report, "Traits ({}): {}", object.traits.len(), object.traits.join(" -> "));
        let _ = writeln!(report, "Fields: {}", object.schema.len());

        for (name, field) in &object.schema {
            let source = object
                .metadata
                .provenance
                .get(name)
                .map(|p| p.source.as_str())
                .unwrap_or("unknown");
            let _ = writeln!(
                report,
                "  {name}: {} (required: {}, from: {source})",
                field.field_type, field.required
            );
        }

        if let Some(owner) = &object.state_machine_owner {
            let _ = writeln!(report, "State machine owned by: {owner}");
        }

        if !object.metadata.collisions.is_empty() {
            let _ = writeln!(report, "Collisions ({}):", object.metadata.collisions.len());
            for collision in &object.metadata.collisions {
                let _ = writeln!(
                    report,
                    "  {}: {} between {} (winner: {})",
                    collision.field,
                    collision.resolution.as_str(),
                    collision.traits.join(", "),
                    collision.winner
                );
            }
        }

        if !object.metadata.warnings.is_empty() {
            let _ = writeln!(report, "Warnings ({}):", object.metadata.warnings.len());
            for warning in &object.metadata.warnings {
                let _ = writeln!(report, "  {warning}");
            }
        }

        report
    }

    /// Seed a fresh composed object, copying the base aspects verbatim
    fn seed(&self, base: Option<&BaseObjectDefinition>) -> ComposedObject {
        let mut object = ComposedObject {
            id: Uuid::new_v4(),
            name: base.map(|b| b.name.clone()).unwrap_or_else(|| "composed".to_string()),
            traits: Vec::new(),
            schema: IndexMap::new(),
            semantics: IndexMap::new(),
            tokens: IndexMap::new(),
            actions: Vec::new(),
            view_extensions: IndexMap::new(),
            state_machine: None,
            state_machine_owner: None,
            metadata: CompositionMetadata {
                composed_at: Utc::now(),
                trait_order: Vec::new(),
                trait_count: 0,
                provenance: IndexMap::new(),
                collisions: Vec::new(),
                warnings: Vec::new(),
                performance: None,
            },
        };

        if let Some(base_def) = base {
            // Schema is seeded through the schema reducer so provenance
            // lands at layer "base"; the remaining aspects copy directly
            merge_semantics(&mut object.semantics, &base_def.semantics);
            merge_tokens(&mut object.tokens, &base_def.tokens);
            merge_view_extensions(&mut object.view_extensions, &base_def.view_extensions);
            merge_actions(&mut object.actions, &base_def.actions);
            if let Some(state_machine) = &base_def.state_machine {
                object.state_machine = Some(state_machine.clone());
                object.state_machine_owner = Some("base".to_string());
            }
        }

        object
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
