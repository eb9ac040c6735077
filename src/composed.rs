// Copyright 2025 Cowboy AI, LLC.

//! Composed-object model: the accumulator type plus provenance and
//! collision records
//!
//! A [`ComposedObject`] is freshly created per composition call, built
//! monotonically while traits are applied in topological order, and never
//! mutated after success. On failure it is never returned at all.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::trait_def::{
    ActionDefinition, SchemaField, StateMachineDefinition, ViewContext, ViewExtension,
};

/// The single merged result of applying all traits in dependency order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedObject {
    /// Unique identifier of this composition result
    pub id: Uuid,

    /// Object name, taken from the base definition when one is supplied
    pub name: String,

    /// Trait names in computed topological order, never raw input order
    pub traits: Vec<String>,

    /// Merged schema fields
    pub schema: IndexMap<String, SchemaField>,

    /// Merged semantic hints
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub semantics: IndexMap<String, Value>,

    /// Merged design tokens
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tokens: IndexMap<String, Value>,

    /// Actions in application order, duplicates preserved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDefinition>,

    /// View extensions bucketed by context
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub view_extensions: IndexMap<ViewContext, Vec<ViewExtension>>,

    /// At most one state machine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_machine: Option<StateMachineDefinition>,

    /// The trait that owns the state machine ("base" when seeded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_machine_owner: Option<String>,

    /// Composition metadata and provenance
    pub metadata: CompositionMetadata,
}

impl ComposedObject {
    /// The merged field names in schema order
    pub fn field_names(&self) -> Vec<&str> {
        self.schema.keys().map(String::as_str).collect()
    }

    /// Whether the merged schema contains a field
    pub fn has_field(&self, name: &str) -> bool {
        self.schema.contains_key(name)
    }
}

/// Metadata recorded alongside a composed object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionMetadata {
    /// When the composition ran
    pub composed_at: DateTime<Utc>,

    /// Trait names in topological order
    pub trait_order: Vec<String>,

    /// Number of traits composed
    pub trait_count: usize,

    /// Field name to provenance record, populated when tracking is enabled
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub provenance: IndexMap<String, FieldProvenance>,

    /// Collisions resolved during the merge
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collisions: Vec<CollisionInfo>,

    /// Non-fatal warnings produced during the merge
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Wall-clock counters, populated when tracking is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceCounters>,
}

/// Layers a field definition can originate from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvenanceLayer {
    /// Platform foundation defaults
    Foundation,
    /// The base object seed
    Base,
    /// A composed trait
    Trait,
    /// Object-level customization
    Object,
    /// Context-specific customization
    Context,
}

impl ProvenanceLayer {
    /// The layer tag as recorded in provenance
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvenanceLayer::Foundation => "foundation",
            ProvenanceLayer::Base => "base",
            ProvenanceLayer::Trait => "trait",
            ProvenanceLayer::Object => "object",
            ProvenanceLayer::Context => "context",
        }
    }
}

/// The record of which trait, and at what step, last defined or overrode
/// a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProvenance {
    /// Field name
    pub field: String,

    /// Trait name, or "base" for the seed
    pub source: String,

    /// Layer the source belongs to
    pub layer: ProvenanceLayer,

    /// Topological position of the contributing trait; 0 for the base seed
    pub order: usize,

    /// Whether an earlier definition was overridden
    pub overridden: bool,

    /// Earlier sources, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_sources: Vec<String>,
}

/// How a field collision was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionResolution {
    /// Same type on both sides; the stricter definition won
    StricterType,
    /// Both sides were enum-shaped; allowed values were unioned
    EnumUnion,
    /// The sides disagreed on required; required = true prevailed
    RequiredWins,
    /// A manual override decided the outcome
    Manual,
    /// The collision could not be resolved
    Error,
}

impl CollisionResolution {
    /// The resolution tag as recorded in collision reports
    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionResolution::StricterType => "stricter_type",
            CollisionResolution::EnumUnion => "enum_union",
            CollisionResolution::RequiredWins => "required_wins",
            CollisionResolution::Manual => "manual",
            CollisionResolution::Error => "error",
        }
    }
}

/// A structured report of one resolved field collision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionInfo {
    /// The field both sides define
    pub field: String,

    /// The conflicting trait names, in application order
    pub traits: Vec<String>,

    /// How the collision was resolved
    pub resolution: CollisionResolution,

    /// Free-text description of what was merged
    pub details: String,

    /// The trait whose definition is recorded as winning
    pub winner: String,
}

/// Wall-clock counters for one composition call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceCounters {
    /// Total milliseconds for the call
    pub total_ms: f64,

    /// Milliseconds spent building and ordering the dependency graph
    pub sort_ms: f64,

    /// Milliseconds spent applying merges
    pub merge_ms: f64,

    /// Traits processed
    pub traits_processed: usize,

    /// Schema fields visited during merging
    pub fields_merged: usize,
}
