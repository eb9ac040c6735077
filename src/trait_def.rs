//! Read-only input model for trait composition
//!
//! A [`TraitDefinition`] is an independently authored fragment contributing
//! schema fields, semantic hints, design tokens, UI extensions, actions,
//! and at most one state machine to a composed object. Definitions are
//! produced by an external parser and are never mutated here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named, versioned, composable fragment
///
/// Traits declare dependencies on other traits by name; the compositor
/// applies them in dependency order so a trait always observes the fields
/// its dependencies contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDefinition {
    /// Unique trait name; keys the dependency graph
    pub name: String,

    /// Trait version, informational only
    #[serde(default)]
    pub version: String,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameter declarations consumed by external tooling
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDeclaration>,

    /// Schema fields contributed by this trait, in author order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schema: IndexMap<String, SchemaField>,

    /// Semantic hints keyed by concept name
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub semantics: IndexMap<String, Value>,

    /// Design tokens keyed by token name
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tokens: IndexMap<String, Value>,

    /// UI extension declarations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub view_extensions: Vec<ViewExtension>,

    /// Actions contributed by this trait
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDefinition>,

    /// Traits this trait depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<TraitDependency>,

    /// Optional state machine owned by this trait
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_machine: Option<StateMachineDefinition>,
}

impl TraitDefinition {
    /// Create an empty trait definition
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            parameters: Vec::new(),
            schema: IndexMap::new(),
            semantics: IndexMap::new(),
            tokens: IndexMap::new(),
            view_extensions: Vec::new(),
            actions: Vec::new(),
            dependencies: Vec::new(),
            state_machine: None,
        }
    }

    /// Return a new definition with a schema field added
    pub fn with_field(mut self, name: impl Into<String>, field: SchemaField) -> Self {
        self.schema.insert(name.into(), field);
        self
    }

    /// Return a new definition with a dependency added
    pub fn with_dependency(mut self, dependency: impl Into<TraitDependency>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    /// Return a new definition with a state machine attached
    pub fn with_state_machine(mut self, state_machine: StateMachineDefinition) -> Self {
        self.state_machine = Some(state_machine);
        self
    }

    /// The declared dependency names, rich references reduced to their name
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies
            .iter()
            .map(|d| d.name().to_string())
            .collect()
    }
}

/// One schema field contributed by a trait or base object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Type tag, e.g. "string", "number", "enum"
    #[serde(rename = "type", default)]
    pub field_type: String,

    /// Whether the field must be present on instances
    #[serde(default)]
    pub required: bool,

    /// Default value applied when the field is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Open validation bag
    #[serde(flatten)]
    pub validation: FieldValidation,
}

impl SchemaField {
    /// Create a field with the given type tag
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            ..Self::default()
        }
    }

    /// Return this field marked required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Return this field with a default value
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Return this field with allowed enum values
    pub fn with_enum_values(mut self, values: Vec<Value>) -> Self {
        self.validation.enum_values = Some(values);
        self
    }

    /// Whether this field is enum-shaped: it declares an enum list, has
    /// type "enum", or declares a oneOf list
    pub fn is_enum_shaped(&self) -> bool {
        self.validation.enum_values.is_some()
            || self.validation.one_of.is_some()
            || self.field_type.eq_ignore_ascii_case("enum")
    }

    /// The allowed values declared by this field, if any
    pub fn allowed_values(&self) -> Option<&[Value]> {
        self.validation
            .enum_values
            .as_deref()
            .or(self.validation.one_of.as_deref())
    }
}

/// Validation constraints carried on a schema field
///
/// Known keys are typed; anything else rides along in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    /// Minimum numeric value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Maximum numeric value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Minimum length
    #[serde(rename = "minLength", default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    /// Maximum length
    #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    /// Regex pattern instances must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Allowed values for enum-shaped fields
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    /// Allowed alternatives (oneOf)
    #[serde(rename = "oneOf", default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,

    /// Any other validation keys, carried through untouched
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// A dependency declaration: a bare trait name or a richer reference
///
/// Only the name participates in ordering; richer references are reduced
/// to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitDependency {
    /// Plain trait-name dependency
    Name(String),

    /// Rich dependency reference
    Reference {
        /// Referenced trait name
        name: String,
        /// Version requirement, informational only
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
}

impl TraitDependency {
    /// The referenced trait name
    pub fn name(&self) -> &str {
        match self {
            TraitDependency::Name(name) => name,
            TraitDependency::Reference { name, .. } => name,
        }
    }
}

impl From<&str> for TraitDependency {
    fn from(name: &str) -> Self {
        TraitDependency::Name(name.to_string())
    }
}

impl From<String> for TraitDependency {
    fn from(name: String) -> Self {
        TraitDependency::Name(name)
    }
}

/// UI contexts a view extension can target
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewContext {
    /// Collection listing
    List,
    /// Single-object detail view
    Detail,
    /// Create/edit form
    Form,
    /// Chronological timeline
    Timeline,
    /// Card summary
    Card,
    /// Inline embed
    Inline,
    /// Consumer-defined context
    Custom,
}

impl ViewContext {
    /// The bucket name for this context
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewContext::List => "list",
            ViewContext::Detail => "detail",
            ViewContext::Form => "form",
            ViewContext::Timeline => "timeline",
            ViewContext::Card => "card",
            ViewContext::Inline => "inline",
            ViewContext::Custom => "custom",
        }
    }
}

/// A UI extension contributed by a trait
///
/// Independent traits commonly contribute independent fragments to the
/// same context, so extensions accumulate additively per bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewExtension {
    /// Context bucket this extension targets
    pub context: ViewContext,

    /// Component the extension mounts
    pub component: String,

    /// Named slot within the context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,

    /// Open property bag passed to the component
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub props: IndexMap<String, Value>,
}

/// An action contributed by a trait
///
/// Actions accumulate by append; duplicate names across traits are
/// preserved, deduplication is the consumer's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Action name
    pub name: String,

    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Action kind understood by the executing layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Open configuration bag
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub config: IndexMap<String, Value>,
}

impl ActionDefinition {
    /// Create an action with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind: None,
            config: IndexMap::new(),
        }
    }
}

/// A state machine declared by a trait, as pure data
///
/// Exactly one trait (or the base object) may own the composed object's
/// state machine. Executing transitions is a consumer concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMachineDefinition {
    /// Initial state name
    pub initial: String,

    /// All state names
    #[serde(default)]
    pub states: Vec<String>,

    /// Allowed transitions
    #[serde(default)]
    pub transitions: Vec<StateTransitionDef>,
}

/// One allowed transition in a state machine definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransitionDef {
    /// Source state
    pub from: String,

    /// Target state
    pub to: String,

    /// Trigger that fires the transition
    pub trigger: String,
}

/// A parameter declared by a trait for external tooling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDeclaration {
    /// Parameter name
    pub name: String,

    /// Parameter type tag
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,

    /// Default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An optional base object seeding a composition
///
/// The base contributes the zero-order seed: its aspects are copied
/// verbatim before any trait is applied, at provenance layer "base".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseObjectDefinition {
    /// Object name, copied onto the composed object
    pub name: String,

    /// Seed schema fields
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schema: IndexMap<String, SchemaField>,

    /// Seed semantics
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub semantics: IndexMap<String, Value>,

    /// Seed design tokens
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tokens: IndexMap<String, Value>,

    /// Seed view extensions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub view_extensions: Vec<ViewExtension>,

    /// Seed actions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDefinition>,

    /// Seed state machine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_machine: Option<StateMachineDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Test that dependencies deserialize from both bare strings and
    /// rich reference objects
    #[test]
    fn test_dependency_forms() {
        let trait_def: TraitDefinition = serde_json::from_value(json!({
            "name": "Auditable",
            "version": "1.0.0",
            "dependencies": [
                "Timestamped",
                { "name": "Identified", "version": ">=0.3" }
            ]
        }))
        .unwrap();

        assert_eq!(
            trait_def.dependency_names(),
            vec!["Timestamped".to_string(), "Identified".to_string()]
        );
    }

    /// Test enum-shape detection across the three declaring forms
    #[test]
    fn test_enum_shape_detection() {
        let by_list = SchemaField::new("string")
            .with_enum_values(vec![json!("draft"), json!("published")]);
        assert!(by_list.is_enum_shaped());

        let by_type = SchemaField::new("enum");
        assert!(by_type.is_enum_shaped());

        let mut by_one_of = SchemaField::new("string");
        by_one_of.validation.one_of = Some(vec![json!("a"), json!("b")]);
        assert!(by_one_of.is_enum_shaped());

        let plain = SchemaField::new("string");
        assert!(!plain.is_enum_shaped());
    }

    /// Test that unknown validation keys survive a round trip in the
    /// open bag
    #[test]
    fn test_open_validation_bag() {
        let field: SchemaField = serde_json::from_value(json!({
            "type": "string",
            "required": true,
            "minLength": 3,
            "format": "hostname",
            "deprecated": true
        }))
        .unwrap();

        assert_eq!(field.validation.min_length, Some(3));
        assert_eq!(field.validation.extra.get("format"), Some(&json!("hostname")));
        assert_eq!(field.validation.extra.get("deprecated"), Some(&json!(true)));

        let back = serde_json::to_value(&field).unwrap();
        assert_eq!(back.get("format"), Some(&json!("hostname")));
    }

    /// Test schema author order is preserved
    #[test]
    fn test_schema_author_order() {
        let trait_def = TraitDefinition::new("Person", "1.0.0")
            .with_field("zeta", SchemaField::new("string"))
            .with_field("alpha", SchemaField::new("string"));

        let names: Vec<&str> = trait_def.schema.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    /// Test view context bucket names
    #[test]
    fn test_view_context_names() {
        assert_eq!(ViewContext::List.as_str(), "list");
        assert_eq!(ViewContext::Custom.as_str(), "custom");
        assert_eq!(
            serde_json::to_string(&ViewContext::Timeline).unwrap(),
            "\"timeline\""
        );
    }
}
