// Copyright 2025 Cowboy AI, LLC.

//! Field collision resolution
//!
//! When two traits define the same field name, [`resolve_collision`]
//! merges the two definitions into one and reports how, or fails the
//! composition on incompatible types. Resolution across more than two
//! contributors proceeds strictly pairwise, left to right in topological
//! order, the running merged field becoming the new first side each step.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::composed::{CollisionInfo, CollisionResolution};
use crate::errors::{CompositionError, CompositionResult};
use crate::trait_def::SchemaField;

/// Enum unions larger than this produce a warning
const ENUM_UNION_WARNING_THRESHOLD: usize = 10;

/// A manual override for one field, keyed by field name in the
/// composition options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualOverride {
    /// Strategy to apply
    pub strategy: OverrideStrategy,

    /// Trait selected by `prefer_trait`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trait_name: Option<String>,
}

impl ManualOverride {
    /// Select the named trait's definition verbatim
    pub fn prefer_trait(trait_name: impl Into<String>) -> Self {
        Self {
            strategy: OverrideStrategy::PreferTrait,
            trait_name: Some(trait_name.into()),
        }
    }

    /// Apply the given positional or merging strategy
    pub fn strategy(strategy: OverrideStrategy) -> Self {
        Self {
            strategy,
            trait_name: None,
        }
    }
}

/// Strategies a manual override can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideStrategy {
    /// Take the named trait's definition verbatim
    PreferTrait,
    /// Take the earlier side's definition verbatim
    UseFirst,
    /// Take the later side's definition verbatim
    UseLast,
    /// Merge both sides; still fails on a type mismatch
    Merge,
}

/// The outcome of resolving one collision
#[derive(Debug, Clone)]
pub struct ResolvedCollision {
    /// The merged field definition
    pub field: SchemaField,

    /// The structured collision report
    pub info: CollisionInfo,

    /// Non-fatal warnings produced during resolution
    pub warnings: Vec<String>,
}

/// Rank of a type tag in the strictness order
///
/// `any < unknown < string < number < boolean < object < array <
/// timestamp < email < url < uuid`; unrecognized custom types rank as
/// "string". Comparison is case-insensitive.
pub fn type_rank(type_tag: &str) -> u8 {
    match type_tag.to_ascii_lowercase().as_str() {
        "any" => 0,
        "unknown" => 1,
        "string" => 2,
        "number" => 3,
        "boolean" => 4,
        "object" => 5,
        "array" => 6,
        "timestamp" => 7,
        "email" => 8,
        "url" => 9,
        "uuid" => 10,
        _ => 2,
    }
}

/// Resolve two conflicting definitions of one field
///
/// Decision order: a manual override when supplied, then enum union when
/// both sides are enum-shaped, then a terminal type-mismatch failure when
/// the type tags differ, then the same-type merge.
///
/// In the same-type merge the recorded winner is the side whose type
/// equals the computed stricter type. Because both sides carry the same
/// tag there, the earlier side is always named winner, even when only
/// `required` differs and the later side's `required: true` is the value
/// actually applied. Longstanding behavior; consumers key off the
/// resolution tag, not the winner, for that case.
pub fn resolve_collision(
    field_name: &str,
    first: &SchemaField,
    second: &SchemaField,
    first_trait: &str,
    second_trait: &str,
    manual: Option<&ManualOverride>,
) -> CompositionResult<ResolvedCollision> {
    if let Some(override_) = manual {
        return apply_override(
            field_name,
            first,
            second,
            first_trait,
            second_trait,
            override_,
        );
    }

    if first.is_enum_shaped() && second.is_enum_shaped() {
        return Ok(enum_union(
            field_name,
            first,
            second,
            first_trait,
            second_trait,
        ));
    }

    if !first
        .field_type
        .eq_ignore_ascii_case(&second.field_type)
    {
        return Err(type_mismatch(
            field_name,
            first,
            second,
            first_trait,
            second_trait,
        ));
    }

    let (field, winner, resolution) =
        merge_same_type(first, second, first_trait, second_trait);
    let details = match resolution {
        CollisionResolution::RequiredWins => format!(
            "'{first_trait}' and '{second_trait}' disagree on required; merged required = true"
        ),
        _ => format!(
            "'{first_trait}' and '{second_trait}' agree on type '{}'; constraints tightened",
            field.field_type
        ),
    };

    Ok(ResolvedCollision {
        field,
        info: CollisionInfo {
            field: field_name.to_string(),
            traits: vec![first_trait.to_string(), second_trait.to_string()],
            resolution,
            details,
            winner: winner.to_string(),
        },
        warnings: Vec::new(),
    })
}

fn apply_override(
    field_name: &str,
    first: &SchemaField,
    second: &SchemaField,
    first_trait: &str,
    second_trait: &str,
    override_: &ManualOverride,
) -> CompositionResult<ResolvedCollision> {
    let (field, winner, details) = match override_.strategy {
        OverrideStrategy::PreferTrait => {
            let chosen = override_.trait_name.as_deref().ok_or_else(|| {
                CompositionError::invalid_trait(format!(
                    "prefer_trait override for field '{field_name}' names no trait"
                ))
            })?;
            if chosen == first_trait {
                (
                    first.clone(),
                    first_trait,
                    format!("manual prefer_trait selected '{first_trait}'"),
                )
            } else if chosen == second_trait {
                (
                    second.clone(),
                    second_trait,
                    format!("manual prefer_trait selected '{second_trait}'"),
                )
            } else {
                return Err(CompositionError::invalid_trait(format!(
                    "prefer_trait override for field '{field_name}' names '{chosen}', \
                     which is neither '{first_trait}' nor '{second_trait}'"
                )));
            }
        }
        OverrideStrategy::UseFirst => (
            first.clone(),
            first_trait,
            format!("manual use_first selected '{first_trait}'"),
        ),
        OverrideStrategy::UseLast => (
            second.clone(),
            second_trait,
            format!("manual use_last selected '{second_trait}'"),
        ),
        OverrideStrategy::Merge => {
            if !first
                .field_type
                .eq_ignore_ascii_case(&second.field_type)
            {
                return Err(type_mismatch(
                    field_name,
                    first,
                    second,
                    first_trait,
                    second_trait,
                ));
            }
            let (field, winner, _) = merge_same_type(first, second, first_trait, second_trait);
            (field, winner, "manual merge strategy applied".to_string())
        }
    };

    Ok(ResolvedCollision {
        field,
        info: CollisionInfo {
            field: field_name.to_string(),
            traits: vec![first_trait.to_string(), second_trait.to_string()],
            resolution: CollisionResolution::Manual,
            details,
            winner: winner.to_string(),
        },
        warnings: Vec::new(),
    })
}

fn enum_union(
    field_name: &str,
    first: &SchemaField,
    second: &SchemaField,
    first_trait: &str,
    second_trait: &str,
) -> ResolvedCollision {
    let first_values = first.allowed_values().unwrap_or(&[]);
    let second_values = second.allowed_values().unwrap_or(&[]);

    let mut union: Vec<serde_json::Value> = first_values.to_vec();
    for value in second_values {
        if !union.contains(value) {
            union.push(value.clone());
        }
    }

    let mut field = first.clone();
    field.required = first.required || second.required;
    fill_validation_from(&mut field, second);
    if field.default.is_none() {
        field.default = second.default.clone();
    }
    if field.description.is_none() {
        field.description = second.description.clone();
    }
    field.validation.enum_values = Some(union.clone());
    if first.validation.one_of.is_some() || second.validation.one_of.is_some() {
        field.validation.one_of = Some(union.clone());
    }

    let mut warnings = Vec::new();
    if union.len() > ENUM_UNION_WARNING_THRESHOLD {
        let warning = format!(
            "enum union for field '{field_name}' produced {} values",
            union.len()
        );
        warn!(field = %field_name, values = union.len(), "large enum union");
        warnings.push(warning);
    }

    ResolvedCollision {
        field,
        info: CollisionInfo {
            field: field_name.to_string(),
            traits: vec![first_trait.to_string(), second_trait.to_string()],
            resolution: CollisionResolution::EnumUnion,
            details: format!(
                "union of {} values from '{first_trait}' and {} from '{second_trait}'",
                first_values.len(),
                second_values.len()
            ),
            winner: first_trait.to_string(),
        },
        warnings,
    }
}

/// Merge two same-type definitions, returning the merged field, the
/// recorded winner, and the resolution tag
fn merge_same_type<'a>(
    first: &SchemaField,
    second: &SchemaField,
    first_trait: &'a str,
    second_trait: &'a str,
) -> (SchemaField, &'a str, CollisionResolution) {
    let second_is_stricter = type_rank(&second.field_type) > type_rank(&first.field_type);

    let mut field = first.clone();
    field.required = first.required || second.required;
    if second_is_stricter {
        field.field_type = second.field_type.clone();
    }

    // Bounds tighten toward the narrower range
    field.validation.min = max_of(first.validation.min, second.validation.min);
    field.validation.max = min_of(first.validation.max, second.validation.max);
    field.validation.min_length =
        max_of(first.validation.min_length, second.validation.min_length);
    field.validation.max_length =
        min_of(first.validation.max_length, second.validation.max_length);

    // Pattern is overwritten by the later side's when present
    if second.validation.pattern.is_some() {
        field.validation.pattern = second.validation.pattern.clone();
    }

    fill_validation_from(&mut field, second);

    if field.default.is_none() {
        field.default = second.default.clone();
    }
    if field.description.is_none() {
        field.description = second.description.clone();
    }

    let resolution = if first.required != second.required {
        CollisionResolution::RequiredWins
    } else {
        CollisionResolution::StricterType
    };
    let winner = if second_is_stricter {
        second_trait
    } else {
        first_trait
    };

    (field, winner, resolution)
}

/// Fill validation keys missing on `field` from `other`
fn fill_validation_from(field: &mut SchemaField, other: &SchemaField) {
    if field.validation.min.is_none() {
        field.validation.min = other.validation.min;
    }
    if field.validation.max.is_none() {
        field.validation.max = other.validation.max;
    }
    if field.validation.min_length.is_none() {
        field.validation.min_length = other.validation.min_length;
    }
    if field.validation.max_length.is_none() {
        field.validation.max_length = other.validation.max_length;
    }
    if field.validation.pattern.is_none() {
        field.validation.pattern = other.validation.pattern.clone();
    }
    if field.validation.enum_values.is_none() {
        field.validation.enum_values = other.validation.enum_values.clone();
    }
    if field.validation.one_of.is_none() {
        field.validation.one_of = other.validation.one_of.clone();
    }
    for (key, value) in &other.validation.extra {
        if !field.validation.extra.contains_key(key) {
            field.validation.extra.insert(key.clone(), value.clone());
        }
    }
}

fn type_mismatch(
    field_name: &str,
    first: &SchemaField,
    second: &SchemaField,
    first_trait: &str,
    second_trait: &str,
) -> CompositionError {
    CompositionError::TypeMismatch {
        field: field_name.to_string(),
        conflicting_traits: vec![first_trait.to_string(), second_trait.to_string()],
        details: format!(
            "'{}' from {first_trait} is incompatible with '{}' from {second_trait}",
            first.field_type, second.field_type
        ),
    }
}

fn max_of<T: PartialOrd>(first: Option<T>, second: Option<T>) -> Option<T> {
    match (first, second) {
        (Some(a), Some(b)) => Some(if b > a { b } else { a }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn min_of<T: PartialOrd>(first: Option<T>, second: Option<T>) -> Option<T> {
    match (first, second) {
        (Some(a), Some(b)) => Some(if b < a { b } else { a }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}
