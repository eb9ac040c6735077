//! Per-aspect merge reducers
//!
//! Five independent fold operations, one per trait aspect. Schema alone
//! consults the collision resolver; semantics and tokens are later-wins
//! key overwrites; view extensions append per context bucket; actions
//! append with no deduplication.

use indexmap::IndexMap;
use serde_json::Value;

use crate::collision::{resolve_collision, ManualOverride};
use crate::composed::{CollisionInfo, FieldProvenance, ProvenanceLayer};
use crate::errors::CompositionResult;
use crate::trait_def::{ActionDefinition, SchemaField, ViewContext, ViewExtension};

/// Bookkeeping produced by one schema fold step
#[derive(Debug, Clone, Default)]
pub struct SchemaMergeOutcome {
    /// Non-fatal warnings produced by collision resolution
    pub warnings: Vec<String>,

    /// Collisions resolved during this step
    pub collisions: Vec<CollisionInfo>,

    /// Schema fields visited
    pub fields_merged: usize,
}

/// Fold one contributor's schema into the accumulated schema
///
/// New fields are inserted with a fresh provenance entry. Existing fields
/// go through the collision resolver pairwise, the accumulated definition
/// acting as the earlier side; provenance then records the incoming
/// contributor as the latest source and appends the previous one.
#[allow(clippy::too_many_arguments)]
pub fn merge_schema(
    accumulated: &mut IndexMap<String, SchemaField>,
    provenance: &mut IndexMap<String, FieldProvenance>,
    incoming: &IndexMap<String, SchemaField>,
    source: &str,
    order: usize,
    layer: ProvenanceLayer,
    overrides: &IndexMap<String, ManualOverride>,
) -> CompositionResult<SchemaMergeOutcome> {
    let mut outcome = SchemaMergeOutcome::default();

    for (field_name, incoming_field) in incoming {
        outcome.fields_merged += 1;

        let existing = accumulated.get(field_name).cloned();
        match existing {
            None => {
                accumulated.insert(field_name.clone(), incoming_field.clone());
                provenance.insert(
                    field_name.clone(),
                    FieldProvenance {
                        field: field_name.clone(),
                        source: source.to_string(),
                        layer,
                        order,
                        overridden: false,
                        previous_sources: Vec::new(),
                    },
                );
            }
            Some(existing_field) => {
                let prior_source = provenance
                    .get(field_name)
                    .map(|p| p.source.clone())
                    .unwrap_or_else(|| "base".to_string());

                let resolved = resolve_collision(
                    field_name,
                    &existing_field,
                    incoming_field,
                    &prior_source,
                    source,
                    overrides.get(field_name),
                )?;

                accumulated.insert(field_name.clone(), resolved.field);
                outcome.warnings.extend(resolved.warnings);
                outcome.collisions.push(resolved.info);

                if let Some(entry) = provenance.get_mut(field_name) {
                    let previous = entry.source.clone();
                    entry.previous_sources.push(previous);
                    entry.source = source.to_string();
                    entry.layer = layer;
                    entry.order = order;
                    entry.overridden = true;
                }
            }
        }
    }

    Ok(outcome)
}

/// Fold semantics: later contributors overwrite per key
pub fn merge_semantics(
    accumulated: &mut IndexMap<String, Value>,
    incoming: &IndexMap<String, Value>,
) {
    for (key, value) in incoming {
        accumulated.insert(key.clone(), value.clone());
    }
}

/// Fold design tokens: later contributors overwrite per key
pub fn merge_tokens(
    accumulated: &mut IndexMap<String, Value>,
    incoming: &IndexMap<String, Value>,
) {
    for (key, value) in incoming {
        accumulated.insert(key.clone(), value.clone());
    }
}

/// Fold view extensions additively into their context buckets
pub fn merge_view_extensions(
    accumulated: &mut IndexMap<ViewContext, Vec<ViewExtension>>,
    incoming: &[ViewExtension],
) {
    for extension in incoming {
        accumulated
            .entry(extension.context)
            .or_default()
            .push(extension.clone());
    }
}

/// Fold actions by append; duplicate names are preserved
pub fn merge_actions(accumulated: &mut Vec<ActionDefinition>, incoming: &[ActionDefinition]) {
    accumulated.extend(incoming.iter().cloned());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(fields: &[(&str, SchemaField)]) -> IndexMap<String, SchemaField> {
        fields
            .iter()
            .map(|(name, field)| (name.to_string(), field.clone()))
            .collect()
    }

    /// Test new fields insert with fresh provenance
    #[test]
    fn test_schema_insert_with_provenance() {
        let mut accumulated = IndexMap::new();
        let mut provenance = IndexMap::new();
        let incoming = schema(&[("title", SchemaField::new("string"))]);

        let outcome = merge_schema(
            &mut accumulated,
            &mut provenance,
            &incoming,
            "Titled",
            0,
            ProvenanceLayer::Trait,
            &IndexMap::new(),
        )
        .unwrap();

        assert_eq!(outcome.fields_merged, 1);
        assert!(outcome.collisions.is_empty());

        let entry = provenance.get("title").unwrap();
        assert_eq!(entry.source, "Titled");
        assert_eq!(entry.layer, ProvenanceLayer::Trait);
        assert_eq!(entry.order, 0);
        assert!(!entry.overridden);
        assert!(entry.previous_sources.is_empty());
    }

    /// Test collisions update provenance to the later contributor
    #[test]
    fn test_schema_collision_updates_provenance() {
        let mut accumulated = IndexMap::new();
        let mut provenance = IndexMap::new();
        let first = schema(&[("x", SchemaField::new("string"))]);
        let second = schema(&[("x", SchemaField::new("string").required())]);

        merge_schema(
            &mut accumulated,
            &mut provenance,
            &first,
            "A",
            0,
            ProvenanceLayer::Trait,
            &IndexMap::new(),
        )
        .unwrap();
        let outcome = merge_schema(
            &mut accumulated,
            &mut provenance,
            &second,
            "B",
            1,
            ProvenanceLayer::Trait,
            &IndexMap::new(),
        )
        .unwrap();

        assert_eq!(outcome.collisions.len(), 1);
        assert!(accumulated.get("x").unwrap().required);

        let entry = provenance.get("x").unwrap();
        assert_eq!(entry.source, "B");
        assert_eq!(entry.order, 1);
        assert!(entry.overridden);
        assert_eq!(entry.previous_sources, vec!["A".to_string()]);
    }

    /// Test batch resolution runs pairwise, the running merge becoming
    /// the earlier side
    #[test]
    fn test_schema_pairwise_across_three_contributors() {
        let mut accumulated = IndexMap::new();
        let mut provenance = IndexMap::new();
        let overrides = IndexMap::new();

        let mut a = SchemaField::new("number");
        a.validation.min = Some(0.0);
        let mut b = SchemaField::new("number");
        b.validation.min = Some(5.0);
        let mut c = SchemaField::new("number");
        c.validation.min = Some(3.0);

        for (idx, (name, field)) in [("A", a), ("B", b), ("C", c)].into_iter().enumerate() {
            merge_schema(
                &mut accumulated,
                &mut provenance,
                &schema(&[("n", field)]),
                name,
                idx,
                ProvenanceLayer::Trait,
                &overrides,
            )
            .unwrap();
        }

        // max(max(0, 5), 3) = 5: C observed the fully applied A+B merge
        assert_eq!(accumulated.get("n").unwrap().validation.min, Some(5.0));
        let entry = provenance.get("n").unwrap();
        assert_eq!(entry.previous_sources, vec!["A".to_string(), "B".to_string()]);
    }

    /// Test semantics and tokens are later-wins overwrites
    #[test]
    fn test_semantics_and_tokens_later_wins() {
        let mut semantics: IndexMap<String, Value> = IndexMap::new();
        semantics.insert("role".to_string(), json!("document"));

        let mut incoming: IndexMap<String, Value> = IndexMap::new();
        incoming.insert("role".to_string(), json!("record"));
        incoming.insert("icon".to_string(), json!("file"));

        merge_semantics(&mut semantics, &incoming);
        assert_eq!(semantics.get("role"), Some(&json!("record")));
        assert_eq!(semantics.get("icon"), Some(&json!("file")));

        let mut tokens: IndexMap<String, Value> = IndexMap::new();
        tokens.insert("accent".to_string(), json!("#111111"));
        let mut incoming: IndexMap<String, Value> = IndexMap::new();
        incoming.insert("accent".to_string(), json!("#222222"));
        merge_tokens(&mut tokens, &incoming);
        assert_eq!(tokens.get("accent"), Some(&json!("#222222")));
    }

    /// Test view extensions append into their context bucket
    #[test]
    fn test_view_extensions_append_per_bucket() {
        let mut buckets: IndexMap<ViewContext, Vec<ViewExtension>> = IndexMap::new();

        let badge = ViewExtension {
            context: ViewContext::List,
            component: "StatusBadge".to_string(),
            slot: None,
            props: IndexMap::new(),
        };
        let chip = ViewExtension {
            context: ViewContext::List,
            component: "OwnerChip".to_string(),
            slot: None,
            props: IndexMap::new(),
        };
        let panel = ViewExtension {
            context: ViewContext::Detail,
            component: "AuditPanel".to_string(),
            slot: Some("sidebar".to_string()),
            props: IndexMap::new(),
        };

        merge_view_extensions(&mut buckets, &[badge.clone()]);
        merge_view_extensions(&mut buckets, &[chip.clone(), panel.clone()]);

        assert_eq!(buckets.get(&ViewContext::List).unwrap().len(), 2);
        assert_eq!(buckets.get(&ViewContext::Detail).unwrap().len(), 1);
        assert_eq!(buckets.get(&ViewContext::List).unwrap()[0], badge);
    }

    /// Test actions append without deduplication
    #[test]
    fn test_actions_append_no_dedup() {
        let mut actions = Vec::new();
        merge_actions(&mut actions, &[ActionDefinition::new("archive")]);
        merge_actions(&mut actions, &[ActionDefinition::new("archive")]);

        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].name, "archive");
        assert_eq!(actions[1].name, "archive");
    }
}
