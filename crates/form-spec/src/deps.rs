use std::collections::{BTreeMap, BTreeSet};

use crate::spec::form::FormSpec;

/// What has to be looked at again after a field's value changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependents {
    /// The field itself plus every field whose activity condition reads it.
    pub fields: BTreeSet<String>,
    /// Cross-field rules reading the field.
    pub rules: BTreeSet<String>,
}

/// Static re-validation graph derived from a form definition.
///
/// Field F re-validates when F changes; a rule re-evaluates when any field it
/// reads changes; a conditional field re-validates when any field its
/// activity condition reads changes.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: BTreeMap<String, Dependents>,
}

impl DependencyGraph {
    pub fn build(spec: &FormSpec) -> Self {
        let mut edges: BTreeMap<String, Dependents> = BTreeMap::new();

        for field in &spec.fields {
            edges
                .entry(field.id.clone())
                .or_default()
                .fields
                .insert(field.id.clone());
            if let Some(condition) = &field.active_if {
                for source in condition.reads() {
                    edges
                        .entry(source)
                        .or_default()
                        .fields
                        .insert(field.id.clone());
                }
            }
        }

        for rule in &spec.validations {
            for source in rule.reads() {
                edges.entry(source).or_default().rules.insert(rule.id.clone());
            }
        }

        Self { edges }
    }

    pub fn dependents(&self, field: &str) -> Option<&Dependents> {
        self.edges.get(field)
    }
}
