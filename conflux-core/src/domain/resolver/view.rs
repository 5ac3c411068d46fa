// conflux-core/src/domain/resolver/view.rs

use serde::Serialize;

use super::keys::key_for;
use crate::domain::form::{ChoiceSource, Field, FieldValue, FormManifest, SelectionState};
use crate::domain::metadata::{EnumKind, Lookup, MetadataLookup, MetadataValue};
use crate::domain::policy::{ExecutionLayer, Flag, LoadType, ModePolicy, ModeValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: FieldValue,
    pub label: String,
}

impl Choice {
    fn named(name: &str) -> Self {
        Self {
            value: FieldValue::text(name),
            label: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "options", rename_all = "snake_case")]
pub enum Choices {
    /// Free input.
    Free,
    /// The metadata call is not back yet.
    Loading,
    /// The metadata call failed.
    Unavailable(String),
    Options(Vec<Choice>),
}

impl Choices {
    /// `None` while the valid set is unknown.
    pub fn allows(&self, value: &FieldValue) -> Option<bool> {
        match self {
            Self::Free => Some(true),
            Self::Loading | Self::Unavailable(_) => None,
            Self::Options(options) => Some(options.iter().any(|c| same_value(&c.value, value))),
        }
    }
}

fn same_value(a: &FieldValue, b: &FieldValue) -> bool {
    match (a, b) {
        (FieldValue::Integer(_), _) | (_, FieldValue::Integer(_)) => {
            a.as_integer().is_some() && a.as_integer() == b.as_integer()
        }
        (FieldValue::Text(x), FieldValue::Text(y)) => x == y,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldStatus {
    pub field: Field,
    pub value: Option<FieldValue>,
    pub relevant: bool,
    pub enabled: bool,
    pub required: bool,
    pub choices: Choices,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub fields: Vec<FieldStatus>,
}

impl FormView {
    pub fn get(&self, field: Field) -> Option<&FieldStatus> {
        self.fields.iter().find(|s| s.field == field)
    }
}

/// Recomputes enabled fields and valid choice sets from the current selection and
/// whatever metadata has arrived so far.
pub fn resolve(
    manifest: &FormManifest,
    policy: &ModePolicy,
    state: &SelectionState,
    lookup: &dyn MetadataLookup,
) -> FormView {
    let fields = manifest
        .fields
        .iter()
        .map(|spec| {
            let enabled = policy.is_enabled(manifest, state, spec.field);
            FieldStatus {
                field: spec.field,
                value: state.get(spec.field).cloned(),
                relevant: policy.is_relevant(manifest, state, spec.field),
                enabled,
                required: policy.is_required(manifest, state, spec.field),
                choices: if enabled {
                    choices_for(manifest, policy, state, lookup, spec.field)
                } else {
                    Choices::Options(Vec::new())
                },
            }
        })
        .collect();
    FormView { fields }
}

pub fn choices_for(
    manifest: &FormManifest,
    policy: &ModePolicy,
    state: &SelectionState,
    lookup: &dyn MetadataLookup,
    field: Field,
) -> Choices {
    let Some(spec) = manifest.spec(field) else {
        return Choices::Options(Vec::new());
    };

    match spec.source {
        ChoiceSource::Free => return Choices::Free,
        ChoiceSource::Flag => {
            return Choices::Options(Flag::ALL.iter().map(|f| Choice::named(f.display())).collect());
        }
        _ => {}
    }

    let Some(key) = key_for(manifest, state, field) else {
        return Choices::Options(Vec::new());
    };

    let value = match lookup.lookup(&key) {
        Lookup::Missing | Lookup::Pending => return Choices::Loading,
        Lookup::Unavailable(reason) => return Choices::Unavailable(reason.to_string()),
        Lookup::Ready(value) => value,
    };

    let options = match (spec.source, value) {
        (ChoiceSource::Connections { system }, MetadataValue::Connections(connections)) => {
            let eligible: Vec<_> = match system {
                // Ungated chain: every connection.
                None => connections.iter().collect(),
                Some(gate) => match state.text(gate) {
                    Some(s) => policy.aliases().eligible(s, connections).collect(),
                    None => Vec::new(),
                },
            };
            eligible
                .into_iter()
                .map(|c| Choice {
                    value: FieldValue::Integer(c.id),
                    label: format!("{} ({})", c.name, c.connection_type),
                })
                .collect()
        }
        (ChoiceSource::Enum(EnumKind::LoadTypes), value) => {
            let legal =
                ModePolicy::legal_load_types(state.mode::<ExecutionLayer>(Field::ExecutionLayer));
            value
                .names()
                .iter()
                .filter(|n| LoadType::parse(n).is_some_and(|l| legal.contains(&l)))
                .map(|n| Choice::named(n))
                .collect()
        }
        (_, value) => value.names().iter().map(|n| Choice::named(n)).collect(),
    };
    Choices::Options(options)
}
