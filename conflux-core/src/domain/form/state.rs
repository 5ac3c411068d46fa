// conflux-core/src/domain/form/state.rs

use std::collections::BTreeMap;
use std::fmt;

use super::field::{Field, FieldValue, split_list};
use crate::domain::policy::modes::ModeValue;

/// A field-level change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: Field,
    pub old: Option<FieldValue>,
    pub new: Option<FieldValue>,
}

type Observer = Box<dyn FnMut(&FieldChange) + Send>;

/// Current values of one configuration record being authored.
///
/// A plain container: it never validates. Everything that decides *which* values are
/// written goes through the resolver first.
#[derive(Default)]
pub struct SelectionState {
    values: BTreeMap<Field, FieldValue>,
    observers: Vec<Observer>,
}

impl fmt::Debug for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionState")
            .field("values", &self.values)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (Field, FieldValue)>,
    {
        Self {
            values: values.into_iter().collect(),
            observers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&FieldChange) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn is_set(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn integer(&self, field: Field) -> Option<i64> {
        self.get(field).and_then(FieldValue::as_integer)
    }

    /// Items of a multi-select field; `None` when unset.
    pub fn list(&self, field: Field) -> Option<Vec<String>> {
        self.text(field).map(split_list)
    }

    pub fn mode<T: ModeValue>(&self, field: Field) -> Option<T> {
        self.text(field).and_then(T::parse)
    }

    pub fn values(&self) -> &BTreeMap<Field, FieldValue> {
        &self.values
    }

    pub fn set(&mut self, field: Field, value: Option<FieldValue>) -> Option<FieldChange> {
        self.apply(&[(field, value)]).pop()
    }

    /// Writes every update first, then notifies: observers never see a half-applied batch.
    pub fn apply(&mut self, updates: &[(Field, Option<FieldValue>)]) -> Vec<FieldChange> {
        let mut changes = Vec::with_capacity(updates.len());
        for (field, value) in updates {
            let old = match value {
                Some(v) => self.values.insert(*field, v.clone()),
                None => self.values.remove(field),
            };
            if old.as_ref() != value.as_ref() {
                changes.push(FieldChange {
                    field: *field,
                    old,
                    new: value.clone(),
                });
            }
        }

        for change in &changes {
            for observer in self.observers.iter_mut() {
                observer(change);
            }
        }
        changes
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::policy::modes::LoadType;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_set_emits_change_event() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut state = SelectionState::new();
        state.subscribe(move |c| sink.lock().unwrap().push(c.field));

        let change = state.set(Field::Name, Some("orders_load".into())).unwrap();
        assert_eq!(change.old, None);
        assert_eq!(state.text(Field::Name), Some("orders_load"));
        assert_eq!(*seen.lock().unwrap(), vec![Field::Name]);

        // Same value again: nothing to report.
        assert!(state.set(Field::Name, Some("orders_load".into())).is_none());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_observers_see_the_whole_batch_applied() {
        let snapshots = Arc::new(Mutex::new(Vec::new()));
        let sink = snapshots.clone();
        let mut state = SelectionState::with_values([
            (Field::SourceSchema, FieldValue::text("public")),
            (Field::SourceTable, FieldValue::text("orders")),
        ]);
        state.subscribe(move |c| sink.lock().unwrap().push(c.clone()));

        let changes = state.apply(&[
            (Field::SourceSchema, Some(FieldValue::text("sales"))),
            (Field::SourceTable, None),
        ]);

        assert_eq!(changes.len(), 2);
        assert!(!state.is_set(Field::SourceTable));
        assert_eq!(snapshots.lock().unwrap()[1].old, Some(FieldValue::text("orders")));
    }

    #[test]
    fn test_typed_accessors() {
        let state = SelectionState::with_values([
            (Field::SourceConnectionId, FieldValue::Integer(7)),
            (Field::LoadType, FieldValue::text("SCD2")),
            (Field::Md5Columns, FieldValue::text("id,amount")),
        ]);
        assert_eq!(state.integer(Field::SourceConnectionId), Some(7));
        assert_eq!(state.mode::<LoadType>(Field::LoadType), Some(LoadType::Scd2));
        assert_eq!(
            state.list(Field::Md5Columns),
            Some(vec!["id".to_string(), "amount".to_string()])
        );
        assert_eq!(state.list(Field::PrimaryKey), None);
    }
}
