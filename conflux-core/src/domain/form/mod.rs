// conflux-core/src/domain/form/mod.rs

pub mod field;
pub mod manifest;
pub mod state;

pub use field::{Field, FieldValue, join_list, split_list};
pub use manifest::{Chain, ChainSpec, ChoiceSource, FieldSpec, FormKind, FormManifest};
pub use state::{FieldChange, SelectionState};
