// conflux-core/src/domain/mod.rs

pub mod error;
pub mod form;
pub mod metadata;
pub mod normalizer;
pub mod policy;
pub mod reconciler;
pub mod record;
pub mod resolver;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use error::{DomainError, FieldError, ValidationErrorKind, ValidationReport};
pub use normalizer::{SubmissionNormalizer, hydrate};
pub use reconciler::{ColumnSetReconciler, ReconcileOutcome};
pub use record::ConfigurationRecord;
