// conflux-core/src/domain/error.rs

use miette::Diagnostic;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::domain::form::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Relevant, required and empty.
    Required,
    /// Set while something it depends on is not.
    AncestorUnset,
    /// Not among the valid choices derived from its ancestors.
    InvalidChoice,
    /// Breaks a rule of the current modes (duplicates, ranges, patterns...).
    IllegalValue,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::AncestorUnset => "ancestor unset",
            Self::InvalidChoice => "invalid choice",
            Self::IllegalValue => "illegal value",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.kind.as_str(), self.message)
    }
}

/// Every problem found in one submission attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Field, kind: ValidationErrorKind, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            kind,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn kind_of(&self, field: Field) -> Option<ValidationErrorKind> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.kind)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.errors.iter().map(|e| e.field.as_str()).collect();
        write!(f, "{} field(s) failed: {}", self.errors.len(), fields.join(", "))
    }
}

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    #[diagnostic(
        code(conflux::domain::validation),
        help("Fix the listed fields and submit again. Nothing was written.")
    )]
    Validation(ValidationReport),

    #[error("Invalid configuration record: {0}")]
    #[diagnostic(code(conflux::domain::record))]
    InvalidRecord(String),
}

impl From<ValidationReport> for DomainError {
    fn from(report: ValidationReport) -> Self {
        DomainError::Validation(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lists_failing_fields() {
        let mut report = ValidationReport::new();
        assert!(report.is_empty());
        report.push(
            Field::EffectiveDateColumn,
            ValidationErrorKind::Required,
            "required for Incremental loads",
        );
        report.push(Field::PrimaryKey, ValidationErrorKind::IllegalValue, "duplicate 'id'");

        assert!(report.contains(Field::EffectiveDateColumn));
        assert_eq!(
            report.kind_of(Field::PrimaryKey),
            Some(ValidationErrorKind::IllegalValue)
        );
        assert_eq!(
            report.to_string(),
            "2 field(s) failed: effective_date_column, primary_key"
        );

        let err = DomainError::from(report);
        assert!(err.to_string().starts_with("Validation failed"));
    }
}
