// conflux-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::metadata::MetadataError;
use crate::ports::store::PersistenceError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum ConsoleError {
    // --- ERREURS DU DOMAINE (validation, records) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- ERREURS D'INFRASTRUCTURE (IO, Parsing, Config) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- COLLABORATEURS EXTERNES ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Persistence(#[from] PersistenceError),
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        ConsoleError::Infrastructure(InfrastructureError::Io(err))
    }
}
