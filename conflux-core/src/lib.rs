// conflux-core/src/lib.rs

#![allow(missing_docs)]
// 1. Memory safety
#![deny(unsafe_code)]
// 2. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 3. Performance
#![warn(clippy::perf)]

// --- MODULES HEXAGONAUX ---

// 1. Ports (Interfaces / Traits)
// Metadata provider, record store.
pub mod ports;

// 2. Domain (Cœur du métier)
// Field manifests, mode policy, dependency resolver, reconciler, normalizer.
// Ne dépend de RIEN d'autre (ni infra, ni app).
pub mod domain;

// 3. Infrastructure (Adapters)
// Console config, YAML catalog, YAML record store.
pub mod infrastructure;

// 4. Application (Use Cases)
// Editing session, metadata cache, batch drift check.
pub mod application;

// --- GESTION DES ERREURS GLOBALE ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::ConsoleError;
