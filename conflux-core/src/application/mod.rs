// conflux-core/src/application/mod.rs

pub mod cache;
pub mod reconcile;
pub mod session;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Le CLI fait : `use conflux_core::application::{EditingSession, Notice};`

pub use cache::{Completion, MetadataCache, MetadataRequest};
pub use reconcile::{DriftReport, reconcile_record};
pub use session::{EditOutcome, EditingSession, Notice};
