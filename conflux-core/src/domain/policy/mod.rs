// conflux-core/src/domain/policy/mod.rs

pub mod alias;
pub mod mode_policy;
pub mod modes;

pub use alias::SystemAliases;
pub use mode_policy::ModePolicy;
pub use modes::{
    EndpointKind, ExecutionLayer, Flag, LoadType, ModeValue, ReconType, ValidationType,
};
