// conflux-core/src/domain/resolver/mod.rs

pub mod keys;
pub mod reducer;
pub mod view;

pub use keys::{key_for, wanted_keys};
pub use reducer::{Reducer, Rejection, Transition};
pub use view::{Choice, Choices, FieldStatus, FormView, choices_for, resolve};
