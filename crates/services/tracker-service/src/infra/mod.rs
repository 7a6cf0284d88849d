//! Infrastructure layer - initialization and seed data.

mod bootstrap;
mod sample_data;

pub use bootstrap::{load_or_seed, reseed, BootstrapOutcome};
pub use sample_data::generate_sample_data;
