pub mod cli;
pub mod config;
pub mod factory;
pub mod fixtures;
pub mod model;
pub mod provider;

mod api;

pub use api::{Dependencies, DependenciesBuilder, DependencyError};
pub use fixtures::TestFixturesDependencyModifiers;
