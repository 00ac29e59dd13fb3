pub mod paths;
pub mod setup;

pub use paths::{ResolvedPaths, default_data_dir, default_resource_dir};
pub use setup::{SetupUtils, SetupError, SetupResult, SeedOutcome};
