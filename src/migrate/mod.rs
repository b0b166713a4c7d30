pub mod generation;

pub use generation::{MigrationGenerationInput, MigrationGenerationResult, generate_migration};
