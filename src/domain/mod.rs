pub mod errors;
pub mod guia;
pub mod input;
pub mod locator;
pub mod repositories;
pub mod resolver;
pub mod sessions;
pub mod viewer;

// Re-exports
pub use errors::RepositoryError;
pub use input::FormatError;
