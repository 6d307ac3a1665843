//! Storage for export files.

pub mod local;

// Re-export for convenience
pub use local::LocalStorage;
