// Core modules
pub mod config;
pub mod error;
pub mod lock;
pub mod path;

// Re-export commonly used types
pub use config::{FetchStrategy, GobinConfig, ToolVersionsStrategy};
pub use error::{GobinError, Result};
