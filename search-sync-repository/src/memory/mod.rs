//! In-process implementations of the repository interfaces.

mod config_context;

pub use config_context::InMemoryConfigContext;
