//! Configuration and dependency initialization.

mod dependencies;
mod settings;

pub use dependencies::{ConnectionMode, Dependencies};
pub use settings::{parse_settings, server_addr_from_env, settings_from_env};
