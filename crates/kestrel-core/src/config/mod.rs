//! Configuration system for kestrel
//!
//! - TOML and JSON configuration files
//! - Auto-discovery by traversing up directories
//! - Strong typing with serde and JSON Schema generation via schemars
//!
//! ## Example Configuration
//!
//! ```toml
//! [linter]
//! recommended = true
//!
//! [linter.rules]
//! nimble_operator = "warning"
//! redundant_void_return = { severity = "error", options = { include_closures = false } }
//! ```

mod kestrel_config;
mod loader;

pub use kestrel_config::{
    Configuration, LinterConfiguration, RuleConfig, RuleSetting, RuleSeverity,
};
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
