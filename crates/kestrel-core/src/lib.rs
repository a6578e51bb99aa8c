//! Kestrel Core
//!
//! Core engine of the Kestrel Swift linter: a lossless syntax tree, inline
//! suppression directives, rule detection and rule-driven correction.

pub mod config;
pub mod corrector;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod detector;
pub mod error;
pub mod linter;
pub mod position;
pub mod registry;
pub mod result;
pub mod rule;
pub mod suppression;

// Re-export commonly used types
pub use config::{
    ConfigLoader, Configuration, LinterConfiguration, RuleConfig, RuleSetting, RuleSeverity,
};
pub use corrector::CorrectionOutcome;
pub use cst::{SyntaxKind, SyntaxNode, SyntaxToken};
pub use error::{ErrorKind, KestrelError};
pub use linter::{ActiveRule, CorrectionReport, FileReport, LintReport, Linter};
pub use position::{LineIndex, Position, SharedTree, SourceRange, SourceTree};
pub use registry::{RegistryCell, RuleRegistry};
pub use result::{Result, ResultExt};
pub use rule::{
    Correction, Match, Rewrite, Rule, RuleDescription, RuleKind, Severity, Violation,
    strip_markers,
};
pub use suppression::{DirectiveWarning, DisabledRegion, DisabledRegions, RuleRegions};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kestrel=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
