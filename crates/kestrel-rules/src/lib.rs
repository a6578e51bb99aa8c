//! Kestrel Rules
//!
//! Built-in rules for the Kestrel Swift linter and the process-wide catalog
//! that holds them.

pub mod builtin;

pub use builtin::{BuiltinRules, NimbleOperator, RedundantVoidReturn};

use kestrel_core::{RegistryCell, Result, RuleRegistry};

static REGISTRY: RegistryCell = RegistryCell::new();

/// Catalog of the built-in rules, built on first use
///
/// Later calls return the same catalog.
pub fn builtin_registry() -> Result<&'static RuleRegistry> {
    REGISTRY.get_or_try_init(|| RuleRegistry::with_rules(BuiltinRules::all_rules()))
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_built_once() {
        let first = builtin_registry().unwrap();
        let second = builtin_registry().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(
            first.ids().collect::<Vec<_>>(),
            vec!["redundant_void_return", "nimble_operator"]
        );
    }

    #[test]
    fn only_nimble_is_opt_in() {
        let registry = builtin_registry().unwrap();
        let opt_in: Vec<_> = registry
            .rules()
            .filter(|r| r.description().opt_in)
            .map(|r| r.id())
            .collect();
        assert_eq!(opt_in, vec!["nimble_operator"]);
    }
}
