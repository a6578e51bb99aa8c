//! Built-in rules for Swift linting

use std::sync::Arc;

use kestrel_core::Rule;

pub mod nimble_operator;
pub mod redundant_void_return;

pub use nimble_operator::{NIMBLE_OPERATOR, NimbleOperator};
pub use redundant_void_return::{REDUNDANT_VOID_RETURN, RedundantVoidReturn};

/// Collection of built-in Swift linting rules
pub struct BuiltinRules;

impl BuiltinRules {
    /// Rules that prefer the idiomatic spelling of a construct
    pub fn idiomatic_rules() -> Vec<Arc<dyn Rule>> {
        vec![
            Arc::new(RedundantVoidReturn::new()),
            Arc::new(NimbleOperator::new()),
        ]
    }

    /// Every built-in rule, in registration order
    pub fn all_rules() -> Vec<Arc<dyn Rule>> {
        Self::idiomatic_rules()
    }
}
