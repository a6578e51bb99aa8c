//! Redundant `-> Void` / `-> ()` return clauses
//!
//! A function (or closure) that returns nothing does not need to say so.
//! Only the exact spellings `Void` and `()` count: `Void?`, `()!`,
//! `Swift.Void`, `VoidResponse` and curried `-> Int -> Void` are left alone,
//! and so are function *types* such as `let f: (Int) -> Void`.

use std::sync::Arc;

use kestrel_core::cst::ast::{AstNode, ReturnClause};
use kestrel_core::cst::{SyntaxKind, SyntaxNode, trivia};
use kestrel_core::position::offset_of;
use kestrel_core::{KestrelError, Match, Result, Rewrite, Rule, RuleDescription, RuleKind, Severity};
use serde::Deserialize;

/// Rule ID for redundant void return clauses
pub const REDUNDANT_VOID_RETURN: &str = "redundant_void_return";

static DESCRIPTION: RuleDescription = RuleDescription {
    id: REDUNDANT_VOID_RETURN,
    name: "Redundant Void Return",
    description: "Returning Void in a function declaration is redundant",
    kind: RuleKind::Idiomatic,
    severity: Severity::Warning,
    opt_in: false,
    non_triggering: &[
        "func foo() {}\n",
        "func foo() -> Int {}\n",
        "func foo() -> Int -> Void {}\n",
        "func foo() -> VoidResponse\n",
        "let foo: (Int) -> Void\n",
        "func foo() -> Int -> () {}\n",
        "let foo: (ConfigurationTests) -> () throws -> Void\n",
        "let foo: (ConfigurationTests) ->   () throws -> Void\n",
        "let foo: (ConfigurationTests) ->() throws -> Void\n",
        "func foo() -> ()?\n",
        "func foo() -> ()!\n",
        "func foo() -> Void?\n",
        "func foo() -> Void!\n",
        "func foo() -> Swift.Void {}\n",
        "struct A {\n    subscript(key: String) {\n        print(key)\n    }\n}\n",
        "doSomething { arg in\n    print(arg)\n}\n",
    ],
    triggering: &[
        "func foo()↓ -> Void {}\n",
        "protocol Foo {\n  func foo()↓ -> Void\n}\n",
        "func foo()↓ -> () {}\n",
        "func foo()↓ -> ( ) {}\n",
        "protocol Foo {\n  func foo()↓ -> ()\n}\n",
        "func foo() throws↓ -> Void {}\n",
        "func run<T>(_ value: T)↓ -> Void where T: Equatable {}\n",
        "doSomething { arg↓ -> () in\n    print(arg)\n}\n",
        "doSomething { arg↓ -> Void in\n    print(arg)\n}\n",
    ],
    corrections: &[
        ("func foo()↓ -> Void {}\n", "func foo() {}\n"),
        (
            "protocol Foo {\n  func foo()↓ -> Void\n}\n",
            "protocol Foo {\n  func foo()\n}\n",
        ),
        (
            "protocol Foo {\n  func foo()↓ -> ()\n}\n",
            "protocol Foo {\n  func foo()\n}\n",
        ),
        ("func foo()↓ -> () {}\n", "func foo() {}\n"),
        ("func foo()↓ -> ( ) {}\n", "func foo() {}\n"),
        ("func foo()↓ -> Void // done\n", "func foo() // done\n"),
        (
            "doSomething { arg↓ -> Void in\n    print(arg)\n}\n",
            "doSomething { arg in\n    print(arg)\n}\n",
        ),
    ],
};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Options {
    include_closures: Option<bool>,
}

/// Flags `-> Void` and `-> ()` on function declarations and closures
#[derive(Debug, Clone)]
pub struct RedundantVoidReturn {
    include_closures: bool,
}

impl Default for RedundantVoidReturn {
    fn default() -> Self {
        Self {
            include_closures: true,
        }
    }
}

impl RedundantVoidReturn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave closure signatures alone when `false`
    pub fn with_closures(mut self, include_closures: bool) -> Self {
        self.include_closures = include_closures;
        self
    }
}

impl Rule for RedundantVoidReturn {
    fn description(&self) -> &RuleDescription {
        &DESCRIPTION
    }

    fn matches(&self, node: &SyntaxNode) -> Result<Option<Match>> {
        let Some(clause) = ReturnClause::cast(node.clone()) else {
            return Ok(None);
        };
        let in_closure = match clause.owner_kind() {
            Some(SyntaxKind::FunctionSignature) => false,
            Some(SyntaxKind::ClosureSignature) if self.include_closures => true,
            _ => return Ok(None),
        };
        if !clause.ty().is_some_and(|ty| ty.is_void()) {
            return Ok(None);
        }

        let first = node
            .first_token()
            .ok_or_else(|| KestrelError::rule_error(REDUNDANT_VOID_RETURN, "empty return clause"))?;
        let anchor = trivia::previous_significant_token(&first)
            .map(|previous| offset_of(previous.text_range().end()))
            .unwrap_or_else(|| offset_of(node.text_range().start()));

        let site = Match::new(node.clone(), anchor);
        Ok(Some(if in_closure {
            site.with_message("Returning Void in a closure is redundant")
        } else {
            site
        }))
    }

    fn rewrite(&self, site: &Match) -> Result<Option<Rewrite>> {
        Ok(Some(Rewrite::Remove(site.node.clone())))
    }

    fn configure(&self, options: &serde_json::Value) -> Result<Option<Arc<dyn Rule>>> {
        if options.is_null() {
            return Ok(None);
        }
        let options = Options::deserialize(options)
            .map_err(|e| KestrelError::rule_error(REDUNDANT_VOID_RETURN, e.to_string()))?;
        let include_closures = options.include_closures.unwrap_or(self.include_closures);
        Ok(Some(Arc::new(self.clone().with_closures(include_closures))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::detector::detect;
    use kestrel_core::{RuleRegions, SourceTree};

    fn lines(rule: &RedundantVoidReturn, source: &str) -> Vec<(usize, usize)> {
        detect(&SourceTree::parse(source), rule, &RuleRegions::none())
            .into_iter()
            .map(|v| (v.position.line, v.position.column))
            .collect()
    }

    #[test]
    fn anchor_sits_before_the_arrow() {
        assert_eq!(lines(&RedundantVoidReturn::new(), "func foo() -> Void {}\n"), vec![(1, 11)]);
    }

    #[test]
    fn optional_empty_tuple_is_not_redundant() {
        assert!(lines(&RedundantVoidReturn::new(), "func foo() -> ()?\n").is_empty());
    }

    #[test]
    fn closure_messages_differ() {
        let tree = SourceTree::parse("run { x -> Void in }\nfunc f() -> Void\n");
        let violations = detect(&tree, &RedundantVoidReturn::new(), &RuleRegions::none());
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].message, "Returning Void in a closure is redundant");
        assert_eq!(violations[1].message, DESCRIPTION.description);
    }

    #[test]
    fn closures_can_be_excluded() {
        let rule = RedundantVoidReturn::new()
            .configure(&serde_json::json!({ "include_closures": false }))
            .unwrap()
            .unwrap();
        let tree = SourceTree::parse("run { x -> Void in }\nfunc f() -> Void\n");
        let violations = detect(&tree, rule.as_ref(), &RuleRegions::none());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].position.line, 2);
    }

    #[test]
    fn unknown_options_are_rejected() {
        let err = RedundantVoidReturn::new()
            .configure(&serde_json::json!({ "closures": false }))
            .unwrap_err();
        assert!(matches!(err, KestrelError::RuleError { .. }));
    }

    #[test]
    fn initializers_and_subscripts_are_ignored() {
        let source = "struct S {\n  init() {}\n  subscript(i: Int) -> Void { }\n}\n";
        assert!(lines(&RedundantVoidReturn::new(), source).is_empty());
    }
}
