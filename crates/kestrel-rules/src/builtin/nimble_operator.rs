//! Nimble matcher functions that have an operator equivalent
//!
//! `expect(x).to(equal(y))` reads better as `expect(x) == y`. The rewrite
//! keeps the `expect(...)` call as the left operand and joins it to the
//! predicate's argument (or a synthesized literal for `beTrue()`,
//! `beFalse()` and `beNil()`) with single spaces.

use kestrel_core::cst::ast::{AstNode, CallExpr, Expr};
use kestrel_core::cst::{GreenChild, SyntaxKind, SyntaxNode, compose};
use kestrel_core::position::offset_of;
use kestrel_core::{KestrelError, Match, Result, Rewrite, Rule, RuleDescription, RuleKind, Severity};

/// Rule ID for Nimble operator equivalents
pub const NIMBLE_OPERATOR: &str = "nimble_operator";

static DESCRIPTION: RuleDescription = RuleDescription {
    id: NIMBLE_OPERATOR,
    name: "Nimble Operator",
    description: "Prefer Nimble operator overloads over free matcher functions",
    kind: RuleKind::Idiomatic,
    severity: Severity::Warning,
    opt_in: true,
    non_triggering: &[
        "expect(seagull.squawk) != \"Hi!\"\n",
        "expect(\"Hi!\") == \"Hi!\"\n",
        "expect(10) > 2\n",
        "expect(10) >= 10\n",
        "expect(10) < 11\n",
        "expect(10) <= 10\n",
        "expect(x) === x\n",
        "expect(10) == 10\n",
        "expect(success) == true\n",
        "expect(value) == nil\n",
        "expect(value) != nil\n",
        "expect(object.asyncFunction()).toEventually(equal(1))\n",
        "expect(actual).to(haveCount(expected))\n",
        "foo.method {\n    expect(value).to(equal(expectedValue), description: \"Failed\")\n    return Bar(value: ())\n}\n",
        "expect(x).to(beGreaterThan(8), description: \"d\")\n",
        "expect(10).toNot(beGreaterThan(8))\n",
        "expect(10).notTo(beLessThanOrEqualTo(8))\n",
        "expect { try compute() }.to(equal(1))\n",
        "expect(x).to(equal(1)) {\n    print(\"done\")\n}\n",
        "expect(a, b).to(equal(1))\n",
        "expect(x).to(equal(1, 2))\n",
        "expect(x).to(beNil(1))\n",
        "expect(x).to(equal(to: 1))\n",
        "expect(x).to(equal(1)).foo\n",
        "expect(x).to(equal(1))()\n",
        "expect(x).to(beNil())!\n",
        "let failed = !expect(x).to(beTrue())\n",
    ],
    triggering: &[
        "↓expect(seagull.squawk).toNot(equal(\"Hi\"))\n",
        "↓expect(12).toNot(equal(10))\n",
        "↓expect(10).to(equal(10))\n",
        "↓expect(10).to(beGreaterThan(8))\n",
        "↓expect(10).to(beGreaterThanOrEqualTo(10))\n",
        "↓expect(10).to(beLessThan(11))\n",
        "↓expect(10).to(beLessThanOrEqualTo(10))\n",
        "↓expect(x).to(beIdenticalTo(x))\n",
        "↓expect(x).toNot(beIdenticalTo(y))\n",
        "↓expect(success).to(beTrue())\n",
        "↓expect(success).to(beFalse())\n",
        "↓expect(value).to(beNil())\n",
        "↓expect(value).toNot(beNil())\n",
        "↓expect(value).notTo(beNil())\n",
        "expect(10) > 2\n↓expect(10).to(beGreaterThan(2))\n",
        "func testSum() {\n    ↓expect(sum(1, 2)).to(equal(3))\n}\n",
    ],
    corrections: &[
        (
            "↓expect(seagull.squawk).toNot(equal(\"Hi\"))\n",
            "expect(seagull.squawk) != \"Hi\"\n",
        ),
        ("↓expect(\"Hi!\").to(equal(\"Hi!\"))\n", "expect(\"Hi!\") == \"Hi!\"\n"),
        ("↓expect(12).toNot(equal(10))\n", "expect(12) != 10\n"),
        ("↓expect(value1).to(equal(value2))\n", "expect(value1) == value2\n"),
        ("↓expect(10).to(beGreaterThan(8))\n", "expect(10) > 8\n"),
        ("↓expect(10).to(beGreaterThanOrEqualTo(10))\n", "expect(10) >= 10\n"),
        ("↓expect(10).to(beLessThan(11))\n", "expect(10) < 11\n"),
        ("↓expect(10).to(beLessThanOrEqualTo(10))\n", "expect(10) <= 10\n"),
        ("↓expect(x).to(beIdenticalTo(x))\n", "expect(x) === x\n"),
        ("↓expect(x).notTo(beIdenticalTo(y))\n", "expect(x) !== y\n"),
        ("↓expect(success).to(beTrue())\n", "expect(success) == true\n"),
        ("↓expect(success).to(beFalse())\n", "expect(success) == false\n"),
        ("↓expect(success).toNot(beFalse())\n", "expect(success) != false\n"),
        ("↓expect(value).to(beNil())\n", "expect(value) == nil\n"),
        ("↓expect(value).notTo(beNil())\n", "expect(value) != nil\n"),
        ("↓expect(10).to(beGreaterThan(8)) // sanity\n", "expect(10) > 8 // sanity\n"),
        ("↓expect(x).to(equal(a ?? b))\n", "expect(x) == (a ?? b)\n"),
        ("↓expect(x).to(equal(y as Int))\n", "expect(x) == (y as Int)\n"),
        ("↓expect(x).to(equal(try foo()))\n", "expect(x) == (try foo())\n"),
        ("↓expect(x).toNot(equal(await load()))\n", "expect(x) != (await load())\n"),
        ("try ↓expect(x).to(equal(1))\n", "try expect(x) == 1\n"),
        (
            "func testSum() {\n    ↓expect(sum(1, 2)).to(equal(3))\n}\n",
            "func testSum() {\n    expect(sum(1, 2)) == 3\n}\n",
        ),
    ],
};

/// Right operand of the rewritten comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    /// The predicate's single argument
    Argument,
    /// A literal the nullary predicate stands for
    Literal(SyntaxKind, &'static str),
}

#[derive(Debug)]
struct Predicate {
    name: &'static str,
    to: &'static str,
    to_not: Option<&'static str>,
    operand: Operand,
}

impl Predicate {
    fn arity(&self) -> usize {
        match self.operand {
            Operand::Argument => 1,
            Operand::Literal(..) => 0,
        }
    }
}

const PREDICATES: &[Predicate] = &[
    Predicate {
        name: "equal",
        to: "==",
        to_not: Some("!="),
        operand: Operand::Argument,
    },
    Predicate {
        name: "beIdenticalTo",
        to: "===",
        to_not: Some("!=="),
        operand: Operand::Argument,
    },
    Predicate {
        name: "beGreaterThan",
        to: ">",
        to_not: None,
        operand: Operand::Argument,
    },
    Predicate {
        name: "beGreaterThanOrEqualTo",
        to: ">=",
        to_not: None,
        operand: Operand::Argument,
    },
    Predicate {
        name: "beLessThan",
        to: "<",
        to_not: None,
        operand: Operand::Argument,
    },
    Predicate {
        name: "beLessThanOrEqualTo",
        to: "<=",
        to_not: None,
        operand: Operand::Argument,
    },
    Predicate {
        name: "beTrue",
        to: "==",
        to_not: Some("!="),
        operand: Operand::Literal(SyntaxKind::TrueKw, "true"),
    },
    Predicate {
        name: "beFalse",
        to: "==",
        to_not: Some("!="),
        operand: Operand::Literal(SyntaxKind::FalseKw, "false"),
    },
    Predicate {
        name: "beNil",
        to: "==",
        to_not: Some("!="),
        operand: Operand::Literal(SyntaxKind::NilKw, "nil"),
    },
];

fn predicate(name: &str) -> Option<&'static Predicate> {
    PREDICATES.iter().find(|p| p.name == name)
}

/// Negation of a `to`/`toNot`/`notTo` modifier; `None` for anything else
fn is_negated(modifier: &str) -> Option<bool> {
    match modifier {
        "to" => Some(false),
        "toNot" | "notTo" => Some(true),
        _ => None,
    }
}

/// A flattenable `expect(base).modifier(predicate(args))`
#[derive(Debug)]
struct Assertion {
    expectation: SyntaxNode,
    predicate: &'static Predicate,
    operator: &'static str,
    argument: Option<SyntaxNode>,
}

impl Assertion {
    fn parse(call: &CallExpr) -> Option<Self> {
        if call.is_subscript()
            || call.trailing_closure().is_some()
            || is_bound_tightly(call.syntax())
        {
            return None;
        }
        let Expr::Member(member) = call.callee()? else {
            return None;
        };
        let negated = is_negated(&member.name()?)?;

        let Expr::Call(expectation) = member.base()? else {
            return None;
        };
        if expectation.callee_name()?.as_str() != "expect"
            || expectation.trailing_closure().is_some()
            || expectation.arguments().len() != 1
        {
            return None;
        }

        let [matcher]: [_; 1] = call.arguments().try_into().ok()?;
        if matcher.label().is_some() {
            return None;
        }
        let Expr::Call(predicate_call) = matcher.expr()? else {
            return None;
        };
        if predicate_call.trailing_closure().is_some() {
            return None;
        }
        let predicate = predicate(&predicate_call.callee_name()?)?;
        let operator = if negated {
            predicate.to_not?
        } else {
            predicate.to
        };

        let arguments = predicate_call.arguments();
        if arguments.len() != predicate.arity() || arguments.iter().any(|a| a.label().is_some()) {
            return None;
        }
        let argument = match arguments.first() {
            Some(argument) => Some(argument.expr()?.syntax().clone()),
            None => None,
        };

        Some(Self {
            expectation: expectation.syntax().clone(),
            predicate,
            operator,
            argument,
        })
    }

    fn right_operand(&self) -> Option<GreenChild> {
        match (self.predicate.operand, &self.argument) {
            (Operand::Literal(kind, text), _) => Some(GreenChild::Node(compose(
                SyntaxKind::LiteralExpr,
                [GreenChild::Token(kind, text.to_string())],
            ))),
            (Operand::Argument, Some(argument)) if needs_parentheses(argument) => {
                Some(GreenChild::Node(compose(
                    SyntaxKind::TupleExpr,
                    [
                        GreenChild::Token(SyntaxKind::LParen, "(".to_string()),
                        GreenChild::from(argument),
                        GreenChild::Token(SyntaxKind::RParen, ")".to_string()),
                    ],
                )))
            }
            (Operand::Argument, Some(argument)) => Some(GreenChild::from(argument)),
            (Operand::Argument, None) => None,
        }
    }
}

/// Operands that would bind differently next to a comparison operator
///
/// `try` and `await` are not allowed right of a non-assignment operator.
fn needs_parentheses(node: &SyntaxNode) -> bool {
    matches!(
        node.kind(),
        SyntaxKind::BinaryExpr | SyntaxKind::TernaryExpr | SyntaxKind::TryExpr
    )
}

/// Whether the assertion is an operand of a tighter-binding expression
///
/// Member access, postfix operators, calls and other operators applied to
/// the assertion would attach to the right operand once it is flattened.
fn is_bound_tightly(call: &SyntaxNode) -> bool {
    call.parent().is_some_and(|parent| {
        matches!(
            parent.kind(),
            SyntaxKind::MemberExpr
                | SyntaxKind::PostfixExpr
                | SyntaxKind::CallExpr
                | SyntaxKind::PrefixExpr
                | SyntaxKind::BinaryExpr
        )
    })
}

/// Flags Nimble matchers that have an operator overload
#[derive(Debug, Default, Clone)]
pub struct NimbleOperator;

impl NimbleOperator {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for NimbleOperator {
    fn description(&self) -> &RuleDescription {
        &DESCRIPTION
    }

    fn matches(&self, node: &SyntaxNode) -> Result<Option<Match>> {
        let Some(call) = CallExpr::cast(node.clone()) else {
            return Ok(None);
        };
        let Some(assertion) = Assertion::parse(&call) else {
            return Ok(None);
        };
        let anchor = offset_of(node.text_range().start());
        Ok(Some(Match::new(node.clone(), anchor).with_message(format!(
            "Prefer the `{}` operator over `{}`",
            assertion.operator, assertion.predicate.name
        ))))
    }

    fn rewrite(&self, site: &Match) -> Result<Option<Rewrite>> {
        let assertion = CallExpr::cast(site.node.clone())
            .as_ref()
            .and_then(Assertion::parse)
            .ok_or_else(|| KestrelError::rule_error(NIMBLE_OPERATOR, "site no longer matches"))?;
        let rhs = assertion
            .right_operand()
            .ok_or_else(|| KestrelError::rule_error(NIMBLE_OPERATOR, "missing predicate argument"))?;

        let mut children = vec![
            GreenChild::from(&assertion.expectation),
            GreenChild::Token(SyntaxKind::Whitespace, " ".to_string()),
        ];
        children.extend(GreenChild::lexed(assertion.operator));
        children.push(GreenChild::Token(SyntaxKind::Whitespace, " ".to_string()));
        children.push(rhs);

        Ok(Some(Rewrite::Replace {
            node: site.node.clone(),
            green: compose(SyntaxKind::BinaryExpr, children),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::corrector::correct;
    use kestrel_core::detector::detect;
    use kestrel_core::{RuleRegions, SourceTree};

    fn corrected(source: &str) -> String {
        correct(&SourceTree::parse(source), &NimbleOperator, &RuleRegions::none())
            .unwrap()
            .tree
            .text()
    }

    #[test]
    fn predicate_table_arity() {
        assert_eq!(predicate("equal").unwrap().arity(), 1);
        assert_eq!(predicate("beNil").unwrap().arity(), 0);
        assert!(predicate("haveCount").is_none());
    }

    #[test]
    fn operators_are_lexed_like_source() {
        let tree = SourceTree::parse(&corrected("expect(10).to(beGreaterThanOrEqualTo(10))\n"));
        let kinds: Vec<_> = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::BinaryExpr)
            .unwrap()
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .map(|t| t.kind())
            .filter(|k| !k.is_trivia())
            .collect();
        assert_eq!(kinds, vec![SyntaxKind::RAngle, SyntaxKind::Equals]);
    }

    #[test]
    fn multi_argument_modifier_is_ignored() {
        let tree = SourceTree::parse("expect(x).to(beGreaterThan(8), description: \"d\")\n");
        assert!(detect(&tree, &NimbleOperator, &RuleRegions::none()).is_empty());
    }

    #[test]
    fn message_names_the_operator() {
        let tree = SourceTree::parse("expect(10).to(beGreaterThan(8))\n");
        let violations = detect(&tree, &NimbleOperator, &RuleRegions::none());
        assert_eq!(violations[0].message, "Prefer the `>` operator over `beGreaterThan`");
        assert_eq!((violations[0].position.line, violations[0].position.column), (1, 1));
    }

    #[test]
    fn assertions_used_as_operands_are_ignored() {
        for source in [
            "expect(x).to(equal(1)).foo\n",
            "expect(x).to(equal(1))()\n",
            "value ?? expect(x).to(beNil())\n",
        ] {
            let tree = SourceTree::parse(source);
            assert!(detect(&tree, &NimbleOperator, &RuleRegions::none()).is_empty(), "{source}");
            assert_eq!(corrected(source), source);
        }
    }

    #[test]
    fn effect_operands_are_parenthesized() {
        assert_eq!(
            corrected("expect(x).to(equal(try foo()))\n"),
            "expect(x) == (try foo())\n"
        );
        assert_eq!(
            corrected("expect(x).to(beGreaterThan(await count()))\n"),
            "expect(x) > (await count())\n"
        );
    }

    #[test]
    fn nested_assertions_are_both_rewritten() {
        assert_eq!(
            corrected("run {\n  expect(a).to(equal(1))\n  expect(b).toNot(beNil())\n}\n"),
            "run {\n  expect(a) == 1\n  expect(b) != nil\n}\n"
        );
    }
}
