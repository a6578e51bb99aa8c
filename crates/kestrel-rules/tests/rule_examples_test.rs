//! Verifies every built-in rule against its own examples
//!
//! Triggering examples carry `↓` at each expected anchor; correction inputs
//! carry the same markers, and the applied corrections must land on them.

use kestrel_core::corrector::correct;
use kestrel_core::detector::detect;
use kestrel_core::{Rule, RuleRegions, SourceTree, strip_markers};
use kestrel_rules::BuiltinRules;

fn anchors(rule: &dyn Rule, source: &str) -> Vec<usize> {
    detect(&SourceTree::parse(source), rule, &RuleRegions::none())
        .into_iter()
        .map(|v| v.position.offset)
        .collect()
}

#[test]
fn test_non_triggering_examples() {
    for rule in BuiltinRules::all_rules() {
        for example in rule.description().non_triggering {
            assert!(
                anchors(rule.as_ref(), example).is_empty(),
                "{} fired on non-triggering example:\n{example}",
                rule.id()
            );
        }
    }
}

#[test]
fn test_triggering_examples() {
    for rule in BuiltinRules::all_rules() {
        for example in rule.description().triggering {
            let (source, markers) = strip_markers(example);
            assert!(!markers.is_empty(), "{}: example without marker", rule.id());
            assert_eq!(
                anchors(rule.as_ref(), &source),
                markers,
                "{} anchors differ on:\n{example}",
                rule.id()
            );
        }
    }
}

#[test]
fn test_correction_examples() {
    for rule in BuiltinRules::all_rules() {
        assert!(rule.is_correctable());
        for (before, after) in rule.description().corrections {
            let (source, markers) = strip_markers(before);
            let outcome = correct(&SourceTree::parse(&source), rule.as_ref(), &RuleRegions::none())
                .unwrap();

            assert_eq!(outcome.tree.text(), *after, "{} corrected:\n{source}", rule.id());
            let offsets: Vec<_> = outcome.corrections.iter().map(|c| c.position.offset).collect();
            assert_eq!(offsets, markers, "{} correction positions on:\n{source}", rule.id());
        }
    }
}

#[test]
fn test_triggering_examples_are_correctable() {
    for rule in BuiltinRules::all_rules() {
        for example in rule.description().triggering {
            let (source, markers) = strip_markers(example);
            let outcome = correct(&SourceTree::parse(&source), rule.as_ref(), &RuleRegions::none())
                .unwrap();
            assert_eq!(outcome.corrections.len(), markers.len(), "{}:\n{source}", rule.id());
        }
    }
}
