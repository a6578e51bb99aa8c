//! Properties every built-in rule must hold on its examples
//!
//! - detection and correction agree on the sites
//! - correcting twice changes nothing the second time
//! - a disable/enable pair silences both detection and correction
//! - correction leaves text outside the rewritten span alone

use kestrel_core::corrector::correct;
use kestrel_core::detector::{collect_sites, detect};
use kestrel_core::position::offset_of;
use kestrel_core::{DisabledRegions, Rule, RuleRegions, SourceTree, strip_markers};
use kestrel_rules::BuiltinRules;

/// Clean sources of every triggering and correction example
fn triggering_sources(rule: &dyn Rule) -> Vec<String> {
    let description = rule.description();
    description
        .triggering
        .iter()
        .chain(description.corrections.iter().map(|(before, _)| before))
        .map(|example| strip_markers(example).0)
        .collect()
}

#[test]
fn test_detection_and_correction_agree() {
    for rule in BuiltinRules::all_rules() {
        for source in triggering_sources(rule.as_ref()) {
            let tree = SourceTree::parse(&source);
            let detected: Vec<_> = detect(&tree, rule.as_ref(), &RuleRegions::none())
                .into_iter()
                .map(|v| v.position)
                .collect();
            let corrected: Vec<_> = correct(&tree, rule.as_ref(), &RuleRegions::none())
                .unwrap()
                .corrections
                .into_iter()
                .map(|c| c.position)
                .collect();
            assert_eq!(detected, corrected, "{} on:\n{source}", rule.id());
        }
    }
}

#[test]
fn test_correction_is_idempotent() {
    for rule in BuiltinRules::all_rules() {
        for source in triggering_sources(rule.as_ref()) {
            let once = correct(&SourceTree::parse(&source), rule.as_ref(), &RuleRegions::none())
                .unwrap();
            let twice = correct(&once.tree, rule.as_ref(), &RuleRegions::none()).unwrap();
            assert!(twice.corrections.is_empty(), "{} on:\n{source}", rule.id());
            assert_eq!(twice.tree.text(), once.tree.text());

            // A fresh parse of the output must not fire either
            let reparsed = SourceTree::parse(&once.tree.text());
            assert!(
                detect(&reparsed, rule.as_ref(), &RuleRegions::none()).is_empty(),
                "{} fires again on:\n{}",
                rule.id(),
                once.tree.text()
            );
        }
    }
}

#[test]
fn test_disabled_region_silences_rule() {
    for rule in BuiltinRules::all_rules() {
        for source in triggering_sources(rule.as_ref()) {
            let id = rule.id();
            let wrapped = format!("// kestrel:disable {id}\n{source}// kestrel:enable {id}\n");
            let tree = SourceTree::parse(&wrapped);
            let regions = DisabledRegions::resolve(&tree).for_rule(id);

            assert!(detect(&tree, rule.as_ref(), &regions).is_empty(), "{id} on:\n{wrapped}");
            let outcome = correct(&tree, rule.as_ref(), &regions).unwrap();
            assert!(outcome.corrections.is_empty());
            assert_eq!(outcome.tree.text(), wrapped);
        }
    }
}

#[test]
fn test_correction_preserves_surrounding_text() {
    for rule in BuiltinRules::all_rules() {
        for (before, _) in rule.description().corrections {
            let (source, _) = strip_markers(before);
            let tree = SourceTree::parse(&source);
            let sites = collect_sites(tree.root(), rule.as_ref(), &RuleRegions::none());
            let [site] = sites.as_slice() else {
                continue;
            };

            // The rewritten span plus the horizontal space around it
            let bytes = source.as_bytes();
            let is_space = |b: u8| b == b' ' || b == b'\t';
            let mut start = offset_of(site.node.text_range().start());
            let mut end = offset_of(site.node.text_range().end());
            while start > 0 && is_space(bytes[start - 1]) {
                start -= 1;
            }
            while end < bytes.len() && is_space(bytes[end]) {
                end += 1;
            }

            let output = correct(&tree, rule.as_ref(), &RuleRegions::none())
                .unwrap()
                .tree
                .text();
            assert!(output.starts_with(&source[..start]), "{}: prefix changed in\n{output}", rule.id());
            assert!(output.ends_with(&source[end..]), "{}: suffix changed in\n{output}", rule.id());
        }
    }
}
