//! Violation detection over one tree and one rule

use crate::cst::SyntaxNode;
use crate::position::SourceTree;
use crate::result::ResultExt;
use crate::rule::{Match, Rule, Violation};
use crate::suppression::RuleRegions;

/// Every unsuppressed match of `rule` under `root`, ordered by anchor
///
/// Detection and correction both select their sites through this function.
/// Matcher errors skip the node they were raised for.
pub fn collect_sites(root: &SyntaxNode, rule: &dyn Rule, regions: &RuleRegions) -> Vec<Match> {
    let mut sites: Vec<Match> = root
        .descendants()
        .filter_map(|node| rule.matches(&node).log_and_continue().flatten())
        .filter(|site| !regions.is_suppressed(site.anchor))
        .collect();
    // Pre-order is already ascending by node start; anchors may sit before
    // the node, so sort on them explicitly.
    sites.sort_by_key(|site| site.anchor);
    sites
}

/// Violations of one rule, ascending by position
pub fn detect(tree: &SourceTree, rule: &dyn Rule, regions: &RuleRegions) -> Vec<Violation> {
    let description = rule.description();
    let violations: Vec<Violation> = collect_sites(tree.root(), rule, regions)
        .into_iter()
        .map(|site| Violation {
            rule_id: description.id.to_string(),
            position: tree.position(site.anchor),
            severity: description.severity,
            message: site
                .message
                .unwrap_or_else(|| description.description.to_string()),
        })
        .collect();
    tracing::debug!(rule = description.id, count = violations.len(), "Detection finished");
    violations
}
