//! Applying rule rewrites while keeping unrelated trivia intact
//!
//! Sites come from [`collect_sites`] on a mutable copy of the tree and are
//! applied from the end of the file backwards, so offsets of sites that are
//! still pending never shift. A rewrite is computed right before it is
//! applied, which lets an outer site see edits made inside it.
//!
//! Removing a node takes along the whitespace that trails its last token on
//! the same line. If the next surviving token then starts a new line (or the
//! file ends), [`trivia::drop_dangling_space`] also removes the space that
//! separated the node from the token before it, so
//! `func foo() -> Void\n` becomes `func foo()\n` and not `func foo() \n`.
//!
//! A node that opens a continuation line also takes the line break and
//! indentation before it, so `func foo()\n    -> Void {}` becomes
//! `func foo() {}`.

use crate::cst::{SyntaxKind, SyntaxNode, trivia};
use crate::detector::collect_sites;
use crate::error::KestrelError;
use crate::position::SourceTree;
use crate::result::{Result, ResultExt};
use crate::rule::{Correction, Rewrite, Rule};
use crate::suppression::RuleRegions;

/// New tree plus the corrections that produced it
#[derive(Debug, Clone)]
pub struct CorrectionOutcome {
    pub tree: SourceTree,
    pub corrections: Vec<Correction>,
}

/// Apply every unsuppressed rewrite of `rule` to `tree`
///
/// A failing rewrite, including an attempt to replace the root, is logged
/// and skips its site only; the other sites are still corrected.
pub fn correct(tree: &SourceTree, rule: &dyn Rule, regions: &RuleRegions) -> Result<CorrectionOutcome> {
    let root = tree.root().clone_for_update();
    let mut sites = collect_sites(&root, rule, regions);

    // Later sites first; among sites starting at the same offset, the deeper
    // one first.
    sites.sort_by_cached_key(|site| {
        let start = u32::from(site.node.text_range().start());
        let depth = site.node.ancestors().count();
        std::cmp::Reverse((start, depth))
    });

    let mut corrections = Vec::new();
    for site in sites {
        if !is_attached(&site.node, &root) {
            tracing::debug!(rule = rule.id(), "Skipping site removed by an earlier rewrite");
            continue;
        }
        let Some(rewrite) = rule.rewrite(&site).log_and_continue().flatten() else {
            continue;
        };
        if apply(rewrite).log_and_continue().is_some() {
            corrections.push(Correction {
                rule_id: rule.id().to_string(),
                position: tree.position(site.anchor),
            });
        }
    }
    corrections.reverse();

    tracing::debug!(rule = rule.id(), count = corrections.len(), "Correction finished");
    let root = SyntaxNode::new_root(root.green().into_owned());
    Ok(CorrectionOutcome {
        tree: SourceTree::from_root(root),
        corrections,
    })
}

fn is_attached(node: &SyntaxNode, root: &SyntaxNode) -> bool {
    node.ancestors().any(|ancestor| &ancestor == root)
}

/// Perform one rewrite on a mutable tree
pub fn apply(rewrite: Rewrite) -> Result<()> {
    match rewrite {
        Rewrite::Remove(node) => remove_with_trivia(&node),
        Rewrite::Replace { node, green } => {
            let parent = node
                .parent()
                .ok_or_else(|| KestrelError::internal_error("cannot replace the root node"))?;
            let index = node.index();
            parent.splice_children(index..index + 1, vec![SyntaxNode::new_root_mut(green).into()]);
            Ok(())
        }
    }
}

fn remove_with_trivia(node: &SyntaxNode) -> Result<()> {
    if node.parent().is_none() {
        return Err(KestrelError::internal_error("cannot remove the root node"));
    }
    let (Some(first), Some(last)) = (node.first_token(), node.last_token()) else {
        node.detach();
        return Ok(());
    };

    let trailing_space: Vec<_> = trivia::trailing_trivia(&last)
        .into_iter()
        .take_while(|t| t.kind() == SyntaxKind::Whitespace)
        .collect();
    let previous = trivia::previous_significant_token(&first);
    let next_starts_line =
        trivia::next_significant_token(&last).is_none_or(|next| trivia::starts_line(&next));

    // A node alone at the start of a continuation line folds back onto the
    // previous line, unless a comment sits in between
    let blank = |kind: SyntaxKind| matches!(kind, SyntaxKind::Whitespace | SyntaxKind::Newline);
    let continuation = previous
        .as_ref()
        .filter(|_| trivia::starts_line(&first))
        .map(|previous| {
            let mut band = trivia::trailing_trivia(previous);
            band.extend(trivia::leading_trivia(&first));
            band
        })
        .filter(|band| band.iter().all(|t| blank(t.kind())));

    node.detach();
    if let Some(band) = continuation {
        for token in band {
            token.detach();
        }
        // Otherwise the trailing space now separates the previous token from
        // the next one on the same line
        if next_starts_line {
            for token in trailing_space {
                token.detach();
            }
        }
        return Ok(());
    }

    for token in trailing_space {
        token.detach();
    }
    if next_starts_line && let Some(previous) = previous {
        trivia::drop_dangling_space(&previous);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::green_node;
    use crate::rule::{Match, RuleDescription, RuleKind, Severity};

    /// Removes return clauses and replaces `nil` with `none`
    #[derive(Debug)]
    struct Edits(RuleDescription);

    fn rule() -> Edits {
        Edits(RuleDescription {
            id: "edits",
            name: "Edits",
            description: "edit",
            kind: RuleKind::Style,
            severity: Severity::Warning,
            opt_in: false,
            non_triggering: &[],
            triggering: &[],
            corrections: &[("", "")],
        })
    }

    impl Rule for Edits {
        fn description(&self) -> &RuleDescription {
            &self.0
        }

        fn matches(&self, node: &SyntaxNode) -> Result<Option<Match>> {
            let anchor = u32::from(node.text_range().start()) as usize;
            match node.kind() {
                SyntaxKind::ReturnClause => Ok(Some(Match::new(node.clone(), anchor))),
                SyntaxKind::LiteralExpr if node.text() == "nil" => {
                    Ok(Some(Match::new(node.clone(), anchor)))
                }
                _ => Ok(None),
            }
        }

        fn rewrite(&self, site: &Match) -> Result<Option<Rewrite>> {
            Ok(Some(match site.node.kind() {
                SyntaxKind::ReturnClause => Rewrite::Remove(site.node.clone()),
                _ => Rewrite::Replace {
                    node: site.node.clone(),
                    green: green_node(SyntaxKind::IdentExpr, &[(SyntaxKind::Ident, "none")]),
                },
            }))
        }
    }

    fn run(source: &str) -> (String, usize) {
        let outcome = correct(&SourceTree::parse(source), &rule(), &RuleRegions::none())
            .expect("correction");
        (outcome.tree.text(), outcome.corrections.len())
    }

    #[test]
    fn removal_before_body_keeps_one_space() {
        assert_eq!(run("func foo() -> Void {}\n"), ("func foo() {}\n".to_string(), 1));
    }

    #[test]
    fn removal_at_line_end_drops_dangling_space() {
        assert_eq!(
            run("protocol P {\n  func foo() -> Void\n}\n").0,
            "protocol P {\n  func foo()\n}\n"
        );
        assert_eq!(run("func foo() -> Void").0, "func foo()");
    }

    #[test]
    fn removal_keeps_comments() {
        assert_eq!(
            run("func foo() -> Void // note\n").0,
            "func foo() // note\n"
        );
        assert_eq!(
            run("func foo() /* a */ -> Void {}").0,
            "func foo() /* a */ {}"
        );
    }

    #[test]
    fn continuation_line_clause_folds_back() {
        assert_eq!(run("func foo()\n    -> Void {}\n").0, "func foo() {}\n");
        assert_eq!(
            run("protocol P {\n  func foo()\n    -> Void\n}\n").0,
            "protocol P {\n  func foo()\n}\n"
        );
        assert_eq!(run("func foo()\n  -> Void").0, "func foo()");
    }

    #[test]
    fn continuation_after_comment_stays_on_its_line() {
        assert_eq!(
            run("func foo() // c\n    -> Void {}\n").0,
            "func foo() // c\n    {}\n"
        );
    }

    #[test]
    fn replacement_keeps_surrounding_trivia() {
        assert_eq!(run("x = nil  // c\ny = nil\n").0, "x = none  // c\ny = none\n");
    }

    #[test]
    fn corrections_are_ascending() {
        let outcome = correct(
            &SourceTree::parse("a = nil\nb = nil\n"),
            &rule(),
            &RuleRegions::none(),
        )
        .expect("correction");
        let lines: Vec<_> = outcome.corrections.iter().map(|c| c.position.line).collect();
        assert_eq!(lines, vec![1, 2]);
    }

    /// Removes `a` and `c`, fails on `bad` and tries to remove the root
    #[derive(Debug)]
    struct Failing(RuleDescription);

    impl Rule for Failing {
        fn description(&self) -> &RuleDescription {
            &self.0
        }

        fn matches(&self, node: &SyntaxNode) -> Result<Option<Match>> {
            let anchor = u32::from(node.text_range().start()) as usize;
            match node.kind() {
                SyntaxKind::SourceFile => Ok(Some(Match::new(node.clone(), anchor))),
                SyntaxKind::IdentExpr if ["a", "bad", "c"].iter().any(|t| node.text() == *t) => {
                    Ok(Some(Match::new(node.clone(), anchor)))
                }
                _ => Ok(None),
            }
        }

        fn rewrite(&self, site: &Match) -> Result<Option<Rewrite>> {
            if site.node.text() == "bad" {
                return Err(KestrelError::internal_error("cannot rewrite `bad`"));
            }
            Ok(Some(Rewrite::Remove(site.node.clone())))
        }
    }

    #[test]
    fn failing_sites_are_skipped() {
        let failing = Failing(rule().0);
        let outcome = correct(
            &SourceTree::parse("f(a)\ng(bad)\nh(c)\n"),
            &failing,
            &RuleRegions::none(),
        )
        .expect("correction");
        assert_eq!(outcome.tree.text(), "f()\ng(bad)\nh()\n");
        let lines: Vec<_> = outcome.corrections.iter().map(|c| c.position.line).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn root_removal_is_fatal() {
        let root = SourceTree::parse("x").root().clone_for_update();
        let err = apply(Rewrite::Remove(root)).expect_err("root cannot be removed");
        assert!(!err.is_recoverable());
    }
}
