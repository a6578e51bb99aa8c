//! Running a set of configured rules over sources
//!
//! Detection runs the rules of one file in parallel; each worker rebuilds a
//! cursor over the shared green tree. Correction applies rules one after
//! another, each on the tree the previous rule produced, and re-resolves
//! disabled regions in between because earlier rewrites move offsets.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::Configuration;
use crate::corrector;
use crate::detector::detect;
use crate::error::KestrelError;
use crate::position::SourceTree;
use crate::registry::RuleRegistry;
use crate::result::Result;
use crate::rule::{Correction, Rule, Severity, Violation};
use crate::suppression::{DirectiveWarning, DisabledRegions};

/// A rule selected by configuration, with its resolved severity
#[derive(Debug, Clone)]
pub struct ActiveRule {
    pub rule: Arc<dyn Rule>,
    pub severity: Severity,
}

impl ActiveRule {
    pub fn new(rule: Arc<dyn Rule>, severity: Severity) -> Self {
        Self { rule, severity }
    }
}

impl From<Arc<dyn Rule>> for ActiveRule {
    fn from(rule: Arc<dyn Rule>) -> Self {
        let severity = rule.description().severity;
        Self::new(rule, severity)
    }
}

/// Result of linting one tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintReport {
    /// Ordered by position, then by rule order
    pub violations: Vec<Violation>,
    pub directive_warnings: Vec<DirectiveWarning>,
}

impl LintReport {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == Severity::Error)
    }
}

/// Result of correcting one tree
#[derive(Debug, Clone)]
pub struct CorrectionReport {
    pub tree: SourceTree,
    /// Grouped by rule; positions refer to the tree each rule was applied to
    pub corrections: Vec<Correction>,
    pub directive_warnings: Vec<DirectiveWarning>,
}

/// Lint result of one file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub report: LintReport,
}

/// Ordered set of active rules
#[derive(Debug, Clone, Default)]
pub struct Linter {
    rules: Vec<ActiveRule>,
}

impl Linter {
    pub fn new(rules: Vec<ActiveRule>) -> Self {
        Self { rules }
    }

    pub fn from_configuration(config: &Configuration, registry: &RuleRegistry) -> Result<Self> {
        Ok(Self::new(config.active_rules(registry)?))
    }

    pub fn rules(&self) -> &[ActiveRule] {
        &self.rules
    }

    pub fn lint(&self, tree: &SourceTree) -> LintReport {
        let regions = DisabledRegions::resolve(tree);
        let shared = tree.share();

        let mut found: Vec<(usize, Violation)> = self
            .rules
            .par_iter()
            .enumerate()
            .flat_map_iter(|(index, active)| {
                let tree = shared.tree();
                let rule_regions = regions.for_rule(active.rule.id());
                detect(&tree, active.rule.as_ref(), &rule_regions)
                    .into_iter()
                    .map(move |mut violation| {
                        violation.severity = active.severity;
                        (index, violation)
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        found.sort_by_key(|(index, violation)| (violation.position.offset, *index));

        LintReport {
            violations: found.into_iter().map(|(_, violation)| violation).collect(),
            directive_warnings: regions.warnings().to_vec(),
        }
    }

    /// Apply every correctable rule in order
    ///
    /// A site whose rewrite fails is skipped; every other site and rule
    /// still applies.
    pub fn correct(&self, tree: &SourceTree) -> Result<CorrectionReport> {
        let directive_warnings = DisabledRegions::resolve(tree).warnings().to_vec();
        let mut current = tree.clone();
        let mut corrections = Vec::new();

        for active in self.rules.iter().filter(|a| a.rule.is_correctable()) {
            let regions = DisabledRegions::resolve(&current).for_rule(active.rule.id());
            let outcome = corrector::correct(&current, active.rule.as_ref(), &regions)?;
            corrections.extend(outcome.corrections);
            current = outcome.tree;
        }

        tracing::debug!(count = corrections.len(), "Corrections applied");
        Ok(CorrectionReport {
            tree: current,
            corrections,
            directive_warnings,
        })
    }

    /// Lint in-memory sources in parallel, keeping input order
    pub fn lint_sources(&self, sources: &[(PathBuf, String)]) -> Vec<FileReport> {
        let reports: Vec<FileReport> = sources
            .par_iter()
            .map(|(path, text)| FileReport {
                path: path.clone(),
                report: self.lint(&SourceTree::parse(text)),
            })
            .collect();
        tracing::info!(files = reports.len(), "Linted sources");
        reports
    }

    /// Read and lint files in parallel; unreadable files yield an error
    pub fn lint_files(&self, paths: &[PathBuf]) -> Vec<Result<FileReport>> {
        paths
            .par_iter()
            .map(|path| {
                let text = read_source(path)?;
                Ok(FileReport {
                    path: path.clone(),
                    report: self.lint(&SourceTree::parse(&text)),
                })
            })
            .collect()
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| KestrelError::io_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{SyntaxKind, SyntaxNode};
    use crate::rule::{Match, Rewrite, RuleDescription, RuleKind};

    /// Flags identifiers spelled `name`; removes them when correcting
    #[derive(Debug)]
    struct Spelled {
        description: RuleDescription,
        name: &'static str,
    }

    fn spelled(id: &'static str, name: &'static str, severity: Severity) -> Arc<dyn Rule> {
        Arc::new(Spelled {
            description: RuleDescription {
                id,
                name: id,
                description: "spelled",
                kind: RuleKind::Lint,
                severity,
                opt_in: false,
                non_triggering: &[],
                triggering: &[],
                corrections: &[("", "")],
            },
            name,
        })
    }

    impl Rule for Spelled {
        fn description(&self) -> &RuleDescription {
            &self.description
        }

        fn matches(&self, node: &SyntaxNode) -> Result<Option<Match>> {
            if node.kind() == SyntaxKind::IdentExpr && node.text() == self.name {
                let start = u32::from(node.text_range().start()) as usize;
                return Ok(Some(Match::new(node.clone(), start)));
            }
            Ok(None)
        }

        fn rewrite(&self, site: &Match) -> Result<Option<Rewrite>> {
            Ok(Some(Rewrite::Remove(site.node.clone())))
        }
    }

    /// Tries to remove the whole file
    #[derive(Debug)]
    struct RemoveRoot(RuleDescription);

    impl Rule for RemoveRoot {
        fn description(&self) -> &RuleDescription {
            &self.0
        }

        fn matches(&self, node: &SyntaxNode) -> Result<Option<Match>> {
            Ok((node.kind() == SyntaxKind::SourceFile).then(|| Match::new(node.clone(), 0)))
        }

        fn rewrite(&self, site: &Match) -> Result<Option<Rewrite>> {
            Ok(Some(Rewrite::Remove(site.node.clone())))
        }
    }

    fn linter() -> Linter {
        Linter::new(vec![
            spelled("second", "b", Severity::Warning).into(),
            ActiveRule::new(spelled("first", "a", Severity::Warning), Severity::Error),
        ])
    }

    #[test]
    fn violations_sorted_by_position_then_rule() {
        let report = linter().lint(&SourceTree::parse("f(a, b)\ng(b, a)\n"));
        let found: Vec<_> = report
            .violations
            .iter()
            .map(|v| (v.position.line, v.rule_id.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![(1, "first"), (1, "second"), (2, "second"), (2, "first")]
        );
        assert_eq!(report.violations[0].severity, Severity::Error);
        assert!(report.has_errors());
    }

    #[test]
    fn directive_warnings_are_reported() {
        let report = linter().lint(&SourceTree::parse("// kestrel:enable first\na\n"));
        assert_eq!(report.directive_warnings.len(), 1);
        assert_eq!(report.violations.len(), 1);
    }

    #[test]
    fn correction_chains_rules() {
        let report = linter()
            .correct(&SourceTree::parse("f(a)\ng(b)\n"))
            .expect("correction");
        assert_eq!(report.tree.text(), "f()\ng()\n");
        assert_eq!(report.corrections.len(), 2);
        assert_eq!(report.corrections[0].rule_id, "second");
    }

    #[test]
    fn failing_rule_keeps_other_corrections() {
        let remove_root: Arc<dyn Rule> = Arc::new(RemoveRoot(RuleDescription {
            id: "remove_root",
            name: "Remove Root",
            description: "remove everything",
            kind: RuleKind::Lint,
            severity: Severity::Warning,
            opt_in: false,
            non_triggering: &[],
            triggering: &[],
            corrections: &[("", "")],
        }));
        let linter = Linter::new(vec![
            spelled("first", "a", Severity::Warning).into(),
            remove_root.into(),
        ]);

        let report = linter
            .correct(&SourceTree::parse("f(a)\n"))
            .expect("failing sites do not abort the run");
        assert_eq!(report.tree.text(), "f()\n");
        assert_eq!(report.corrections.len(), 1);
        assert_eq!(report.corrections[0].rule_id, "first");
    }

    #[test]
    fn lint_sources_keeps_input_order() {
        let sources = vec![
            (PathBuf::from("One.swift"), "a\n".to_string()),
            (PathBuf::from("Two.swift"), "c\n".to_string()),
        ];
        let reports = linter().lint_sources(&sources);
        assert_eq!(reports[0].path, PathBuf::from("One.swift"));
        assert_eq!(reports[0].report.violations.len(), 1);
        assert!(reports[1].report.violations.is_empty());
    }

    #[test]
    fn unreadable_files_are_io_errors() {
        let results = linter().lint_files(&[PathBuf::from("/no/such/File.swift")]);
        let err = results.into_iter().next().expect("one result").unwrap_err();
        assert!(matches!(err, KestrelError::IoError { .. }));
        assert!(err.is_recoverable());
    }
}
