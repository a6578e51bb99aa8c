//! Disabled regions from inline directives
//!
//! Directives are comments:
//! - `// kestrel:disable rule_a rule_b` - disable until a matching `enable`
//! - `// kestrel:enable rule_a` - close the most recent `disable` for the rule
//! - `// kestrel:disable:next rule_a` - disable on the following line only
//! - `// kestrel:disable:this rule_a` - disable on the directive's own line
//! - `// kestrel:disable:previous rule_a` - disable on the line above
//! - `all` in place of a rule identifier matches every rule
//!
//! Text after ` - ` is an explanation and is ignored. Block comments work
//! the same way. Comments inside inactive `#if` branches are still trivia in
//! the tree, so their directives count.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::position::{Position, SourceTree, offset_of};

/// Wildcard identifier that matches every rule
pub const ALL_RULES: &str = "all";

static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?://+|/\*+)\s*kestrel:(disable|enable)(?::(\w*))?(.*?)(?:\*+/)?\s*$")
        .expect("directive pattern is valid")
});

/// A span where one rule (or every rule) is switched off
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisabledRegion {
    pub rule: String,
    pub start: Position,
    pub end: Position,
}

impl DisabledRegion {
    /// Closed containment on `[start, end]`
    pub fn contains(&self, offset: usize) -> bool {
        self.start.offset <= offset && offset <= self.end.offset
    }

    pub fn applies_to(&self, rule_id: &str) -> bool {
        self.rule == rule_id || self.rule == ALL_RULES
    }
}

/// A directive that could not be turned into a region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveWarning {
    pub position: Position,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Disable,
    Enable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Open,
    Previous,
    This,
    Next,
}

impl Scope {
    fn name(self) -> &'static str {
        match self {
            Scope::Open => "",
            Scope::Previous => "previous",
            Scope::This => "this",
            Scope::Next => "next",
        }
    }
}

#[derive(Debug)]
struct Directive {
    action: Action,
    scope: Scope,
    rules: Vec<String>,
}

/// Parse one comment; `Ok(None)` means it is not a directive at all
fn parse_directive(comment: &str) -> Result<Option<Directive>, String> {
    let Some(caps) = DIRECTIVE_PATTERN.captures(comment) else {
        return Ok(None);
    };

    let action = match &caps[1] {
        "disable" => Action::Disable,
        _ => Action::Enable,
    };

    let scope = match caps.get(2).map(|m| m.as_str()) {
        None => Scope::Open,
        Some("previous") => Scope::Previous,
        Some("this") => Scope::This,
        Some("next") => Scope::Next,
        Some(other) => return Err(format!("unknown directive modifier '{other}'")),
    };
    if action == Action::Enable && scope != Scope::Open {
        return Err("line modifiers only apply to 'disable'".to_string());
    }

    let body = caps.get(3).map(|m| m.as_str()).unwrap_or("");
    if !body.is_empty() && !body.starts_with(char::is_whitespace) {
        return Err(format!("malformed directive '{}'", comment.trim()));
    }
    let body = body.split(" - ").next().unwrap_or("");
    let rules: Vec<String> = body
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();
    if rules.is_empty() {
        return Err("directive names no rules".to_string());
    }

    Ok(Some(Directive {
        action,
        scope,
        rules,
    }))
}

/// Every disabled region of one tree version, plus directive warnings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisabledRegions {
    regions: Vec<DisabledRegion>,
    warnings: Vec<DirectiveWarning>,
}

impl DisabledRegions {
    /// Scan every comment in source order and pair up directives
    pub fn resolve(tree: &SourceTree) -> Self {
        let index = tree.line_index();
        let mut resolved = Self::default();
        let mut open: HashMap<String, Vec<Position>> = HashMap::new();

        let comments = tree
            .root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind().is_comment());

        for comment in comments {
            let at = tree.position(offset_of(comment.text_range().start()));
            let directive = match parse_directive(comment.text()) {
                Ok(Some(directive)) => directive,
                Ok(None) => continue,
                Err(message) => {
                    resolved.warn(at, message);
                    continue;
                }
            };

            for rule in directive.rules {
                match (directive.action, directive.scope) {
                    (Action::Disable, Scope::Open) => open.entry(rule).or_default().push(at),
                    (Action::Enable, _) => match open.get_mut(&rule).and_then(Vec::pop) {
                        Some(start) => resolved.push(rule, start, at),
                        None => resolved.warn(
                            at,
                            format!("'enable {rule}' without a matching 'disable'"),
                        ),
                    },
                    (Action::Disable, scope) => {
                        let line = match scope {
                            Scope::Previous => at.line.checked_sub(1).filter(|l| *l > 0),
                            Scope::Next => Some(at.line + 1).filter(|l| *l <= index.line_count()),
                            _ => Some(at.line),
                        };
                        let span = line.and_then(|l| Some((index.line_start(l)?, index.line_end(l)?)));
                        match span {
                            Some((start, end)) => {
                                resolved.push(rule, index.position(start), index.position(end))
                            }
                            None => resolved.warn(
                                at,
                                format!(
                                    "'disable:{}' for '{rule}' has no line to apply to",
                                    scope.name()
                                ),
                            ),
                        }
                    }
                }
            }
        }

        // Unmatched disables run to the end of the file
        let eof = tree.position(index.len());
        let mut unmatched: Vec<(String, Position)> = open
            .into_iter()
            .flat_map(|(rule, starts)| starts.into_iter().map(move |s| (rule.clone(), s)))
            .collect();
        unmatched.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        for (rule, start) in unmatched {
            resolved.push(rule, start, eof);
        }
        resolved.regions.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.rule.cmp(&b.rule)));

        resolved
    }

    fn push(&mut self, rule: String, start: Position, end: Position) {
        if end.offset < start.offset {
            self.warn(start, format!("inverted region for '{rule}'"));
            return;
        }
        self.regions.push(DisabledRegion { rule, start, end });
    }

    fn warn(&mut self, position: Position, message: String) {
        tracing::warn!(line = position.line, column = position.column, "{}", message);
        self.warnings.push(DirectiveWarning { position, message });
    }

    pub fn regions(&self) -> &[DisabledRegion] {
        &self.regions
    }

    pub fn warnings(&self) -> &[DirectiveWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions that apply to one rule, including `all`
    pub fn for_rule(&self, rule_id: &str) -> RuleRegions {
        RuleRegions {
            regions: self
                .regions
                .iter()
                .filter(|r| r.applies_to(rule_id))
                .cloned()
                .collect(),
        }
    }
}

/// Disabled regions of a single rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleRegions {
    regions: Vec<DisabledRegion>,
}

impl RuleRegions {
    /// No suppression at all
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_suppressed(&self, offset: usize) -> bool {
        self.regions.iter().any(|r| r.contains(offset))
    }

    pub fn regions(&self) -> &[DisabledRegion] {
        &self.regions
    }
}
