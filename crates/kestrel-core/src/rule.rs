//! Rule trait, descriptions and the records rules produce

use std::fmt;
use std::sync::Arc;

use rowan::GreenNode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cst::SyntaxNode;
use crate::error::KestrelError;
use crate::position::Position;
use crate::result::Result;

/// Severity attached to a reported violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Broad family a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Prefer the idiomatic spelling of a construct
    Idiomatic,
    /// Formatting and redundancy
    Style,
    /// Likely mistakes
    Lint,
}

/// Static metadata and fixtures of a rule
///
/// `triggering` examples mark every expected violation with `↓` at its
/// anchor. `corrections` pairs use the same markers in the input.
#[derive(Debug, Clone)]
pub struct RuleDescription {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: RuleKind,
    pub severity: Severity,
    /// Opt-in rules only run when configuration names them
    pub opt_in: bool,
    pub non_triggering: &'static [&'static str],
    pub triggering: &'static [&'static str],
    pub corrections: &'static [(&'static str, &'static str)],
}

/// Marker used in examples to show where a violation is anchored
pub const ANCHOR_MARKER: char = '↓';

/// One place in the tree where a rule fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The node the rewrite operates on
    pub node: SyntaxNode,
    /// Byte offset the violation is reported at
    pub anchor: usize,
    /// Overrides the rule description in the violation message
    pub message: Option<String>,
}

impl Match {
    pub fn new(node: SyntaxNode, anchor: usize) -> Self {
        Self {
            node,
            anchor,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Tree edit computed for a match
#[derive(Debug, Clone)]
pub enum Rewrite {
    /// Delete the node; see [`crate::corrector`] for the trivia it takes along
    Remove(SyntaxNode),
    /// Swap the node for a freshly built subtree
    Replace { node: SyntaxNode, green: GreenNode },
}

/// A lint rule
///
/// Rules are stateless: `matches` is called on every node of the tree in
/// pre-order and decides on its own whether that node is a site. The same
/// function drives detection and correction, so both always agree on which
/// sites qualify. An `Err` from either hook skips that site only.
pub trait Rule: Send + Sync + fmt::Debug {
    fn description(&self) -> &RuleDescription;

    fn id(&self) -> &'static str {
        self.description().id
    }

    fn matches(&self, node: &SyntaxNode) -> Result<Option<Match>>;

    /// Edit for a match; `None` leaves the site untouched
    fn rewrite(&self, _site: &Match) -> Result<Option<Rewrite>> {
        Ok(None)
    }

    fn is_correctable(&self) -> bool {
        !self.description().corrections.is_empty()
    }

    /// Build a configured copy from user options
    ///
    /// `Ok(None)` keeps the rule as registered. The default accepts only
    /// empty options.
    fn configure(&self, options: &serde_json::Value) -> Result<Option<Arc<dyn Rule>>> {
        match options {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Object(map) if map.is_empty() => Ok(None),
            _ => Err(KestrelError::rule_error(
                self.id(),
                "this rule does not take options",
            )),
        }
    }
}

/// A reported rule violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule_id: String,
    pub position: Position,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {} ({})",
            self.position, self.severity, self.message, self.rule_id
        )
    }
}

/// A rewrite that was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    pub rule_id: String,
    pub position: Position,
}

/// Split an example into clean source and the offsets of its `↓` markers
pub fn strip_markers(example: &str) -> (String, Vec<usize>) {
    let mut clean = String::with_capacity(example.len());
    let mut markers = Vec::new();
    for c in example.chars() {
        if c == ANCHOR_MARKER {
            markers.push(clean.len());
        } else {
            clean.push(c);
        }
    }
    (clean, markers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_removed_and_located() {
        let (clean, markers) = strip_markers("func foo()↓ -> Void {}");
        assert_eq!(clean, "func foo() -> Void {}");
        assert_eq!(markers, vec![10]);
    }

    #[test]
    fn violation_display() {
        let violation = Violation {
            rule_id: "redundant_void_return".to_string(),
            position: Position {
                offset: 10,
                line: 1,
                column: 11,
            },
            severity: Severity::Warning,
            message: "Returning Void in a function declaration is redundant".to_string(),
        };
        assert_eq!(
            violation.to_string(),
            "1:11: warning: Returning Void in a function declaration is redundant (redundant_void_return)"
        );
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Error).expect("serialize");
        assert_eq!(json, r#""error""#);
    }
}
