//! Offset to line/column conversion and the parsed source wrapper

use std::fmt;

use rowan::{GreenNode, TextSize};
use serde::Serialize;

use crate::cst::{LexerError, SyntaxNode, parse_source};

/// A point in the source: byte offset plus 1-based line and column
///
/// Columns count characters, not bytes, so a diagnostic after `é` lands
/// where an editor would put the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open `[start, end)` span of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRange {
    pub start: Position,
    pub end: Position,
}

impl SourceRange {
    /// `None` when `end` comes before `start`
    pub fn new(start: Position, end: Position) -> Option<Self> {
        (start.offset <= end.offset).then_some(Self { start, end })
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start.offset <= offset && offset < self.end.offset
    }

    pub fn contains_range(&self, other: &SourceRange) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Line start table for one version of a file's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    text: String,
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => line_starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        Self { text, line_starts }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Position of a byte offset; offsets past the end clamp to the end
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line];
        let column = self
            .text
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start);
        Position {
            offset,
            line: line + 1,
            column: column + 1,
        }
    }

    /// Byte offset where a 1-based line begins
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1).and_then(|i| self.line_starts.get(i)).copied()
    }

    /// Byte offset of the end of a 1-based line, before its line break
    pub fn line_end(&self, line: usize) -> Option<usize> {
        let start = self.line_start(line)?;
        let rest = &self.text[start..];
        let len = rest.find(['\n', '\r']).unwrap_or(rest.len());
        Some(start + len)
    }

    pub fn range(&self, start: usize, end: usize) -> Option<SourceRange> {
        SourceRange::new(self.position(start), self.position(end))
    }
}

pub fn offset_of(size: TextSize) -> usize {
    u32::from(size) as usize
}

/// A parsed file: syntax tree plus the line index of its text
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: SyntaxNode,
    line_index: LineIndex,
    lexer_errors: Vec<LexerError>,
}

impl SourceTree {
    pub fn parse(text: &str) -> Self {
        let (root, lexer_errors) = parse_source(text);
        Self {
            root,
            line_index: LineIndex::new(text),
            lexer_errors,
        }
    }

    /// Wrap a tree produced elsewhere
    pub fn from_root(root: SyntaxNode) -> Self {
        let line_index = LineIndex::new(root.text().to_string());
        Self {
            root,
            line_index,
            lexer_errors: Vec::new(),
        }
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn lexer_errors(&self) -> &[LexerError] {
        &self.lexer_errors
    }

    pub fn text(&self) -> String {
        self.root.text().to_string()
    }

    pub fn position(&self, offset: usize) -> Position {
        self.line_index.position(offset)
    }

    pub fn node_range(&self, node: &SyntaxNode) -> SourceRange {
        let range = node.text_range();
        let start = self.position(offset_of(range.start()));
        let end = self.position(offset_of(range.end()));
        SourceRange { start, end }
    }

    /// Detach the tree from its cursor so it can cross threads
    pub fn share(&self) -> SharedTree {
        SharedTree {
            green: self.root.green().into_owned(),
            line_index: self.line_index.clone(),
            lexer_errors: self.lexer_errors.clone(),
        }
    }
}

/// `Send + Sync` form of a [`SourceTree`]
///
/// Red nodes are thread-local; each worker rebuilds its own cursor over the
/// shared green tree with [`SharedTree::tree`].
#[derive(Debug, Clone)]
pub struct SharedTree {
    green: GreenNode,
    line_index: LineIndex,
    lexer_errors: Vec<LexerError>,
}

impl SharedTree {
    pub fn tree(&self) -> SourceTree {
        SourceTree {
            root: SyntaxNode::new_root(self.green.clone()),
            line_index: self.line_index.clone(),
            lexer_errors: self.lexer_errors.clone(),
        }
    }
}
