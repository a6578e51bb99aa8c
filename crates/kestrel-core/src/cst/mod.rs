//! Concrete Syntax Tree (CST) for Swift sources
//!
//! Lossless syntax tree built on Rowan. Every byte of the input, including
//! whitespace, comments and `#if` lines, is a token in the tree, so
//! `parse_source(text).0.text() == text` holds for any input.
//!
//! ## Architecture
//!
//! - **Green tree**: immutable and position independent. Rewrites build small
//!   green nodes and splice them into a mutable copy of the tree.
//! - **Red tree**: the navigable view with parent pointers that rules read.
//!
//! ## Trivia
//!
//! Trivia tokens sit between significant tokens. Composite nodes never start
//! or end with trivia; see [`trivia`] for the leading/trailing split used when
//! text is removed.

mod builder;
mod language;
mod lexer;
mod parser;
mod syntax_kind;

pub mod ast;
pub mod trivia;

pub use builder::{CstBuilder, GreenChild, compose, green_node};
pub use language::{SwiftLanguage, SyntaxElement, SyntaxNode, SyntaxToken};
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use parser::parse_source;
pub use syntax_kind::SyntaxKind;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn green_node_builds_detached_tree() {
        let green = green_node(
            SyntaxKind::LiteralExpr,
            &[(SyntaxKind::NilKw, "nil")],
        );
        let node = SyntaxNode::new_root(green);
        assert_eq!(node.kind(), SyntaxKind::LiteralExpr);
        assert_eq!(node.text().to_string(), "nil");
    }
}
