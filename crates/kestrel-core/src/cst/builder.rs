//! Thin wrapper over Rowan's green node builder

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, GreenToken, NodeOrToken};

use super::{SyntaxKind, SyntaxNode, lex_with_trivia};

/// Builds a green tree with [`SyntaxKind`]s instead of raw kinds
#[derive(Default)]
pub struct CstBuilder {
    inner: GreenNodeBuilder<'static>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.inner.start_node(kind.into());
    }

    /// Start a node that wraps everything emitted since `checkpoint`
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.inner.start_node_at(checkpoint, kind.into());
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.inner.checkpoint()
    }

    pub fn token(&mut self, kind: SyntaxKind, text: &str) {
        self.inner.token(kind.into(), text);
    }

    pub fn finish_node(&mut self) {
        self.inner.finish_node();
    }

    pub fn finish_green(self) -> GreenNode {
        self.inner.finish()
    }

    pub fn finish(self) -> SyntaxNode {
        SyntaxNode::new_root(self.finish_green())
    }
}

/// Build a detached node from `(kind, text)` tokens, mainly for rewrites and tests
pub fn green_node(kind: SyntaxKind, tokens: &[(SyntaxKind, &str)]) -> GreenNode {
    let mut builder = CstBuilder::new();
    builder.start_node(kind);
    for (token_kind, text) in tokens {
        builder.token(*token_kind, text);
    }
    builder.finish_node();
    builder.finish_green()
}

/// Child of a node assembled with [`compose`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreenChild {
    Node(GreenNode),
    Token(SyntaxKind, String),
}

impl GreenChild {
    /// `text` split into tokens the way the lexer would split it
    pub fn lexed(text: &str) -> Vec<GreenChild> {
        lex_with_trivia(text)
            .0
            .into_iter()
            .map(|token| GreenChild::Token(token.kind, token.text))
            .collect()
    }
}

impl From<&SyntaxNode> for GreenChild {
    fn from(node: &SyntaxNode) -> Self {
        GreenChild::Node(node.green().into_owned())
    }
}

/// Assemble a node from existing subtrees and new tokens
///
/// Subtrees are shared, not copied.
pub fn compose(kind: SyntaxKind, children: impl IntoIterator<Item = GreenChild>) -> GreenNode {
    let children: Vec<NodeOrToken<GreenNode, GreenToken>> = children
        .into_iter()
        .map(|child| match child {
            GreenChild::Node(node) => NodeOrToken::Node(node),
            GreenChild::Token(kind, text) => NodeOrToken::Token(GreenToken::new(kind.into(), &text)),
        })
        .collect();
    GreenNode::new(kind.into(), children)
}
