//! Rowan language implementation for Swift
//!
//! Connects [`SyntaxKind`] to Rowan's generic green/red tree types.

use rowan::Language;

use super::SyntaxKind;

/// Language marker for Swift syntax trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SwiftLanguage;

impl Language for SwiftLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        // Only trees built from our own kinds reach this point
        SyntaxKind::from_raw(raw.0).unwrap_or(SyntaxKind::Error)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Red syntax node for Swift
pub type SyntaxNode = rowan::SyntaxNode<SwiftLanguage>;
/// Red syntax token for Swift
pub type SyntaxToken = rowan::SyntaxToken<SwiftLanguage>;
/// Either a node or a token
pub type SyntaxElement = rowan::SyntaxElement<SwiftLanguage>;
