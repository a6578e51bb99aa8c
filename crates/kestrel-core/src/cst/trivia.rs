//! Trivia bands around significant tokens
//!
//! Trivia lives in the tree as ordinary tokens. A token's *trailing* trivia is
//! the same-line trivia that follows it, up to but excluding the next newline.
//! Its *leading* trivia is everything between the previous token's trailing
//! trivia and the token itself. Every trivia token belongs to exactly one band.
//!
//! # Example
//!
//! ```rust,ignore
//! use kestrel_core::cst::{parse_source, trivia};
//!
//! let (root, _) = parse_source("let a = 1 // one\nlet b = 2");
//! let one = root.descendants_with_tokens()
//!     .filter_map(|e| e.into_token())
//!     .find(|t| t.text() == "1")
//!     .unwrap();
//! assert_eq!(trivia::trailing_trivia(&one).len(), 2); // " " and "// one"
//! ```

use super::{SyntaxKind, SyntaxToken};

/// Leading and trailing trivia of one token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriviaBands {
    pub leading: Vec<SyntaxToken>,
    pub trailing: Vec<SyntaxToken>,
}

impl TriviaBands {
    pub fn of(token: &SyntaxToken) -> Self {
        Self {
            leading: leading_trivia(token),
            trailing: trailing_trivia(token),
        }
    }

    pub fn leading_text(&self) -> String {
        self.leading.iter().map(|t| t.text()).collect()
    }

    pub fn trailing_text(&self) -> String {
        self.trailing.iter().map(|t| t.text()).collect()
    }
}

fn breaks_line(token: &SyntaxToken) -> bool {
    token.kind() == SyntaxKind::Newline
}

pub fn next_significant_token(token: &SyntaxToken) -> Option<SyntaxToken> {
    let mut current = token.next_token();
    while let Some(t) = current {
        if !t.kind().is_trivia() {
            return Some(t);
        }
        current = t.next_token();
    }
    None
}

pub fn previous_significant_token(token: &SyntaxToken) -> Option<SyntaxToken> {
    let mut current = token.prev_token();
    while let Some(t) = current {
        if !t.kind().is_trivia() {
            return Some(t);
        }
        current = t.prev_token();
    }
    None
}

/// Same-line trivia after `token`, stopping before the first newline
pub fn trailing_trivia(token: &SyntaxToken) -> Vec<SyntaxToken> {
    let mut band = Vec::new();
    let mut current = token.next_token();
    while let Some(t) = current {
        if !t.kind().is_trivia() || breaks_line(&t) {
            break;
        }
        current = t.next_token();
        band.push(t);
    }
    band
}

/// Trivia before `token` that is not the previous token's trailing trivia
pub fn leading_trivia(token: &SyntaxToken) -> Vec<SyntaxToken> {
    let mut all = Vec::new();
    let mut current = token.prev_token();
    let mut at_file_start = true;
    while let Some(t) = current {
        if !t.kind().is_trivia() {
            at_file_start = false;
            break;
        }
        current = t.prev_token();
        all.push(t);
    }
    all.reverse();

    // At the start of the file nothing is trailing trivia
    if at_file_start {
        return all;
    }
    match all.iter().position(breaks_line) {
        Some(split) => all.split_off(split),
        None => Vec::new(),
    }
}

/// Whether `token` is the first significant token on its line
pub fn starts_line(token: &SyntaxToken) -> bool {
    previous_significant_token(token).is_none()
        || leading_trivia(token).iter().any(breaks_line)
}

/// Detach whitespace left dangling at the end of `token`'s line
///
/// Only acts when the whole trailing band is plain whitespace, so comments
/// and their separating spaces stay untouched. The token must belong to a
/// mutable tree.
pub fn drop_dangling_space(token: &SyntaxToken) {
    let trailing = trailing_trivia(token);
    if trailing.is_empty() || trailing.iter().any(|t| t.kind() != SyntaxKind::Whitespace) {
        return;
    }
    for t in trailing {
        t.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_source;

    fn token(source: &str, text: &str) -> SyntaxToken {
        let (root, _) = parse_source(source);
        root.descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.text() == text)
            .expect("token with text")
    }

    #[test]
    fn bands_split_at_newline() {
        let one = token("let a = 1 // one\n  let b = 2", "1");
        let bands = TriviaBands::of(&one);
        assert_eq!(bands.trailing_text(), " // one");
        // The space after `=` is trailing trivia of `=`
        assert_eq!(bands.leading_text(), "");

        let second_let = {
            let (root, _) = parse_source("let a = 1 // one\n  let b = 2");
            root.descendants_with_tokens()
                .filter_map(|e| e.into_token())
                .filter(|t| t.text() == "let")
                .nth(1)
                .expect("second let")
        };
        let bands = TriviaBands::of(&second_let);
        assert_eq!(bands.leading_text(), "\n  ");
        assert!(starts_line(&second_let));
    }

    #[test]
    fn file_start_is_leading() {
        let first = token("  // header\nfunc foo() {}", "func");
        assert_eq!(leading_trivia(&first).len(), 3);
        assert!(starts_line(&first));
    }

    #[test]
    fn dangling_space_is_removed_on_mutable_trees() {
        let (root, _) = parse_source("foo() \nbar()");
        let root = root.clone_for_update();
        let paren = root
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == SyntaxKind::RParen)
            .expect("rparen");
        drop_dangling_space(&paren);
        assert_eq!(root.text().to_string(), "foo()\nbar()");
    }

    #[test]
    fn comments_keep_their_spacing() {
        let (root, _) = parse_source("foo() // note\nbar()");
        let root = root.clone_for_update();
        let paren = root
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == SyntaxKind::RParen)
            .expect("rparen");
        drop_dangling_space(&paren);
        assert_eq!(root.text().to_string(), "foo() // note\nbar()");
    }
}
