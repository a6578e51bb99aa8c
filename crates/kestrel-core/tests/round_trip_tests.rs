//! Round-trip tests for the lossless Swift syntax tree
//!
//! Every input, valid or not, must come back byte for byte from the tree.

use kestrel_core::cst::{SyntaxKind, lex_with_trivia, parse_source};

fn assert_lossless(source: &str) {
    let (root, _errors) = parse_source(source);
    assert_eq!(root.kind(), SyntaxKind::SourceFile);
    assert_eq!(root.text().to_string(), source, "tree text differs from input");

    let lexed: String = lex_with_trivia(source)
        .0
        .iter()
        .map(|token| token.text.as_str())
        .collect();
    assert_eq!(lexed, source, "token texts differ from input");
}

/// Test round-trip for declarations with trivia in odd places
#[test]
fn test_declarations_round_trip() {
    assert_lossless(
        r#"import Foundation

/// Docs
@available(iOS 13, *)
public final class Cache<Key: Hashable, Value>: NSObject where Key: Sendable {
    private(set) var storage: [Key: Value] = [:]
    static let shared = Cache()

    init?(capacity: Int = 10) { }

    subscript(key: Key) -> Value? {
        get { storage[key] }
    }

    func store(_ value: Value, for key: Key) throws -> Void {
        storage[key] = value // keep
    }
}
"#,
    );
}

/// Test round-trip for control flow and closures
#[test]
fn test_statements_round_trip() {
    assert_lossless(
        r#"func run() async throws -> (Int, String)? {
    guard let value = try? await load() else { return nil }
    for item in items where item.isEnabled {
        print(item)
    }
    switch value {
    case .some(let x) where x > 0:
        break
    default:
        break
    }
    let mapped = values.map { (v: Int) throws -> String in "\(v)" }
    return condition ? (1, "a") : nil
}
"#,
    );
}

/// Test round-trip for conditional compilation and comments
#[test]
fn test_conditional_markers_round_trip() {
    assert_lossless("#if DEBUG\nlet x = 1 /* a\nb */\n#else\nlet x = 2\n#endif\n");
}

/// Test round-trip for line endings and unicode
#[test]
fn test_line_endings_and_unicode_round_trip() {
    assert_lossless("let café = \"naïve\"\r\nlet π = 3.14\rprint(café)\n");
    assert_lossless("");
    assert_lossless("\n\n   \t");
}

/// Test round-trip for malformed input
#[test]
fn test_malformed_input_round_trip() {
    assert_lossless("func (((\n} ] ) -> -> in in\n@@ ¤ `unterminated");
    assert_lossless("let s = \"unterminated\nfunc foo() -> Void {}\n");
    assert_lossless("/* never closed");
}

/// Test that malformed input still yields error nodes rather than panics
#[test]
fn test_unexpected_tokens_become_error_nodes() {
    let (root, _errors) = parse_source("} ) ]\n");
    assert!(root.descendants().any(|n| n.kind() == SyntaxKind::Error));
}

/// Test that composite nodes never start or end with trivia
#[test]
fn test_nodes_are_trimmed() {
    let (root, _errors) = parse_source(
        "  func foo()  ->  Void  {\n  // body\n  bar( 1 , 2 )\n}  \n",
    );
    for node in root.descendants().skip(1) {
        let first = node.first_token().map(|t| t.kind());
        let last = node.last_token().map(|t| t.kind());
        assert!(!first.is_some_and(|k| k.is_trivia()), "{:?} starts with trivia", node.kind());
        assert!(!last.is_some_and(|k| k.is_trivia()), "{:?} ends with trivia", node.kind());
    }
}
