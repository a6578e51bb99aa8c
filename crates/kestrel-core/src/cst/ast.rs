//! Typed AST layer over the CST
//!
//! Thin wrappers that give rules named accessors instead of raw child walks.
//! Each wrapper only stores the underlying [`SyntaxNode`], so casting is free
//! and the wrappers work on both immutable and mutable trees.
//!
//! # Example
//!
//! ```ignore
//! use kestrel_core::cst::{parse_source, ast::{AstNode, FunctionDecl}};
//!
//! let (root, _) = parse_source("func foo() -> Void {}");
//! let function = root.children().find_map(FunctionDecl::cast).unwrap();
//!
//! assert_eq!(function.name().unwrap(), "foo");
//! assert!(function.signature().unwrap().return_clause().is_some());
//! ```

use super::{SyntaxKind, SyntaxNode, SyntaxToken};

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

fn child_of_kind(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
    parent.children().find(|n| n.kind() == kind)
}

fn token_of_kind(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// First direct name token, accepting keywords used as names (`.init`)
fn name_token(parent: &SyntaxNode) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == SyntaxKind::Ident || t.kind().is_keyword())
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

// ============================================================================
// Declarations
// ============================================================================

ast_node!(
    /// Whole file
    SourceFile => SourceFile
);

ast_node!(
    /// `func name<T>(params) throws -> R { body }`
    FunctionDecl => FunctionDecl
);

impl FunctionDecl {
    pub fn name(&self) -> Option<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .skip_while(|t| t.kind() != SyntaxKind::FuncKw)
            .skip(1)
            .find(|t| !t.kind().is_trivia())
            .map(|t| t.text().to_string())
    }

    pub fn signature(&self) -> Option<FunctionSignature> {
        child_of_kind(&self.syntax, SyntaxKind::FunctionSignature).and_then(FunctionSignature::cast)
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        child_of_kind(&self.syntax, SyntaxKind::CodeBlock)
    }
}

ast_node!(
    /// Parameters, effects and return clause of a function or initializer
    FunctionSignature => FunctionSignature
);

impl FunctionSignature {
    pub fn parameter_clause(&self) -> Option<SyntaxNode> {
        child_of_kind(&self.syntax, SyntaxKind::ParameterClause)
    }

    pub fn return_clause(&self) -> Option<ReturnClause> {
        child_of_kind(&self.syntax, SyntaxKind::ReturnClause).and_then(ReturnClause::cast)
    }

    pub fn is_throwing(&self) -> bool {
        token_of_kind(&self.syntax, SyntaxKind::ThrowsKw).is_some()
            || token_of_kind(&self.syntax, SyntaxKind::RethrowsKw).is_some()
    }
}

ast_node!(
    /// `-> Type`
    ReturnClause => ReturnClause
);

impl ReturnClause {
    pub fn arrow_token(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, SyntaxKind::Arrow)
    }

    pub fn ty(&self) -> Option<Type> {
        self.syntax.children().find_map(Type::cast)
    }

    /// Whether the clause belongs to a function declaration or a closure
    pub fn owner_kind(&self) -> Option<SyntaxKind> {
        self.syntax.parent().map(|p| p.kind())
    }
}

// ============================================================================
// Types
// ============================================================================

ast_node!(
    /// Named type with optional generic arguments: `Void`, `Array<Int>`
    SimpleType => SimpleType
);

impl SimpleType {
    pub fn name(&self) -> Option<String> {
        token_of_kind(&self.syntax, SyntaxKind::Ident).map(|t| t.text().to_string())
    }

    pub fn generic_args(&self) -> Option<SyntaxNode> {
        child_of_kind(&self.syntax, SyntaxKind::GenericArgs)
    }
}

ast_node!(
    /// `(A, B)`, including the empty tuple `()`
    TupleType => TupleType
);

impl TupleType {
    pub fn elements(&self) -> impl Iterator<Item = SyntaxNode> {
        self.syntax
            .children()
            .filter(|n| n.kind() == SyntaxKind::TupleTypeElement)
    }
}

ast_node!(
    /// `Wrapped?`
    OptionalType => OptionalType
);

impl OptionalType {
    pub fn wrapped(&self) -> Option<Type> {
        self.syntax.children().find_map(Type::cast)
    }
}

ast_node!(
    /// `(A) -> B` or `A -> B`
    FunctionType => FunctionType
);

impl FunctionType {
    pub fn result(&self) -> Option<Type> {
        self.syntax.children().filter_map(Type::cast).last()
    }
}

/// Any type position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Simple(SimpleType),
    Tuple(TupleType),
    Optional(OptionalType),
    Function(FunctionType),
    /// Member, collection, attributed and implicitly unwrapped types
    Other(SyntaxNode),
}

impl Type {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::SimpleType => SimpleType::cast(node).map(Type::Simple),
            SyntaxKind::TupleType => TupleType::cast(node).map(Type::Tuple),
            SyntaxKind::OptionalType => OptionalType::cast(node).map(Type::Optional),
            SyntaxKind::FunctionType => FunctionType::cast(node).map(Type::Function),
            SyntaxKind::MemberType
            | SyntaxKind::ImplicitlyUnwrappedType
            | SyntaxKind::ArrayType
            | SyntaxKind::DictionaryType
            | SyntaxKind::AttributedType => Some(Type::Other(node)),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Type::Simple(t) => t.syntax(),
            Type::Tuple(t) => t.syntax(),
            Type::Optional(t) => t.syntax(),
            Type::Function(t) => t.syntax(),
            Type::Other(node) => node,
        }
    }

    /// `Void` spelled as a bare name or as the empty tuple `()`
    pub fn is_void(&self) -> bool {
        match self {
            Type::Simple(simple) => {
                simple.name().as_deref() == Some("Void") && simple.generic_args().is_none()
            }
            Type::Tuple(tuple) => tuple.elements().next().is_none(),
            _ => false,
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

ast_node!(IdentExpr => IdentExpr);

impl IdentExpr {
    pub fn name(&self) -> Option<String> {
        name_token(&self.syntax).map(|t| t.text().to_string())
    }
}

ast_node!(LiteralExpr => LiteralExpr);

ast_node!(
    /// `base.member`, or `.member` with an implicit base
    MemberExpr => MemberExpr
);

impl MemberExpr {
    pub fn base(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn name(&self) -> Option<String> {
        name_token(&self.syntax).map(|t| t.text().to_string())
    }
}

ast_node!(
    /// Call or subscript, with an optional trailing closure
    CallExpr => CallExpr
);

impl CallExpr {
    pub fn callee(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn argument_list(&self) -> Option<ArgumentList> {
        child_of_kind(&self.syntax, SyntaxKind::ArgumentList).and_then(ArgumentList::cast)
    }

    /// Arguments inside the parentheses, not counting a trailing closure
    pub fn arguments(&self) -> Vec<Argument> {
        self.argument_list()
            .map(|list| list.arguments().collect())
            .unwrap_or_default()
    }

    pub fn trailing_closure(&self) -> Option<ClosureExpr> {
        // The callee itself may be a closure; only a direct closure child
        // after it counts.
        self.syntax
            .children()
            .skip(1)
            .find_map(ClosureExpr::cast)
    }

    pub fn is_subscript(&self) -> bool {
        self.argument_list()
            .and_then(|list| list.syntax().first_token())
            .is_some_and(|t| t.kind() == SyntaxKind::LBracket)
    }

    /// Name of a plain identifier callee: `expect(x)` gives `expect`
    pub fn callee_name(&self) -> Option<String> {
        match self.callee()? {
            Expr::Ident(ident) => ident.name(),
            _ => None,
        }
    }
}

ast_node!(ArgumentList => ArgumentList);

impl ArgumentList {
    pub fn arguments(&self) -> impl Iterator<Item = Argument> {
        self.syntax.children().filter_map(Argument::cast)
    }
}

ast_node!(
    /// `label: value` or `value`
    Argument => Argument
);

impl Argument {
    pub fn label(&self) -> Option<String> {
        token_of_kind(&self.syntax, SyntaxKind::Colon)?;
        name_token(&self.syntax).map(|t| t.text().to_string())
    }

    pub fn expr(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(ClosureExpr => ClosureExpr);

impl ClosureExpr {
    pub fn signature(&self) -> Option<ClosureSignature> {
        child_of_kind(&self.syntax, SyntaxKind::ClosureSignature).and_then(ClosureSignature::cast)
    }
}

ast_node!(
    /// `[captures] (params) throws -> R in`
    ClosureSignature => ClosureSignature
);

impl ClosureSignature {
    pub fn return_clause(&self) -> Option<ReturnClause> {
        child_of_kind(&self.syntax, SyntaxKind::ReturnClause).and_then(ReturnClause::cast)
    }
}

ast_node!(BinaryExpr => BinaryExpr);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn rhs(&self) -> Option<Expr> {
        self.syntax.children().filter_map(Expr::cast).nth(1)
    }

    /// Operator text with split tokens joined: `>` `=` gives `>=`
    pub fn operator(&self) -> String {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind().is_operator_part() || t.kind() == SyntaxKind::Ident)
            .map(|t| t.text().to_string())
            .collect()
    }
}

/// Any expression position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Ident(IdentExpr),
    Literal(LiteralExpr),
    Member(MemberExpr),
    Call(CallExpr),
    Closure(ClosureExpr),
    Binary(BinaryExpr),
    /// Tuples, arrays, prefix, postfix, ternary and effect expressions
    Other(SyntaxNode),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::IdentExpr => IdentExpr::cast(node).map(Expr::Ident),
            SyntaxKind::LiteralExpr => LiteralExpr::cast(node).map(Expr::Literal),
            SyntaxKind::MemberExpr => MemberExpr::cast(node).map(Expr::Member),
            SyntaxKind::CallExpr => CallExpr::cast(node).map(Expr::Call),
            SyntaxKind::ClosureExpr => ClosureExpr::cast(node).map(Expr::Closure),
            SyntaxKind::BinaryExpr => BinaryExpr::cast(node).map(Expr::Binary),
            SyntaxKind::TupleExpr
            | SyntaxKind::ArrayExpr
            | SyntaxKind::PrefixExpr
            | SyntaxKind::PostfixExpr
            | SyntaxKind::TernaryExpr
            | SyntaxKind::TryExpr => Some(Expr::Other(node)),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Ident(e) => e.syntax(),
            Expr::Literal(e) => e.syntax(),
            Expr::Member(e) => e.syntax(),
            Expr::Call(e) => e.syntax(),
            Expr::Closure(e) => e.syntax(),
            Expr::Binary(e) => e.syntax(),
            Expr::Other(node) => node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_source;

    fn find<N: AstNode>(source: &str) -> N {
        let (root, _) = parse_source(source);
        root.descendants()
            .find_map(N::cast)
            .expect("node of the requested kind")
    }

    #[test]
    fn function_accessors() {
        let function: FunctionDecl = find("func foo(_ x: Int) throws -> Void {}");
        assert_eq!(function.name().as_deref(), Some("foo"));
        let signature = function.signature().expect("signature");
        assert!(signature.is_throwing());
        let clause = signature.return_clause().expect("return clause");
        assert_eq!(clause.owner_kind(), Some(SyntaxKind::FunctionSignature));
        assert!(clause.ty().expect("type").is_void());
    }

    #[test]
    fn void_detection() {
        let void = |source: &str| -> bool {
            let clause: ReturnClause = find(source);
            clause.ty().is_some_and(|t| t.is_void())
        };
        assert!(void("func f() -> Void {}"));
        assert!(void("func f() -> () {}"));
        assert!(!void("func f() -> ()? {}"));
        assert!(!void("func f() -> Void! {}"));
        assert!(!void("func f() -> (Int) {}"));
        assert!(!void("func f() -> Int -> Void {}"));
        assert!(!void("func f() -> Void<Int> {}"));
    }

    #[test]
    fn call_accessors() {
        let call: CallExpr = find("expect(10).to(beGreaterThan(8))");
        let Some(Expr::Member(member)) = call.callee() else {
            panic!("expected member callee");
        };
        assert_eq!(member.name().as_deref(), Some("to"));
        let Some(Expr::Call(inner)) = member.base() else {
            panic!("expected call base");
        };
        assert_eq!(inner.callee_name().as_deref(), Some("expect"));
        assert_eq!(inner.arguments().len(), 1);
        assert!(call.trailing_closure().is_none());
    }

    #[test]
    fn trailing_closure_and_labels() {
        let call: CallExpr = find("foo(bar: 1) { x in x }");
        assert!(call.trailing_closure().is_some());
        let argument = call.arguments().pop().expect("argument");
        assert_eq!(argument.label().as_deref(), Some("bar"));
    }

    #[test]
    fn binary_operator_text() {
        let binary: BinaryExpr = find("a >= b");
        assert_eq!(binary.operator(), ">=");
        assert!(binary.rhs().is_some());
    }
}
