//! Syntax kinds for the Swift CST
//!
//! One closed enum covers trivia, tokens and composite nodes. Rules match on
//! it exhaustively through the typed layer in [`super::ast`].

/// Every kind of element that can appear in a Kestrel syntax tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // Trivia
    Whitespace = 0,
    Newline,
    LineComment,
    BlockComment,
    /// `#if`, `#elseif`, `#else` and `#endif` lines
    ConditionalMarker,

    // Literals and names
    Ident,
    NumberLiteral,
    StringLiteral,
    Attribute,

    // Keywords
    FuncKw,
    InitKw,
    SubscriptKw,
    ProtocolKw,
    StructKw,
    ClassKw,
    EnumKw,
    ExtensionKw,
    VarKw,
    LetKw,
    ImportKw,
    TypealiasKw,
    CaseKw,
    DefaultKw,
    ReturnKw,
    IfKw,
    GuardKw,
    ElseKw,
    WhileKw,
    ForKw,
    SwitchKw,
    InKw,
    ThrowsKw,
    RethrowsKw,
    AsyncKw,
    TryKw,
    AwaitKw,
    TrueKw,
    FalseKw,
    NilKw,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LAngle,
    RAngle,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Arrow,
    Question,
    Bang,
    Equals,
    Operator,
    Unknown,

    // Declarations
    SourceFile,
    ImportDecl,
    TypealiasDecl,
    FunctionDecl,
    InitializerDecl,
    SubscriptDecl,
    TypeDecl,
    VariableDecl,
    EnumCaseDecl,
    Modifiers,
    AttributeNode,
    GenericParams,
    InheritanceClause,
    FunctionSignature,
    ParameterClause,
    Parameter,
    ReturnClause,
    TypeAnnotation,
    Initializer,
    CodeBlock,

    // Statements
    ReturnStmt,
    IfStmt,
    GuardStmt,
    WhileStmt,
    ForStmt,
    SwitchStmt,
    SwitchCase,
    ElseClause,

    // Types
    SimpleType,
    GenericArgs,
    MemberType,
    TupleType,
    TupleTypeElement,
    OptionalType,
    ImplicitlyUnwrappedType,
    FunctionType,
    ArrayType,
    DictionaryType,
    AttributedType,

    // Expressions
    IdentExpr,
    LiteralExpr,
    TupleExpr,
    ArrayExpr,
    MemberExpr,
    CallExpr,
    ArgumentList,
    Argument,
    ClosureExpr,
    ClosureSignature,
    ClosureParams,
    PrefixExpr,
    PostfixExpr,
    BinaryExpr,
    TernaryExpr,
    TryExpr,

    Error,
}

use SyntaxKind::*;

/// Kinds in discriminant order, used to map raw rowan kinds back to the enum
const ALL_KINDS: &[SyntaxKind] = &[
    Whitespace,
    Newline,
    LineComment,
    BlockComment,
    ConditionalMarker,
    Ident,
    NumberLiteral,
    StringLiteral,
    Attribute,
    FuncKw,
    InitKw,
    SubscriptKw,
    ProtocolKw,
    StructKw,
    ClassKw,
    EnumKw,
    ExtensionKw,
    VarKw,
    LetKw,
    ImportKw,
    TypealiasKw,
    CaseKw,
    DefaultKw,
    ReturnKw,
    IfKw,
    GuardKw,
    ElseKw,
    WhileKw,
    ForKw,
    SwitchKw,
    InKw,
    ThrowsKw,
    RethrowsKw,
    AsyncKw,
    TryKw,
    AwaitKw,
    TrueKw,
    FalseKw,
    NilKw,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LAngle,
    RAngle,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Arrow,
    Question,
    Bang,
    Equals,
    Operator,
    Unknown,
    SourceFile,
    ImportDecl,
    TypealiasDecl,
    FunctionDecl,
    InitializerDecl,
    SubscriptDecl,
    TypeDecl,
    VariableDecl,
    EnumCaseDecl,
    Modifiers,
    AttributeNode,
    GenericParams,
    InheritanceClause,
    FunctionSignature,
    ParameterClause,
    Parameter,
    ReturnClause,
    TypeAnnotation,
    Initializer,
    CodeBlock,
    ReturnStmt,
    IfStmt,
    GuardStmt,
    WhileStmt,
    ForStmt,
    SwitchStmt,
    SwitchCase,
    ElseClause,
    SimpleType,
    GenericArgs,
    MemberType,
    TupleType,
    TupleTypeElement,
    OptionalType,
    ImplicitlyUnwrappedType,
    FunctionType,
    ArrayType,
    DictionaryType,
    AttributedType,
    IdentExpr,
    LiteralExpr,
    TupleExpr,
    ArrayExpr,
    MemberExpr,
    CallExpr,
    ArgumentList,
    Argument,
    ClosureExpr,
    ClosureSignature,
    ClosureParams,
    PrefixExpr,
    PostfixExpr,
    BinaryExpr,
    TernaryExpr,
    TryExpr,
    Error,
];

impl SyntaxKind {
    /// Map a raw discriminant back to its kind
    pub fn from_raw(raw: u16) -> Option<Self> {
        ALL_KINDS.get(raw as usize).copied()
    }

    /// Whitespace, newlines, comments and conditional-compilation markers
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Whitespace | Newline | LineComment | BlockComment | ConditionalMarker
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, LineComment | BlockComment)
    }

    pub fn is_keyword(self) -> bool {
        (FuncKw as u16..=NilKw as u16).contains(&(self as u16))
    }

    /// Keywords that introduce a declaration
    pub fn is_decl_keyword(self) -> bool {
        matches!(
            self,
            FuncKw
                | InitKw
                | SubscriptKw
                | ProtocolKw
                | StructKw
                | ClassKw
                | EnumKw
                | ExtensionKw
                | VarKw
                | LetKw
                | ImportKw
                | TypealiasKw
                | CaseKw
        )
    }

    /// Kinds that may be glued together to spell a binary operator
    pub fn is_operator_part(self) -> bool {
        matches!(self, Operator | LAngle | RAngle | Equals | Bang | Question)
    }

    /// Map an identifier-like word to its keyword kind
    pub fn from_keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "func" => FuncKw,
            "init" => InitKw,
            "subscript" => SubscriptKw,
            "protocol" => ProtocolKw,
            "struct" => StructKw,
            "class" => ClassKw,
            "enum" => EnumKw,
            "extension" => ExtensionKw,
            "var" => VarKw,
            "let" => LetKw,
            "import" => ImportKw,
            "typealias" => TypealiasKw,
            "case" => CaseKw,
            "default" => DefaultKw,
            "return" => ReturnKw,
            "if" => IfKw,
            "guard" => GuardKw,
            "else" => ElseKw,
            "while" => WhileKw,
            "for" => ForKw,
            "switch" => SwitchKw,
            "in" => InKw,
            "throws" => ThrowsKw,
            "rethrows" => RethrowsKw,
            "async" => AsyncKw,
            "try" => TryKw,
            "await" => AwaitKw,
            "true" => TrueKw,
            "false" => FalseKw,
            "nil" => NilKw,
            _ => return None,
        };
        Some(kind)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}
