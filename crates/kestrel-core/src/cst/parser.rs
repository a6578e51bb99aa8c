//! Hierarchical parser for the Swift subset Kestrel understands
//!
//! The parser never fails: anything it does not recognise is wrapped in an
//! `Error` node so the tree stays lossless. Trivia is flushed into the
//! enclosing node before a child node starts, so composite nodes never begin
//! or end with trivia.

use super::lexer::LexerError;
use super::{CstBuilder, CstToken, SyntaxKind, SyntaxNode};
use rowan::Checkpoint;

/// Words that act as declaration modifiers when they precede a declaration
const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "fileprivate",
    "internal",
    "open",
    "static",
    "final",
    "override",
    "mutating",
    "nonmutating",
    "lazy",
    "weak",
    "unowned",
    "convenience",
    "required",
    "dynamic",
    "optional",
    "indirect",
    "nonisolated",
];

/// Words that prefix a type (`inout T`, `some View`)
const TYPE_SPECIFIERS: &[&str] = &["inout", "some", "any", "borrowing", "consuming"];

/// Parse Swift source into a lossless CST
///
/// # Example
///
/// ```rust,ignore
/// use kestrel_core::cst::parse_source;
///
/// let (root, errors) = parse_source("func foo() -> Void {}\n");
/// assert!(errors.is_empty());
/// assert_eq!(root.text().to_string(), "func foo() -> Void {}\n");
/// ```
pub fn parse_source(source: &str) -> (SyntaxNode, Vec<LexerError>) {
    let (tokens, errors) = super::lex_with_trivia(source);
    let mut parser = Parser::new(&tokens);
    parser.parse_source_file();
    (parser.finish(), errors)
}

#[derive(Debug, Clone, Copy, Default)]
struct Restrictions {
    /// `if`/`guard`/`while` conditions: a `{` opens the body, not a closure
    no_trailing_closure: bool,
}

const CONDITION: Restrictions = Restrictions {
    no_trailing_closure: true,
};

struct Parser<'a> {
    tokens: &'a [CstToken],
    pos: usize,
    builder: CstBuilder,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: CstBuilder::new(),
        }
    }

    fn finish(self) -> SyntaxNode {
        self.builder.finish()
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    /// Raw index of the `n`th significant token from the cursor
    fn significant_index(&self, n: usize) -> Option<usize> {
        self.tokens[self.pos..]
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia())
            .nth(n)
            .map(|(offset, _)| self.pos + offset)
    }

    fn nth(&self, n: usize) -> Option<SyntaxKind> {
        self.significant_index(n).map(|i| self.tokens[i].kind)
    }

    fn nth_text(&self, n: usize) -> &str {
        self.significant_index(n)
            .map(|i| self.tokens[i].text.as_str())
            .unwrap_or("")
    }

    fn current(&self) -> Option<SyntaxKind> {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == Some(kind)
    }

    fn at_end(&self) -> bool {
        self.current().is_none()
    }

    fn at_word(&self, word: &str) -> bool {
        self.at(SyntaxKind::Ident) && self.nth_text(0) == word
    }

    /// Trivia between the cursor and the current token
    fn pending_trivia(&self) -> &[CstToken] {
        let end = self.significant_index(0).unwrap_or(self.tokens.len());
        &self.tokens[self.pos..end]
    }

    fn trivia_before_current(&self) -> bool {
        !self.pending_trivia().is_empty()
    }

    fn newline_before_current(&self) -> bool {
        self.pending_trivia().iter().any(|t| match t.kind {
            SyntaxKind::Newline | SyntaxKind::ConditionalMarker => true,
            SyntaxKind::BlockComment => t.text.contains('\n'),
            _ => false,
        })
    }

    fn flush_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.token(token.kind, &token.text);
            self.pos += 1;
        }
    }

    fn bump(&mut self) {
        self.flush_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind, &token.text);
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind);
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind);
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn bump_as_error(&mut self) {
        self.start_node(SyntaxKind::Error);
        self.bump();
        self.finish_node();
    }

    /// Bump a parenthesised or bracketed group including nested groups
    fn bump_balanced_group(&mut self) {
        let (open, close) = match self.current() {
            Some(SyntaxKind::LParen) => (SyntaxKind::LParen, SyntaxKind::RParen),
            Some(SyntaxKind::LBracket) => (SyntaxKind::LBracket, SyntaxKind::RBracket),
            _ => return,
        };
        let mut depth = 0usize;
        while let Some(kind) = self.current() {
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth -= 1;
            }
            self.bump();
            if depth == 0 {
                break;
            }
        }
    }

    fn at_name(&self) -> bool {
        matches!(self.current(), Some(k) if k == SyntaxKind::Ident || k.is_keyword())
    }

    // ------------------------------------------------------------------
    // Statements and declarations
    // ------------------------------------------------------------------

    fn parse_source_file(&mut self) {
        self.builder.start_node(SyntaxKind::SourceFile);
        while !self.at_end() {
            self.parse_statement_with_progress();
        }
        self.flush_trivia();
        self.builder.finish_node();
    }

    fn parse_statement_with_progress(&mut self) {
        let before = self.pos;
        self.parse_statement();
        if self.pos == before && !self.at_end() {
            self.bump_as_error();
        }
    }

    fn parse_statement(&mut self) {
        if self.at_decl_start() {
            self.parse_declaration();
            return;
        }
        match self.current() {
            Some(SyntaxKind::Semicolon) => self.bump(),
            Some(SyntaxKind::ReturnKw) => self.parse_return(),
            Some(SyntaxKind::IfKw) => self.parse_if(),
            Some(SyntaxKind::GuardKw) => self.parse_guard(),
            Some(SyntaxKind::WhileKw) => self.parse_while(),
            Some(SyntaxKind::ForKw) => self.parse_for(),
            Some(SyntaxKind::SwitchKw) => self.parse_switch(),
            Some(_) if self.at_expr_start() => self.parse_expr(Restrictions::default()),
            Some(_) => self.bump_as_error(),
            None => {}
        }
    }

    fn is_modifier_at(&self, n: usize) -> bool {
        self.nth(n) == Some(SyntaxKind::Ident) && MODIFIERS.contains(&self.nth_text(n))
    }

    fn at_decl_start(&self) -> bool {
        let mut n = 0;
        loop {
            match self.nth(n) {
                Some(SyntaxKind::Attribute) => return true,
                Some(SyntaxKind::Ident) if self.is_modifier_at(n) => {
                    // `private(set)`
                    n += if self.nth(n + 1) == Some(SyntaxKind::LParen) { 4 } else { 1 };
                }
                Some(SyntaxKind::ClassKw)
                    if self.nth(n + 1).is_some_and(|k| k.is_decl_keyword()) =>
                {
                    n += 1
                }
                Some(kind) => return kind.is_decl_keyword(),
                None => return false,
            }
        }
    }

    fn parse_declaration(&mut self) {
        let cp = self.checkpoint();
        if !self.current().is_some_and(|k| k.is_decl_keyword())
            || (self.at(SyntaxKind::ClassKw)
                && self.nth(1).is_some_and(|k| k.is_decl_keyword()))
        {
            self.parse_modifiers();
        }

        match self.current() {
            Some(SyntaxKind::FuncKw) => self.parse_function(cp),
            Some(SyntaxKind::InitKw) => self.parse_initializer(cp),
            Some(SyntaxKind::SubscriptKw) => self.parse_subscript(cp),
            Some(
                SyntaxKind::ProtocolKw
                | SyntaxKind::StructKw
                | SyntaxKind::ClassKw
                | SyntaxKind::EnumKw
                | SyntaxKind::ExtensionKw,
            ) => self.parse_type_decl(cp),
            Some(SyntaxKind::VarKw | SyntaxKind::LetKw) => self.parse_variable(cp),
            Some(SyntaxKind::ImportKw) => self.parse_import(cp),
            Some(SyntaxKind::TypealiasKw) => self.parse_typealias(cp),
            Some(SyntaxKind::CaseKw) => self.parse_enum_case(cp),
            _ => {
                // Modifiers without a declaration
                self.start_node_at(cp, SyntaxKind::Error);
                self.finish_node();
            }
        }
    }

    fn parse_modifiers(&mut self) {
        self.start_node(SyntaxKind::Modifiers);
        loop {
            match self.current() {
                Some(SyntaxKind::Attribute) => self.parse_attribute(),
                Some(SyntaxKind::Ident) if self.is_modifier_at(0) => {
                    self.bump();
                    if self.at(SyntaxKind::LParen) && !self.trivia_before_current() {
                        self.bump_balanced_group();
                    }
                }
                Some(SyntaxKind::ClassKw)
                    if self.nth(1).is_some_and(|k| k.is_decl_keyword()) =>
                {
                    self.bump()
                }
                _ => break,
            }
        }
        self.finish_node();
    }

    fn parse_attribute(&mut self) {
        self.start_node(SyntaxKind::AttributeNode);
        self.bump();
        if self.at(SyntaxKind::LParen) && !self.trivia_before_current() {
            self.bump_balanced_group();
        }
        self.finish_node();
    }

    fn parse_function(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SyntaxKind::FunctionDecl);
        self.bump(); // func

        if self.at_name() {
            self.bump();
        } else {
            // Operator functions: `static func == (lhs: A, rhs: A) -> Bool`
            while self.current().is_some_and(|k| k.is_operator_part()) {
                self.bump();
            }
        }
        if self.at(SyntaxKind::LAngle) {
            self.parse_generic_params();
        }
        self.parse_function_signature();
        self.skip_where_clause();
        if self.at(SyntaxKind::LBrace) {
            self.parse_code_block();
        }
        self.finish_node();
    }

    fn parse_initializer(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SyntaxKind::InitializerDecl);
        self.bump(); // init
        if matches!(self.current(), Some(SyntaxKind::Question | SyntaxKind::Bang))
            && !self.trivia_before_current()
        {
            self.bump();
        }
        if self.at(SyntaxKind::LAngle) {
            self.parse_generic_params();
        }
        self.parse_function_signature();
        self.skip_where_clause();
        if self.at(SyntaxKind::LBrace) {
            self.parse_code_block();
        }
        self.finish_node();
    }

    fn parse_subscript(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SyntaxKind::SubscriptDecl);
        self.bump(); // subscript
        if self.at(SyntaxKind::LAngle) {
            self.parse_generic_params();
        }
        if self.at(SyntaxKind::LParen) {
            self.parse_parameter_clause();
        }
        if self.at(SyntaxKind::Arrow) {
            self.parse_return_clause();
        }
        self.skip_where_clause();
        if self.at(SyntaxKind::LBrace) {
            self.parse_code_block();
        }
        self.finish_node();
    }

    fn parse_function_signature(&mut self) {
        self.start_node(SyntaxKind::FunctionSignature);
        if self.at(SyntaxKind::LParen) {
            self.parse_parameter_clause();
        }
        self.parse_effect_specifiers();
        if self.at(SyntaxKind::Arrow) {
            self.parse_return_clause();
        }
        self.finish_node();
    }

    fn parse_effect_specifiers(&mut self) {
        while matches!(
            self.current(),
            Some(SyntaxKind::AsyncKw | SyntaxKind::ThrowsKw | SyntaxKind::RethrowsKw)
        ) {
            self.bump();
            // Typed throws: `throws(MyError)`
            if self.at(SyntaxKind::LParen) && !self.trivia_before_current() {
                self.bump_balanced_group();
            }
        }
    }

    fn parse_return_clause(&mut self) {
        self.start_node(SyntaxKind::ReturnClause);
        self.bump(); // ->
        self.parse_type();
        self.finish_node();
    }

    fn parse_parameter_clause(&mut self) {
        self.start_node(SyntaxKind::ParameterClause);
        self.bump(); // (
        while !self.at_end() && !self.at(SyntaxKind::RParen) {
            if self.at(SyntaxKind::Comma) {
                self.bump();
                continue;
            }
            if matches!(self.current(), Some(SyntaxKind::RBrace | SyntaxKind::LBrace)) {
                break;
            }
            self.parse_parameter();
        }
        self.expect(SyntaxKind::RParen);
        self.finish_node();
    }

    fn parse_parameter(&mut self) {
        self.start_node(SyntaxKind::Parameter);
        let before = self.pos;

        while self.at(SyntaxKind::Attribute) {
            self.parse_attribute();
        }
        // External label and internal name
        for _ in 0..2 {
            if self.at_name() {
                self.bump();
            }
        }
        if self.expect(SyntaxKind::Colon) {
            self.parse_type();
            if self.at(SyntaxKind::Operator) && self.nth_text(0) == "..." {
                self.bump();
            }
        }
        if self.expect(SyntaxKind::Equals) {
            self.parse_expr(Restrictions::default());
        }

        if self.pos == before {
            self.bump_as_error();
        }
        self.finish_node();
    }

    fn parse_generic_params(&mut self) {
        self.start_node(SyntaxKind::GenericParams);
        self.bump(); // <
        while !self.at_end() && !self.at(SyntaxKind::RAngle) {
            match self.current() {
                Some(SyntaxKind::Comma) | Some(SyntaxKind::Ident) => self.bump(),
                Some(SyntaxKind::Colon) => {
                    self.bump();
                    self.parse_type();
                }
                Some(SyntaxKind::LBrace) | Some(SyntaxKind::LParen) => break,
                _ => self.bump_as_error(),
            }
        }
        self.expect(SyntaxKind::RAngle);
        self.finish_node();
    }

    /// `where T: Equatable` constraints are kept as plain tokens
    fn skip_where_clause(&mut self) {
        if !self.at_word("where") {
            return;
        }
        self.bump();
        while !self.at_end() && !self.at(SyntaxKind::LBrace) && !self.newline_before_current() {
            self.bump();
        }
    }

    fn parse_code_block(&mut self) {
        self.start_node(SyntaxKind::CodeBlock);
        self.bump(); // {
        while !self.at_end() && !self.at(SyntaxKind::RBrace) {
            self.parse_statement_with_progress();
        }
        self.expect(SyntaxKind::RBrace);
        self.finish_node();
    }

    fn parse_type_decl(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SyntaxKind::TypeDecl);
        self.bump(); // protocol / struct / class / enum / extension

        if self.at_name() {
            self.bump();
            while self.at(SyntaxKind::Dot) && self.nth(1) == Some(SyntaxKind::Ident) {
                self.bump();
                self.bump();
            }
        }
        if self.at(SyntaxKind::LAngle) {
            self.parse_generic_params();
        }
        if self.at(SyntaxKind::Colon) {
            self.start_node(SyntaxKind::InheritanceClause);
            self.bump();
            self.parse_type();
            while self.expect(SyntaxKind::Comma) {
                self.parse_type();
            }
            self.finish_node();
        }
        self.skip_where_clause();
        if self.at(SyntaxKind::LBrace) {
            self.parse_code_block();
        }
        self.finish_node();
    }

    fn parse_variable(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SyntaxKind::VariableDecl);
        self.bump(); // var / let

        loop {
            match self.current() {
                Some(SyntaxKind::LParen) => self.bump_balanced_group(),
                Some(_) if self.at_name() => self.bump(),
                _ => {}
            }
            if self.at(SyntaxKind::Colon) {
                self.start_node(SyntaxKind::TypeAnnotation);
                self.bump();
                self.parse_type();
                self.finish_node();
            }
            if self.at(SyntaxKind::Equals) {
                self.start_node(SyntaxKind::Initializer);
                self.bump();
                self.parse_expr(Restrictions::default());
                self.finish_node();
            }
            if self.at(SyntaxKind::LBrace) && !self.newline_before_current() {
                // Computed property or observers
                self.parse_code_block();
            }
            if !self.expect(SyntaxKind::Comma) {
                break;
            }
        }
        self.finish_node();
    }

    fn parse_import(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SyntaxKind::ImportDecl);
        self.bump(); // import
        if self.current().is_some_and(|k| k.is_decl_keyword()) {
            self.bump();
        }
        if self.at_name() {
            self.bump();
            while self.at(SyntaxKind::Dot) && !self.newline_before_current() {
                self.bump();
                if self.at_name() {
                    self.bump();
                }
            }
        }
        self.finish_node();
    }

    fn parse_typealias(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SyntaxKind::TypealiasDecl);
        self.bump(); // typealias
        if self.at_name() {
            self.bump();
        }
        if self.at(SyntaxKind::LAngle) {
            self.parse_generic_params();
        }
        if self.expect(SyntaxKind::Equals) {
            self.parse_type();
        }
        self.finish_node();
    }

    fn parse_enum_case(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SyntaxKind::EnumCaseDecl);
        self.bump(); // case
        loop {
            if self.at_name() {
                self.bump();
            }
            if self.at(SyntaxKind::LParen) {
                self.parse_tuple_type();
            }
            if self.expect(SyntaxKind::Equals) {
                self.parse_expr(Restrictions::default());
            }
            if !self.expect(SyntaxKind::Comma) {
                break;
            }
        }
        self.finish_node();
    }

    fn parse_return(&mut self) {
        self.start_node(SyntaxKind::ReturnStmt);
        self.bump(); // return
        if !self.newline_before_current() && self.at_expr_start() {
            self.parse_expr(Restrictions::default());
        }
        self.finish_node();
    }

    fn parse_condition_list(&mut self) {
        loop {
            match self.current() {
                Some(SyntaxKind::LetKw | SyntaxKind::VarKw | SyntaxKind::CaseKw) => {
                    self.bump();
                    while !self.at_end()
                        && !matches!(
                            self.current(),
                            Some(SyntaxKind::Equals | SyntaxKind::Comma | SyntaxKind::LBrace)
                        )
                        && !self.at(SyntaxKind::ElseKw)
                    {
                        if matches!(self.current(), Some(SyntaxKind::LParen | SyntaxKind::LBracket)) {
                            self.bump_balanced_group();
                        } else {
                            self.bump();
                        }
                    }
                    if self.expect(SyntaxKind::Equals) {
                        self.parse_expr(CONDITION);
                    }
                }
                Some(_) if self.at_expr_start() => self.parse_expr(CONDITION),
                _ => break,
            }
            if !self.expect(SyntaxKind::Comma) {
                break;
            }
        }
    }

    fn parse_if(&mut self) {
        self.start_node(SyntaxKind::IfStmt);
        self.bump(); // if
        self.parse_condition_list();
        if self.at(SyntaxKind::LBrace) {
            self.parse_code_block();
        }
        if self.at(SyntaxKind::ElseKw) {
            self.start_node(SyntaxKind::ElseClause);
            self.bump();
            if self.at(SyntaxKind::IfKw) {
                self.parse_if();
            } else if self.at(SyntaxKind::LBrace) {
                self.parse_code_block();
            }
            self.finish_node();
        }
        self.finish_node();
    }

    fn parse_guard(&mut self) {
        self.start_node(SyntaxKind::GuardStmt);
        self.bump(); // guard
        self.parse_condition_list();
        self.expect(SyntaxKind::ElseKw);
        if self.at(SyntaxKind::LBrace) {
            self.parse_code_block();
        }
        self.finish_node();
    }

    fn parse_while(&mut self) {
        self.start_node(SyntaxKind::WhileStmt);
        self.bump(); // while
        self.parse_condition_list();
        if self.at(SyntaxKind::LBrace) {
            self.parse_code_block();
        }
        self.finish_node();
    }

    fn parse_for(&mut self) {
        self.start_node(SyntaxKind::ForStmt);
        self.bump(); // for
        while !self.at_end() && !self.at(SyntaxKind::InKw) && !self.at(SyntaxKind::LBrace) {
            self.bump();
        }
        if self.expect(SyntaxKind::InKw) {
            self.parse_expr(CONDITION);
        }
        if self.at_word("where") {
            self.bump();
            self.parse_expr(CONDITION);
        }
        if self.at(SyntaxKind::LBrace) {
            self.parse_code_block();
        }
        self.finish_node();
    }

    fn parse_switch(&mut self) {
        self.start_node(SyntaxKind::SwitchStmt);
        self.bump(); // switch
        if self.at_expr_start() {
            self.parse_expr(CONDITION);
        }
        if self.expect(SyntaxKind::LBrace) {
            while !self.at_end() && !self.at(SyntaxKind::RBrace) {
                if matches!(self.current(), Some(SyntaxKind::CaseKw | SyntaxKind::DefaultKw)) {
                    self.parse_switch_case();
                } else {
                    self.parse_statement_with_progress();
                }
            }
            self.expect(SyntaxKind::RBrace);
        }
        self.finish_node();
    }

    fn parse_switch_case(&mut self) {
        self.start_node(SyntaxKind::SwitchCase);
        self.bump(); // case / default
        while !self.at_end() && !self.at(SyntaxKind::Colon) && !self.at(SyntaxKind::RBrace) {
            if matches!(self.current(), Some(SyntaxKind::LParen | SyntaxKind::LBracket)) {
                self.bump_balanced_group();
            } else {
                self.bump();
            }
        }
        self.expect(SyntaxKind::Colon);
        while !self.at_end()
            && !matches!(
                self.current(),
                Some(SyntaxKind::CaseKw | SyntaxKind::DefaultKw | SyntaxKind::RBrace)
            )
        {
            self.parse_statement_with_progress();
        }
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn at_type_start(&self) -> bool {
        matches!(
            self.current(),
            Some(
                SyntaxKind::Ident
                    | SyntaxKind::LParen
                    | SyntaxKind::LBracket
                    | SyntaxKind::Attribute
            )
        )
    }

    fn parse_type(&mut self) {
        if !self.at_type_start() {
            return;
        }
        let cp = self.checkpoint();

        match self.current() {
            Some(SyntaxKind::Attribute) => {
                self.start_node(SyntaxKind::AttributedType);
                self.parse_attribute();
                self.parse_type();
                self.finish_node();
                return;
            }
            Some(SyntaxKind::Ident) if TYPE_SPECIFIERS.contains(&self.nth_text(0)) => {
                self.start_node(SyntaxKind::AttributedType);
                self.bump();
                self.parse_type();
                self.finish_node();
                return;
            }
            Some(SyntaxKind::Ident) => self.parse_simple_type(),
            Some(SyntaxKind::LParen) => self.parse_tuple_type(),
            Some(SyntaxKind::LBracket) => self.parse_collection_type(),
            _ => return,
        }

        loop {
            match self.current() {
                Some(SyntaxKind::Question) if !self.trivia_before_current() => {
                    self.start_node_at(cp, SyntaxKind::OptionalType);
                    self.bump();
                    self.finish_node();
                }
                Some(SyntaxKind::Bang) if !self.trivia_before_current() => {
                    self.start_node_at(cp, SyntaxKind::ImplicitlyUnwrappedType);
                    self.bump();
                    self.finish_node();
                }
                Some(SyntaxKind::Dot) if self.nth(1) == Some(SyntaxKind::Ident) => {
                    self.start_node_at(cp, SyntaxKind::MemberType);
                    self.bump();
                    self.bump();
                    if self.at(SyntaxKind::LAngle) && !self.trivia_before_current() {
                        self.parse_generic_args();
                    }
                    self.finish_node();
                }
                _ => break,
            }
        }

        let effects_then_arrow = matches!(
            self.current(),
            Some(SyntaxKind::AsyncKw | SyntaxKind::ThrowsKw)
        ) && (1..3).any(|n| self.nth(n) == Some(SyntaxKind::Arrow));
        if self.at(SyntaxKind::Arrow) || effects_then_arrow {
            self.start_node_at(cp, SyntaxKind::FunctionType);
            self.parse_effect_specifiers();
            self.bump(); // ->
            self.parse_type();
            self.finish_node();
        }
    }

    fn parse_simple_type(&mut self) {
        self.start_node(SyntaxKind::SimpleType);
        self.bump();
        if self.at(SyntaxKind::LAngle) && !self.trivia_before_current() {
            self.parse_generic_args();
        }
        self.finish_node();
    }

    fn parse_generic_args(&mut self) {
        self.start_node(SyntaxKind::GenericArgs);
        self.bump(); // <
        while !self.at_end() && !self.at(SyntaxKind::RAngle) {
            if self.at(SyntaxKind::Comma) {
                self.bump();
            } else if self.at_type_start() {
                self.parse_type();
            } else {
                break;
            }
        }
        self.expect(SyntaxKind::RAngle);
        self.finish_node();
    }

    fn parse_tuple_type(&mut self) {
        self.start_node(SyntaxKind::TupleType);
        self.bump(); // (
        while !self.at_end() && !self.at(SyntaxKind::RParen) {
            if self.at(SyntaxKind::Comma) {
                self.bump();
                continue;
            }
            let before = self.pos;
            self.start_node(SyntaxKind::TupleTypeElement);
            // Labelled element: `name: Type` or `_ name: Type`
            if self.at_name() && self.nth(1) == Some(SyntaxKind::Colon) {
                self.bump();
                self.bump();
            } else if self.at_name()
                && self.nth(1) == Some(SyntaxKind::Ident)
                && self.nth(2) == Some(SyntaxKind::Colon)
            {
                self.bump();
                self.bump();
                self.bump();
            }
            self.parse_type();
            if self.at(SyntaxKind::Operator) && self.nth_text(0) == "..." {
                self.bump();
            }
            if self.pos == before {
                self.bump_as_error();
            }
            self.finish_node();
            if matches!(self.current(), Some(SyntaxKind::LBrace | SyntaxKind::RBrace)) {
                break;
            }
        }
        self.expect(SyntaxKind::RParen);
        self.finish_node();
    }

    fn parse_collection_type(&mut self) {
        let cp = self.checkpoint();
        self.bump(); // [
        self.parse_type();
        let kind = if self.expect(SyntaxKind::Colon) {
            self.parse_type();
            SyntaxKind::DictionaryType
        } else {
            SyntaxKind::ArrayType
        };
        self.expect(SyntaxKind::RBracket);
        self.start_node_at(cp, kind);
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn at_expr_start(&self) -> bool {
        match self.current() {
            Some(
                SyntaxKind::Ident
                | SyntaxKind::NumberLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::TrueKw
                | SyntaxKind::FalseKw
                | SyntaxKind::NilKw
                | SyntaxKind::LParen
                | SyntaxKind::LBracket
                | SyntaxKind::LBrace
                | SyntaxKind::TryKw
                | SyntaxKind::AwaitKw
                | SyntaxKind::Bang
                | SyntaxKind::Operator
                | SyntaxKind::InitKw,
            ) => true,
            Some(SyntaxKind::Dot) => self.nth(1).is_some_and(|k| k == SyntaxKind::Ident || k.is_keyword()),
            _ => false,
        }
    }

    fn at_binary_operator(&self) -> bool {
        match self.current() {
            Some(SyntaxKind::Operator | SyntaxKind::LAngle | SyntaxKind::RAngle | SyntaxKind::Equals) => {
                true
            }
            Some(SyntaxKind::Ident) => {
                matches!(self.nth_text(0), "as" | "is") && !self.newline_before_current()
            }
            _ => false,
        }
    }

    fn parse_expr(&mut self, restrictions: Restrictions) {
        let cp = self.checkpoint();
        if !self.parse_unary(restrictions) {
            return;
        }

        loop {
            if self.at(SyntaxKind::Question) && self.trivia_before_current() {
                self.start_node_at(cp, SyntaxKind::TernaryExpr);
                self.bump();
                self.parse_expr(restrictions);
                if self.expect(SyntaxKind::Colon) {
                    self.parse_expr(restrictions);
                }
                self.finish_node();
                break;
            }
            if !self.at_binary_operator() {
                break;
            }

            self.start_node_at(cp, SyntaxKind::BinaryExpr);
            if self.at(SyntaxKind::Ident) {
                // Casts: `x as? T`, `x is T`
                self.bump();
                if matches!(self.current(), Some(SyntaxKind::Question | SyntaxKind::Bang))
                    && !self.trivia_before_current()
                {
                    self.bump();
                }
                self.parse_type();
            } else {
                self.bump();
                // Operators split by the lexer (`>=`, `<=`) are glued back together
                while self.current().is_some_and(|k| k.is_operator_part())
                    && !self.trivia_before_current()
                {
                    self.bump();
                }
                self.parse_unary(restrictions);
            }
            self.finish_node();
        }
    }

    fn parse_unary(&mut self, restrictions: Restrictions) -> bool {
        match self.current() {
            Some(SyntaxKind::Operator | SyntaxKind::Bang) => {
                self.start_node(SyntaxKind::PrefixExpr);
                self.bump();
                self.parse_unary(restrictions);
                self.finish_node();
                true
            }
            Some(SyntaxKind::TryKw | SyntaxKind::AwaitKw) => {
                self.start_node(SyntaxKind::TryExpr);
                self.bump();
                if matches!(self.current(), Some(SyntaxKind::Question | SyntaxKind::Bang))
                    && !self.trivia_before_current()
                {
                    self.bump();
                }
                self.parse_expr(restrictions);
                self.finish_node();
                true
            }
            _ => self.parse_postfix(restrictions),
        }
    }

    fn parse_postfix(&mut self, restrictions: Restrictions) -> bool {
        let cp = self.checkpoint();
        if !self.parse_primary() {
            return false;
        }

        loop {
            match self.current() {
                Some(SyntaxKind::Dot)
                    if self.nth(1).is_some_and(|k| {
                        k == SyntaxKind::Ident || k == SyntaxKind::NumberLiteral || k.is_keyword()
                    }) =>
                {
                    self.start_node_at(cp, SyntaxKind::MemberExpr);
                    self.bump();
                    self.bump();
                    self.finish_node();
                }
                Some(SyntaxKind::LParen) if !self.newline_before_current() => {
                    self.start_node_at(cp, SyntaxKind::CallExpr);
                    self.parse_argument_list(SyntaxKind::RParen);
                    if self.at(SyntaxKind::LBrace)
                        && !restrictions.no_trailing_closure
                        && !self.newline_before_current()
                    {
                        self.parse_closure();
                    }
                    self.finish_node();
                }
                Some(SyntaxKind::LBracket) if !self.trivia_before_current() => {
                    self.start_node_at(cp, SyntaxKind::CallExpr);
                    self.parse_argument_list(SyntaxKind::RBracket);
                    self.finish_node();
                }
                Some(SyntaxKind::LBrace)
                    if !restrictions.no_trailing_closure && !self.newline_before_current() =>
                {
                    self.start_node_at(cp, SyntaxKind::CallExpr);
                    self.parse_closure();
                    self.finish_node();
                }
                Some(SyntaxKind::Bang | SyntaxKind::Question) if !self.trivia_before_current() => {
                    self.start_node_at(cp, SyntaxKind::PostfixExpr);
                    self.bump();
                    self.finish_node();
                }
                _ => break,
            }
        }
        true
    }

    fn parse_primary(&mut self) -> bool {
        match self.current() {
            Some(SyntaxKind::Ident | SyntaxKind::InitKw) => {
                self.start_node(SyntaxKind::IdentExpr);
                self.bump();
                self.finish_node();
            }
            Some(
                SyntaxKind::NumberLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::TrueKw
                | SyntaxKind::FalseKw
                | SyntaxKind::NilKw,
            ) => {
                self.start_node(SyntaxKind::LiteralExpr);
                self.bump();
                self.finish_node();
            }
            Some(SyntaxKind::LParen) => {
                self.start_node(SyntaxKind::TupleExpr);
                self.parse_arguments(SyntaxKind::RParen);
                self.finish_node();
            }
            Some(SyntaxKind::LBracket) => self.parse_array(),
            Some(SyntaxKind::LBrace) => self.parse_closure(),
            Some(SyntaxKind::Dot) => {
                // Implicit member: `.some(x)`
                self.start_node(SyntaxKind::MemberExpr);
                self.bump();
                self.bump();
                self.finish_node();
            }
            _ => return false,
        }
        true
    }

    fn parse_argument_list(&mut self, close: SyntaxKind) {
        self.start_node(SyntaxKind::ArgumentList);
        self.parse_arguments(close);
        self.finish_node();
    }

    /// Opening delimiter, labelled arguments and closing delimiter
    fn parse_arguments(&mut self, close: SyntaxKind) {
        self.bump(); // ( or [
        while !self.at_end() && !self.at(close) {
            if self.at(SyntaxKind::Comma) {
                self.bump();
                continue;
            }
            if matches!(self.current(), Some(SyntaxKind::RBrace | SyntaxKind::RParen | SyntaxKind::RBracket)) {
                break;
            }
            self.start_node(SyntaxKind::Argument);
            if self.at_name() && self.nth(1) == Some(SyntaxKind::Colon) {
                self.bump();
                self.bump();
            }
            if self.at_expr_start() {
                self.parse_expr(Restrictions::default());
            } else if !self.at(close) && !self.at(SyntaxKind::Comma) {
                self.bump_as_error();
            }
            self.finish_node();
        }
        self.expect(close);
    }

    fn parse_array(&mut self) {
        self.start_node(SyntaxKind::ArrayExpr);
        self.bump(); // [
        while !self.at_end() && !self.at(SyntaxKind::RBracket) {
            match self.current() {
                Some(SyntaxKind::Comma | SyntaxKind::Colon) => self.bump(),
                Some(_) if self.at_expr_start() => self.parse_expr(Restrictions::default()),
                Some(SyntaxKind::RBrace | SyntaxKind::RParen) => break,
                _ => self.bump_as_error(),
            }
        }
        self.expect(SyntaxKind::RBracket);
        self.finish_node();
    }

    fn parse_closure(&mut self) {
        self.start_node(SyntaxKind::ClosureExpr);
        self.bump(); // {
        if self.closure_has_signature() {
            self.parse_closure_signature();
        }
        while !self.at_end() && !self.at(SyntaxKind::RBrace) {
            self.parse_statement_with_progress();
        }
        self.expect(SyntaxKind::RBrace);
        self.finish_node();
    }

    /// Look ahead for `in` before anything that can only start a statement
    fn closure_has_signature(&self) -> bool {
        let mut depth = 0usize;
        let significant = self.tokens[self.pos..]
            .iter()
            .map(|t| t.kind)
            .filter(|k| !k.is_trivia());
        for kind in significant {
            match kind {
                SyntaxKind::InKw if depth == 0 => return true,
                SyntaxKind::LParen | SyntaxKind::LBracket | SyntaxKind::LAngle => depth += 1,
                SyntaxKind::RParen | SyntaxKind::RBracket | SyntaxKind::RAngle => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                SyntaxKind::Ident
                | SyntaxKind::Comma
                | SyntaxKind::Colon
                | SyntaxKind::Arrow
                | SyntaxKind::Question
                | SyntaxKind::Bang
                | SyntaxKind::Dot
                | SyntaxKind::Attribute
                | SyntaxKind::ThrowsKw
                | SyntaxKind::AsyncKw => {}
                SyntaxKind::LBrace | SyntaxKind::RBrace => return false,
                _ if depth > 0 => {}
                _ => return false,
            }
        }
        false
    }

    fn parse_closure_signature(&mut self) {
        self.start_node(SyntaxKind::ClosureSignature);
        while self.at(SyntaxKind::Attribute) {
            self.parse_attribute();
        }
        if self.at(SyntaxKind::LBracket) {
            // Capture list
            self.bump_balanced_group();
        }
        if self.at(SyntaxKind::LParen) {
            self.parse_parameter_clause();
        } else if self.at(SyntaxKind::Ident) {
            self.start_node(SyntaxKind::ClosureParams);
            while self.at(SyntaxKind::Ident) {
                self.bump();
                if !self.expect(SyntaxKind::Comma) {
                    break;
                }
            }
            self.finish_node();
        }
        self.parse_effect_specifiers();
        if self.at(SyntaxKind::Arrow) {
            self.parse_return_clause();
        }
        self.expect(SyntaxKind::InKw);
        self.finish_node();
    }
}
