//! Recursive-descent parser over a [`lusush_lexer::Lexer`], producing
//! [`lusush_ast::Node`] trees per the grammar in spec.md §4.3.
//!
//! The parser owns no incremental-reparse or semantic-index state — it is
//! a single pass from tokens to a tree, consulting [`SymbolTable`] and
//! `lusush-arith` at the two points the grammar actually needs them (name
//! resolution is out of scope; arithmetic constructs are evaluated-as-parsed
//! so a malformed `$((...))` is diagnosed immediately rather than deferred
//! to a runtime this crate doesn't have). A [`BudgetTracker`] bounds recursion so
//! pathological input can't blow the native stack, and diagnostics are
//! reported through the caller's [`DiagnosticSink`] rather than aborting
//! the whole parse on the first error — matching spec.md §5's "a SYNTAX
//! error at statement 2 of 3 still lets the other two parse" contract.

mod grammar;

use lusush_alias::AliasMap;
use lusush_ast::{Node, NodeKind};
use lusush_error::{BudgetTracker, DiagnosticSink, ParseBudget, ParseError};
use lusush_lexer::Lexer;
use lusush_position::SourceLocation;
use lusush_symtab::SymbolTable;
use lusush_token::{Token, TokenKind};

/// Parse a complete line (or multi-line script fragment) of source text
/// into a `List` node, using the default [`ParseBudget`] and no
/// cancellation hook. Every statement-level syntax error is reported to
/// `diagnostics` and recovered from; this only returns `Err` for a
/// condition recovery cannot work around (recursion limit, resource
/// exhaustion, or cancellation).
pub fn parse_program(
    source: &str,
    alias_map: &AliasMap,
    symtab: &mut SymbolTable,
    diagnostics: &mut dyn DiagnosticSink,
) -> Result<Node, ParseError> {
    Parser::new(
        source,
        alias_map,
        symtab,
        diagnostics,
        ParseBudget::default(),
        None,
    )
    .parse()
}

/// A function checked at statement boundaries; returning `true` aborts the
/// parse with [`ParseError::Cancelled`] (spec.md §5, cooperative
/// cancellation). Never consulted mid-expression.
pub type CancellationCheck<'a> = &'a dyn Fn() -> bool;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    symtab: &'a mut SymbolTable,
    diagnostics: &'a mut dyn DiagnosticSink,
    budget: ParseBudget,
    tracker: BudgetTracker,
    cancel: Option<CancellationCheck<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(
        source: &str,
        alias_map: &'a AliasMap,
        symtab: &'a mut SymbolTable,
        diagnostics: &'a mut dyn DiagnosticSink,
        budget: ParseBudget,
        cancel: Option<CancellationCheck<'a>>,
    ) -> Self {
        Parser {
            lexer: Lexer::new(source.to_string(), alias_map),
            symtab,
            diagnostics,
            budget,
            tracker: BudgetTracker::new(),
            cancel,
        }
    }

    /// `complete_commands`: zero or more `complete_command`s, each
    /// terminated by a separator or EOF, flattened into one `List`.
    pub fn parse(&mut self) -> Result<Node, ParseError> {
        self.parse_compound_list(&[])
    }

    /// Consume a trailing `;`/`&`/NEWLINE after one `and_or`, wrapping in
    /// `Background` for `&`. Absence of any separator (end of input) is
    /// fine — the grammar treats EOF as an implicit terminator.
    fn apply_trailing_separator(&mut self, node: Node) -> Result<Node, ParseError> {
        match self.peek().kind {
            TokenKind::Amp => {
                let location = self.peek().location;
                self.advance();
                Ok(Node::new(NodeKind::Background, location).with_children(vec![node]))
            }
            TokenKind::Semi | TokenKind::Newline => {
                self.advance();
                Ok(node)
            }
            _ => Ok(node),
        }
    }

    fn skip_newlines(&mut self) {
        while self.peek().kind == TokenKind::Newline {
            self.advance();
        }
    }

    fn check_cancelled(&self) -> Result<bool, ParseError> {
        Ok(self.cancel.map(|f| f()).unwrap_or(false))
    }

    fn report(&mut self, err: &ParseError) {
        self.tracker.record_error();
        self.diagnostics.report(err.to_diagnostic());
    }

    /// Recover by discarding tokens up to the next list boundary (`;`,
    /// `&`, NEWLINE, EOF, or one of `terminators`) so the remaining
    /// statements still get a chance to parse (spec.md §5). `terminators`
    /// lets a nested `compound_list` recover without eating the keyword
    /// that closes its enclosing construct (e.g. `fi`, `done`).
    fn synchronize_until(&mut self, terminators: &[TokenKind]) -> Result<(), ParseError> {
        let mut skipped = 0usize;
        loop {
            let kind = self.peek().kind;
            if kind == TokenKind::Eof || terminators.contains(&kind) {
                self.tracker.record_skip(skipped);
                tracing::debug!(skipped, "parser recovered at enclosing terminator");
                return Ok(());
            }
            if kind.is_list_separator() {
                self.advance();
                self.tracker.record_skip(skipped);
                tracing::debug!(skipped, "parser recovered at list boundary");
                return Ok(());
            }
            if self.tracker.skip_would_exceed(&self.budget, skipped + 1) {
                return Err(ParseError::Resource {
                    message: "recovery exceeded token skip budget".into(),
                });
            }
            self.advance();
            skipped += 1;
        }
    }

    // ===== token-stream helpers shared by grammar.rs =====

    fn peek(&mut self) -> &Token {
        self.lexer.peek()
    }

    fn peek_second(&mut self) -> &Token {
        self.lexer.peek_second()
    }

    fn advance(&mut self) -> Token {
        self.lexer.next()
    }

    fn at_eof(&mut self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&mut self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            let token = self.peek().clone();
            Err(ParseError::syntax_expected(
                format!("expected {what}, found {:?} {:?}", token.kind, token.lexeme),
                token.location,
                vec![what.to_string()],
            ))
        }
    }

    fn eval_arith(&mut self, expr: &str, location: SourceLocation) -> Result<i64, ParseError> {
        lusush_arith::eval(expr, self.symtab).map_err(|err| match err {
            ParseError::Arith { message } => ParseError::Arith {
                message: format!("{message} (at {location:?})"),
            },
            other => other,
        })
    }
}
