//! Grammar productions, split out of `lib.rs` to keep token-stream plumbing
//! separate from the statement/expression grammar it drives.
//!
//! Every production here is a method on [`Parser`] so it shares the token
//! helpers, budget tracker, and diagnostics sink defined there.

use crate::Parser;
use lusush_ast::{Node, NodeKind};
use lusush_error::ParseError;
use lusush_heredoc::HeredocQuoting;
use lusush_token::{Token, TokenKind};

/// Placeholder value stamped onto a heredoc redirect's target node at parse
/// time; patched in once the scanner collects the body at the next
/// NEWLINE. `\0` can never appear in a scanned word, so it can't collide
/// with a real leaf produced any other way.
const HEREDOC_PLACEHOLDER: &str = "\0heredoc\0";

fn is_redirect_operator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Less
            | TokenKind::Great
            | TokenKind::DLess
            | TokenKind::DLessDash
            | TokenKind::TLess
            | TokenKind::DGreat
            | TokenKind::LessAmp
            | TokenKind::GreatAmp
            | TokenKind::LessGreat
            | TokenKind::GreatPipe
            | TokenKind::AmpGreat
            | TokenKind::AmpGreatGreat
    )
}

impl<'a> Parser<'a> {
    /// `compound_list`: zero or more separator-terminated `and_or`s,
    /// stopping at EOF or any token in `terminators` (the keyword that
    /// closes whatever construct is calling this, or nothing at the top
    /// level). Heredoc bodies are drained and spliced into the tree
    /// immediately after each NEWLINE a statement consumes, since that is
    /// the earliest point the scanner has collected them.
    pub(crate) fn parse_compound_list(
        &mut self,
        terminators: &[TokenKind],
    ) -> Result<Node, ParseError> {
        let location = self.peek().location;
        let mut statements = Vec::new();
        self.skip_newlines();
        self.patch_pending_heredocs(&mut statements);
        while !terminators.contains(&self.peek().kind) && !self.at_eof() {
            if self.check_cancelled()? {
                return Err(ParseError::Cancelled);
            }
            match self.parse_and_or() {
                Ok(node) => {
                    let node = self.apply_trailing_separator(node)?;
                    statements.push(node);
                    self.patch_pending_heredocs(&mut statements);
                    self.skip_newlines();
                    self.patch_pending_heredocs(&mut statements);
                }
                Err(err) => {
                    self.report(&err);
                    if self.tracker.errors_exhausted(&self.budget) {
                        return Err(err);
                    }
                    self.synchronize_until(terminators)?;
                }
            }
        }
        Ok(Node::new(NodeKind::List, location).with_children(statements))
    }

    /// Drain every heredoc body the scanner has collected so far and patch
    /// each into the earliest not-yet-filled placeholder, in declaration
    /// order (first `<<WORD` seen gets the first body collected).
    fn patch_pending_heredocs(&mut self, statements: &mut [Node]) {
        while let Some((quoting, body)) = self.lexer.take_heredoc_body() {
            if !patch_first_placeholder(statements, quoting, &body) {
                tracing::warn!("heredoc body collected with no matching placeholder redirect");
                break;
            }
        }
    }

    /// `and_or`: `pipeline (('&&'|'||') NEWLINE* pipeline)*`, left-associative.
    fn parse_and_or(&mut self) -> Result<Node, ParseError> {
        let location = self.peek().location;
        let mut left = self.parse_pipeline()?;
        loop {
            let kind = match self.peek().kind {
                TokenKind::AndAnd => NodeKind::LogicalAnd,
                TokenKind::OrOr => NodeKind::LogicalOr,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            let right = self.parse_pipeline()?;
            left = Node::new(kind, location).with_children(vec![left, right]);
        }
        Ok(left)
    }

    /// `pipeline`: optional `!`, then `command ('|'|'|&' NEWLINE* command)*`.
    fn parse_pipeline(&mut self) -> Result<Node, ParseError> {
        let depth_location = self.peek().location;
        if !self.tracker.enter_depth(&self.budget) {
            return Err(ParseError::RecursionLimit {
                location: depth_location,
            });
        }
        let result = (|| {
            let location = self.peek().location;
            let negate = self.check(TokenKind::Bang);
            if negate {
                self.advance();
            }
            let mut commands = vec![self.parse_command()?];
            while self.check(TokenKind::Pipe) || self.check(TokenKind::PipeAmp) {
                self.advance();
                self.skip_newlines();
                commands.push(self.parse_command()?);
            }
            let pipeline = if commands.len() == 1 {
                commands.into_iter().next().expect("len checked above")
            } else {
                Node::new(NodeKind::Pipeline, location).with_children(commands)
            };
            if negate {
                Ok(Node::new(NodeKind::Negate, location).with_children(vec![pipeline]))
            } else {
                Ok(pipeline)
            }
        })();
        self.tracker.exit_depth();
        result
    }

    /// `command`: a `time`/`coproc` prefix, a compound command, a function
    /// definition, or a simple command — dispatched on the next token(s).
    fn parse_command(&mut self) -> Result<Node, ParseError> {
        let depth_location = self.peek().location;
        if !self.tracker.enter_depth(&self.budget) {
            return Err(ParseError::RecursionLimit {
                location: depth_location,
            });
        }
        let result = (|| {
            let kind = self.peek().kind;
            match kind {
                TokenKind::Time => {
                    let location = self.advance().location;
                    let body = self.parse_pipeline()?;
                    Ok(Node::new(NodeKind::Time, location).with_children(vec![body]))
                }
                TokenKind::Coproc => {
                    let location = self.advance().location;
                    let body = self.parse_command()?;
                    Ok(Node::new(NodeKind::Coproc, location).with_children(vec![body]))
                }
                TokenKind::LBrace => self.parse_brace_group(),
                TokenKind::LParen => self.parse_subshell(),
                TokenKind::DLParen => self.parse_arith_command(),
                TokenKind::DLBracket => self.parse_extended_test(),
                TokenKind::If => self.parse_if(),
                TokenKind::While => self.parse_while_or_until(true),
                TokenKind::Until => self.parse_while_or_until(false),
                TokenKind::For => self.parse_for(),
                TokenKind::Case => self.parse_case(),
                TokenKind::Select => self.parse_select(),
                TokenKind::Function => self.parse_function_keyword(),
                TokenKind::Word if self.is_function_definition() => {
                    self.parse_function_name_parens()
                }
                _ => self.parse_simple_command(),
            }
        })();
        self.tracker.exit_depth();
        result
    }

    /// Two-token lookahead for `name '(' ... ')' compound_command`, per
    /// spec.md §9: a `Word` immediately followed by `(` in this position
    /// can only be a function definition, never a simple command (a bare
    /// `(` would instead start a subshell command word).
    fn is_function_definition(&mut self) -> bool {
        self.peek().kind == TokenKind::Word && self.peek_second().kind == TokenKind::LParen
    }

    fn parse_function_keyword(&mut self) -> Result<Node, ParseError> {
        let location = self.expect(TokenKind::Function, "'function'")?.location;
        let name = self.expect(TokenKind::Word, "function name")?;
        if self.check(TokenKind::LParen) {
            self.advance();
            self.expect(TokenKind::RParen, "')'")?;
        }
        self.skip_newlines();
        let body = self.parse_command()?;
        let node = Node::new(NodeKind::Function, location)
            .with_value(name.lexeme.to_string())
            .with_children(vec![body]);
        self.with_trailing_redirects(node)
    }

    fn parse_function_name_parens(&mut self) -> Result<Node, ParseError> {
        let name = self.advance();
        self.expect(TokenKind::LParen, "'('")?;
        self.expect(TokenKind::RParen, "')'")?;
        self.skip_newlines();
        let body = self.parse_command()?;
        let node = Node::new(NodeKind::Function, name.location)
            .with_value(name.lexeme.to_string())
            .with_children(vec![body]);
        self.with_trailing_redirects(node)
    }

    fn parse_brace_group(&mut self) -> Result<Node, ParseError> {
        let location = self.expect(TokenKind::LBrace, "'{'")?.location;
        let body = self.parse_compound_list(&[TokenKind::RBrace])?;
        self.expect(TokenKind::RBrace, "'}'")?;
        let node = Node::new(NodeKind::BraceGroup, location).with_children(vec![body]);
        self.with_trailing_redirects(node)
    }

    fn parse_subshell(&mut self) -> Result<Node, ParseError> {
        let location = self.expect(TokenKind::LParen, "'('")?.location;
        let body = self.parse_compound_list(&[TokenKind::RParen])?;
        self.expect(TokenKind::RParen, "')'")?;
        let node = Node::new(NodeKind::Subshell, location).with_children(vec![body]);
        self.with_trailing_redirects(node)
    }

    /// `if compound_list then compound_list (elif compound_list then
    /// compound_list)* (else compound_list)? fi`, flattened to
    /// `[cond, then, cond, then, ..., else?]` per `NodeKind::If`.
    fn parse_if(&mut self) -> Result<Node, ParseError> {
        let location = self.expect(TokenKind::If, "'if'")?.location;
        let mut children = Vec::new();
        loop {
            let cond = self.parse_compound_list(&[TokenKind::Then])?;
            self.expect(TokenKind::Then, "'then'")?;
            let body =
                self.parse_compound_list(&[TokenKind::Elif, TokenKind::Else, TokenKind::Fi])?;
            children.push(cond);
            children.push(body);
            match self.peek().kind {
                TokenKind::Elif => {
                    self.advance();
                }
                TokenKind::Else => {
                    self.advance();
                    children.push(self.parse_compound_list(&[TokenKind::Fi])?);
                    break;
                }
                _ => break,
            }
        }
        self.expect(TokenKind::Fi, "'fi'")?;
        let node = Node::new(NodeKind::If, location).with_children(children);
        self.with_trailing_redirects(node)
    }

    fn parse_while_or_until(&mut self, is_while: bool) -> Result<Node, ParseError> {
        let (keyword, what, kind) = if is_while {
            (TokenKind::While, "'while'", NodeKind::While)
        } else {
            (TokenKind::Until, "'until'", NodeKind::Until)
        };
        let location = self.expect(keyword, what)?.location;
        let cond = self.parse_compound_list(&[TokenKind::Do])?;
        self.expect(TokenKind::Do, "'do'")?;
        let body = self.parse_compound_list(&[TokenKind::Done])?;
        self.expect(TokenKind::Done, "'done'")?;
        let node = Node::new(kind, location).with_children(vec![cond, body]);
        self.with_trailing_redirects(node)
    }

    /// `for NAME [in word*] term do compound_list done`, or the arithmetic
    /// form `for (( init ; test ; update )) do compound_list done`. The
    /// arithmetic header is scanned as raw text by the lexer's sub-mode, not
    /// evaluated here — each iteration re-evaluates it, which is an
    /// execution-time concern this crate doesn't have.
    fn parse_for(&mut self) -> Result<Node, ParseError> {
        let location = self.expect(TokenKind::For, "'for'")?.location;
        if self.check(TokenKind::DLParen) {
            self.advance();
            let header = self.lexer.scan_arith_body();
            self.consume_list_terminator();
            self.expect(TokenKind::Do, "'do'")?;
            let body = self.parse_compound_list(&[TokenKind::Done])?;
            self.expect(TokenKind::Done, "'done'")?;
            let node = Node::new(NodeKind::ForArith, location)
                .with_value(header)
                .with_children(vec![body]);
            return self.with_trailing_redirects(node);
        }
        let name = self.expect(TokenKind::Word, "loop variable name")?;
        self.skip_newlines();
        let mut words = Vec::new();
        if self.check(TokenKind::In) {
            self.advance();
            while self.check(TokenKind::Word) {
                let token = self.advance();
                words.push(self.word_node(&token));
            }
        }
        self.consume_list_terminator();
        self.expect(TokenKind::Do, "'do'")?;
        let body = self.parse_compound_list(&[TokenKind::Done])?;
        self.expect(TokenKind::Done, "'done'")?;
        let word_list = Node::new(NodeKind::ArrayLiteral, location).with_children(words);
        let node = Node::new(NodeKind::For, location)
            .with_value(name.lexeme.to_string())
            .with_children(vec![word_list, body]);
        self.with_trailing_redirects(node)
    }

    /// `select NAME [in word*] term do compound_list done`; same child
    /// layout as `For`.
    fn parse_select(&mut self) -> Result<Node, ParseError> {
        let location = self.expect(TokenKind::Select, "'select'")?.location;
        let name = self.expect(TokenKind::Word, "loop variable name")?;
        self.skip_newlines();
        let mut words = Vec::new();
        if self.check(TokenKind::In) {
            self.advance();
            while self.check(TokenKind::Word) {
                let token = self.advance();
                words.push(self.word_node(&token));
            }
        }
        self.consume_list_terminator();
        self.expect(TokenKind::Do, "'do'")?;
        let body = self.parse_compound_list(&[TokenKind::Done])?;
        self.expect(TokenKind::Done, "'done'")?;
        let word_list = Node::new(NodeKind::ArrayLiteral, location).with_children(words);
        let node = Node::new(NodeKind::Select, location)
            .with_value(name.lexeme.to_string())
            .with_children(vec![word_list, body]);
        self.with_trailing_redirects(node)
    }

    /// `case word in (pattern('|'pattern)* ')' compound_list term)* esac`.
    fn parse_case(&mut self) -> Result<Node, ParseError> {
        let location = self.expect(TokenKind::Case, "'case'")?.location;
        let scrutinee = self.expect(TokenKind::Word, "case scrutinee")?;
        self.skip_newlines();
        self.expect(TokenKind::In, "'in'")?;
        self.skip_newlines();
        let mut items = Vec::new();
        while !self.check(TokenKind::Esac) && !self.at_eof() {
            items.push(self.parse_case_item()?);
            self.skip_newlines();
        }
        self.expect(TokenKind::Esac, "'esac'")?;
        let node = Node::new(NodeKind::Case, location)
            .with_value(scrutinee.lexeme.to_string())
            .with_children(items);
        self.with_trailing_redirects(node)
    }

    fn parse_case_item(&mut self) -> Result<Node, ParseError> {
        let location = self.peek().location;
        if self.check(TokenKind::LParen) {
            self.advance();
        }
        let mut pattern = String::new();
        loop {
            let token = self.expect(TokenKind::Word, "case pattern")?;
            pattern.push_str(&token.lexeme);
            if self.check(TokenKind::Pipe) {
                self.advance();
                pattern.push('|');
            } else {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        self.skip_newlines();
        let body = self.parse_compound_list(&[
            TokenKind::SemiSemi,
            TokenKind::SemiAmp,
            TokenKind::SemiSemiAmp,
            TokenKind::Esac,
        ])?;
        let terminator = match self.peek().kind {
            TokenKind::SemiSemi => {
                self.advance();
                ";;"
            }
            TokenKind::SemiAmp => {
                self.advance();
                ";&"
            }
            TokenKind::SemiSemiAmp => {
                self.advance();
                ";;&"
            }
            _ => ";;",
        };
        Ok(Node::new(NodeKind::CaseItem, location)
            .with_value(format!("{terminator}|{pattern}"))
            .with_children(vec![body]))
    }

    /// A standalone `((...))` arithmetic command. Pre-expanded immediately
    /// (spec.md §9) so a malformed expression is diagnosed at parse time
    /// rather than deferred to an execution phase this crate lacks.
    fn parse_arith_command(&mut self) -> Result<Node, ParseError> {
        let token = self.expect(TokenKind::DLParen, "'(('")?;
        let expr = self.lexer.scan_arith_body();
        self.eval_arith(&expr, token.location)?;
        let node = Node::new(NodeKind::ArithCmd, token.location).with_value(expr);
        self.with_trailing_redirects(node)
    }

    fn parse_extended_test(&mut self) -> Result<Node, ParseError> {
        let token = self.expect(TokenKind::DLBracket, "'[['")?;
        let expr = self.lexer.scan_test_body();
        let node = Node::new(NodeKind::ExtendedTest, token.location).with_value(expr);
        self.with_trailing_redirects(node)
    }

    /// `simple_command`: leading `AssignmentWord`s, then words and
    /// redirections interleaved in source order. At least one child is
    /// required — an empty simple command is a syntax error.
    fn parse_simple_command(&mut self) -> Result<Node, ParseError> {
        let location = self.peek().location;
        let mut children = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::AssignmentWord => {
                    let token = self.advance();
                    children.push(self.assignment_node(&token)?);
                }
                TokenKind::Word => {
                    let token = self.advance();
                    children.push(self.word_node(&token));
                }
                TokenKind::DollarDLParen => {
                    let dtoken_location = self.advance().location;
                    let expr = self.lexer.scan_arith_body();
                    self.eval_arith(&expr, dtoken_location)?;
                    children.push(Node::new(NodeKind::ArithExp, dtoken_location).with_value(expr));
                }
                TokenKind::IoNumber => children.push(self.parse_redirect()?),
                kind if is_redirect_operator(kind) => children.push(self.parse_redirect()?),
                _ => break,
            }
        }
        if children.is_empty() {
            let token = self.peek().clone();
            return Err(ParseError::syntax(
                format!("expected a command, found {:?}", token.kind),
                token.location,
            ));
        }
        Ok(Node::new(NodeKind::Command, location).with_children(children))
    }

    /// One redirection: an optional `IoNumber` file descriptor, the
    /// operator, and a target word — except for `<<`/`<<-`, whose target
    /// is a placeholder patched in once the heredoc body is collected.
    fn parse_redirect(&mut self) -> Result<Node, ParseError> {
        let location = self.peek().location;
        let fd = if self.check(TokenKind::IoNumber) {
            Some(self.advance().lexeme.to_string())
        } else {
            None
        };
        let op_token = self.advance();
        let operator = op_token.lexeme.to_string();
        let target = match op_token.kind {
            TokenKind::DLess | TokenKind::DLessDash => {
                Node::new(NodeKind::StringExpandable, op_token.location)
                    .with_value(HEREDOC_PLACEHOLDER)
            }
            _ => {
                let word = self.expect(TokenKind::Word, "redirection target")?;
                self.word_node(&word)
            }
        };
        let value = match fd {
            Some(fd) => format!("{fd}:{operator}"),
            None => format!(":{operator}"),
        };
        Ok(Node::new(NodeKind::Redirect, location)
            .with_value(value)
            .with_children(vec![target]))
    }

    /// Absorb any redirections trailing a compound command, e.g. `{ ...; }
    /// >out` or `(cmd) 2>&1` — appended as further children after the
    /// construct's own, matching how a simple `Command`'s redirects sit
    /// alongside its words.
    fn with_trailing_redirects(&mut self, mut node: Node) -> Result<Node, ParseError> {
        while self.check(TokenKind::IoNumber) || is_redirect_operator(self.peek().kind) {
            let redirect = self.parse_redirect()?;
            node.push_child(redirect);
        }
        Ok(node)
    }

    /// Split an `AssignmentWord` token's lexeme at the `=` the lexer already
    /// found (via [`lusush_lexer::assignment_name_len`], the same function
    /// that qualified this token as an assignment in the first place) and
    /// build the `name`/`rhs` pair as an `Assignment` node. A `$((...))`
    /// right-hand side is decomposed and evaluated eagerly, exactly like
    /// the bare-word `DollarDLParen` case above — `x=$((2+3*4))` yields the
    /// same `ArithExp` shape `echo $((2+3*4))` does.
    fn assignment_node(&mut self, token: &Token) -> Result<Node, ParseError> {
        let lexeme = token.lexeme.as_ref();
        let Some(eq) = lusush_lexer::assignment_name_len(lexeme) else {
            // The scanner only emits AssignmentWord for lexemes that pass
            // this same check; fall back to the old flat rendering if that
            // invariant is ever violated, rather than panicking.
            return Ok(Node::new(NodeKind::StringExpandable, token.location)
                .with_value(lexeme.to_string()));
        };
        let name = &lexeme[..eq];
        let rhs = &lexeme[eq + 1..];
        let rhs_node = match rhs.strip_prefix("$((").and_then(|s| s.strip_suffix("))")) {
            Some(expr) => {
                self.eval_arith(expr, token.location)?;
                Node::new(NodeKind::ArithExp, token.location).with_value(expr)
            }
            None => match fully_single_quoted(rhs) {
                Some(inner) => Node::new(NodeKind::StringLiteral, token.location).with_value(inner),
                None => Node::new(NodeKind::StringExpandable, token.location)
                    .with_value(rhs.to_string()),
            },
        };
        Ok(Node::new(NodeKind::Assignment, token.location)
            .with_value(name)
            .with_children(vec![rhs_node]))
    }

    /// A scanned `Word` classified as a leaf: a word that is entirely one
    /// single-quoted span is a non-expanding `StringLiteral` (quotes
    /// stripped); anything else keeps its raw text as `StringExpandable`,
    /// expansion being an execution-time concern out of scope here.
    fn word_node(&self, token: &Token) -> Node {
        let text = token.lexeme.as_ref();
        match fully_single_quoted(text) {
            Some(inner) => Node::new(NodeKind::StringLiteral, token.location).with_value(inner),
            None => {
                Node::new(NodeKind::StringExpandable, token.location).with_value(text.to_string())
            }
        }
    }

    fn consume_list_terminator(&mut self) {
        if self.check(TokenKind::Semi) {
            self.advance();
        }
        self.skip_newlines();
    }
}

fn fully_single_quoted(text: &str) -> Option<String> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    if inner.contains('\'') {
        None
    } else {
        Some(inner.to_string())
    }
}

/// Depth-first search for the first `Redirect` node whose target is still
/// the heredoc placeholder, patching it to the collected body. Returns
/// `true` once a placeholder is found and filled.
fn patch_first_placeholder(nodes: &mut [Node], quoting: HeredocQuoting, body: &str) -> bool {
    for node in nodes.iter_mut() {
        if node.kind == NodeKind::Redirect {
            if let Some(target) = node.children.first_mut() {
                if target.value.as_deref() == Some(HEREDOC_PLACEHOLDER) {
                    target.kind = if quoting == HeredocQuoting::Literal {
                        NodeKind::StringLiteral
                    } else {
                        NodeKind::StringExpandable
                    };
                    target.value = Some(body.to_string());
                    return true;
                }
            }
        }
        if patch_first_placeholder(&mut node.children, quoting, body) {
            return true;
        }
    }
    false
}
