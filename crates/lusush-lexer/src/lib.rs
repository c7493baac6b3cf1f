//! Lexical scanner for lusush (spec.md §4.2, §6).
//!
//! [`Scanner`] turns source text into [`Token`]s one at a time, tracking
//! command position for reserved-word/assignment-word recognition and
//! consulting an [`AliasExpander`] on eligible words. [`Lexer`] wraps a
//! scanner with the bounded, multi-token lookahead the parser needs
//! (two-token lookahead for `name ( ) { ... }` function-definition
//! detection, and push-back for backtracking out of a speculative parse).

mod operators;
mod pushback;
mod reserved;
mod scanner;

pub use pushback::PushbackBuffer;
pub use scanner::{assignment_name_len, Scanner};

use lusush_alias::AliasMap;
use lusush_token::Token;

/// The parser-facing front end: a [`Scanner`] plus bounded lookahead and
/// push-back for backtracking out of a speculative parse.
pub struct Lexer<'a> {
    scanner: Scanner<'a>,
    lookahead: Vec<Token>,
    pushback: PushbackBuffer,
}

impl<'a> Lexer<'a> {
    pub fn new(source: impl Into<String>, alias_map: &'a AliasMap) -> Self {
        Lexer {
            scanner: Scanner::new(source, alias_map),
            lookahead: Vec::new(),
            pushback: PushbackBuffer::default(),
        }
    }

    /// Consume and return the next token: a pushed-back token if any is
    /// waiting, else the oldest buffered lookahead token, else a freshly
    /// scanned one.
    pub fn next(&mut self) -> Token {
        if let Some(token) = self.pushback.pop() {
            return token;
        }
        if !self.lookahead.is_empty() {
            return self.lookahead.remove(0);
        }
        self.scanner.next_token()
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> &Token {
        self.peek_nth(0)
    }

    /// Look at the second-next token without consuming either.
    pub fn peek_second(&mut self) -> &Token {
        self.peek_nth(1)
    }

    /// Zero-indexed lookahead: `peek_nth(0)` is the same as `peek()`.
    pub fn peek_nth(&mut self, n: usize) -> &Token {
        while self.lookahead.len() <= n {
            let token = self.scanner.next_token();
            self.lookahead.push(token);
        }
        &self.lookahead[n]
    }

    /// Return a consumed token so the next `next()` yields it again.
    pub fn push_back(&mut self, token: Token) {
        self.pushback.push(token);
    }

    /// Heredoc bodies collected so far, in declaration order, rendered to
    /// text and paired with whether their delimiter was quoted.
    pub fn take_heredoc_body(&mut self) -> Option<(lusush_heredoc::HeredocQuoting, String)> {
        let (quoting, content) = self.scanner.take_heredoc_content()?;
        Some((quoting, self.scanner.render_heredoc_body(&content)))
    }

    /// Scan an arithmetic construct's raw body. Callers must only invoke
    /// this immediately after consuming the opening `((`/`$((` token with
    /// no intervening `peek` past it — peeking would have already run the
    /// bypassed text through ordinary tokenization.
    pub fn scan_arith_body(&mut self) -> String {
        debug_assert!(
            self.lookahead.is_empty(),
            "scan_arith_body called after peeking past the opener"
        );
        self.scanner.scan_arith_body()
    }

    /// Scan a `[[ ... ]]` extended test's raw body. Same calling
    /// convention as [`Self::scan_arith_body`].
    pub fn scan_test_body(&mut self) -> String {
        debug_assert!(
            self.lookahead.is_empty(),
            "scan_test_body called after peeking past the opener"
        );
        self.scanner.scan_test_body()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lusush_token::TokenKind;

    #[test]
    fn peek_does_not_consume() {
        let map = AliasMap::new();
        let mut lexer = Lexer::new("echo hi\n", &map);
        assert_eq!(lexer.peek().kind, TokenKind::Word);
        assert_eq!(lexer.peek().kind, TokenKind::Word);
        assert_eq!(lexer.next().kind, TokenKind::Word);
        assert_eq!(lexer.next().lexeme.as_ref(), "hi");
    }

    #[test]
    fn peek_second_looks_past_first() {
        let map = AliasMap::new();
        let mut lexer = Lexer::new("name ( )\n", &map);
        assert_eq!(lexer.peek().kind, TokenKind::Word);
        assert_eq!(lexer.peek_second().kind, TokenKind::LParen);
    }

    #[test]
    fn push_back_replays_token() {
        let map = AliasMap::new();
        let mut lexer = Lexer::new("a b\n", &map);
        let first = lexer.next();
        assert_eq!(first.lexeme.as_ref(), "a");
        lexer.push_back(first);
        assert_eq!(lexer.next().lexeme.as_ref(), "a");
        assert_eq!(lexer.next().lexeme.as_ref(), "b");
    }
}
