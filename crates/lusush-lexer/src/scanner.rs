//! The scanner proper: turns source text into a [`Token`] stream, tracking
//! command position for reserved-word and assignment-word recognition,
//! collecting here-document bodies, and consulting [`AliasExpander`] on
//! command-position words.

use crate::operators;
use crate::reserved;
use lusush_alias::{AliasExpander, AliasMap};
use lusush_heredoc::{CollectionResult, HeredocContent, HeredocQuoting, PendingHeredoc};
use lusush_position::{LineIndex, SourceLocation};
use lusush_token::{Token, TokenKind};
use std::collections::VecDeque;

/// Tracks one spliced-in alias replacement so [`AliasExpander::end`] fires
/// once the scanner's cursor has advanced past it.
struct ActiveSplice {
    name: String,
    end_offset: usize,
}

/// A read-only-feeling view over the line being scanned. Source text is
/// mutable internally (alias expansion splices replacement text in place)
/// but every [`Token`] a caller sees carries a span into *some* valid state
/// of the buffer, never a dangling one.
pub struct Scanner<'a> {
    src: String,
    pos: usize,
    line_index: LineIndex,
    command_position: bool,
    alias_eligible: bool,
    alias_map: &'a AliasMap,
    expander: AliasExpander,
    active_splices: Vec<ActiveSplice>,
    pending_heredocs: VecDeque<PendingHeredoc>,
    /// Paired with the quoting of its declaration — `collect_all` returns
    /// bare `HeredocContent` with no quoting field, so the scanner carries
    /// it alongside instead of losing it.
    completed_heredocs: VecDeque<(HeredocQuoting, HeredocContent)>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: impl Into<String>, alias_map: &'a AliasMap) -> Self {
        let src = source.into();
        let line_index = LineIndex::new(&src);
        Scanner {
            src,
            pos: 0,
            line_index,
            command_position: true,
            alias_eligible: true,
            alias_map,
            expander: AliasExpander::new(),
            active_splices: Vec::new(),
            pending_heredocs: VecDeque::new(),
            completed_heredocs: VecDeque::new(),
        }
    }

    /// Heredoc bodies collected so far, oldest declaration first. The
    /// parser drains this once per `Redirect` node it builds for a `<<`
    /// family operator.
    pub fn take_heredoc_content(&mut self) -> Option<(HeredocQuoting, HeredocContent)> {
        self.completed_heredocs.pop_front()
    }

    /// Join a collected heredoc's body lines with `\n`, reading from the
    /// scanner's current source buffer.
    pub fn render_heredoc_body(&self, content: &HeredocContent) -> String {
        content
            .segments
            .iter()
            .map(|span| span.slice(&self.src))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Scan the raw body of an arithmetic construct immediately after its
    /// opening `((` or `$((` token has been consumed, stopping at (and
    /// consuming) the matching `))`. This is the "arithmetic sub-mode"
    /// that never enters command position, so reserved words, alias
    /// expansion, and operator splitting inside `(( ... ))` are all
    /// bypassed — the parser gets the expression as plain text and hands
    /// it to `lusush-arith`.
    pub fn scan_arith_body(&mut self) -> String {
        let start = self.pos;
        let mut depth = 2i32;
        while depth > 0 {
            match self.rest().chars().next() {
                Some('(') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(')') => {
                    depth -= 1;
                    self.pos += 1;
                }
                Some(c) => self.pos += c.len_utf8(),
                None => break,
            }
        }
        let end = self.pos.saturating_sub(2).max(start);
        self.src[start..end].trim().to_string()
    }

    /// Scan the raw body of a `[[ ... ]]` extended test immediately after
    /// its opening `[[` token has been consumed, stopping at (and
    /// consuming) the matching `]]`. Same sub-mode rationale as
    /// [`Self::scan_arith_body`].
    pub fn scan_test_body(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.src.len() && !self.rest().starts_with("]]") {
            if let Some(c) = self.rest().chars().next() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        let end = self.pos;
        if self.rest().starts_with("]]") {
            self.pos += 2;
        }
        self.src[start..end].trim().to_string()
    }

    fn location(&self) -> SourceLocation {
        self.line_index.resolve(self.pos)
    }

    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn close_finished_splices(&mut self) {
        while let Some(top) = self.active_splices.last() {
            if self.pos >= top.end_offset {
                let done = self.active_splices.pop().expect("just checked last()");
                self.expander.end(&done.name);
            } else {
                break;
            }
        }
    }

    /// Scan and return the next token. Returns a stable EOF sentinel
    /// forever once the end of input is reached.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.close_finished_splices();
            self.skip_non_newline_whitespace();
            self.skip_comment();

            if self.pos >= self.src.len() {
                return Token::eof(self.location());
            }

            let c = match self.rest().chars().next() {
                Some(c) => c,
                None => return Token::eof(self.location()),
            };

            if c == '\n' {
                return self.scan_newline();
            }

            if let Some((kind, len)) = operators::match_operator(self.rest()) {
                return self.scan_operator(kind, len);
            }

            if c == '\'' || c == '"' || c == '`' {
                return self.scan_word_or_assignment();
            }

            if c.is_ascii_digit() && self.peek_io_number() {
                return self.scan_io_number();
            }

            return self.scan_word_or_assignment();
        }
    }

    fn skip_non_newline_whitespace(&mut self) {
        while let Some(c) = self.rest().chars().next() {
            if c == '\n' || !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// `#` starts a comment only where a new word could begin — i.e. here,
    /// since this is only called between tokens.
    fn skip_comment(&mut self) {
        if self.rest().starts_with('#') {
            while let Some(c) = self.rest().chars().next() {
                if c == '\n' {
                    break;
                }
                self.pos += c.len_utf8();
            }
        }
    }

    fn scan_newline(&mut self) -> Token {
        let location = self.location();
        self.pos += 1;
        self.command_position = true;
        self.alias_eligible = true;
        if !self.pending_heredocs.is_empty() {
            let pending = std::mem::take(&mut self.pending_heredocs);
            let quotings: Vec<HeredocQuoting> = pending.iter().map(|p| p.quoting).collect();
            let CollectionResult {
                contents,
                next_offset,
            } = lusush_heredoc::collect_all(&self.src, &self.line_index, self.pos, pending);
            self.completed_heredocs
                .extend(quotings.into_iter().zip(contents));
            self.pos = next_offset;
        }
        Token::new(TokenKind::Newline, "\n", location)
    }

    fn scan_operator(&mut self, kind: TokenKind, len: usize) -> Token {
        let location = self.location();
        let lexeme = self.rest()[..len].to_string();
        self.pos += len;

        match kind {
            TokenKind::DLess | TokenKind::DLessDash => {
                self.skip_non_newline_whitespace();
                self.queue_heredoc_label(&lexeme);
            }
            _ => {}
        }

        // Every operator that can begin a new command resets command
        // position; everything else (grouping/redirection operators mid
        // command) does not.
        self.command_position = matches!(
            kind,
            TokenKind::Pipe
                | TokenKind::PipeAmp
                | TokenKind::OrOr
                | TokenKind::AndAnd
                | TokenKind::Semi
                | TokenKind::SemiSemi
                | TokenKind::SemiSemiAmp
                | TokenKind::SemiAmp
                | TokenKind::Amp
                | TokenKind::LParen
                | TokenKind::LBrace
                | TokenKind::Bang
                | TokenKind::DLParen
        );
        self.alias_eligible = self.command_position;
        Token::new(kind, lexeme, location)
    }

    /// After a `<<`/`<<-` operator, the next word is the heredoc label.
    /// Quoting anywhere in the label suppresses expansion of the body.
    fn queue_heredoc_label(&mut self, op_lexeme: &str) {
        let decl_start = self.pos;
        let mut label = String::new();
        let mut quoted = false;
        while let Some(c) = self.rest().chars().next() {
            if c.is_whitespace() || operators::starts_operator(c) {
                break;
            }
            match c {
                '\'' => {
                    quoted = true;
                    self.pos += 1;
                    while let Some(c) = self.rest().chars().next() {
                        self.pos += c.len_utf8();
                        if c == '\'' {
                            break;
                        }
                        label.push(c);
                    }
                }
                '"' => {
                    quoted = true;
                    self.pos += 1;
                    while let Some(c) = self.rest().chars().next() {
                        self.pos += c.len_utf8();
                        if c == '"' {
                            break;
                        }
                        label.push(c);
                    }
                }
                '\\' => {
                    quoted = true;
                    self.pos += 1;
                    if let Some(escaped) = self.rest().chars().next() {
                        self.pos += escaped.len_utf8();
                        label.push(escaped);
                    }
                }
                _ => {
                    label.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
        let decl_span = lusush_position::ByteSpan::new(decl_start, self.pos);
        self.pending_heredocs.push_back(PendingHeredoc {
            label: label.into(),
            strip_indent: op_lexeme == "<<-" || op_lexeme == "<<~",
            quoting: if quoted {
                HeredocQuoting::Literal
            } else {
                HeredocQuoting::Expand
            },
            decl_span,
        });
    }

    /// Whether the digit run at `pos` is glued to a redirection operator
    /// with no intervening whitespace (an `IoNumber`, spec.md §3).
    fn peek_io_number(&self) -> bool {
        let digits: usize = self
            .rest()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .map(char::len_utf8)
            .sum();
        if digits == 0 {
            return false;
        }
        operators::starts_redirection(&self.rest()[digits..])
    }

    fn scan_io_number(&mut self) -> Token {
        let location = self.location();
        let start = self.pos;
        while self
            .rest()
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
        {
            self.pos += 1;
        }
        Token::new(TokenKind::IoNumber, &self.src[start..self.pos], location)
    }

    /// Scan one WORD, then reclassify as `AssignmentWord` or a reserved
    /// word, or run it through alias expansion, as command position and
    /// content dictate.
    fn scan_word_or_assignment(&mut self) -> Token {
        let location = self.location();
        let start = self.pos;
        self.consume_word_body();
        let lexeme = self.src[start..self.pos].to_string();

        if self.command_position {
            if let Some(kind) = reserved::lookup(&lexeme) {
                self.command_position = matches!(
                    kind,
                    TokenKind::Do | TokenKind::Then | TokenKind::Else | TokenKind::Elif
                );
                self.alias_eligible = self.command_position;
                return Token::new(kind, lexeme, location);
            }
            if assignment_name_len(&lexeme).is_some() {
                self.alias_eligible = true;
                return Token::new(TokenKind::AssignmentWord, lexeme, location);
            }
        }

        if self.alias_eligible && !self.command_position_consumed_by_quote(&lexeme) {
            if let Some(expansion) = self.expander.expand(&lexeme, self.alias_map) {
                self.splice_alias(start, &lexeme, &expansion.replacement);
                self.alias_eligible = expansion.trailing_whitespace;
                // The spliced replacement is rescanned from `start`; the
                // caller's loop will pick up its first token next.
                return self.next_token();
            }
        }

        self.command_position = false;
        self.alias_eligible = false;
        Token::new(TokenKind::Word, lexeme, location)
    }

    /// Aliases never expand a word that was wholly or partly quoted
    /// (spec.md §4.4 rule (c)); a literal `'`/`"` anywhere in the raw
    /// lexeme disqualifies it.
    fn command_position_consumed_by_quote(&self, lexeme: &str) -> bool {
        lexeme.contains(['\'', '"'])
    }

    fn splice_alias(&mut self, start: usize, lexeme: &str, replacement: &str) {
        let end = start + lexeme.len();
        self.src.replace_range(start..end, replacement);
        self.line_index = LineIndex::new(&self.src);
        self.pos = start;
        let name = lexeme.to_string();
        self.expander.begin(name.clone());
        self.active_splices.push(ActiveSplice {
            name,
            end_offset: start + replacement.len(),
        });
    }

    fn consume_word_body(&mut self) {
        while let Some(c) = self.rest().chars().next() {
            match c {
                c if c.is_whitespace() => break,
                c if operators::starts_operator(c) => break,
                '\'' => {
                    self.pos += 1;
                    while let Some(c) = self.rest().chars().next() {
                        self.pos += c.len_utf8();
                        if c == '\'' {
                            break;
                        }
                    }
                }
                '"' => self.consume_double_quoted(),
                '`' => self.consume_backquoted(),
                '\\' => {
                    self.pos += 1;
                    if let Some(escaped) = self.rest().chars().next() {
                        self.pos += escaped.len_utf8();
                    }
                }
                '$' if self.rest().starts_with("$(") => self.consume_dollar_paren(),
                _ => self.pos += c.len_utf8(),
            }
        }
    }

    fn consume_double_quoted(&mut self) {
        self.pos += 1; // opening quote
        while let Some(c) = self.rest().chars().next() {
            match c {
                '"' => {
                    self.pos += 1;
                    return;
                }
                '\\' => {
                    self.pos += 1;
                    if let Some(escaped) = self.rest().chars().next() {
                        self.pos += escaped.len_utf8();
                    }
                }
                '$' if self.rest().starts_with("$(") => self.consume_dollar_paren(),
                _ => self.pos += c.len_utf8(),
            }
        }
    }

    fn consume_backquoted(&mut self) {
        self.pos += 1; // opening backtick
        while let Some(c) = self.rest().chars().next() {
            match c {
                '`' => {
                    self.pos += 1;
                    return;
                }
                '\\' => {
                    self.pos += 1;
                    if let Some(escaped) = self.rest().chars().next() {
                        self.pos += escaped.len_utf8();
                    }
                }
                _ => self.pos += c.len_utf8(),
            }
        }
    }

    /// Consume a balanced `$(...)` (or `$((...))`, which is just nested
    /// parens from this scanner's point of view — arithmetic evaluation is
    /// the parser's concern) so an inner `)` doesn't end the word early.
    fn consume_dollar_paren(&mut self) {
        self.pos += 2; // "$("
        let mut depth = 1usize;
        while depth > 0 {
            match self.rest().chars().next() {
                Some('(') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(')') => {
                    depth -= 1;
                    self.pos += 1;
                }
                Some('\'') => {
                    self.pos += 1;
                    while let Some(c) = self.rest().chars().next() {
                        self.pos += c.len_utf8();
                        if c == '\'' {
                            break;
                        }
                    }
                }
                Some('"') => self.consume_double_quoted(),
                Some(c) => self.pos += c.len_utf8(),
                None => break,
            }
        }
    }
}

/// Byte offset of the `=` in a valid assignment name prefix (`NAME=`) at
/// the start of `word`, if `word` is shaped like `NAME=VALUE`. Shared with
/// the parser so the name/value boundary an `AssignmentWord` token carries
/// is computed once, not re-derived independently on each side.
pub fn assignment_name_len(word: &str) -> Option<usize> {
    let mut chars = word.char_indices();
    let (_, first) = chars.next()?;
    if !(unicode_ident::is_xid_start(first) || first == '_') {
        return None;
    }
    for (i, c) in chars {
        if c == '=' {
            return Some(i);
        }
        if !(unicode_ident::is_xid_continue(c) || c == '_') {
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str, map: &AliasMap) -> Vec<Token> {
        let mut scanner = Scanner::new(src, map);
        let mut out = Vec::new();
        loop {
            let token = scanner.next_token();
            let is_eof = token.is_eof();
            out.push(token);
            if is_eof {
                break;
            }
        }
        out
    }

    #[test]
    fn scans_simple_pipeline() {
        let map = AliasMap::new();
        let kinds: Vec<TokenKind> = tokens("echo hi | wc -l\n", &map)
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Word,
                TokenKind::Word,
                TokenKind::Pipe,
                TokenKind::Word,
                TokenKind::Word,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn recognizes_reserved_words_in_command_position() {
        let map = AliasMap::new();
        let kinds: Vec<TokenKind> = tokens("if true; then echo y; fi\n", &map)
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(kinds[0], TokenKind::If);
        assert!(kinds.contains(&TokenKind::Then));
        assert!(kinds.contains(&TokenKind::Fi));
    }

    #[test]
    fn word_after_command_name_is_not_reserved() {
        let map = AliasMap::new();
        let toks = tokens("echo if\n", &map);
        assert_eq!(toks[1].kind, TokenKind::Word);
        assert_eq!(toks[1].lexeme.as_ref(), "if");
    }

    #[test]
    fn recognizes_assignment_word_prefix() {
        let map = AliasMap::new();
        let toks = tokens("FOO=bar echo hi\n", &map);
        assert_eq!(toks[0].kind, TokenKind::AssignmentWord);
        assert_eq!(toks[1].kind, TokenKind::Word);
    }

    #[test]
    fn io_number_glued_to_redirection() {
        let map = AliasMap::new();
        let toks = tokens("2>&1\n", &map);
        assert_eq!(toks[0].kind, TokenKind::IoNumber);
        assert_eq!(toks[1].kind, TokenKind::GreatAmp);
        assert_eq!(toks[2].kind, TokenKind::IoNumber);
    }

    #[test]
    fn bare_digits_with_space_are_a_word() {
        let map = AliasMap::new();
        let toks = tokens("echo 2 > out\n", &map);
        assert_eq!(toks[1].kind, TokenKind::Word);
    }

    #[test]
    fn alias_expands_in_command_position() {
        let mut map = AliasMap::new();
        map.define("ll", "ls -l");
        let kinds: Vec<TokenKind> = tokens("ll\n", &map).into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Word,
                TokenKind::Word,
                TokenKind::Newline,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn alias_does_not_expand_inside_quotes() {
        let mut map = AliasMap::new();
        map.define("ll", "ls -l");
        let toks = tokens("\"ll\"\n", &map);
        assert_eq!(toks[0].kind, TokenKind::Word);
        assert_eq!(toks[0].lexeme.as_ref(), "\"ll\"");
    }

    #[test]
    fn heredoc_body_collected_at_newline() {
        let map = AliasMap::new();
        let mut scanner = Scanner::new("cat <<EOF\nhello\nEOF\n", &map);
        loop {
            let token = scanner.next_token();
            if token.kind == TokenKind::Newline {
                break;
            }
        }
        let (quoting, content) = scanner
            .take_heredoc_content()
            .expect("heredoc body collected");
        assert_eq!(quoting, HeredocQuoting::Expand);
        assert!(content.terminated);
        assert_eq!(content.segments.len(), 1);
        assert_eq!(scanner.render_heredoc_body(&content), "hello");
    }

    #[test]
    fn double_quoted_word_keeps_embedded_paren() {
        let map = AliasMap::new();
        let toks = tokens("echo \"a)b\"\n", &map);
        assert_eq!(toks[1].lexeme.as_ref(), "\"a)b\"");
    }

    #[test]
    fn command_substitution_parens_do_not_split_word() {
        let map = AliasMap::new();
        let toks = tokens("echo $(echo a; echo b)\n", &map);
        assert_eq!(toks[1].kind, TokenKind::Word);
        assert_eq!(toks[1].lexeme.as_ref(), "$(echo a; echo b)");
    }

    #[test]
    fn scans_arithmetic_command_body() {
        let map = AliasMap::new();
        let mut scanner = Scanner::new("((1 + (2 * 3)))\n", &map);
        let opener = scanner.next_token();
        assert_eq!(opener.kind, TokenKind::DLParen);
        assert_eq!(scanner.scan_arith_body(), "1 + (2 * 3)");
        assert_eq!(scanner.next_token().kind, TokenKind::Newline);
    }

    #[test]
    fn scans_dollar_arith_expansion_body() {
        let map = AliasMap::new();
        let mut scanner = Scanner::new("$((x + 1))\n", &map);
        let opener = scanner.next_token();
        assert_eq!(opener.kind, TokenKind::DollarDLParen);
        assert_eq!(scanner.scan_arith_body(), "x + 1");
    }

    #[test]
    fn scans_extended_test_body() {
        let map = AliasMap::new();
        let mut scanner = Scanner::new("[[ -f foo.txt ]]\n", &map);
        let opener = scanner.next_token();
        assert_eq!(opener.kind, TokenKind::DLBracket);
        assert_eq!(scanner.scan_test_body(), "-f foo.txt");
        assert_eq!(scanner.next_token().kind, TokenKind::Newline);
    }
}
