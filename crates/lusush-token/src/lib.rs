//! Token definitions produced by the lusush scanner and consumed by the
//! parser.
//!
//! A [`Token`] is a tagged record carrying its [`TokenKind`], the exact
//! source lexeme, and a [`SourceLocation`]. Tokens are cheap to clone (the
//! lexeme is an `Arc<str>`) so the parser's push-back buffer can hand
//! consumed tokens back to the scanner without re-reading source text.

use lusush_position::SourceLocation;
use std::sync::Arc;

/// Token kind, per spec.md §3's three buckets (WORD/ASSIGNMENT_WORD/IO_NUMBER,
/// operators, reserved words) plus EOF and the lexer's ERROR escape hatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An ordinary word: command name, argument, pattern, etc.
    Word,
    /// `name=value` recognized as a variable assignment in command-prefix
    /// position.
    AssignmentWord,
    /// A leading digit sequence immediately followed by a redirection
    /// operator, e.g. the `2` in `2>&1`.
    IoNumber,

    // ===== Operators (spec.md §6, bit-exact table) =====
    Pipe,    // |
    PipeAmp, // |& (non-POSIX extension some shells support; kept as a
    // single recognized operator rather than two tokens)
    OrOr,          // ||
    Amp,           // &
    AndAnd,        // &&
    Semi,          // ;
    SemiSemi,      // ;;
    SemiSemiAmp,   // ;;&
    SemiAmp,       // ;&
    LParen,        // (
    RParen,        // )
    LBrace,        // {
    RBrace,        // }
    Less,          // <
    Great,         // >
    DLess,         // <<
    DLessDash,     // <<-
    TLess,         // <<<
    DGreat,        // >>
    LessAmp,       // <&
    GreatAmp,      // >&
    LessGreat,     // <>
    GreatPipe,     // >|
    AmpGreat,      // &>
    AmpGreatGreat, // &>>
    Bang,          // !
    DLBracket,     // [[
    DRBracket,     // ]]
    DLParen,       // ((
    DRParen,       // ))
    DollarDLParen, // $((
    Newline,

    // ===== Reserved words (command position only, spec.md §6) =====
    If,
    Then,
    Elif,
    Else,
    Fi,
    While,
    Until,
    Do,
    Done,
    For,
    In,
    Case,
    Esac,
    Select,
    Function,
    Time,
    Coproc,

    /// End of input. The scanner returns a stable sentinel of this kind
    /// forever once reached; compared structurally, never by identity.
    Eof,
    /// Malformed token (unterminated quote/here-doc, malformed operator,
    /// invalid UTF-8). The diagnostic lives on [`Token::error_message`].
    Error,
}

impl TokenKind {
    /// True for tokens that may only be recognized while the scanner is in
    /// command position, per the Glossary's "Command position" entry.
    pub fn is_reserved_word(self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::Then
                | TokenKind::Elif
                | TokenKind::Else
                | TokenKind::Fi
                | TokenKind::While
                | TokenKind::Until
                | TokenKind::Do
                | TokenKind::Done
                | TokenKind::For
                | TokenKind::In
                | TokenKind::Case
                | TokenKind::Esac
                | TokenKind::Select
                | TokenKind::Function
                | TokenKind::Time
                | TokenKind::Coproc
        )
    }

    /// True for a separator that ends a `list` production (spec.md §4.3).
    pub fn is_list_separator(self) -> bool {
        matches!(self, TokenKind::Semi | TokenKind::Amp | TokenKind::Newline)
    }
}

/// A lexical token: classification, exact source text, and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source substring this token was scanned from.
    pub lexeme: Arc<str>,
    pub location: SourceLocation,
    /// Set only for `TokenKind::Error`: a human-readable diagnostic
    /// describing why the token is malformed.
    pub error_message: Option<Arc<str>>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<Arc<str>>, location: SourceLocation) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            location,
            error_message: None,
        }
    }

    pub fn error(
        lexeme: impl Into<Arc<str>>,
        location: SourceLocation,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Token {
            kind: TokenKind::Error,
            lexeme: lexeme.into(),
            location,
            error_message: Some(message.into()),
        }
    }

    /// The stable EOF sentinel for a location. Two EOF tokens at the same
    /// location compare equal; identity is never relied upon (spec.md §9
    /// Design Notes).
    pub fn eof(location: SourceLocation) -> Self {
        Token::new(TokenKind::Eof, "", location)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}
