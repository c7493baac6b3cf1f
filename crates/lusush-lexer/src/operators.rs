//! Operator recognition table, longest-match first (spec.md §6's bit-exact
//! table). `$((` is matched ahead of the general table since it would
//! otherwise be read as the start of a word.
//!
//! `<<~` has no dedicated [`TokenKind`] variant distinct from `<<-`; both
//! request indentation stripping for a here-document and are distinguished
//! downstream by inspecting the token's lexeme, which preserves the exact
//! source text.

use lusush_token::TokenKind;

/// Longest operator lexeme starting at `src[pos..]`, if any.
pub fn match_operator(src: &str) -> Option<(TokenKind, usize)> {
    if src.starts_with("$((") {
        return Some((TokenKind::DollarDLParen, 3));
    }
    for &(text, kind) in THREE_CHAR {
        if src.starts_with(text) {
            return Some((kind, 3));
        }
    }
    for &(text, kind) in TWO_CHAR {
        if src.starts_with(text) {
            return Some((kind, 2));
        }
    }
    let mut chars = src.chars();
    let first = chars.next()?;
    ONE_CHAR
        .iter()
        .find(|&&(c, _)| c == first)
        .map(|&(_, kind)| (kind, first.len_utf8()))
}

/// True if `c` can only ever appear as the first character of an operator,
/// so word scanning must stop before it (outside quotes).
pub fn starts_operator(c: char) -> bool {
    matches!(
        c,
        '|' | '&' | ';' | '(' | ')' | '{' | '}' | '<' | '>' | '!' | '\n'
    )
}

/// True if `src[pos..]` begins a redirection operator — used to recognize
/// an `IoNumber` (a digit run glued to a redirection with no space).
pub fn starts_redirection(src: &str) -> bool {
    src.starts_with('<') || src.starts_with('>') || src.starts_with("&>")
}

const THREE_CHAR: &[(&str, TokenKind)] = &[
    ("<<-", TokenKind::DLessDash),
    ("<<~", TokenKind::DLessDash),
    ("<<<", TokenKind::TLess),
    (";;&", TokenKind::SemiSemiAmp),
    ("&>>", TokenKind::AmpGreatGreat),
];

const TWO_CHAR: &[(&str, TokenKind)] = &[
    ("<<", TokenKind::DLess),
    (">>", TokenKind::DGreat),
    ("||", TokenKind::OrOr),
    ("&&", TokenKind::AndAnd),
    (";;", TokenKind::SemiSemi),
    (";&", TokenKind::SemiAmp),
    ("<&", TokenKind::LessAmp),
    (">&", TokenKind::GreatAmp),
    ("<>", TokenKind::LessGreat),
    (">|", TokenKind::GreatPipe),
    ("&>", TokenKind::AmpGreat),
    ("|&", TokenKind::PipeAmp),
    ("[[", TokenKind::DLBracket),
    ("]]", TokenKind::DRBracket),
    ("((", TokenKind::DLParen),
    ("))", TokenKind::DRParen),
];

const ONE_CHAR: &[(char, TokenKind)] = &[
    ('|', TokenKind::Pipe),
    ('&', TokenKind::Amp),
    (';', TokenKind::Semi),
    ('(', TokenKind::LParen),
    (')', TokenKind::RParen),
    ('{', TokenKind::LBrace),
    ('}', TokenKind::RBrace),
    ('<', TokenKind::Less),
    ('>', TokenKind::Great),
    ('!', TokenKind::Bang),
    ('\n', TokenKind::Newline),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_match_wins() {
        assert_eq!(match_operator("<<-EOF").unwrap().1, 3);
        assert_eq!(match_operator("<<EOF").unwrap().1, 2);
        assert_eq!(match_operator("<EOF").unwrap().1, 1);
    }

    #[test]
    fn dollar_dlparen_before_general_table() {
        assert_eq!(
            match_operator("$((1+1))").unwrap().0,
            TokenKind::DollarDLParen
        );
    }

    #[test]
    fn non_operator_text_is_none() {
        assert!(match_operator("hello").is_none());
    }
}
