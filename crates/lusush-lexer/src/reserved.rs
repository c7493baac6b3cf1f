//! Reserved-word lookup, gated to command position (spec.md §6: a reserved
//! word is only recognized where a command name would be). A perfect-hash
//! map avoids a linear `match` over every keyword on every word token.

use lusush_token::TokenKind;

static RESERVED: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "if" => TokenKind::If,
    "then" => TokenKind::Then,
    "elif" => TokenKind::Elif,
    "else" => TokenKind::Else,
    "fi" => TokenKind::Fi,
    "while" => TokenKind::While,
    "until" => TokenKind::Until,
    "do" => TokenKind::Do,
    "done" => TokenKind::Done,
    "for" => TokenKind::For,
    "in" => TokenKind::In,
    "case" => TokenKind::Case,
    "esac" => TokenKind::Esac,
    "select" => TokenKind::Select,
    "function" => TokenKind::Function,
    "time" => TokenKind::Time,
    "coproc" => TokenKind::Coproc,
};

/// Look up `word` as a reserved word. Callers must only do this in command
/// position — `lusush-alias`'s expansion check, and the scanner's own
/// position tracking, both happen before this is consulted.
pub fn lookup(word: &str) -> Option<TokenKind> {
    RESERVED.get(word).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_every_keyword() {
        assert_eq!(lookup("if"), Some(TokenKind::If));
        assert_eq!(lookup("done"), Some(TokenKind::Done));
        assert_eq!(lookup("coproc"), Some(TokenKind::Coproc));
    }

    #[test]
    fn rejects_non_keywords() {
        assert_eq!(lookup("iffy"), None);
        assert_eq!(lookup(""), None);
    }
}
