//! Logos tokenizer for resource keys.

use logos::Logos;

use crate::types::Binding;

/// Tokens of a resource key. Whitespace matches no token and surfaces as a
/// lexing error.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyToken {
    #[token(".")]
    Tight,
    #[token("*")]
    Loose,
    #[regex(r"[^.*\s]+")]
    Segment,
}

impl KeyToken {
    pub(crate) fn binding(self) -> Option<Binding> {
        match self {
            Self::Tight => Some(Binding::Tight),
            Self::Loose => Some(Binding::Loose),
            Self::Segment => None,
        }
    }
}

/// Returns true if every byte of `input` lexes into a token.
pub(crate) fn lexes_cleanly(input: &str) -> bool {
    KeyToken::lexer(input).all(|token| token.is_ok())
}
