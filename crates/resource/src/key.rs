//! Resource key grammar.
//!
//! Keys are segments joined by tight (`.`) or loose (`*`) delimiters:
//! - `frame.label` binds `label` directly under `frame`
//! - `*label` matches `label` at any depth
//! - `frame.?.label` matches any single segment between the two names
//! - `*widgets/Button.label` names a runtime type instead of an instance

mod grammar;
mod lexer;

use std::fmt;
use std::str::FromStr;

use logos::Logos;

use crate::error::{ensure_valid_key, ResourceError, Result};
use crate::types::Binding;

use lexer::KeyToken;

pub use grammar::{classify_segment, is_valid_key, is_valid_name, normalize_key};

/// One step of an insertion path: a segment and how it binds to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStep<'a> {
    pub binding: Binding,
    pub segment: &'a str,
}

/// A validated, normalized resource key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Validates and normalizes a raw key.
    pub fn parse(raw: &str) -> Result<Self> {
        ensure_valid_key(raw)?;
        Ok(Self(normalize_key(raw)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the key into insertion steps.
    ///
    /// The first segment is loosely bound when the key starts with the loose
    /// delimiter; every later segment takes the binding of the delimiter in
    /// front of it.
    pub fn steps(&self) -> Vec<KeyStep<'_>> {
        let mut steps = Vec::new();
        let mut binding = Binding::Tight;
        let mut lexer = KeyToken::lexer(&self.0);

        while let Some(token) = lexer.next() {
            // Parsed keys lex cleanly; an error token cannot appear here.
            let Ok(token) = token else { continue };
            match token.binding() {
                Some(next) => binding = next,
                None => {
                    steps.push(KeyStep {
                        binding,
                        segment: lexer.slice(),
                    });
                    binding = Binding::Tight;
                }
            }
        }

        steps
    }

    /// Appends `relative` under this key with a tight delimiter.
    pub fn join(&self, relative: &str) -> Result<Self> {
        Self::parse(&format!("{}.{relative}", self.0))
    }
}

impl FromStr for ResourceKey {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
