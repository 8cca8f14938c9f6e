//! Token-level validation.
//!
//! These checks run on the raw token stream before and during parsing:
//! - symbols must be a single letter `A`..`Z` (lowercase is normalized)
//! - parentheses must balance across the whole source
//! - operator tokens must belong to the supported set

use crate::condition::Symbol;
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};

/// The operator kinds the parser knows how to handle.
pub const ALLOWED_OPERATORS: [TokenKind; 6] = [
    TokenKind::And,
    TokenKind::Or,
    TokenKind::Xor,
    TokenKind::Not,
    TokenKind::Implies,
    TokenKind::Iif,
];

/// Validates an identifier token and returns its normalized `Symbol`.
///
/// # Errors
///
/// Returns a validation error when the lexeme is not exactly one ASCII letter.
pub fn ensure_valid_symbol(token: &Token<'_>) -> Result<Symbol> {
    let mut chars = token.lexeme.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Symbol::new(c).ok_or_else(|| invalid_symbol(token)),
        _ => Err(invalid_symbol(token)),
    }
}

fn invalid_symbol(token: &Token<'_>) -> Error {
    Error::validation(
        format!("Invalid fact symbol '{}'.", token.lexeme),
        Some(token.location()),
    )
}

/// Checks that every `(` has a matching `)` in the token stream.
///
/// An unmatched `)` is reported at its own position. Openers left on the
/// stack at the end are reported at the first one that was never closed.
pub fn validate_balanced_parentheses(tokens: &[Token<'_>]) -> Result<()> {
    let mut open: Vec<&Token<'_>> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::LParen => open.push(token),
            TokenKind::RParen => {
                if open.pop().is_none() {
                    return Err(Error::syntax("Unmatched ')'.", Some(token.location())));
                }
            }
            _ => {}
        }
    }

    match open.first() {
        Some(opener) => Err(Error::syntax("Unmatched '('.", Some(opener.location()))),
        None => Ok(()),
    }
}

/// Rejects operator positions holding a token outside `ALLOWED_OPERATORS`.
pub fn ensure_known_operator(token: &Token<'_>) -> Result<()> {
    if ALLOWED_OPERATORS.contains(&token.kind) {
        Ok(())
    } else {
        Err(Error::validation(
            format!("Unsupported operator '{}'.", token.lexeme),
            Some(token.location()),
        ))
    }
}
