//! Lexer for the rule language.
//!
//! The grammar is line structured, so newlines are emitted as explicit `Eol`
//! tokens and the stream always ends with a single `Eof`. Lexing is all or
//! nothing: the first unscannable character aborts with its location.

use std::iter::Peekable;
use std::str::CharIndices;

use log::trace;

use crate::error::{Error, Location, Result};

/// The kinds of lexemes recognized by the rule language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A single letter symbol.
    Ident,
    /// `+`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
    /// `!`
    Not,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `=>`
    Implies,
    /// `<=>`
    Iif,
    /// `=` at the start of a fact line.
    Equal,
    /// `?` at the start of a query line.
    Query,
    /// End of line.
    Eol,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns `true` for the logical operator kinds.
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::And
                | TokenKind::Or
                | TokenKind::Xor
                | TokenKind::Not
                | TokenKind::Implies
                | TokenKind::Iif
        )
    }
}

/// A token together with its position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub line: usize,
    pub column: usize,
}

impl Token<'_> {
    /// Returns the 1-based location of the first character of this token.
    pub fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }
}

/// Converts rule text into a stream of tokens.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    offset: usize,
    line: usize,
    column: usize,
    start_offset: usize,
    start: Location,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            offset: 0,
            line: 1,
            column: 1,
            start_offset: 0,
            start: Location::new(1, 1),
        }
    }

    /// Scans the whole source.
    pub fn tokenize(mut self) -> Result<Vec<Token<'a>>> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.begin_token() {
            let kind = match ch {
                ' ' | '\t' | '\r' => continue,
                '#' => {
                    self.skip_comment();
                    continue;
                }
                '\n' => TokenKind::Eol,
                '+' => TokenKind::And,
                '|' => TokenKind::Or,
                '^' => TokenKind::Xor,
                '!' => TokenKind::Not,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '?' => TokenKind::Query,
                '<' => {
                    if !self.matches('=') {
                        return Err(self.error("Unexpected '<' character."));
                    }
                    if !self.matches('>') {
                        return Err(self.error("Expected '>' to complete '<=>' operator."));
                    }
                    TokenKind::Iif
                }
                '=' => {
                    if self.matches('>') {
                        TokenKind::Implies
                    } else {
                        TokenKind::Equal
                    }
                }
                c if c.is_alphabetic() => TokenKind::Ident,
                c => return Err(self.error(format!("Unsupported character '{}'.", c))),
            };
            tokens.push(self.make_token(kind));
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            lexeme: "",
            line: self.line,
            column: self.column,
        });
        trace!("lexed {} tokens", tokens.len());
        Ok(tokens)
    }

    /// Marks the start of a new token and consumes its first character.
    fn begin_token(&mut self) -> Option<char> {
        self.start_offset = self.offset;
        self.start = Location::new(self.line, self.column);
        self.advance()
    }

    fn advance(&mut self) -> Option<char> {
        let (index, ch) = self.chars.next()?;
        self.offset = index + ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn matches(&mut self, expected: char) -> bool {
        match self.chars.peek() {
            Some(&(_, ch)) if ch == expected => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn skip_comment(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token<'a> {
        Token {
            kind,
            lexeme: &self.source[self.start_offset..self.offset],
            line: self.start.line,
            column: self.start.column,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::lex(message, self.start)
    }
}

/// Tokenizes `source`, returning every token including `Eol`s and the final `Eof`.
pub fn lex(source: &str) -> Result<Vec<Token<'_>>> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_rule() {
        use TokenKind::*;
        assert_eq!(
            kinds("A + B => C\n"),
            vec![Ident, And, Ident, Implies, Ident, Eol, Eof]
        );
    }

    #[test]
    fn test_all_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("!(A|B)^C<=>D"),
            vec![Not, LParen, Ident, Or, Ident, RParen, Xor, Ident, Iif, Ident, Eof]
        );
    }

    #[test]
    fn test_fact_and_query_lines() {
        use TokenKind::*;
        assert_eq!(
            kinds("=AB\n?C"),
            vec![Equal, Ident, Ident, Eol, Query, Ident, Eof]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        use TokenKind::*;
        assert_eq!(
            kinds("# header\nA => B # trailing\n"),
            vec![Eol, Ident, Implies, Ident, Eol, Eof]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = lex("A => B\n  =A").unwrap();
        let implies = tokens[1];
        assert_eq!(implies.lexeme, "=>");
        assert_eq!((implies.line, implies.column), (1, 3));

        let equal = tokens[4];
        assert_eq!(equal.kind, TokenKind::Equal);
        assert_eq!((equal.line, equal.column), (2, 3));
    }

    #[test]
    fn test_iif_lexeme() {
        let tokens = lex("A <=> B").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Iif);
        assert_eq!(tokens[1].lexeme, "<=>");
    }

    #[test]
    fn test_incomplete_iif() {
        let err = lex("A <= B").unwrap_err();
        assert!(err.is_lex());
        assert_eq!(err.location(), Some(Location::new(1, 3)));
        assert!(err.to_string().contains("'<=>'"));
    }

    #[test]
    fn test_lone_less_than() {
        let err = lex("A < B").unwrap_err();
        assert!(err.to_string().contains("Unexpected '<'"));
    }

    #[test]
    fn test_unsupported_character() {
        let err = lex("A => B\nC & D => E").unwrap_err();
        assert_eq!(err.location(), Some(Location::new(2, 3)));
        assert!(err.to_string().contains("'&'"));
    }

    #[test]
    fn test_lowercase_and_unicode_letters_are_idents() {
        let tokens = lex("a é").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[1].lexeme, "é");
        assert_eq!(tokens[1].column, 3);
    }

    #[test]
    fn test_eof_position() {
        let tokens = lex("A\n").unwrap();
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!((eof.line, eof.column), (2, 1));
    }
}
