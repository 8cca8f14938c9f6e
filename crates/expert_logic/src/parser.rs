//! Recursive-descent parser.
//!
//! Expression grammar, loosest binding first:
//!
//! ```text
//! or      := xor ('|' xor)*
//! xor     := and ('^' and)*
//! and     := unary ('+' unary)*
//! unary   := '!' unary | primary
//! primary := IDENT | '(' or ')'
//! ```
//!
//! A program is a block of rule lines (`expr => expr` or `expr <=> expr`),
//! then a block of fact lines (`=ABC`, optionally followed by `!XYZ` lines
//! declaring false facts), then a block of query lines (`?ABC`). Blank and
//! comment-only lines may appear anywhere.

use indexmap::IndexMap;
use log::debug;

use crate::condition::{Condition, Symbol};
use crate::error::{Error, Result};
use crate::lexer::{lex, Token, TokenKind};
use crate::rule::{Program, Rule};
use crate::validator::{ensure_known_operator, ensure_valid_symbol, validate_balanced_parentheses};

/// Parses a token stream produced by [`lex`].
pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    current: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Rules,
    Facts,
    Queries,
}

impl<'a> Parser<'a> {
    /// Creates a parser. A missing trailing `Eof` token is supplied.
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (line, column) = tokens
                .last()
                .map(|t| (t.line, t.column + t.lexeme.chars().count()))
                .unwrap_or((1, 1));
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: "",
                line,
                column,
            });
        }
        Self { tokens, current: 0 }
    }

    /// Parses a complete program.
    pub fn parse(mut self) -> Result<Program> {
        validate_balanced_parentheses(&self.tokens)?;

        let mut rules = Vec::new();
        let mut facts: IndexMap<Symbol, bool> = IndexMap::new();
        let mut queries = Vec::new();
        let mut section = Section::Rules;
        let mut has_biconditional = false;

        while !self.is_at_end() {
            if self.matches(TokenKind::Eol) {
                continue;
            }

            match (self.peek().kind, section) {
                (TokenKind::Equal, Section::Queries) => {
                    return Err(self.error("Facts must be declared before queries."));
                }
                (TokenKind::Equal, _) => {
                    section = Section::Facts;
                    self.advance();
                    for symbol in self.symbol_line("Expected a fact symbol.")? {
                        facts.insert(symbol, true);
                    }
                }
                (TokenKind::Not, Section::Facts) => {
                    self.advance();
                    if !self.check(TokenKind::Ident) {
                        return Err(self.error("Expected a fact symbol after '!'."));
                    }
                    for symbol in self.symbol_line("Expected a fact symbol.")? {
                        facts.insert(symbol, false);
                    }
                }
                (TokenKind::Query, _) => {
                    section = Section::Queries;
                    self.advance();
                    queries.extend(self.symbol_line("Expected a query symbol.")?);
                }
                (_, Section::Queries) => {
                    return Err(self.error("Unexpected content after queries."));
                }
                (_, Section::Facts) => {
                    return Err(self.error("Rules must appear before the facts declaration."));
                }
                (_, Section::Rules) => {
                    let (parsed, biconditional) = self.rule()?;
                    has_biconditional |= biconditional;
                    rules.extend(parsed);
                }
            }
        }

        match section {
            Section::Rules => return Err(Error::syntax("Missing facts line starting with '='.", None)),
            Section::Facts => {
                return Err(Error::syntax("Missing queries line starting with '?'.", None))
            }
            Section::Queries if queries.is_empty() => {
                return Err(Error::syntax("Queries must name at least one symbol.", None));
            }
            Section::Queries => {}
        }

        debug!(
            "parsed {} rules, {} facts, {} queries",
            rules.len(),
            facts.len(),
            queries.len()
        );

        let mut program = Program::new(rules, facts, queries);
        program.has_biconditional = has_biconditional;
        Ok(program)
    }

    /// Parses a single expression that must span the whole input.
    pub fn parse_condition(mut self) -> Result<Condition> {
        validate_balanced_parentheses(&self.tokens)?;
        let condition = self.expression()?;
        self.skip_line_breaks();
        if !self.is_at_end() {
            return Err(self.error("Unexpected content after the expression."));
        }
        Ok(condition)
    }

    /// Reads the symbols up to the end of the current line.
    fn symbol_line(&mut self, message: &str) -> Result<Vec<Symbol>> {
        let mut symbols = Vec::new();
        while !self.check(TokenKind::Eol) && !self.is_at_end() {
            let token = self.consume(TokenKind::Ident, message)?;
            symbols.push(ensure_valid_symbol(&token)?);
        }
        self.skip_line_breaks();
        Ok(symbols)
    }

    /// Parses one rule line. `<=>` yields two rules.
    fn rule(&mut self) -> Result<(Vec<Rule>, bool)> {
        let left = self.expression()?;

        let (operator, biconditional) = if self.matches(TokenKind::Implies) {
            (self.previous(), false)
        } else if self.matches(TokenKind::Iif) {
            (self.previous(), true)
        } else {
            return Err(self.error("Expected '=>' or '<=>' after the rule condition."));
        };
        ensure_known_operator(&operator)?;

        let right = self.expression()?;
        if !self.check(TokenKind::Eol) && !self.is_at_end() {
            return Err(self.error("Expected end of line after the rule conclusion."));
        }
        self.skip_line_breaks();

        let line = operator.line;
        let rules = if biconditional {
            vec![
                Rule::new(left.clone(), right.clone(), line),
                Rule::new(right, left, line),
            ]
        } else {
            vec![Rule::new(left, right, line)]
        };
        Ok((rules, biconditional))
    }

    fn expression(&mut self) -> Result<Condition> {
        self.or()
    }

    fn or(&mut self) -> Result<Condition> {
        let mut expr = self.xor()?;
        while self.matches(TokenKind::Or) {
            ensure_known_operator(&self.previous())?;
            let right = self.xor()?;
            expr = Condition::or(expr, right);
        }
        Ok(expr)
    }

    fn xor(&mut self) -> Result<Condition> {
        let mut expr = self.and()?;
        while self.matches(TokenKind::Xor) {
            ensure_known_operator(&self.previous())?;
            let right = self.and()?;
            expr = Condition::xor(expr, right);
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Condition> {
        let mut expr = self.unary()?;
        while self.matches(TokenKind::And) {
            ensure_known_operator(&self.previous())?;
            let right = self.unary()?;
            expr = Condition::and(expr, right);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Condition> {
        if self.matches(TokenKind::Not) {
            ensure_known_operator(&self.previous())?;
            let operand = self.unary()?;
            return Ok(Condition::not(operand));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Condition> {
        if self.matches(TokenKind::Ident) {
            let symbol = ensure_valid_symbol(&self.previous())?;
            return Ok(Condition::fact(symbol));
        }

        if self.matches(TokenKind::LParen) {
            let expr = self.expression()?;
            self.consume(TokenKind::RParen, "Expected ')' after expression.")?;
            return Ok(expr);
        }

        Err(self.error("Expected a fact symbol or '('."))
    }

    fn skip_line_breaks(&mut self) {
        while self.matches(TokenKind::Eol) {}
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token<'a>> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> Token<'a> {
        let token = self.peek();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn peek(&self) -> Token<'a> {
        self.tokens[self.current]
    }

    fn previous(&self) -> Token<'a> {
        self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// A syntax error at the current token. No location is given at end of input.
    fn error(&self, message: &str) -> Error {
        let location = (!self.is_at_end()).then(|| self.peek().location());
        Error::syntax(message, location)
    }
}

/// Lexes and parses a complete rule file.
///
/// # Errors
///
/// Returns the first lex, syntax or validation error found. Nothing is
/// returned for a source that fails any stage.
pub fn parse_program(source: &str) -> Result<Program> {
    let tokens = lex(source)?;
    Parser::new(tokens).parse()
}

/// Parses a single condition expression such as `"A + !(B | C)"`.
pub fn parse_condition(source: &str) -> Result<Condition> {
    let tokens = lex(source)?;
    Parser::new(tokens).parse_condition()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;

    fn sym(c: char) -> Symbol {
        Symbol::new(c).unwrap()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(parse_condition("A | B + C").unwrap().text(), "(A | (B + C))");
        assert_eq!(parse_condition("A ^ B | C").unwrap().text(), "((A ^ B) | C)");
        assert_eq!(parse_condition("A + B ^ C").unwrap().text(), "((A + B) ^ C)");
        assert_eq!(parse_condition("!A + B").unwrap().text(), "(!A + B)");
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(parse_condition("A + B + C").unwrap().text(), "((A + B) + C)");
        assert_eq!(parse_condition("A ^ B ^ C").unwrap().text(), "((A ^ B) ^ C)");
    }

    #[test]
    fn test_parentheses_and_negation() {
        assert_eq!(parse_condition("!(A | B)").unwrap().text(), "!(A | B)");
        assert_eq!(parse_condition("!!a").unwrap().text(), "!!A");
        assert_eq!(parse_condition("((A))").unwrap(), Condition::fact(sym('A')));
    }

    #[test]
    fn test_parse_condition_trailing_content() {
        let err = parse_condition("A B").unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(err.location(), Some(Location::new(1, 3)));
    }

    #[test]
    fn test_basic_program() {
        let program = parse_program("A + B => C\nC => D\n=AB\n?CD\n").unwrap();
        assert_eq!(program.rules().len(), 2);
        assert_eq!(program.rules()[0].text(), "(A + B) => C");
        assert_eq!(program.rules()[1].line, 2);
        assert_eq!(program.true_facts(), vec![sym('A'), sym('B')]);
        assert_eq!(program.queries(), &[sym('C'), sym('D')]);
        assert!(!program.has_biconditional());
    }

    #[test]
    fn test_biconditional_desugars_to_two_rules() {
        let program = parse_program("A + B <=> C\n=\n?C").unwrap();
        let rules = program.rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].text(), "(A + B) => C");
        assert_eq!(rules[1].text(), "C => (A + B)");
        assert_eq!(rules[0].line, rules[1].line);
        assert!(program.has_biconditional());
    }

    #[test]
    fn test_compound_conclusion() {
        let program = parse_program("A => B + !C\n=A\n?B").unwrap();
        assert_eq!(program.rules()[0].conclusion.text(), "(B + !C)");
    }

    #[test]
    fn test_comments_blank_lines_and_multiple_sections_lines() {
        let source = "# rules\n\nA => B # first\n\n# facts\n=A\n=C\n\n# queries\n?B\n?C\n";
        let program = parse_program(source).unwrap();
        assert_eq!(program.rules().len(), 1);
        assert_eq!(program.true_facts(), vec![sym('A'), sym('C')]);
        assert_eq!(program.queries(), &[sym('B'), sym('C')]);
    }

    #[test]
    fn test_empty_fact_line() {
        let program = parse_program("A | B => C\n=\n?C").unwrap();
        assert!(program.facts().is_empty());
    }

    #[test]
    fn test_negative_fact_lines() {
        let program = parse_program("A => B\n=A\n!BC\n?B").unwrap();
        assert_eq!(program.facts().get(&sym('B')), Some(&false));
        assert_eq!(program.facts().get(&sym('C')), Some(&false));
        assert_eq!(program.false_facts(), vec![sym('B'), sym('C')]);
    }

    #[test]
    fn test_negative_fact_requires_symbol() {
        let err = parse_program("=A\n!\n?A").unwrap_err();
        assert!(err.to_string().contains("after '!'"));
    }

    #[test]
    fn test_missing_sections() {
        let err = parse_program("A => B\n?B").unwrap_err();
        assert!(err.to_string().contains("Missing facts line"));
        assert_eq!(err.location(), None);

        let err = parse_program("A => B\n=A\n").unwrap_err();
        assert!(err.to_string().contains("Missing queries line"));

        let err = parse_program("A => B\n=A\n?\n").unwrap_err();
        assert!(err.to_string().contains("at least one symbol"));
    }

    #[test]
    fn test_out_of_order_sections() {
        let err = parse_program("=A\nA => B\n?B").unwrap_err();
        assert!(err.to_string().contains("Rules must appear before"));
        assert_eq!(err.location(), Some(Location::new(2, 1)));

        let err = parse_program("A => B\n?B\n=A").unwrap_err();
        assert!(err.to_string().contains("Facts must be declared before queries"));

        let err = parse_program("A => B\n=A\n?B\nC => D").unwrap_err();
        assert!(err.to_string().contains("after queries"));
    }

    #[test]
    fn test_missing_implication() {
        let err = parse_program("A + B\n=A\n?B").unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(err.location(), Some(Location::new(1, 6)));
    }

    #[test]
    fn test_dangling_operator() {
        let err = parse_program("A + => B\n=A\n?B").unwrap_err();
        assert!(err.to_string().contains("Expected a fact symbol or '('"));
        assert_eq!(err.location(), Some(Location::new(1, 5)));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = parse_program("(A + B => C\n=A\n?C").unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(err.location(), Some(Location::new(1, 1)));
    }

    #[test]
    fn test_rule_trailing_content() {
        let err = parse_program("A => B C\n=A\n?B").unwrap_err();
        assert_eq!(err.location(), Some(Location::new(1, 8)));
    }

    #[test]
    fn test_invalid_symbol_in_rule() {
        let err = parse_program("é => B\n=\n?B").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_lex_error_propagates() {
        let err = parse_program("A & B => C\n=\n?C").unwrap_err();
        assert!(err.is_lex());
    }

    #[test]
    fn test_lowercase_symbols_normalized() {
        let program = parse_program("a => b\n=a\n?b").unwrap();
        assert_eq!(program.rules()[0].text(), "A => B");
        assert_eq!(program.queries(), &[sym('B')]);
    }

    #[test]
    fn test_parser_supplies_eof() {
        let tokens: Vec<Token<'_>> = Vec::new();
        let err = Parser::new(tokens).parse().unwrap_err();
        assert!(err.to_string().contains("Missing facts line"));
    }
}
