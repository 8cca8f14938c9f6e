//! Symbols and condition expression trees.
//!
//! A `Condition` is a closed tree of five node kinds. Every compound node
//! carries its canonical rendering (`(L op R)` or `!X`), computed once when the
//! node is built. The rendering is for diagnostics only; equality is
//! structural.
//!
//! All recursive walks go through [`ConditionFold`], a bottom-up fold over the
//! five variants. The evaluator, symbol collection, pretty printing and
//! operator detection are all folds.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::Error;

const NAMES: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S",
    "T", "U", "V", "W", "X", "Y", "Z",
];

/// A propositional symbol: a single uppercase letter `A`..`Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u8);

impl Symbol {
    /// Builds a symbol from a letter, normalizing lowercase to uppercase.
    ///
    /// Returns `None` for anything that is not an ASCII letter.
    pub fn new(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        upper.is_ascii_uppercase().then_some(Symbol(upper as u8))
    }

    /// Returns the letter.
    pub fn as_char(self) -> char {
        self.0 as char
    }

    /// Returns the letter as a static string slice.
    pub fn as_str(self) -> &'static str {
        NAMES[(self.0 - b'A') as usize]
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Symbol::new(c),
            _ => None,
        }
        .ok_or_else(|| Error::validation(format!("Invalid fact symbol '{}'.", s), None))
    }
}

impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A negation node.
#[derive(Debug, Clone)]
pub struct Unary {
    pub operand: Box<Condition>,
    text: String,
}

impl PartialEq for Unary {
    fn eq(&self, other: &Self) -> bool {
        self.operand == other.operand
    }
}

impl Eq for Unary {}

/// A binary operator node.
#[derive(Debug, Clone)]
pub struct Binary {
    pub left: Box<Condition>,
    pub right: Box<Condition>,
    text: String,
}

impl PartialEq for Binary {
    fn eq(&self, other: &Self) -> bool {
        self.left == other.left && self.right == other.right
    }
}

impl Eq for Binary {}

/// A condition expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// A bare symbol.
    Fact(Symbol),
    /// `!X`
    Not(Unary),
    /// `L + R`
    And(Binary),
    /// `L | R`
    Or(Binary),
    /// `L ^ R`
    Xor(Binary),
}

/// A bottom-up fold over a condition tree.
///
/// Operands are always folded left to right before their parent is combined.
pub trait ConditionFold {
    type Output;

    fn fact(&mut self, symbol: Symbol) -> Self::Output;
    fn not(&mut self, operand: Self::Output) -> Self::Output;
    fn and(&mut self, left: Self::Output, right: Self::Output) -> Self::Output;
    fn or(&mut self, left: Self::Output, right: Self::Output) -> Self::Output;
    fn xor(&mut self, left: Self::Output, right: Self::Output) -> Self::Output;
}

impl Condition {
    pub fn fact(symbol: Symbol) -> Self {
        Condition::Fact(symbol)
    }

    pub fn not(operand: Condition) -> Self {
        let text = format!("!{}", operand.text());
        Condition::Not(Unary {
            operand: Box::new(operand),
            text,
        })
    }

    pub fn and(left: Condition, right: Condition) -> Self {
        Condition::And(Binary::new(left, "+", right))
    }

    pub fn or(left: Condition, right: Condition) -> Self {
        Condition::Or(Binary::new(left, "|", right))
    }

    pub fn xor(left: Condition, right: Condition) -> Self {
        Condition::Xor(Binary::new(left, "^", right))
    }

    /// Returns the cached canonical rendering.
    pub fn text(&self) -> &str {
        match self {
            Condition::Fact(symbol) => symbol.as_str(),
            Condition::Not(unary) => &unary.text,
            Condition::And(binary) | Condition::Or(binary) | Condition::Xor(binary) => {
                &binary.text
            }
        }
    }

    /// Applies `folder` to this tree.
    pub fn fold<F: ConditionFold>(&self, folder: &mut F) -> F::Output {
        match self {
            Condition::Fact(symbol) => folder.fact(*symbol),
            Condition::Not(unary) => {
                let operand = unary.operand.fold(folder);
                folder.not(operand)
            }
            Condition::And(binary) => {
                let (left, right) = binary.fold_operands(folder);
                folder.and(left, right)
            }
            Condition::Or(binary) => {
                let (left, right) = binary.fold_operands(folder);
                folder.or(left, right)
            }
            Condition::Xor(binary) => {
                let (left, right) = binary.fold_operands(folder);
                folder.xor(left, right)
            }
        }
    }

    /// Returns every symbol in the tree, in first-seen order, without duplicates.
    pub fn symbols(&self) -> IndexSet<Symbol> {
        let mut collector = SymbolCollector::default();
        self.fold(&mut collector);
        collector.symbols
    }

    /// Returns `true` if `symbol` appears anywhere in the tree.
    pub fn mentions(&self, symbol: Symbol) -> bool {
        self.symbols().contains(&symbol)
    }

    /// Renders the condition with only the parentheses needed to preserve
    /// its structure.
    pub fn pretty(&self) -> String {
        self.fold(&mut PrettyPrinter).0
    }

    /// Reports which logical operators occur in the tree.
    pub fn operators(&self) -> OperatorUsage {
        self.fold(&mut OperatorDetector)
    }
}

impl Binary {
    fn new(left: Condition, op: &str, right: Condition) -> Self {
        let text = format!("({} {} {})", left.text(), op, right.text());
        Self {
            left: Box::new(left),
            right: Box::new(right),
            text,
        }
    }

    fn fold_operands<F: ConditionFold>(&self, folder: &mut F) -> (F::Output, F::Output) {
        let left = self.left.fold(folder);
        let right = self.right.fold(folder);
        (left, right)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl Serialize for Condition {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.text())
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ConditionVisitor;

        impl Visitor<'_> for ConditionVisitor {
            type Value = Condition;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a condition expression such as \"(A + !B)\"")
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Condition, E>
            where
                E: de::Error,
            {
                crate::parser::parse_condition(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(ConditionVisitor)
    }
}

/// Which logical operators appear in a condition or program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorUsage {
    pub and: bool,
    pub or: bool,
    pub xor: bool,
    pub not: bool,
    /// Only set at program level, where biconditionals are known.
    pub iif: bool,
}

impl OperatorUsage {
    /// Combines two usage reports.
    pub fn merge(self, other: OperatorUsage) -> OperatorUsage {
        OperatorUsage {
            and: self.and || other.and,
            or: self.or || other.or,
            xor: self.xor || other.xor,
            not: self.not || other.not,
            iif: self.iif || other.iif,
        }
    }
}

#[derive(Default)]
struct SymbolCollector {
    symbols: IndexSet<Symbol>,
}

impl ConditionFold for SymbolCollector {
    type Output = ();

    fn fact(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol);
    }
    fn not(&mut self, _: ()) {}
    fn and(&mut self, _: (), _: ()) {}
    fn or(&mut self, _: (), _: ()) {}
    fn xor(&mut self, _: (), _: ()) {}
}

struct OperatorDetector;

impl ConditionFold for OperatorDetector {
    type Output = OperatorUsage;

    fn fact(&mut self, _: Symbol) -> OperatorUsage {
        OperatorUsage::default()
    }

    fn not(&mut self, operand: OperatorUsage) -> OperatorUsage {
        OperatorUsage {
            not: true,
            ..operand
        }
    }

    fn and(&mut self, left: OperatorUsage, right: OperatorUsage) -> OperatorUsage {
        OperatorUsage {
            and: true,
            ..left.merge(right)
        }
    }

    fn or(&mut self, left: OperatorUsage, right: OperatorUsage) -> OperatorUsage {
        OperatorUsage {
            or: true,
            ..left.merge(right)
        }
    }

    fn xor(&mut self, left: OperatorUsage, right: OperatorUsage) -> OperatorUsage {
        OperatorUsage {
            xor: true,
            ..left.merge(right)
        }
    }
}

// Binding strength, loosest first.
const PREC_OR: u8 = 1;
const PREC_XOR: u8 = 2;
const PREC_AND: u8 = 3;
const PREC_NOT: u8 = 4;
const PREC_ATOM: u8 = 5;

struct PrettyPrinter;

impl PrettyPrinter {
    fn binary(left: (String, u8), op: &str, right: (String, u8), prec: u8) -> (String, u8) {
        // Operators fold to the left, so a right operand of equal strength
        // needs parentheses to keep its grouping.
        let left = wrap(left, |p| p < prec);
        let right = wrap(right, |p| p <= prec);
        (format!("{} {} {}", left, op, right), prec)
    }
}

fn wrap((text, prec): (String, u8), needs_parens: impl Fn(u8) -> bool) -> String {
    if needs_parens(prec) {
        format!("({})", text)
    } else {
        text
    }
}

impl ConditionFold for PrettyPrinter {
    type Output = (String, u8);

    fn fact(&mut self, symbol: Symbol) -> (String, u8) {
        (symbol.as_str().to_string(), PREC_ATOM)
    }

    fn not(&mut self, operand: (String, u8)) -> (String, u8) {
        (format!("!{}", wrap(operand, |p| p < PREC_NOT)), PREC_NOT)
    }

    fn and(&mut self, left: (String, u8), right: (String, u8)) -> (String, u8) {
        Self::binary(left, "+", right, PREC_AND)
    }

    fn or(&mut self, left: (String, u8), right: (String, u8)) -> (String, u8) {
        Self::binary(left, "|", right, PREC_OR)
    }

    fn xor(&mut self, left: (String, u8), right: (String, u8)) -> (String, u8) {
        Self::binary(left, "^", right, PREC_XOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(c: char) -> Symbol {
        Symbol::new(c).unwrap()
    }

    fn fact(c: char) -> Condition {
        Condition::fact(sym(c))
    }

    #[test]
    fn test_symbol_normalization() {
        assert_eq!(sym('b'), sym('B'));
        assert_eq!(sym('z').as_str(), "Z");
        assert!(Symbol::new('1').is_none());
        assert!(Symbol::new('é').is_none());
    }

    #[test]
    fn test_symbol_from_str() {
        assert_eq!("k".parse::<Symbol>().unwrap(), sym('K'));
        assert!("KK".parse::<Symbol>().is_err());
        assert!("".parse::<Symbol>().is_err());
    }

    #[test]
    fn test_canonical_text() {
        let cond = Condition::or(
            Condition::and(fact('A'), Condition::not(fact('B'))),
            fact('C'),
        );
        assert_eq!(cond.text(), "((A + !B) | C)");
        assert_eq!(cond.to_string(), "((A + !B) | C)");
    }

    #[test]
    fn test_structural_equality() {
        let a = Condition::xor(fact('A'), fact('B'));
        let b = Condition::xor(fact('A'), fact('B'));
        let c = Condition::xor(fact('B'), fact('A'));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(Condition::and(fact('A'), fact('B')), Condition::or(fact('A'), fact('B')));
    }

    #[test]
    fn test_symbols_in_first_seen_order() {
        let cond = Condition::and(
            fact('C'),
            Condition::or(fact('A'), Condition::not(fact('C'))),
        );
        let symbols: Vec<_> = cond.symbols().into_iter().collect();
        assert_eq!(symbols, vec![sym('C'), sym('A')]);
        assert!(cond.mentions(sym('A')));
        assert!(!cond.mentions(sym('B')));
    }

    #[test]
    fn test_pretty_minimal_parentheses() {
        let cond = Condition::and(Condition::or(fact('A'), fact('B')), fact('C'));
        assert_eq!(cond.pretty(), "(A | B) + C");

        let cond = Condition::or(Condition::and(fact('A'), fact('B')), fact('C'));
        assert_eq!(cond.pretty(), "A + B | C");

        let cond = Condition::not(Condition::xor(fact('A'), fact('B')));
        assert_eq!(cond.pretty(), "!(A ^ B)");

        let cond = Condition::not(Condition::not(fact('A')));
        assert_eq!(cond.pretty(), "!!A");
    }

    #[test]
    fn test_pretty_keeps_right_grouping() {
        let left = Condition::and(Condition::and(fact('A'), fact('B')), fact('C'));
        let right = Condition::and(fact('A'), Condition::and(fact('B'), fact('C')));
        assert_eq!(left.pretty(), "A + B + C");
        assert_eq!(right.pretty(), "A + (B + C)");
    }

    #[test]
    fn test_operator_usage() {
        let cond = Condition::and(fact('A'), Condition::not(fact('B')));
        let usage = cond.operators();
        assert!(usage.and && usage.not);
        assert!(!usage.or && !usage.xor);
        assert_eq!(fact('A').operators(), OperatorUsage::default());
    }

    #[test]
    fn test_serde_uses_canonical_text() {
        let cond = Condition::or(fact('A'), Condition::not(fact('B')));
        let json = serde_json::to_string(&cond).unwrap();
        assert_eq!(json, "\"(A | !B)\"");

        let back: Condition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cond);
    }

    #[test]
    fn test_deserialize_rejects_bad_text() {
        let result: Result<Condition, _> = serde_json::from_str("\"A +\"");
        assert!(result.is_err());
    }
}
