//! Rules and programs.
//!
//! A `Program` is the parsed form of a rule file: ordered implication rules,
//! the declared facts and the ordered queries. It is immutable once built.
//! What-if runs derive a new program with [`Program::with_facts`], which
//! shares the rule list instead of copying it.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::condition::{Condition, ConditionFold, OperatorUsage, Symbol};

/// An implication `condition => conclusion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// The premise.
    pub condition: Condition,
    /// What the rule asserts when the premise is true.
    pub conclusion: Condition,
    /// 1-based source line the rule was written on.
    pub line: usize,
}

/// What a firing rule says about one symbol of its conclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assertion {
    /// The symbol must be true.
    True,
    /// The symbol must be false.
    False,
    /// The symbol takes part in a disjunction; its own value is unknown.
    Ambiguous,
}

impl Rule {
    /// Creates a new rule.
    pub fn new(condition: Condition, conclusion: Condition, line: usize) -> Self {
        Self {
            condition,
            conclusion,
            line,
        }
    }

    /// The canonical `cond => concl` rendering.
    pub fn text(&self) -> String {
        format!("{} => {}", self.condition.text(), self.conclusion.text())
    }

    /// The symbols this rule can affect when it fires.
    pub fn concluded_symbols(&self) -> IndexSet<Symbol> {
        self.conclusion.symbols()
    }

    /// Interprets the conclusion as a list of per-symbol assertions.
    ///
    /// `Not` flips polarity. A positive `And` or a negative `Or` asserts each
    /// operand definitely; a positive `Or`, a negative `And` and any `Xor`
    /// only make their operands ambiguous. Symbols are listed in source order
    /// and may repeat.
    pub fn assertions(&self) -> Vec<(Symbol, Assertion)> {
        self.conclusion.fold(&mut AssertionFold).positive
    }

    /// Returns the assertion this rule makes about `symbol`, if any.
    ///
    /// When a symbol is asserted more than once, the first assertion wins.
    pub fn assertion_for(&self, symbol: Symbol) -> Option<Assertion> {
        self.assertions()
            .into_iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, assertion)| assertion)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.condition, self.conclusion)
    }
}

/// Assertions implied by a subtree, both when it is asserted true and
/// when it is asserted false.
struct Implied {
    positive: Vec<(Symbol, Assertion)>,
    negative: Vec<(Symbol, Assertion)>,
}

fn ambiguous(items: Vec<(Symbol, Assertion)>) -> Vec<(Symbol, Assertion)> {
    items
        .into_iter()
        .map(|(symbol, _)| (symbol, Assertion::Ambiguous))
        .collect()
}

struct AssertionFold;

impl ConditionFold for AssertionFold {
    type Output = Implied;

    fn fact(&mut self, symbol: Symbol) -> Implied {
        Implied {
            positive: vec![(symbol, Assertion::True)],
            negative: vec![(symbol, Assertion::False)],
        }
    }

    fn not(&mut self, operand: Implied) -> Implied {
        Implied {
            positive: operand.negative,
            negative: operand.positive,
        }
    }

    fn and(&mut self, mut left: Implied, right: Implied) -> Implied {
        left.positive.extend(right.positive);
        left.negative.extend(right.negative);
        Implied {
            positive: left.positive,
            negative: ambiguous(left.negative),
        }
    }

    fn or(&mut self, mut left: Implied, right: Implied) -> Implied {
        left.positive.extend(right.positive);
        left.negative.extend(right.negative);
        Implied {
            positive: ambiguous(left.positive),
            negative: left.negative,
        }
    }

    fn xor(&mut self, mut left: Implied, right: Implied) -> Implied {
        left.positive.extend(right.positive);
        left.negative.extend(right.negative);
        Implied {
            positive: ambiguous(left.positive),
            negative: ambiguous(left.negative),
        }
    }
}

/// A parsed rule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    rules: Arc<[Rule]>,
    facts: IndexMap<Symbol, bool>,
    queries: Vec<Symbol>,
    #[serde(default)]
    pub(crate) has_biconditional: bool,
}

impl Program {
    /// Creates a program from its parts.
    pub fn new(rules: Vec<Rule>, facts: IndexMap<Symbol, bool>, queries: Vec<Symbol>) -> Self {
        Self {
            rules: rules.into(),
            facts,
            queries,
            has_biconditional: false,
        }
    }

    /// The rules in declaration order. Biconditionals appear as two rules.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub(crate) fn shared_rules(&self) -> Arc<[Rule]> {
        Arc::clone(&self.rules)
    }

    /// Declared facts in declaration order, mapped to their value.
    pub fn facts(&self) -> &IndexMap<Symbol, bool> {
        &self.facts
    }

    /// Queried symbols in query order.
    pub fn queries(&self) -> &[Symbol] {
        &self.queries
    }

    /// Symbols declared true.
    pub fn true_facts(&self) -> Vec<Symbol> {
        self.facts_with_value(true)
    }

    /// Symbols declared false.
    pub fn false_facts(&self) -> Vec<Symbol> {
        self.facts_with_value(false)
    }

    fn facts_with_value(&self, value: bool) -> Vec<Symbol> {
        self.facts
            .iter()
            .filter(|(_, v)| **v == value)
            .map(|(s, _)| *s)
            .collect()
    }

    /// Returns `true` if the source contained at least one `<=>` rule.
    pub fn has_biconditional(&self) -> bool {
        self.has_biconditional
    }

    /// Returns a copy of this program with `facts` replacing the declared facts.
    ///
    /// Rules and queries are shared with `self`.
    pub fn with_facts(&self, facts: IndexMap<Symbol, bool>) -> Program {
        Program {
            rules: self.shared_rules(),
            facts,
            queries: self.queries.clone(),
            has_biconditional: self.has_biconditional,
        }
    }

    /// Reports every logical operator used anywhere in the rules.
    pub fn operator_usage(&self) -> OperatorUsage {
        let usage = self
            .rules
            .iter()
            .map(|rule| rule.condition.operators().merge(rule.conclusion.operators()))
            .fold(OperatorUsage::default(), OperatorUsage::merge);
        OperatorUsage {
            iif: self.has_biconditional,
            ..usage
        }
    }
}
