//! Per-run execution state.
//!
//! An `ExecContext` is derived from a `Program` and owns everything the solver
//! mutates during one evaluation: the status map, the contradiction log and
//! the statistics. A what-if rerun builds a new context from a new program;
//! contexts are never shared between runs.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::condition::Symbol;
use crate::rule::{Program, Rule};
use crate::status::Status;

/// A firing rule asserting the opposite of a declared fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contradiction {
    /// The symbol both sides disagree on.
    pub symbol: Symbol,
    /// The declared value.
    pub declared: bool,
    /// The value the rule asserts.
    pub asserted: bool,
    /// Source line of the offending rule.
    pub line: usize,
    /// Canonical text of the offending rule.
    pub rule: String,
}

impl fmt::Display for Contradiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Contradiction: {} is declared {} but rule '{}' (line {}) concludes it is {}",
            self.symbol,
            bool_word(self.declared),
            self.rule,
            self.line,
            bool_word(self.asserted)
        )
    }
}

fn bool_word(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Counters collected while solving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStats {
    /// Symbols whose rule list was scanned.
    pub symbols_solved: usize,
    /// Rule premises evaluated by the solver.
    pub rules_evaluated: usize,
    /// Rules whose premise was true.
    pub rule_firings: usize,
    /// Re-entrant requests for a symbol already being solved.
    pub cycle_hits: usize,
}

/// Runtime structure derived from a `Program`.
#[derive(Debug, Clone)]
pub struct ExecContext {
    program: Program,
    rules: Arc<[Rule]>,
    facts_true: IndexSet<Symbol>,
    facts_false: IndexSet<Symbol>,
    rules_by_conclusion: IndexMap<Symbol, Vec<usize>>,
    status: IndexMap<Symbol, Status>,
    contradictions: Vec<Contradiction>,
    stats: SolverStats,
}

impl ExecContext {
    /// Builds a fresh context for one evaluation of `program`.
    ///
    /// Every rule is indexed under each symbol that appears anywhere in its
    /// conclusion. Fact, query and conclusion symbols start out `Unknown`.
    pub fn from_program(program: &Program) -> Self {
        let rules = program.shared_rules();

        let mut facts_true = IndexSet::new();
        let mut facts_false = IndexSet::new();
        for (&symbol, &value) in program.facts() {
            if value {
                facts_true.insert(symbol);
            } else {
                facts_false.insert(symbol);
            }
        }

        let mut rules_by_conclusion: IndexMap<Symbol, Vec<usize>> = IndexMap::new();
        for (index, rule) in rules.iter().enumerate() {
            for symbol in rule.concluded_symbols() {
                rules_by_conclusion.entry(symbol).or_default().push(index);
            }
        }

        let mut status = IndexMap::new();
        let seeds = program
            .facts()
            .keys()
            .chain(program.queries())
            .chain(rules_by_conclusion.keys());
        for &symbol in seeds {
            status.entry(symbol).or_insert(Status::Unknown);
        }

        trace!(
            "indexed {} rules under {} conclusion symbols",
            rules.len(),
            rules_by_conclusion.len()
        );

        Self {
            program: program.clone(),
            rules,
            facts_true,
            facts_false,
            rules_by_conclusion,
            status,
            contradictions: Vec::new(),
            stats: SolverStats::default(),
        }
    }

    /// The program this context was built from.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Current status of `symbol`. Symbols never seen are `Unknown`.
    pub fn get_status(&self, symbol: Symbol) -> Status {
        self.status.get(&symbol).copied().unwrap_or_default()
    }

    pub(crate) fn set_status(&mut self, symbol: Symbol, status: Status) {
        self.status.insert(symbol, status);
    }

    /// Every tracked symbol with its current status.
    pub fn statuses(&self) -> &IndexMap<Symbol, Status> {
        &self.status
    }

    pub fn is_fact_true(&self, symbol: Symbol) -> bool {
        self.facts_true.contains(&symbol)
    }

    pub fn is_fact_false(&self, symbol: Symbol) -> bool {
        self.facts_false.contains(&symbol)
    }

    /// Returns the declared value of `symbol`, if it is a fact.
    pub fn declared(&self, symbol: Symbol) -> Option<bool> {
        if self.is_fact_true(symbol) {
            Some(true)
        } else if self.is_fact_false(symbol) {
            Some(false)
        } else {
            None
        }
    }

    /// Rules whose conclusion mentions `symbol`, in declaration order.
    pub fn rules_for(&self, symbol: Symbol) -> impl Iterator<Item = &Rule> + '_ {
        self.rule_indices(symbol).iter().map(|&i| &self.rules[i])
    }

    /// The full conclusion index.
    pub fn rules_by_conclusion(&self) -> IndexMap<Symbol, Vec<&Rule>> {
        self.rules_by_conclusion
            .iter()
            .map(|(&symbol, indices)| (symbol, indices.iter().map(|&i| &self.rules[i]).collect()))
            .collect()
    }

    pub(crate) fn rule_indices(&self, symbol: Symbol) -> &[usize] {
        self.rules_by_conclusion
            .get(&symbol)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn shared_rules(&self) -> Arc<[Rule]> {
        Arc::clone(&self.rules)
    }

    /// Contradictions found by the last contradiction pass.
    pub fn contradictions(&self) -> &[Contradiction] {
        &self.contradictions
    }

    pub(crate) fn record_contradiction(&mut self, contradiction: Contradiction) {
        self.contradictions.push(contradiction);
    }

    pub(crate) fn clear_contradictions(&mut self) {
        self.contradictions.clear();
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut SolverStats {
        &mut self.stats
    }
}
