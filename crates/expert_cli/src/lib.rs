//! Expert CLI - command-line front end for `expert_logic`.
//!
//! The binary reads a rule file, prints the answer to every query and
//! optionally explains each answer or opens a what-if prompt. Everything the
//! binary does is available here so it can be tested without spawning a
//! process.

pub mod config;
pub mod interactive;
pub mod report;

use expert_logic::{
    explain, run_queries, Contradiction, ExecContext, Explanation, Program, SolverStats, Status,
    Symbol,
};
use indexmap::IndexMap;

pub use config::{Config, ConfigError, OutputFormat};

/// Environment variable enabling reasoning output.
pub const ENV_REASONING: &str = "EXPERT_SYSTEM_REASONING";

/// Environment variable selecting the output format (`text` or `json`).
pub const ENV_OUTPUT: &str = "EXPERT_SYSTEM_OUTPUT";

/// Environment variable disabling colors when set.
pub const ENV_NO_COLOR: &str = "NO_COLOR";

/// Exit code when contradictions make the results unreliable.
pub const EXIT_CONTRADICTION: u8 = 2;

/// Exit code when the rule file cannot be read or parsed.
pub const EXIT_FAILURE: u8 = 1;

/// Everything produced by one evaluation of a program.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub results: IndexMap<Symbol, Status>,
    pub contradictions: Vec<Contradiction>,
    pub stats: SolverStats,
    /// One explanation per query, empty unless requested.
    pub explanations: Vec<Explanation>,
}

impl Evaluation {
    /// Results are only reliable when no contradiction was found.
    pub fn is_reliable(&self) -> bool {
        self.contradictions.is_empty()
    }
}

/// Builds a fresh context for `program`, answers its queries and, if
/// `reasoning` is set, explains each answer.
pub fn evaluate(program: &Program, reasoning: bool) -> Evaluation {
    let mut ctx = ExecContext::from_program(program);
    let results = run_queries(&mut ctx);

    let explanations = if reasoning {
        program
            .queries()
            .iter()
            .map(|&query| explain(&mut ctx, query))
            .collect()
    } else {
        Vec::new()
    };

    let stats = *ctx.stats();
    log::debug!(
        "solver stats: {} symbols solved, {} rules evaluated, {} firings, {} cycle hits",
        stats.symbols_solved,
        stats.rules_evaluated,
        stats.rule_firings,
        stats.cycle_hits
    );

    Evaluation {
        results,
        contradictions: ctx.contradictions().to_vec(),
        stats,
        explanations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expert_logic::parse_program;

    #[test]
    fn test_evaluate_collects_everything() {
        let program = parse_program("A => B\n=A\n!B\n?B").unwrap();
        let evaluation = evaluate(&program, true);

        assert_eq!(evaluation.results.len(), 1);
        assert!(!evaluation.is_reliable());
        assert_eq!(evaluation.explanations.len(), 1);
        assert_eq!(evaluation.explanations[0].symbol, Symbol::new('B').unwrap());
    }

    #[test]
    fn test_evaluate_without_reasoning() {
        let program = parse_program("A + B => C\n=AB\n?C").unwrap();
        let evaluation = evaluate(&program, false);

        assert!(evaluation.is_reliable());
        assert!(evaluation.explanations.is_empty());
        assert_eq!(evaluation.stats.rule_firings, 1);
    }
}
