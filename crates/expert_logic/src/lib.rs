//! Expert Logic - Three-valued propositional rule engine
//!
//! This crate parses a small rule language (implications over single-letter
//! symbols, declared facts and queries) and answers each query with `TRUE`,
//! `FALSE` or `UNDETERMINED` by backward chaining over three-valued logic.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Front end                              │
//! │   text ──► Lexer ──► Validator ──► Parser ──► Program        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                       Execution                              │
//! │   Program ──► ExecContext ──► contradiction pass             │
//! │                    │                                         │
//! │                    └──► solve_symbol / eval_condition        │
//! │                              (memoized, cycle-safe)          │
//! ├─────────────────────────────────────────────────────────────┤
//! │   {symbol ─► Status}   contradictions   explanations         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use expert_logic::{parse_program, run_queries, ExecContext, Status, Symbol};
//!
//! let program = parse_program("A + B => C\nC => D\n=AB\n?CD\n").unwrap();
//! let mut ctx = ExecContext::from_program(&program);
//! let results = run_queries(&mut ctx);
//!
//! let d = Symbol::new('D').unwrap();
//! assert_eq!(results[&d], Status::True);
//! assert!(ctx.contradictions().is_empty());
//! ```

pub mod condition;
pub mod context;
pub mod error;
pub mod explain;
pub mod lexer;
pub mod parser;
pub mod rule;
pub mod solver;
pub mod status;
pub mod validator;

// Re-exports
pub use condition::{Condition, ConditionFold, OperatorUsage, Symbol};
pub use context::{Contradiction, ExecContext, SolverStats};
pub use error::{Error, Location, Result};
pub use explain::{explain, Explanation, ExplanationStep};
pub use lexer::{lex, Token, TokenKind};
pub use parser::{parse_condition, parse_program, Parser};
pub use rule::{Assertion, Program, Rule};
pub use solver::{detect_contradictions, eval_condition, run_queries, solve_symbol};
pub use status::Status;
