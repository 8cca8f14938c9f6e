//! Three-valued evaluation and backward chaining.
//!
//! `solve_symbol` resolves one symbol by scanning the rules that can conclude
//! it, in declaration order, and recursively evaluating their premises.
//! Results are memoized in the `ExecContext`; a symbol requested again while
//! it is still being solved is a cycle and answers `Undetermined` for that
//! request only.
//!
//! `run_queries` first runs a contradiction pass over every rule, then
//! solves each query in order.

use indexmap::IndexMap;
use log::{debug, trace};

use crate::condition::{Condition, ConditionFold, Symbol};
use crate::context::{Contradiction, ExecContext};
use crate::rule::{Assertion, Rule};
use crate::status::Status;

struct Evaluator<'c> {
    ctx: &'c mut ExecContext,
}

impl ConditionFold for Evaluator<'_> {
    type Output = Status;

    fn fact(&mut self, symbol: Symbol) -> Status {
        solve_symbol(self.ctx, symbol)
    }

    fn not(&mut self, operand: Status) -> Status {
        operand.not()
    }

    fn and(&mut self, left: Status, right: Status) -> Status {
        left.and(right)
    }

    fn or(&mut self, left: Status, right: Status) -> Status {
        left.or(right)
    }

    fn xor(&mut self, left: Status, right: Status) -> Status {
        left.xor(right)
    }
}

/// Evaluates `condition` under three-valued logic.
///
/// Every symbol in the tree is solved, so both operands of each binary node
/// are always evaluated. Results are memoized in `ctx`, so calling this again
/// after a run returns the same value.
pub fn eval_condition(ctx: &mut ExecContext, condition: &Condition) -> Status {
    condition.fold(&mut Evaluator { ctx })
}

/// Resolves `symbol` to `True`, `False` or `Undetermined`.
///
/// Declared facts are returned as given. Otherwise the rules concluding
/// `symbol` are tried in order:
///
/// - a true premise fires the rule and its conclusion decides the symbol
/// - an undetermined premise makes the symbol undetermined
/// - a false premise moves on to the next rule
///
/// A symbol no rule can establish is `False`, unless one of the rules that
/// did not fire lists it among alternatives and another of those
/// alternatives holds; then it is `Undetermined`.
pub fn solve_symbol(ctx: &mut ExecContext, symbol: Symbol) -> Status {
    match ctx.get_status(symbol) {
        status if status.is_resolved() => return status,
        Status::InProgress => {
            ctx.stats_mut().cycle_hits += 1;
            trace!("cycle detected on {}", symbol);
            return Status::Undetermined;
        }
        _ => {}
    }

    if let Some(value) = ctx.declared(symbol) {
        let status = Status::from(value);
        ctx.set_status(symbol, status);
        return status;
    }

    trace!("solving {}", symbol);
    ctx.set_status(symbol, Status::InProgress);
    ctx.stats_mut().symbols_solved += 1;

    let rules = ctx.shared_rules();
    let indices = ctx.rule_indices(symbol).to_vec();
    // Set once a non-firing rule has a true alternative in its conclusion.
    let mut vacuous = false;

    for index in indices {
        let rule = &rules[index];
        ctx.stats_mut().rules_evaluated += 1;
        let premise = eval_condition(ctx, &rule.condition);

        // A nested rule may already have settled this symbol.
        let current = ctx.get_status(symbol);
        if current.is_resolved() {
            debug!("{} resolved to {} while evaluating line {}", symbol, current, rule.line);
            return current;
        }

        match premise {
            Status::True => {
                ctx.stats_mut().rule_firings += 1;
                let status = fire(ctx, rule, symbol);
                debug!("{} is {} by rule '{}' (line {})", symbol, status, rule, rule.line);
                return status;
            }
            Status::False => {
                if !vacuous && sibling_holds(ctx, rule, symbol) {
                    trace!("{}: an alternative of rule '{}' holds", symbol, rule);
                    vacuous = true;
                }
            }
            _ => {
                ctx.set_status(symbol, Status::Undetermined);
                debug!(
                    "{} is UNDETERMINED: premise of rule '{}' is undetermined",
                    symbol, rule
                );
                return Status::Undetermined;
            }
        }
    }

    let current = ctx.get_status(symbol);
    if current.is_resolved() {
        return current;
    }

    if vacuous {
        ctx.set_status(symbol, Status::Undetermined);
        debug!(
            "{} is UNDETERMINED: another alternative of its conclusion holds",
            symbol
        );
        return Status::Undetermined;
    }

    ctx.set_status(symbol, Status::False);
    debug!("{} is FALSE: no rule establishes it", symbol);
    Status::False
}

/// Applies the conclusion of a rule whose premise is true.
///
/// Symbols that are declared facts or already resolved are left alone.
/// Returns the resulting status of `symbol`.
fn fire(ctx: &mut ExecContext, rule: &Rule, symbol: Symbol) -> Status {
    for (target, assertion) in rule.assertions() {
        if ctx.declared(target).is_some() {
            continue;
        }
        if matches!(ctx.get_status(target), Status::Unknown | Status::InProgress) {
            let status = match assertion {
                Assertion::True => Status::True,
                Assertion::False => Status::False,
                Assertion::Ambiguous => Status::Undetermined,
            };
            ctx.set_status(target, status);
        }
    }
    ctx.get_status(symbol)
}

/// For a rule that did not fire, checks whether another alternative of its
/// conclusion holds.
///
/// `symbol` is held `False` while the alternatives are solved and put back
/// in progress afterwards.
fn sibling_holds(ctx: &mut ExecContext, rule: &Rule, symbol: Symbol) -> bool {
    let assertions = rule.assertions();
    if !assertions
        .iter()
        .any(|&(s, a)| s == symbol && a == Assertion::Ambiguous)
    {
        return false;
    }

    let siblings: Vec<Symbol> = assertions
        .into_iter()
        .filter(|&(s, a)| s != symbol && a == Assertion::Ambiguous)
        .map(|(s, _)| s)
        .collect();

    ctx.set_status(symbol, Status::False);
    let mut holds = false;
    for sibling in siblings {
        if solve_symbol(ctx, sibling) == Status::True {
            holds = true;
            break;
        }
    }
    ctx.set_status(symbol, Status::InProgress);
    holds
}

/// Checks every rule whose premise is currently true against the declared
/// facts, recording each definite assertion that contradicts one.
///
/// Ambiguous assertions never contradict. Previously recorded
/// contradictions are replaced.
pub fn detect_contradictions(ctx: &mut ExecContext) -> &[Contradiction] {
    ctx.clear_contradictions();
    let rules = ctx.shared_rules();

    for rule in rules.iter() {
        if eval_condition(ctx, &rule.condition) != Status::True {
            continue;
        }
        for (symbol, assertion) in rule.assertions() {
            let asserted = match assertion {
                Assertion::True => true,
                Assertion::False => false,
                Assertion::Ambiguous => continue,
            };
            if ctx.declared(symbol) == Some(!asserted) {
                let contradiction = Contradiction {
                    symbol,
                    declared: !asserted,
                    asserted,
                    line: rule.line,
                    rule: rule.text(),
                };
                debug!("{}", contradiction);
                ctx.record_contradiction(contradiction);
            }
        }
    }

    ctx.contradictions()
}

/// Runs the contradiction pass, then solves every query in order.
///
/// Results are returned even when contradictions were found; callers should
/// check [`ExecContext::contradictions`] before trusting them.
pub fn run_queries(ctx: &mut ExecContext) -> IndexMap<Symbol, Status> {
    detect_contradictions(ctx);

    let queries = ctx.program().queries().to_vec();
    let mut results = IndexMap::with_capacity(queries.len());
    for query in queries {
        let status = solve_symbol(ctx, query);
        results.insert(query, status);
    }

    debug!(
        "answered {} queries ({} contradictions)",
        results.len(),
        ctx.contradictions().len()
    );
    results
}
