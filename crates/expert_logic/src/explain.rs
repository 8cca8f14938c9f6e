//! Reasoning explanations.
//!
//! An `Explanation` records why a solved symbol ended up with its status:
//! which fact or rule decided it, or which rules were considered and failed.
//! Building one only re-evaluates memoized conditions, so it must run after
//! the symbol has been solved and does not change any result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition::Symbol;
use crate::context::ExecContext;
use crate::error::{Error, Result};
use crate::rule::{Assertion, Rule};
use crate::solver::{eval_condition, solve_symbol};
use crate::status::Status;

/// The status of one symbol used as evidence for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub symbol: Symbol,
    pub status: Status,
}

/// One step of an explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExplanationStep {
    /// The symbol was declared in the fact section.
    GivenFact { value: bool },
    /// A rule with a true premise asserted the symbol.
    RuleFired {
        rule: String,
        line: usize,
        premises: Vec<Evidence>,
    },
    /// A rule with a true premise asserted the negation of the symbol.
    RuleNegated {
        rule: String,
        line: usize,
        premises: Vec<Evidence>,
    },
    /// A rule with a true premise only says one of several symbols holds.
    AmbiguousConclusion {
        rule: String,
        line: usize,
        premises: Vec<Evidence>,
        alternatives: Vec<Symbol>,
    },
    /// A rule that could conclude the symbol but whose premise is not true.
    RuleBlocked {
        rule: String,
        line: usize,
        premise: Status,
        premises: Vec<Evidence>,
    },
    /// A rule that did not apply lists the symbol among alternatives, and
    /// another of them is true, so the symbol cannot default to false.
    AlternativeHolds {
        rule: String,
        line: usize,
        alternative: Symbol,
    },
    /// The symbol depends on itself and nothing breaks the loop.
    Cycle,
    /// Nothing establishes the symbol, so it defaults to false.
    ClosedWorld { rules_considered: usize },
}

/// Why a symbol has the status it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub symbol: Symbol,
    pub status: Status,
    pub steps: Vec<ExplanationStep>,
}

impl Explanation {
    /// Serializes the explanation into a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::from)
    }

    /// Deserializes an explanation from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::from)
    }
}

/// Builds the explanation for `symbol`.
///
/// The symbol is solved first if it has not been already.
pub fn explain(ctx: &mut ExecContext, symbol: Symbol) -> Explanation {
    let status = solve_symbol(ctx, symbol);
    let mut steps = Vec::new();

    if let Some(value) = ctx.declared(symbol) {
        steps.push(ExplanationStep::GivenFact { value });
        return Explanation {
            symbol,
            status,
            steps,
        };
    }

    let rules: Vec<Rule> = ctx.rules_for(symbol).cloned().collect();
    let mut blocked = Vec::new();
    let mut alternatives_holding = Vec::new();

    for rule in &rules {
        let premise = eval_condition(ctx, &rule.condition);
        let premises = evidence(ctx, rule);
        let assertion = rule.assertion_for(symbol);

        if premise != Status::True {
            if premise == Status::False && assertion == Some(Assertion::Ambiguous) {
                if let Some(alternative) = holding_alternative(ctx, rule, symbol) {
                    alternatives_holding.push(ExplanationStep::AlternativeHolds {
                        rule: rule.text(),
                        line: rule.line,
                        alternative,
                    });
                }
            }
            blocked.push(ExplanationStep::RuleBlocked {
                rule: rule.text(),
                line: rule.line,
                premise,
                premises,
            });
            continue;
        }

        let decisive = match (assertion, status) {
            (Some(Assertion::True), Status::True) => Some(ExplanationStep::RuleFired {
                rule: rule.text(),
                line: rule.line,
                premises,
            }),
            (Some(Assertion::False), Status::False) => Some(ExplanationStep::RuleNegated {
                rule: rule.text(),
                line: rule.line,
                premises,
            }),
            (Some(Assertion::Ambiguous), Status::Undetermined) => {
                let alternatives = rule
                    .concluded_symbols()
                    .into_iter()
                    .filter(|s| *s != symbol)
                    .collect();
                Some(ExplanationStep::AmbiguousConclusion {
                    rule: rule.text(),
                    line: rule.line,
                    premises,
                    alternatives,
                })
            }
            _ => None,
        };

        if let Some(step) = decisive {
            steps.push(step);
            return Explanation {
                symbol,
                status,
                steps,
            };
        }
    }

    match status {
        Status::Undetermined => {
            let undetermined: Vec<_> = blocked
                .into_iter()
                .filter(|step| {
                    matches!(
                        step,
                        ExplanationStep::RuleBlocked {
                            premise: Status::Undetermined,
                            ..
                        }
                    )
                })
                .collect();
            if undetermined.is_empty() && alternatives_holding.is_empty() {
                steps.push(ExplanationStep::Cycle);
            } else {
                steps.extend(undetermined);
                steps.extend(alternatives_holding);
            }
        }
        _ => {
            steps.extend(blocked);
            steps.push(ExplanationStep::ClosedWorld {
                rules_considered: rules.len(),
            });
        }
    }

    Explanation {
        symbol,
        status,
        steps,
    }
}

fn evidence(ctx: &ExecContext, rule: &Rule) -> Vec<Evidence> {
    rule.condition
        .symbols()
        .into_iter()
        .map(|symbol| Evidence {
            symbol,
            status: ctx.get_status(symbol),
        })
        .collect()
}

fn holding_alternative(ctx: &ExecContext, rule: &Rule, symbol: Symbol) -> Option<Symbol> {
    rule.assertions()
        .into_iter()
        .find(|&(s, a)| {
            s != symbol && a == Assertion::Ambiguous && ctx.get_status(s) == Status::True
        })
        .map(|(s, _)| s)
}

fn truth_word(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

struct EvidenceList<'a>(&'a [Evidence]);

impl fmt::Display for EvidenceList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} is {}", item.symbol, item.status)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.symbol;
        writeln!(f, "Reasoning for {}:", s)?;

        for step in &self.steps {
            match step {
                ExplanationStep::GivenFact { value } => {
                    writeln!(
                        f,
                        "  We know that {} is {} (given as initial fact).",
                        s,
                        truth_word(*value)
                    )?;
                }
                ExplanationStep::RuleFired {
                    rule,
                    line,
                    premises,
                } => {
                    writeln!(f, "  We can prove {} is true using the rule:", s)?;
                    writeln!(f, "    {} (line {})", rule, line)?;
                    writeln!(f, "  The condition holds: {}.", EvidenceList(premises))?;
                }
                ExplanationStep::RuleNegated {
                    rule,
                    line,
                    premises,
                } => {
                    writeln!(f, "  We can prove {} is false using the rule:", s)?;
                    writeln!(f, "    {} (line {})", rule, line)?;
                    writeln!(f, "  The condition holds: {}.", EvidenceList(premises))?;
                }
                ExplanationStep::AmbiguousConclusion {
                    rule,
                    line,
                    premises,
                    alternatives,
                } => {
                    writeln!(f, "  The rule that applies is:")?;
                    writeln!(f, "    {} (line {})", rule, line)?;
                    writeln!(f, "  The condition holds: {}.", EvidenceList(premises))?;
                    let others: Vec<&str> = alternatives.iter().map(|a| a.as_str()).collect();
                    writeln!(
                        f,
                        "  Its conclusion only says that some of {} and {} hold, not which.",
                        s,
                        others.join(", ")
                    )?;
                }
                ExplanationStep::RuleBlocked {
                    rule,
                    line,
                    premise,
                    premises,
                } => {
                    writeln!(f, "  Rule {} (line {}) does not apply:", rule, line)?;
                    writeln!(
                        f,
                        "    its condition is {} ({}).",
                        premise,
                        EvidenceList(premises)
                    )?;
                }
                ExplanationStep::AlternativeHolds {
                    rule,
                    line,
                    alternative,
                } => {
                    writeln!(
                        f,
                        "  Rule {} (line {}) does not apply, but {} is true.",
                        rule, line, alternative
                    )?;
                    writeln!(
                        f,
                        "    {} is one of its alternatives, so it cannot be assumed false.",
                        s
                    )?;
                }
                ExplanationStep::Cycle => {
                    writeln!(
                        f,
                        "  The value of {} depends on itself through the rules, and no fact settles it.",
                        s
                    )?;
                }
                ExplanationStep::ClosedWorld { rules_considered } => {
                    if *rules_considered == 0 {
                        writeln!(f, "  No rule concludes {}, and it is not given as a fact.", s)?;
                    }
                    writeln!(
                        f,
                        "  Therefore, {} is false (closed-world assumption).",
                        s
                    )?;
                }
            }
        }

        write!(f, "Conclusion: {} is {}", s, self.status)
    }
}
