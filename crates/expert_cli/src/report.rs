//! Presentation of programs and results.
//!
//! Text output is built as strings so it can be tested; colors are applied
//! only when requested.

use colored::{ColoredString, Colorize};
use expert_logic::{Contradiction, Explanation, OperatorUsage, Program, Status, Symbol};
use indexmap::IndexMap;
use serde::Serialize;

use crate::Evaluation;

pub(crate) fn paint(text: &str, color: bool, style: fn(&str) -> ColoredString) -> String {
    if color {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

fn header(text: &str, color: bool) -> String {
    paint(text, color, |t| t.magenta().bold())
}

fn label(text: &str, color: bool) -> String {
    paint(text, color, |t| t.cyan())
}

/// Renders a status with its conventional color.
pub fn status_label(status: Status, color: bool) -> String {
    let text = status.to_string();
    match status {
        Status::True => paint(&text, color, |t| t.green().bold()),
        Status::False => paint(&text, color, |t| t.red().bold()),
        _ => paint(&text, color, |t| t.yellow().bold()),
    }
}

fn symbol_list(symbols: &[Symbol]) -> String {
    if symbols.is_empty() {
        return "(none)".to_string();
    }
    symbols
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Names of the operators in use, in a fixed order.
pub fn operator_names(usage: OperatorUsage) -> Vec<&'static str> {
    [
        (usage.and, "AND"),
        (usage.or, "OR"),
        (usage.xor, "XOR"),
        (usage.not, "NOT"),
        (usage.iif, "IIF"),
    ]
    .into_iter()
    .filter_map(|(used, name)| used.then_some(name))
    .collect()
}

/// One line per item of the program summary.
pub fn program_summary(program: &Program) -> Vec<String> {
    let mut lines = Vec::with_capacity(program.rules().len() + 5);

    lines.push(format!("Rules ({}):", program.rules().len()));
    for (i, rule) in program.rules().iter().enumerate() {
        lines.push(format!(
            "  [{:02}] line {} -> {} => {}",
            i + 1,
            rule.line,
            rule.condition.pretty(),
            rule.conclusion.pretty()
        ));
    }

    lines.push(format!("Facts true: {}", symbol_list(&program.true_facts())));
    lines.push(format!("Facts false: {}", symbol_list(&program.false_facts())));
    lines.push(format!("Queries: {}", symbol_list(program.queries())));

    let operators = operator_names(program.operator_usage());
    if operators.is_empty() {
        lines.push("Operators used: (none)".to_string());
    } else {
        lines.push(format!("Operators used: {}", operators.join(", ")));
    }

    lines
}

/// Writes the program summary to the log at info level.
pub fn log_program_summary(program: &Program) {
    for line in program_summary(program) {
        log::info!("{}", line);
    }
}

/// Renders the query answers and any contradictions.
pub fn render_results(
    results: &IndexMap<Symbol, Status>,
    contradictions: &[Contradiction],
    color: bool,
) -> String {
    let mut out = String::new();

    if !contradictions.is_empty() {
        out.push_str(&paint(
            "WARNING: contradictions detected, results are UNRELIABLE",
            color,
            |t| t.red().bold(),
        ));
        out.push('\n');
        for contradiction in contradictions {
            out.push_str(&format!("  {}\n", contradiction));
        }
        out.push('\n');
    }

    out.push_str(&header("Query results:", color));
    out.push('\n');
    for (symbol, status) in results {
        out.push_str(&format!(
            "  {}: {}\n",
            label(symbol.as_str(), color),
            status_label(*status, color)
        ));
    }
    out
}

/// Renders explanations, one block per query.
pub fn render_explanations(explanations: &[Explanation], color: bool) -> String {
    let mut out = String::new();
    for explanation in explanations {
        let rule = "=".repeat(60);
        out.push_str(&header(&rule, color));
        out.push('\n');
        out.push_str(&explanation.to_string());
        out.push('\n');
    }
    if !explanations.is_empty() {
        out.push_str(&header(&"=".repeat(60), color));
        out.push('\n');
    }
    out
}

/// Renders a full evaluation as text.
pub fn render_evaluation(evaluation: &Evaluation, color: bool) -> String {
    let mut out = render_results(&evaluation.results, &evaluation.contradictions, color);
    if !evaluation.explanations.is_empty() {
        out.push('\n');
        out.push_str(&render_explanations(&evaluation.explanations, color));
    }
    out
}

/// The document printed by `--json`.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub results: &'a IndexMap<Symbol, Status>,
    pub contradictions: &'a [Contradiction],
    pub reliable: bool,
    #[serde(skip_serializing_if = "no_explanations")]
    pub explanations: &'a [Explanation],
}

fn no_explanations(explanations: &&[Explanation]) -> bool {
    explanations.is_empty()
}

impl<'a> JsonReport<'a> {
    pub fn new(evaluation: &'a Evaluation) -> Self {
        Self {
            results: &evaluation.results,
            contradictions: &evaluation.contradictions,
            reliable: evaluation.is_reliable(),
            explanations: &evaluation.explanations,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
