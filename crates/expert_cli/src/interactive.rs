//! What-if prompt.
//!
//! The user edits the fact set and reruns the queries. Each run clones the
//! program with the edited facts and evaluates it in a fresh context; the
//! original program is never modified.

use colored::Colorize;
use expert_logic::{Program, Symbol};
use indexmap::IndexMap;
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};

use crate::evaluate;
use crate::report::{paint, render_evaluation};

const HELP: &str = "\
Available commands:
  set <symbol> <true|false>  Set a fact value
  unset <symbol>             Remove a fact
  list                       Show current facts
  reset                      Reset to original facts
  run                        Execute queries with current facts
  help                       Show this help
  quit | exit | q            Leave interactive mode";

/// What the prompt loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print the message and keep reading.
    Continue(String),
    /// Print the message and stop.
    Quit(String),
}

/// The editable state of one interactive session.
pub struct Session {
    program: Program,
    facts: IndexMap<Symbol, bool>,
    reasoning: bool,
    color: bool,
}

impl Session {
    pub fn new(program: Program, reasoning: bool, color: bool) -> Self {
        let facts = program.facts().clone();
        Self {
            program,
            facts,
            reasoning,
            color,
        }
    }

    /// The facts as currently edited.
    pub fn facts(&self) -> &IndexMap<Symbol, bool> {
        &self.facts
    }

    /// Runs one command line.
    pub fn execute(&mut self, line: &str) -> Outcome {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((command, args)) = parts.split_first() else {
            return Outcome::Continue(String::new());
        };

        match command.to_ascii_lowercase().as_str() {
            "quit" | "exit" | "q" => Outcome::Quit("Exiting interactive mode.".to_string()),
            "help" => Outcome::Continue(HELP.to_string()),
            "list" => Outcome::Continue(self.list()),
            "reset" => {
                self.facts = self.program.facts().clone();
                Outcome::Continue(self.ok("Facts reset to original values."))
            }
            "set" => Outcome::Continue(self.set(args)),
            "unset" => Outcome::Continue(self.unset(args)),
            "run" => Outcome::Continue(self.run()),
            other => Outcome::Continue(format!(
                "{}\nType 'help' for available commands",
                self.err(&format!("Unknown command: {}", other))
            )),
        }
    }

    fn list(&self) -> String {
        if self.facts.is_empty() {
            return "No facts defined.".to_string();
        }
        let mut out = String::from("Current facts:");
        for (symbol, value) in &self.facts {
            out.push_str(&format!("\n  {}: {}", symbol, value));
        }
        out
    }

    fn set(&mut self, args: &[&str]) -> String {
        let [symbol, value] = args else {
            return self.err("Usage: set <symbol> <true|false>");
        };
        let Ok(symbol) = symbol.parse::<Symbol>() else {
            return self.err("Symbol must be a single letter");
        };
        let value = match value.to_ascii_lowercase().as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => return self.err("Value must be 'true' or 'false'"),
        };
        self.facts.insert(symbol, value);
        self.ok(&format!("Set {} = {}", symbol, value))
    }

    fn unset(&mut self, args: &[&str]) -> String {
        let [symbol] = args else {
            return self.err("Usage: unset <symbol>");
        };
        let Ok(symbol) = symbol.parse::<Symbol>() else {
            return self.err("Symbol must be a single letter");
        };
        if self.facts.shift_remove(&symbol).is_some() {
            self.ok(&format!("Removed fact {}", symbol))
        } else {
            format!("Fact {} not found", symbol)
        }
    }

    fn run(&self) -> String {
        let program = self.program.with_facts(self.facts.clone());
        let evaluation = evaluate(&program, self.reasoning);
        render_evaluation(&evaluation, self.color)
    }

    fn ok(&self, message: &str) -> String {
        paint(message, self.color, |t| t.green())
    }

    fn err(&self, message: &str) -> String {
        paint(message, self.color, |t| t.red())
    }
}

/// Reads commands until the user quits or closes the input.
pub fn run(mut session: Session) -> anyhow::Result<()> {
    let mut line_editor = Reedline::create();
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("expert".to_string()),
        DefaultPromptSegment::Empty,
    );

    println!("Interactive fact editing. Type 'help' for commands.");

    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => match session.execute(&buffer) {
                Outcome::Continue(message) => {
                    if !message.is_empty() {
                        println!("{}", message);
                    }
                }
                Outcome::Quit(message) => {
                    println!("{}", message);
                    break;
                }
            },
            Signal::CtrlD | Signal::CtrlC => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use expert_logic::parse_program;

    fn session() -> Session {
        let program = parse_program("A | B => C\n=A\n?C").unwrap();
        Session::new(program, false, false)
    }

    fn message(outcome: Outcome) -> String {
        match outcome {
            Outcome::Continue(message) => message,
            Outcome::Quit(message) => panic!("unexpected quit: {message}"),
        }
    }

    #[test]
    fn test_run_uses_edited_facts() {
        let mut session = session();
        assert!(message(session.execute("run")).contains("C: TRUE"));

        message(session.execute("unset A"));
        assert!(message(session.execute("run")).contains("C: FALSE"));

        message(session.execute("set b true"));
        assert!(message(session.execute("run")).contains("C: TRUE"));
    }

    #[test]
    fn test_set_and_list() {
        let mut session = session();
        assert_eq!(message(session.execute("set D false")), "Set D = false");
        assert_eq!(
            message(session.execute("list")),
            "Current facts:\n  A: true\n  D: false"
        );
    }

    #[test]
    fn test_reset_restores_original_facts() {
        let mut session = session();
        session.execute("unset A");
        session.execute("set Z true");
        session.execute("reset");
        assert_eq!(session.facts().len(), 1);
        assert_eq!(session.facts().get(&Symbol::new('A').unwrap()), Some(&true));
    }

    #[test]
    fn test_bad_input() {
        let mut session = session();
        assert!(message(session.execute("set A")).starts_with("Usage"));
        assert!(message(session.execute("set AB true")).contains("single letter"));
        assert!(message(session.execute("set A maybe")).contains("'true' or 'false'"));
        assert!(message(session.execute("unset Q")).contains("not found"));
        assert!(message(session.execute("frobnicate")).contains("Unknown command"));
        assert_eq!(message(session.execute("   ")), "");
    }

    #[test]
    fn test_quit_commands() {
        for command in ["quit", "exit", "q", "QUIT"] {
            assert!(matches!(session().execute(command), Outcome::Quit(_)));
        }
    }

    #[test]
    fn test_empty_fact_list() {
        let mut session = session();
        session.execute("unset A");
        assert_eq!(message(session.execute("list")), "No facts defined.");
    }
}
