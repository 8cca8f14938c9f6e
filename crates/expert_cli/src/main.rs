//! Expert System - propositional backward-chaining solver
//!
//! Reads a rule file and answers its queries.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use expert_cli::interactive::{self, Session};
use expert_cli::report::{self, JsonReport};
use expert_cli::{evaluate, Config, OutputFormat, EXIT_CONTRADICTION, EXIT_FAILURE};

/// Expert System
#[derive(Parser, Debug)]
#[command(name = "expert-system")]
#[command(version)]
#[command(about = "Backward-chaining expert system over propositional rules", long_about = None)]
struct Args {
    /// Rule file to evaluate
    file: PathBuf,

    /// Edit facts and rerun queries at a prompt
    #[arg(short, long)]
    interactive: bool,

    /// Explain how each query was answered
    #[arg(short, long)]
    reasoning: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn into_config(self) -> Config {
        let mut config = Config::from_env();
        config.file = self.file;
        config.interactive = self.interactive;
        config.reasoning |= self.reasoning;
        if self.json {
            config.output = OutputFormat::Json;
        }
        if self.no_color {
            config.color = false;
        }
        config.verbosity = self.verbose;
        config
    }
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    // Installed before `Config::from_env`, which may warn
    let filter = Config {
        verbosity: args.verbose,
        ..Config::default()
    }
    .log_filter();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let mut config = args.into_config();
    config.validate()?;

    // JSON output never carries escape codes
    if config.output == OutputFormat::Json {
        config.color = false;
    }
    if !config.color {
        colored::control::set_override(false);
    }

    let source = std::fs::read_to_string(&config.file)
        .with_context(|| format!("failed to read {}", config.file.display()))?;
    let program = expert_logic::parse_program(&source)
        .with_context(|| format!("failed to parse {}", config.file.display()))?;

    log::info!("Loaded {}", config.file.display());
    report::log_program_summary(&program);

    if config.interactive {
        interactive::run(Session::new(program, config.reasoning, config.color))?;
        return Ok(ExitCode::SUCCESS);
    }

    let evaluation = evaluate(&program, config.reasoning);
    match config.output {
        OutputFormat::Text => print!("{}", report::render_evaluation(&evaluation, config.color)),
        OutputFormat::Json => println!("{}", JsonReport::new(&evaluation).to_json()?),
    }

    if evaluation.is_reliable() {
        Ok(ExitCode::SUCCESS)
    } else {
        log::warn!(
            "{} contradiction(s) detected",
            evaluation.contradictions.len()
        );
        Ok(ExitCode::from(EXIT_CONTRADICTION))
    }
}
