use clap::{Args, Parser, Subcommand};
use lambda_cbv::{
    eval::{Evaluator, Halt},
    ir::FreeVariables,
    lex::Token,
    parse::ParseOptions,
};
use rustyline::{error::ReadlineError, Editor};
use tracing::dispatcher::DefaultGuard;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

fn init_tracing() -> DefaultGuard {
    let subscriber = Registry::default()
        .with(EnvFilter::from_env("RUST_LOG"))
        .with(HierarchicalLayer::new(2).with_indent_lines(true));
    tracing::subscriber::set_default(subscriber)
}

/// Call-by-value interpreter for the untyped lambda calculus.
///
/// Programs are written as `l x:Bool. x`, with application by juxtaposition.
#[derive(Parser)]
#[clap(version)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EvalOptions {
    /// Give up after this many reduction steps
    #[clap(long)]
    max_steps: Option<usize>,
    /// How free variables are indexed: `single-letter` or `first-letter`
    #[clap(long, default_value = "single-letter")]
    free_vars: FreeVariables,
}

impl EvalOptions {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            free_variables: self.free_vars,
        }
    }

    fn evaluator(&self) -> Evaluator {
        self.max_steps
            .map_or_else(Evaluator::new, Evaluator::with_fuel)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a program, printing the parsed term and its normal form
    Eval {
        program: String,
        #[clap(flatten)]
        options: EvalOptions,
    },
    /// Print the tokens of a program
    Tokens { program: String },
    /// Evaluate programs line by line
    Repl {
        #[clap(flatten)]
        options: EvalOptions,
    },
}

fn evaluate(program: &str, options: &EvalOptions) -> color_eyre::Result<()> {
    let term = lambda_cbv::parse::program(program, options.parse_options())?;
    println!("   {term}");
    let evaluation = options.evaluator().eval(term)?;
    println!("=> {}", evaluation.term);
    if evaluation.halt == Halt::StepLimit {
        eprintln!(
            "stopped after {} steps without reaching a normal form",
            evaluation.steps
        );
    }
    Ok(())
}

fn tokens(program: &str) -> color_eyre::Result<()> {
    let rendered: Vec<_> = lambda_cbv::lex::tokens(program)?
        .iter()
        .filter(|token| **token != Token::End)
        .map(ToString::to_string)
        .collect();
    println!("{}", rendered.join(" "));
    Ok(())
}

fn repl(options: &EvalOptions) -> color_eyre::Result<()> {
    let mut rl = Editor::<()>::new();
    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        rl.add_history_entry(line.as_str());
        if let Err(e) = evaluate(&line, options) {
            eprintln!("{e}");
        }
    }
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let _tracing = init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Eval { program, options } => evaluate(&program, &options)?,
        Commands::Tokens { program } => tokens(&program)?,
        Commands::Repl { options } => repl(&options)?,
    }
    Ok(())
}
