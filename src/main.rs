//! CLI tool to expand build-step command lines the way the launcher will.

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use cmdexpand::{Environment, expand, prepare_commands};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand a command string into arguments
    Expand {
        /// Raw command string
        input: String,

        /// Start from the current process environment
        #[arg(long)]
        inherit_env: bool,

        #[command(flatten)]
        common: Common,
    },
    /// Substitute into already-split tokens
    Prepare {
        /// Command tokens
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,

        /// Plain `$key` substitution without quoting or recursion
        #[arg(long)]
        simple: bool,

        #[command(flatten)]
        common: Common,
    },
}

#[derive(Args, Debug)]
struct Common {
    /// Variable declaration, may be repeated
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE")]
    declarations: Vec<String>,

    /// Print a JSON array instead of one argument per line
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("cmdexpand={default_level}"))),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    match cli.command {
        Command::Expand {
            input,
            inherit_env,
            common,
        } => {
            let mut env = if inherit_env {
                Environment::from_process()
            } else {
                Environment::new()
            };
            match Environment::try_from_declarations(&common.declarations) {
                Ok(declared) => env.extend(declared.iter()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    return ExitCode::from(2);
                }
            }
            tracing::debug!(vars = env.len(), "expanding {input:?}");

            match expand(&input, &env) {
                Ok(words) => print_words(&words, common.json),
                Err(e) => {
                    eprintln!("{input}: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Prepare {
            tokens,
            simple,
            common,
        } => {
            let words = prepare_commands(&tokens, &common.declarations, !simple);
            print_words(&words, common.json)
        }
    }
}

fn print_words(words: &[String], json: bool) -> ExitCode {
    if json {
        match serde_json::to_string(words) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for word in words {
            println!("{word}");
        }
    }
    ExitCode::SUCCESS
}
