//=====================================================
// File: main.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Clam CLI entry point
// Objective: Run .clam scripts on a worker thread with configurable call
//            depth and stack size, plus token, AST and host library dumps
//=====================================================

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result, anyhow};
use clam::config::ClamConfig;
use clam::interpreter::{Interpreter, ScriptError};
use clam::parser::parse_source;
use clam::stdlib_registry::HostRegistry;
use clam::tokenizer::{Lexer, TokenKind};
use clam::logging;
use clap::Parser;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "clam", about = "Clam script runner")]
pub struct Args {
    /// Path to the script to execute.
    #[arg(required_unless_present = "docs")]
    pub script: Option<PathBuf>,

    /// Arguments passed through to the script as `os.args()`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Print the token stream before execution.
    #[arg(long = "print-tokens")]
    pub print_tokens: bool,

    /// Print the parsed AST before execution.
    #[arg(long = "print-ast")]
    pub print_ast: bool,

    /// Configuration file to use instead of the default location.
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Override the maximum nested call depth.
    #[arg(long = "max-depth")]
    pub max_depth: Option<usize>,

    /// List the host library and exit.
    #[arg(long = "docs")]
    pub docs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ClamConfig::load(args.config.as_deref())?;
    if let Some(depth) = args.max_depth {
        config.max_call_depth = depth;
    }
    logging::init(&config.log_level);

    if args.docs || config.print_docs {
        print!("{}", HostRegistry::with_stdlib(Vec::new()).docs());
        return Ok(());
    }

    let script = args
        .script
        .ok_or_else(|| anyhow!("no script given; pass a path or --docs"))?;
    let source = fs::read_to_string(&script)
        .with_context(|| format!("reading script {}", script.display()))?;

    if args.print_tokens {
        print_tokens(&script, &source);
    }
    if args.print_ast {
        match parse_source(&source) {
            Ok(program) => println!("{program:#?}"),
            Err(err) => {
                report(&script, &ScriptError::from(err));
                std::process::exit(1);
            }
        }
    }

    let mut script_args = vec![script.display().to_string()];
    script_args.extend(args.args);

    let status = run_on_worker(script, source, script_args, config)?;
    if status != 0 {
        std::process::exit(status);
    }
    Ok(())
}

fn print_tokens(path: &Path, source: &str) {
    let mut lexer = Lexer::new(source);
    loop {
        match lexer.next_token() {
            Ok(token) => {
                println!("{token}");
                if token.kind == TokenKind::Eof {
                    break;
                }
            }
            Err(err) => {
                report(path, &ScriptError::from(err));
                break;
            }
        }
    }
}

// Interpreter values are not Send, so everything is built on the worker.
fn run_on_worker(
    script: PathBuf,
    source: String,
    script_args: Vec<String>,
    config: ClamConfig,
) -> Result<i32> {
    let stack_size = config.stack_size_mb.max(1) * 1024 * 1024;
    let handle = thread::Builder::new()
        .name("clam-interpreter".into())
        .stack_size(stack_size)
        .spawn(move || run_script(&script, &source, script_args, &config))
        .context("spawning interpreter thread")?;
    handle
        .join()
        .map_err(|_| anyhow!("interpreter thread panicked"))
}

//Function: run_script
//Purpose: Parse, install the host library and execute one script
//Inputs: path for diagnostics, source text, os.args values, runner config
//Returns: Process exit status
fn run_script(path: &Path, source: &str, script_args: Vec<String>, config: &ClamConfig) -> i32 {
    let program = match parse_source(source) {
        Ok(program) => program,
        Err(err) => {
            report(path, &ScriptError::from(err));
            return 1;
        }
    };

    let registry = HostRegistry::with_stdlib(script_args);
    let mut interpreter = Interpreter::new();
    interpreter.set_max_call_depth(config.max_call_depth);
    registry.install(&mut interpreter);

    info!(script = %path.display(), "running script");
    match interpreter.run(&program) {
        Ok(()) => 0,
        Err(err) => match err.exit_status() {
            Some(status) => {
                debug!(status, "script requested exit");
                status
            }
            None => {
                report(path, &ScriptError::from(err));
                1
            }
        },
    }
}

fn report(path: &Path, err: &ScriptError) {
    eprintln!("{}: {err}", path.display());
}
