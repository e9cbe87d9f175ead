use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use fluxscript::config::FluxConfig;
use fluxscript::runtime::{self, RuntimeOptions};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

#[derive(Debug, ClapParser)]
#[command(
    name = "fluxscript",
    about = "Executes FluxScript source (.fx) files.",
    version
)]
struct Args {
    /// Path to a FluxScript source file.
    script: Option<PathBuf>,

    /// Log every executed statement to stderr (equivalent to setting FLUX_TRACE=1).
    #[arg(long)]
    trace: bool,

    /// Dump the token stream to stderr before parsing.
    #[arg(long)]
    print_tokens: bool,

    /// Pretty-print the parsed AST to stderr before execution.
    #[arg(long)]
    print_ast: bool,

    /// Configuration file (defaults to $FLUX_CONFIG, then the user config directory).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let Some(script) = args.script else {
        println!("Usage: fluxscript <program.fx>");
        return Ok(ExitCode::SUCCESS);
    };

    let config = FluxConfig::load(args.config.as_deref())?;
    let mut options = RuntimeOptions::from_config(&config);
    options.trace |= args.trace || trace_from_env();
    install_tracing(options.trace, config.log_directive()?);

    let source = fs::read_to_string(&script)
        .with_context(|| format!("failed to read {}", script.display()))?;

    let outcome = runtime::tokenize(&source).and_then(|tokens| {
        if args.print_tokens {
            for token in &tokens {
                eprintln!(
                    "{}:{}\t{}",
                    token.position.line, token.position.column, token.kind
                );
            }
        }
        let program = runtime::parse_tokens(tokens)?;
        if args.print_ast {
            eprintln!("{:#?}", program);
        }
        runtime::execute(&program, &options, io::stdin().lock(), io::stdout())
    });

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            eprintln!("{}: {err}", script.display());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn trace_from_env() -> bool {
    env::var("FLUX_TRACE")
        .ok()
        .map(|value| {
            let lower = value.to_ascii_lowercase();
            !(lower.is_empty() || lower == "0" || lower == "false" || lower == "off")
        })
        .unwrap_or(false)
}

fn install_tracing(trace: bool, directive: Option<Directive>) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Some(directive) = directive {
        filter = filter.add_directive(directive);
    }
    if trace {
        if let Ok(directive) = "fluxscript=trace".parse() {
            filter = filter.add_directive(directive);
        }
    }
    // Logs go to stderr; stdout belongs to the script.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
