use clap::Parser;
use ghtasks::cli::commands::{self, CommandContext, OutputMode};
use ghtasks::cli::{Cli, Commands};
use ghtasks::config;
use ghtasks::logging::init_logging;
use ghtasks::{Result, StructuredError, SyncError};
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(e) = run(&cli) {
        handle_error(&e, cli.json);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let overrides = build_cli_overrides(cli);

    if let Commands::Config { command } = &cli.command {
        let output = OutputMode {
            json: cli.json,
            quiet: cli.quiet,
        };
        return commands::config::execute(
            command,
            &cli.vault,
            cli.config.as_deref(),
            &overrides,
            output,
        );
    }

    let mut ctx = CommandContext::from_cli(cli, &overrides)?;
    match &cli.command {
        Commands::Refresh => commands::refresh::execute(&mut ctx),
        Commands::SyncRepos(args) => commands::sync_repos::execute(args, &mut ctx),
        Commands::ClearCompleted => commands::clear_completed::execute(&mut ctx),
        Commands::Scan => commands::scan::execute(&ctx),
        Commands::Config { .. } => Ok(()),
    }
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs human-readable error with optional color.
fn handle_error(err: &SyncError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}

fn build_cli_overrides(cli: &Cli) -> config::CliOverrides {
    config::CliOverrides {
        task_tag: cli.tag.clone(),
        task_format: cli.format.clone(),
    }
}
