use std::process::ExitCode;

use clap::Parser;
use deepbase::cli::Cli;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Usage errors exit 1; --help/--version print to stdout and exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    // Logs go to stderr so they never mix with the document
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Build a context once, pass everywhere
    let ctx = cli.context();

    match deepbase::run(&cli, &ctx) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            if ctx.no_color {
                eprintln!("Error: {err:#}");
            } else {
                eprintln!("{} {err:#}", "Error:".red().bold());
            }
            ExitCode::FAILURE
        }
    }
}
