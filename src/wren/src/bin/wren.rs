// src/bin/wren.rs

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{ColorChoice, CommandFactory, FromArgMatches};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::FormatTime;

use wren::cli::{Cli, Commands};
use wren::commands::build::build_files;
use wren::commands::check::check_files;
use wren::commands::inspect::inspect_files;
use wren::commands::version::print_version;
use wren::pipeline::CompileOptions;

/// A timer that outputs nothing but still enables span timing calculation
struct NoTimestamp;

impl FormatTime for NoTimestamp {
    fn format_time(&self, _w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        Ok(())
    }
}

fn main() -> ExitCode {
    // Initialize tracing if WREN_LOG is set
    // WREN_LOG_STYLE: "compact" (default) or "full" (with timestamps)
    if let Ok(filter) = EnvFilter::try_from_env("WREN_LOG") {
        let style = std::env::var("WREN_LOG_STYLE").unwrap_or_default();
        if style == "full" {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_level(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_writer(std::io::stderr)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_level(true)
                .with_timer(NoTimestamp)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_writer(std::io::stderr)
                .init();
        }
        tracing::debug!("tracing initialized");
    }

    // Pre-scan args to determine color choice for clap's help output
    let color_choice = get_color_choice_from_args();

    let styles = Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default());

    let matches = Cli::command().styles(styles).color(color_choice).get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let options = CompileOptions { jobs: cli.jobs };
    match cli.command {
        Commands::Check { paths } => check_files(&paths, &options, cli.color),
        Commands::Build { paths, output } => build_files(&paths, output.as_deref(), &options, cli.color),
        Commands::Inspect { inspect_type, files } => inspect_files(&files, inspect_type, &options, cli.color),
        Commands::Version => print_version(),
    }
}

/// Pre-scan command line args to determine color choice before full parsing.
/// This allows clap's help output to respect the --color flag.
fn get_color_choice_from_args() -> ColorChoice {
    let args: Vec<String> = std::env::args().collect();

    for (i, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix("--color=") {
            return parse_color_choice(value);
        }
        if arg == "--color"
            && let Some(value) = args.get(i + 1)
        {
            return parse_color_choice(value);
        }
    }

    if is_stdout_tty() {
        ColorChoice::Always
    } else {
        ColorChoice::Never
    }
}

fn parse_color_choice(value: &str) -> ColorChoice {
    match value.to_lowercase().as_str() {
        "always" => ColorChoice::Always,
        "never" => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn is_stdout_tty() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal()
}
