use std::{fmt, path::PathBuf, sync::LazyLock, time::Duration};

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, error::ErrorKind};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use validator::Validate;

mod auxiliary;
mod fetcher;
mod job;
mod path;
mod primes;
mod strategy;
#[cfg(test)]
mod test_server;
mod url_list;
mod validate;

use crate::{
    auxiliary::{CompletionArgs, PrimesArgs},
    fetcher::HttpFetcherOptions,
    strategy::{RunOptions, Strategy},
    validate::{validate_file_not_exists, validate_http_urls, validate_output_dir},
};

/// fetch web pages to disk sequentially, on a thread pool, or on an event loop
#[derive(Parser)]
#[command(name = "pagesaver", version, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run_args: RunArgs,
}

#[derive(Clone, Debug, Args, Validate)]
/// Arguments for fetching a batch of pages
pub struct RunArgs {
    #[arg(value_name = "URL", help = "URLs to fetch (defaults to the built-in list)")]
    #[validate(custom(function = "validate_http_urls"))]
    urls: Vec<String>,

    #[arg(
        long = "urls-file",
        value_name = "PATH",
        conflicts_with = "urls",
        help = "File with one URL per line ('#' starts a comment)"
    )]
    #[validate(custom(function = "validate_file_not_exists"))]
    urls_file: Option<PathBuf>,

    #[arg(
        short = 's',
        long = "strategy",
        value_enum,
        help = "Strategy to run; repeat to run several (defaults to all)"
    )]
    strategies: Vec<Strategy>,

    #[arg(
        short = 'o',
        long = "out",
        help = "Root directory for saved pages (defaults to the executable's directory)"
    )]
    #[validate(custom(function = "validate_output_dir"))]
    output_dir: Option<PathBuf>,

    #[arg(
        long = "folder-name",
        help = "Folder under the root directory (defaults to one per strategy)"
    )]
    folder_name: Option<String>,

    #[arg(long = "workers", help = "Thread pool size for the thread-pool strategy")]
    #[validate(range(min = 1))]
    workers: Option<usize>,

    #[command(flatten)]
    #[validate(nested)]
    http_opts: HttpFetcherOptions,

    #[arg(
        long = "log-level",
        default_value_t = LogLevel::Warn,
        help = "Set log level"
    )]
    log_level: LogLevel,

    #[arg(long = "no-progress", help = "Disable progress bar")]
    no_progress: bool,
}

/// Thin wrapper around log levels for clap
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    /// No logging
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(text)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Fetch pages and save them to disk (alias: fetch)
    #[command(name = "run", alias = "fetch")]
    Run(RunArgs),
    /// Print the primes up to a limit
    #[command(name = "primes")]
    Primes(PrimesArgs),
    /// Generate shell completion script for specified shell (alias: comp)
    #[command(name = "completion", alias = "comp")]
    Completion(CompletionArgs),
}

const PROGRESS_COLOR_HEX: &str = "#FF9A76";

static PROGRESS_TEMPLATE: LazyLock<String> = LazyLock::new(|| {
    format!("{{spinner:.{PROGRESS_COLOR_HEX}}} {{prefix}} [{{elapsed}}] {{pos}}/{{len}} {{wide_msg}}")
});

fn main() -> anyhow::Result<()> {
    let Cli { command, run_args } = Cli::parse();

    // Handle auxiliary commands early (e.g., completion)
    // so main stays focused on fetching.
    if auxiliary::handle_auxiliary_command(command.as_ref())? {
        return Ok(());
    }

    let run_args = match command {
        Some(Command::Run(args)) => args,
        None => run_args,
        Some(Command::Primes(_)) | Some(Command::Completion(_)) => {
            unreachable!("auxiliary commands handled earlier")
        }
    };

    // Enable RUST_LOG environment variable support
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(format!("pagesaver={}", run_args.log_level)),
    )
    .init();

    debug!("Run arguments: {:?}", run_args);

    if let Err(err) = run_args.validate() {
        Cli::command()
            .error(ErrorKind::ValueValidation, err.to_string())
            .exit();
    }

    let urls = url_list::load(&run_args.urls, run_args.urls_file.as_deref())?;
    let strategies = if run_args.strategies.is_empty() {
        Strategy::ALL.to_vec()
    } else {
        run_args.strategies.clone()
    };
    let options = RunOptions {
        http: run_args.http_opts.clone(),
        workers: run_args.workers,
    };

    for strategy in strategies {
        let folder_name = run_args
            .folder_name
            .as_deref()
            .unwrap_or(strategy.default_folder_name());

        let bar = create_progress_bar(urls.len() as u64, run_args.no_progress);
        bar.set_prefix(strategy.to_string());
        let report = strategy::run(
            &urls,
            strategy,
            folder_name,
            run_args.output_dir.as_deref(),
            &options,
            &bar,
        )?;
        bar.finish_and_clear();

        println!(
            "{strategy} finished={:.2?} (saved {}, failed {}, {} bytes)",
            report.elapsed,
            report.succeeded(),
            report.failed(),
            report.bytes_written()
        );
        if let Some(folder) = report.output_folder() {
            println!("  pages saved to {}", folder.display());
        }
    }

    Ok(())
}

/// Create and configure a progress bar counting finished jobs
/// NOTE: Failure logs are printed between bar redraws, which causes a newline.
fn create_progress_bar(len: u64, no_progress: bool) -> ProgressBar {
    if no_progress {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    bar.enable_steady_tick(Duration::from_millis(60));
    bar.set_style(
        ProgressStyle::with_template(PROGRESS_TEMPLATE.as_str())
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
