use clap::{Args, CommandFactory};
use clap_complete::{Shell, generate};

use crate::{Cli, Command, primes::primes};

#[derive(Clone, Debug, Args)]
pub struct CompletionArgs {
    #[arg(help = "Shell to generate completions for")]
    shell: Shell,
}

/// Largest accepted `primes` limit; the sieve keeps every prime found in memory
const MAX_PRIMES_LIMIT: u64 = 10_000_000;

#[derive(Clone, Debug, Args)]
pub struct PrimesArgs {
    #[arg(
        value_name = "LIMIT",
        value_parser = clap::value_parser!(u64).range(..=MAX_PRIMES_LIMIT),
        help = "Largest number to consider (at most 10000000)"
    )]
    limit: u64,
}

/// Handles auxiliary (e.g., completion) commands.
/// Returns Ok(true) if an auxiliary command was handled.
pub fn handle_auxiliary_command(command: Option<&Command>) -> anyhow::Result<bool> {
    match command {
        Some(Command::Completion(args)) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(args.shell, &mut cmd, &bin_name, &mut std::io::stdout());
            Ok(true)
        }
        Some(Command::Primes(args)) => {
            let found = primes(args.limit)
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>();
            println!("[{}]", found.join(", "));
            Ok(true)
        }
        _ => Ok(false),
    }
}
