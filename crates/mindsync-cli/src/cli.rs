use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for the `msync` binary.
#[derive(Debug, Parser)]
#[command(
    name = "msync",
    version,
    about = "Mindway database migration toolbox - realtime relay, bulk copy, verification"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Relay realtime row changes from the source project to the target until interrupted
    Relay,
    /// Bulk-copy every replicated table from the source project to the target
    Migrate,
    /// Verify a completed migration: row counts per table, then CDN sampling
    Verify(VerifyArgs),
    /// List the replicated tables
    Tables,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Check every table and report all count mismatches instead of stopping at the first
    #[arg(long)]
    pub accumulate: bool,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_verify_accumulate() {
        let cli = Cli::parse_from(["msync", "verify", "--accumulate"]);
        let Commands::Verify(args) = cli.command else {
            panic!("expected verify");
        };
        assert!(args.accumulate);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["msync", "relay", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Relay));
    }
}
