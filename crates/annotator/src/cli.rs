use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hours-of-work")]
#[command(about = "Shows shop prices as hours of work at your hourly wage")]
pub struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Seed default settings on first run
    Init,

    /// Show or change the saved wage
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Inspect or refresh the cached exchange rates
    #[command(subcommand)]
    Rates(RatesCommand),

    /// Convert an amount of base currency into another currency
    Convert {
        #[arg(long)]
        amount: f64,

        #[arg(long)]
        currency: String,
    },

    /// Annotate a page snapshot (JSON) and print the result
    Annotate(AnnotateArgs),
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,
    Set {
        /// Hourly wage, a positive number
        #[arg(long)]
        wage: String,

        /// Currency code the wage is paid in
        #[arg(long)]
        currency: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RatesCommand {
    Show,
    Refresh,
}

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Snapshot file; `-` reads stdin
    pub snapshot: PathBuf,

    /// Skip prices whose currency has no known rate
    #[arg(long)]
    pub strict: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings_set() {
        let cli = Cli::try_parse_from([
            "hours-of-work",
            "settings",
            "set",
            "--wage",
            "25",
            "--currency",
            "usd",
        ])
        .unwrap();

        match cli.command {
            Command::Settings(SettingsCommand::Set { wage, currency }) => {
                assert_eq!(wage, "25");
                assert_eq!(currency, "usd");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_annotate_with_global_flags() {
        let cli = Cli::try_parse_from([
            "hours-of-work",
            "annotate",
            "page.json",
            "--strict",
            "-vv",
            "--config",
            "custom.toml",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Command::Annotate(args) => {
                assert!(args.strict);
                assert_eq!(args.snapshot, PathBuf::from("page.json"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_convert_requires_amount() {
        assert!(Cli::try_parse_from(["hours-of-work", "convert", "--currency", "USD"]).is_err());
    }
}
