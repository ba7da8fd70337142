//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use clap::Parser;

use crate::config::Config;

use super::commands::Commands;

#[derive(Debug, Parser)]
#[command(name = "mistral-migrate")]
#[command(about = "Analyze OpenAI API usage and estimate Mistral migration savings", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Use fallback pricing only (skip fetching from OpenRouter)
    #[arg(short = 'O', long, global = true)]
    pub(crate) offline: bool,

    /// Suppress progress output on stderr
    #[arg(short, long, global = true)]
    pub(crate) quiet: bool,

    /// Output as JSON
    #[arg(short, long, global = true)]
    pub(crate) json: bool,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence).
    /// Boolean flags only pick up the config value when the CLI left them
    /// at their default.
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        if !self.offline && config.offline {
            self.offline = true;
        }
        if !self.quiet && config.quiet {
            self.quiet = true;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn config_offline_applies_when_cli_silent() {
        let cli = parse(&["mistral-migrate", "compare"]);
        let config = Config {
            offline: true,
            ..Config::default()
        };
        assert!(cli.with_config(&config).offline);
    }

    #[test]
    fn cli_flags_win_over_config() {
        let cli = parse(&["mistral-migrate", "-O", "-q", "compare"]);
        let merged = cli.with_config(&Config::default());
        assert!(merged.offline);
        assert!(merged.quiet);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = parse(&["mistral-migrate", "scan", "/tmp/src", "--json", "-O"]);
        assert!(cli.json);
        assert!(cli.offline);
    }
}
