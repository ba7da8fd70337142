mod app;
mod cli;
mod config;
mod error;
mod output;
mod pricing;
mod savings;
mod scan;

use clap::Parser;

use cli::Cli;
use config::Config;

fn main() {
    let cli = Cli::parse();
    let config = if cli.quiet {
        Config::load_quiet()
    } else {
        Config::load()
    };
    let cli = cli.with_config(&config);

    if let Err(message) = app::run(&cli, &config) {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}
