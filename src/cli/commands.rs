//! CLI subcommand definitions

use std::path::PathBuf;

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Scan a directory for OpenAI API calls and generate a migration guide
    Scan {
        /// Directory to scan
        directory: PathBuf,

        /// Write the guide to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// File extensions to scan (default: py)
        #[arg(long, value_delimiter = ',', value_name = "EXT,...")]
        extensions: Vec<String>,
    },

    /// Estimate monthly savings for a usage mix without scanning
    Savings {
        /// Monthly prompt tokens (default from config, 5M)
        #[arg(long, value_name = "N")]
        prompt_tokens: Option<u64>,

        /// Monthly completion tokens (default from config, 5M)
        #[arg(long, value_name = "N")]
        completion_tokens: Option<u64>,

        /// Usage weight per model, repeatable (weights must sum to 1.0)
        #[arg(short, long, value_name = "MODEL=WEIGHT")]
        model: Vec<String>,
    },

    /// Compare OpenAI models with their Mistral equivalents
    Compare {
        /// A single model to compare (default: all known mappings)
        model: Option<String>,
    },
}

/// Parse a `MODEL=WEIGHT` spec from `--model`.
pub(crate) fn parse_weight_spec(spec: &str) -> Result<(String, f64), String> {
    let Some((model, weight)) = spec.split_once('=') else {
        return Err(format!("Invalid --model \"{spec}\" (expected MODEL=WEIGHT)"));
    };
    let model = model.trim();
    if model.is_empty() {
        return Err(format!("Invalid --model \"{spec}\" (empty model name)"));
    }
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|_| format!("Invalid weight in --model \"{spec}\""))?;
    Ok((model.to_string(), weight))
}
