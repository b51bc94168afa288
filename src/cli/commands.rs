// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `build`, `normalize` and `rules`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, enums, etc.)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::build_use_case::BuildConfig;
use crate::data::loader::TextEncoding;

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Canonicalize a CSV text column into a deduplicated corpus
    Build(BuildArgs),

    /// Canonicalize text given on the command line or on stdin
    Normalize(NormalizeArgs),

    /// Print or save the effective substitution table as JSON
    Rules(RulesArgs),
}

/// How input bytes are decoded
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum EncodingArg {
    /// UTF-8, falling back to Windows-1252 for invalid fields
    Auto,
    /// UTF-8 (invalid bytes become U+FFFD)
    Utf8,
    /// Windows-1252 / Latin-1
    Latin1,
}

impl From<EncodingArg> for TextEncoding {
    fn from(e: EncodingArg) -> Self {
        match e {
            EncodingArg::Auto   => TextEncoding::Auto,
            EncodingArg::Utf8   => TextEncoding::Utf8,
            EncodingArg::Latin1 => TextEncoding::Latin1,
        }
    }
}

/// All arguments for the `build` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Input CSV with a header row
    #[arg(long, default_value = "shared_data/merged_tweets.csv")]
    pub input: String,

    /// Output CSV (single `sentence` column)
    #[arg(long, default_value = "shared_data/cleaned_tweets.csv")]
    pub output: String,

    /// Name of the column holding the raw text
    #[arg(long, default_value = "text")]
    pub text_column: String,

    /// How to decode input bytes
    #[arg(long, value_enum, default_value_t = EncodingArg::Auto)]
    pub encoding: EncodingArg,

    /// Normalizer threads (1 = sequential, 0 = one per core)
    #[arg(long, short = 'j', default_value_t = 1)]
    pub jobs: usize,

    /// Records normalized per parallel batch
    #[arg(long, default_value_t = 4096)]
    pub batch_size: usize,

    /// JSON object of extra or replacement substitution rules
    #[arg(long)]
    pub rules: Option<String>,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<String>,
}

/// Convert CLI BuildArgs into the application-layer BuildConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<BuildArgs> for BuildConfig {
    fn from(a: BuildArgs) -> Self {
        BuildConfig {
            input:       a.input,
            output:      a.output,
            text_column: a.text_column,
            encoding:    a.encoding.into(),
            jobs:        a.jobs,
            batch_size:  a.batch_size,
            rules:       a.rules,
            report:      a.report,
        }
    }
}

/// All arguments for the `normalize` command
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Text to normalize; reads stdin line by line when omitted
    #[arg(long)]
    pub text: Option<String>,

    /// How to decode stdin bytes
    #[arg(long, value_enum, default_value_t = EncodingArg::Auto)]
    pub encoding: EncodingArg,

    /// Print only unique, non-empty stdin sentences in first-seen order
    #[arg(long, conflicts_with = "text")]
    pub unique: bool,

    /// JSON object of extra or replacement substitution rules
    #[arg(long)]
    pub rules: Option<String>,
}

/// All arguments for the `rules` command
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// JSON object of overrides to merge before exporting
    #[arg(long)]
    pub rules: Option<String>,

    /// Save to this file instead of printing
    #[arg(long)]
    pub output: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn build_args_convert_to_config() {
        let cli = Cli::parse_from([
            "tweet-corpus", "build", "--input", "in.csv", "-j", "4", "--encoding", "latin1",
        ]);
        let Commands::Build(args) = cli.command else {
            panic!("expected build");
        };
        let cfg: BuildConfig = args.into();
        assert_eq!(cfg.input, "in.csv");
        assert_eq!(cfg.output, BuildConfig::default().output);
        assert_eq!(cfg.jobs, 4);
        assert_eq!(cfg.encoding, TextEncoding::Latin1);
        assert_eq!(cfg.batch_size, 4096);
    }

    #[test]
    fn normalize_text_is_optional() {
        let cli = Cli::parse_from(["tweet-corpus", "normalize"]);
        assert!(matches!(
            cli.command,
            Commands::Normalize(NormalizeArgs { text: None, unique: false, .. })
        ));
    }

    #[test]
    fn unique_conflicts_with_text() {
        assert!(Cli::try_parse_from(["tweet-corpus", "normalize", "--unique"]).is_ok());
        assert!(Cli::try_parse_from(["tweet-corpus", "normalize", "--unique", "--text", "x"]).is_err());
    }
}
