use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SourceKind {
    /// Local Tesseract OCR + pattern matching
    Ocr,
    /// Gemini multimodal API returning JSON
    Ai,
}

#[derive(Debug, Parser)]
#[command(
    name = "leaderboard-extract",
    about = "Extract name/score pairs from leaderboard images and export them as CSV",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Image files or directories (png, jpg, jpeg). Prompts for a directory when omitted
    #[arg(value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Where the image text comes from
    #[arg(short = 's', long = "source", value_enum, default_value_t = SourceKind::Ai)]
    pub source: SourceKind,

    /// CSV output path (defaults to leaderboard_data_combined.csv)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Gemini API key (overrides GEMINI_API_KEY and config.json)
    #[arg(long = "api-key", value_name = "KEY")]
    pub api_key: Option<String>,

    /// Override the configuration file path
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the CSV without a UTF-8 byte-order mark
    #[arg(long = "no-bom")]
    pub no_bom: bool,

    /// Log the raw OCR / model text for each image
    #[arg(long = "show-raw")]
    pub show_raw: bool,
}

pub fn parse_cli() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["leaderboard-extract"]).unwrap();
        assert!(args.inputs.is_empty());
        assert_eq!(args.source, SourceKind::Ai);
        assert!(args.output.is_none());
        assert!(!args.no_bom);
    }

    #[test]
    fn test_full_command_line() {
        let args = CliArgs::try_parse_from([
            "leaderboard-extract",
            "--source",
            "ocr",
            "-o",
            "out.csv",
            "--no-bom",
            "--show-raw",
            "shots/",
            "extra.png",
        ])
        .unwrap();
        assert_eq!(args.source, SourceKind::Ocr);
        assert_eq!(args.output, Some(PathBuf::from("out.csv")));
        assert!(args.no_bom);
        assert!(args.show_raw);
        assert_eq!(
            args.inputs,
            vec![PathBuf::from("shots/"), PathBuf::from("extra.png")]
        );
    }

    #[test]
    fn test_unknown_source_rejected() {
        assert!(CliArgs::try_parse_from(["leaderboard-extract", "--source", "magic"]).is_err());
    }
}
