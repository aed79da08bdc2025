use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "promptframe")]
#[command(about = "Reusable prompt frameworks with variable substitution and effectiveness scoring")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of ~/.promptframe/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a framework with its variables highlighted
    Highlight {
        /// Framework definition file (TOML)
        file: PathBuf,
    },
    /// Fill in a framework's variables and print the resulting prompt
    Preview {
        /// Framework definition file (TOML)
        file: PathBuf,
        /// Variable value, as name=value (repeatable)
        #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
        /// Copy the preview to the clipboard
        #[arg(long)]
        copy: bool,
        /// Score the preview as well
        #[arg(long)]
        analyze: bool,
    },
    /// Score a prompt's effectiveness
    Analyze {
        /// Prompt text
        #[arg(required_unless_present = "framework", conflicts_with = "framework")]
        text: Option<String>,
        /// Score the preview of this framework instead
        #[arg(short, long, value_name = "FILE")]
        framework: Option<PathBuf>,
        /// Variable value for the framework preview, as name=value (repeatable)
        #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment, conflicts_with = "text")]
        set: Vec<(String, String)>,
    },
    /// Ask for variable suggestions
    Suggest {
        /// Free text to extract variables from
        #[arg(required_unless_present = "framework", conflicts_with = "framework")]
        text: Option<String>,
        /// Suggest variables for this framework's text
        #[arg(short, long, value_name = "FILE")]
        framework: Option<PathBuf>,
        /// Accept every suggestion into the framework and print it
        #[arg(long, conflicts_with = "text")]
        accept: bool,
    },
    /// List frameworks, optionally filtered by name
    List {
        /// Framework definition files (TOML)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Case-insensitive name filter
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Run the analysis/suggestion proxy
    Serve {
        /// Listen address, overriding server.bind
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
    /// Write the default configuration file
    Init,
    /// Show configuration
    Config,
    /// Show version information
    Version,
}

/// Parses `name=value`. The value may itself contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in `{raw}`"));
    }

    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assignments() {
        assert_eq!(
            parse_assignment("topic=a=b").unwrap(),
            ("topic".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_assignment(" tone =").unwrap(),
            ("tone".to_string(), String::new())
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn parses_preview_command() {
        let cli = Cli::try_parse_from([
            "promptframe",
            "preview",
            "f.toml",
            "--set",
            "topic=rust",
            "-s",
            "tone=calm",
            "--no-color",
        ])
        .unwrap();

        assert!(cli.no_color);
        match cli.command {
            Commands::Preview { file, set, copy, analyze } => {
                assert_eq!(file, PathBuf::from("f.toml"));
                assert_eq!(set.len(), 2);
                assert!(!copy && !analyze);
            }
            _ => panic!("expected preview"),
        }
    }

    #[test]
    fn analyze_needs_text_or_framework() {
        assert!(Cli::try_parse_from(["promptframe", "analyze"]).is_err());
        assert!(Cli::try_parse_from(["promptframe", "analyze", "some prompt text"]).is_ok());
        assert!(Cli::try_parse_from(["promptframe", "analyze", "-f", "x.toml"]).is_ok());
    }

    #[test]
    fn accept_requires_framework() {
        assert!(Cli::try_parse_from(["promptframe", "suggest", "text", "--accept"]).is_err());
        assert!(Cli::try_parse_from(["promptframe", "suggest", "--accept"]).is_err());
        assert!(Cli::try_parse_from(["promptframe", "suggest", "-f", "x.toml", "--accept"]).is_ok());
    }

    #[test]
    fn assignments_require_framework() {
        assert!(Cli::try_parse_from(["promptframe", "analyze", "some prompt", "--set", "a=b"]).is_err());
        assert!(Cli::try_parse_from(["promptframe", "analyze", "--set", "a=b"]).is_err());
        assert!(Cli::try_parse_from(["promptframe", "analyze", "-f", "x.toml", "-s", "a=b"]).is_ok());
    }
}
