use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jobqueue-staging")]
#[command(about = "Validate job documents and inspect staging layout", long_about = None)]
pub struct Cli {
    /// Settings file, overrides JOBQUEUE_STAGING_CONFIG
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a JSON document and print it normalized
    Validate(ValidateArgs),
    /// Print the staging directories under the data directory
    Paths,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Kind of document in the file
    #[arg(value_enum)]
    pub kind: DocumentKind,

    /// Path to the JSON document
    pub file: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Component,
    Configuration,
    State,
    AppProxy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate() {
        let cli = Cli::parse_from(["jobqueue-staging", "validate", "app-proxy", "proxy.json"]);
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.kind, DocumentKind::AppProxy);
                assert_eq!(args.file, PathBuf::from("proxy.json"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_paths_with_settings() {
        let cli = Cli::parse_from(["jobqueue-staging", "paths", "--settings", "s.toml"]);
        assert!(matches!(cli.command, Commands::Paths));
        assert_eq!(cli.settings, Some(PathBuf::from("s.toml")));
    }
}
