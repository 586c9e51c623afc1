use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "build-patcher")]
#[command(about = "Applies the root Gradle configuration of a Flutter Android project")]
pub struct CliArgs {
    /// Path to a TOML patcher configuration; built-in defaults are used when absent
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Gradle root (the Flutter project's android/ directory), overrides project.root_dir
    #[arg(short, long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Relocate build dirs, assign namespaces and patch plugin sources
    Apply {
        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the relocated build output directory
    Clean {
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the discovered project tree and the effective configuration
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apply_with_globals_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "build-patcher",
            "apply",
            "--dry-run",
            "--project-dir",
            "android",
            "-v",
        ])
        .unwrap();

        assert!(args.verbose);
        assert_eq!(args.project_dir, Some(PathBuf::from("android")));
        assert!(matches!(
            args.command,
            Command::Apply {
                dry_run: true,
                json: false
            }
        ));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(CliArgs::try_parse_from(["build-patcher"]).is_err());
    }
}
