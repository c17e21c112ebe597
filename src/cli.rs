use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::clean::DEFAULT_MAX_BUILDS;
use crate::logging::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "catalauncher")]
#[command(version, about = "Manage and launch Cataclysm: Dark Days Ahead")]
pub struct Cli {
    /// Config file (default is config.toml in your config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root directory for builds, saves and extras (overrides the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Log verbosity (RUST_LOG takes precedence)
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the latest (or a given) build if needed and start the game
    Launch {
        /// The build number to launch (defaults to the latest)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        build: Option<u32>,

        /// Show a full-screen dashboard while preparing the build
        #[arg(long)]
        tui: bool,

        /// Update and copy extras even if the build is already installed
        #[arg(long)]
        sync_extras: bool,

        /// Prepare the build but do not start the container
        #[arg(long)]
        no_launch: bool,
    },

    /// Delete old builds
    Clean {
        /// The max number of builds to keep
        #[arg(long, default_value_t = DEFAULT_MAX_BUILDS)]
        max: usize,

        /// Keep the specified build(s)
        #[arg(long, value_delimiter = ',')]
        keep: Vec<u32>,
    },

    /// Choose the root directory and write the config file
    Setup,

    /// List downloaded builds
    Builds,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_flags() {
        let cli = Cli::try_parse_from(["catalauncher", "launch", "--build", "12", "--no-launch"])
            .unwrap();
        match cli.command {
            Commands::Launch {
                build,
                tui,
                no_launch,
                ..
            } => {
                assert_eq!(build, Some(12));
                assert!(!tui);
                assert!(no_launch);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_clean_defaults_and_keep_list() {
        let cli = Cli::try_parse_from(["catalauncher", "clean", "--keep", "3,7"]).unwrap();
        match cli.command {
            Commands::Clean { max, keep } => {
                assert_eq!(max, DEFAULT_MAX_BUILDS);
                assert_eq!(keep, vec![3, 7]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["catalauncher", "builds", "--root", "/srv/cdda"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/srv/cdda")));
    }

    #[test]
    fn test_rejects_non_numeric_build() {
        assert!(Cli::try_parse_from(["catalauncher", "launch", "--build", "latest"]).is_err());
    }

    #[test]
    fn test_rejects_build_zero() {
        assert!(Cli::try_parse_from(["catalauncher", "launch", "--build", "0"]).is_err());
        assert!(Cli::try_parse_from(["catalauncher", "launch", "--build", "1"]).is_ok());
    }
}
