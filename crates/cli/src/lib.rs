use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fxmatch")]
#[command(about = "fxmatch - FX spot order matching service")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the service with the given configuration
    Start {
        /// Path to the configuration file
        #[arg(short, long, default_value = "fxmatch.yaml")]
        config: PathBuf,

        /// Override HTTP port
        #[arg(long)]
        port: Option<u16>,

        /// Override Prometheus metrics port
        #[arg(long)]
        metrics_port: Option<u16>,
    },

    /// Validate configuration without starting the service
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "fxmatch.yaml")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "fxmatch.yaml")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_args_parse() {
        let cli = Cli::try_parse_from(["fxmatch", "start", "--port", "9000"]).unwrap();

        match cli.command {
            Commands::Start { config, port, metrics_port } => {
                assert_eq!(config, PathBuf::from("fxmatch.yaml"));
                assert_eq!(port, Some(9000));
                assert_eq!(metrics_port, None);
            }
            other => panic!("Expected start command, got {:?}", other),
        }
    }
}
