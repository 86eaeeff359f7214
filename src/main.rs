// SPDX-License-Identifier: AGPL-3.0-or-later

mod artifact;
mod commands;
mod config_file;
mod constants;
mod deployer;
mod git;
mod utils;

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{DeployOptions, PublishOptions};
use crate::config_file::ConfigFile;
use crate::constants::{PRIVATE_KEY_ENV_VAR, PRIVATE_KEY_FILE_NAME};

/// Command line arguments to configure ferrum-tools.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the config file, defaults to `ferrum.toml` when it exists.
    #[arg(short = 'c', long = "config", global = true)]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands with extra arguments defining the features of ferrum-tools.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Initialises a config file with default values in a given folder.
    Init {
        /// Target folder where the config file will be created.
        target_dir: Option<PathBuf>,
    },

    /// Publishes the pre-built documentation to the hosting branch of a git remote.
    Publish {
        /// Directory holding the static site.
        #[arg(short = 's', long)]
        source: Option<PathBuf>,

        /// Git remote name or URL to publish to.
        #[arg(short = 'r', long)]
        remote: Option<String>,

        /// Branch the site gets committed to.
        #[arg(short = 'b', long)]
        branch: Option<String>,

        /// Commit message, defaults to a timestamped one.
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Only commit, do not push the branch.
        #[arg(long)]
        no_push: bool,

        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Deploys the configured contracts on a node.
    Deploy {
        /// JSON-RPC endpoint of the node the contracts get deployed to.
        #[arg(short = 'e', long)]
        endpoint: Option<String>,

        /// Path to the key file, storing a hex-encoded secp256k1 private key. Ignored when
        /// FERRUM_DEPLOYER_KEY is set.
        #[arg(short = 'k', long = "key", default_value = PRIVATE_KEY_FILE_NAME)]
        private_key_path: PathBuf,

        /// Only show which contracts would be deployed and exit.
        #[arg(long)]
        dry_run: bool,

        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    match args.command {
        Commands::Init { target_dir } => {
            commands::init(target_dir).with_context(|| "Could not initialise config file")?;
        }
        Commands::Publish {
            source,
            remote,
            branch,
            message,
            no_push,
            yes,
        } => {
            let config = ConfigFile::load(args.config_path.as_deref())?;
            let options = PublishOptions {
                source,
                remote,
                branch,
                message,
                no_push,
                yes,
            };

            commands::publish(config.publish, options)
                .await
                .with_context(|| "Could not publish documentation")?;
        }
        Commands::Deploy {
            endpoint,
            private_key_path,
            dry_run,
            yes,
        } => {
            let config = ConfigFile::load(args.config_path.as_deref())?;
            let options = DeployOptions {
                endpoint,
                private_key: env::var(PRIVATE_KEY_ENV_VAR).ok(),
                private_key_path,
                dry_run,
                yes,
            };

            commands::deploy(config.deploy, options)
                .await
                .with_context(|| "Could not deploy contracts")?;
        }
    }

    Ok(())
}
