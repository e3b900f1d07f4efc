// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::telemetry::setup_tracing;
use crate::{add, connect, dashboard, events, owner, stats};
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use pmd_config::{load_config, AppConfig};
use tracing::{info, instrument, Level};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "patient-dash")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")"))]
#[command(about = "Add patients to the PatientManagement contract and review their history", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Name of the configured chain to use. Defaults to the first one.
    #[arg(short, long, global = true)]
    network: Option<String>,

    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `patient-dash -vvv` will
    /// give you trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,

    /// Set the Open Telemetry collector grpc endpoint. Eg. http://localhost:4317
    #[arg(long = "otel", global = true)]
    pub otel: Option<Url>,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        let config = self.load_config()?;

        setup_tracing(&config, self.log_level())?;
        info!("Config loaded from: {:?}", config.config_file());

        match self.command {
            Commands::Owner => owner::execute(&config).await?,
            Commands::Connect => connect::execute(&config).await?,
            Commands::Add { address, age } => add::execute(&config, address, age).await?,
            Commands::Events {
                from_block,
                to_block,
            } => events::execute(&config, from_block, to_block).await?,
            Commands::Stats => stats::execute(&config).await?,
            Commands::Dashboard => dashboard::execute(&config).await?,
        }

        Ok(())
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        load_config(
            self.network.clone(),
            self.config.clone(),
            self.otel.as_ref().map(Url::to_string),
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the contract owner
    Owner,

    /// Connect the wallet and print the authorized account
    Connect,

    /// Add a patient from the connected account
    Add {
        /// Ethereum address of the patient
        #[arg(long)]
        address: String,

        /// Age of the patient
        #[arg(long, allow_hyphen_values = true)]
        age: String,
    },

    /// List past NewPatientAdded events
    Events {
        /// First block to search. Defaults to the contract's deploy block.
        #[arg(long)]
        from_block: Option<u64>,

        /// Last block to search. Defaults to the chain head.
        #[arg(long)]
        to_block: Option<u64>,
    },

    /// Show the statistics table
    Stats,

    /// Owner, event history and statistics in one view
    Dashboard,
}
