pub mod commands;
pub mod dry_run;
pub mod state;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use kiosk_sdk::{DeploymentConfig, RootletSdk, SuiRpcBackend};

use state::FlowController;

// ============================================================================
// CLI definitions
// ============================================================================

/// rootlet-unlock - move Rootlets out of Sui personal kiosks
#[derive(Parser, Debug)]
#[command(name = "rootlet-unlock", version, about)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the Rootlets held in the personal kiosks of a wallet
    Discover {
        /// Wallet address (0x-prefixed hex)
        address: String,
        /// Also read the asking price of listed Rootlets
        #[arg(long)]
        prices: bool,
    },

    /// Build and check the unlock-and-transfer transaction for one Rootlet,
    /// printing the unsigned graph instead of signing it
    Unlock {
        /// Wallet address owning the personal kiosk
        address: String,
        /// Object id of the Rootlet to move
        asset_id: String,
    },

    /// Print the explorer link for an object
    Link {
        /// Object id
        asset_id: String,
    },
}

// ============================================================================
// App Entry Point
// ============================================================================

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = format!("{level},reqwest=warn,hyper=warn,hyper_util=warn,rustls=warn");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| format!("json error: {e}"))?;
    println!("{json}");
    Ok(())
}

async fn dispatch(command: Command, config: DeploymentConfig) -> Result<bool, String> {
    if let Command::Link { asset_id } = &command {
        println!("{}", commands::explorer_link(&config, asset_id)?);
        return Ok(true);
    }

    let backend = SuiRpcBackend::new(&config.fullnode_url, config.network)
        .map_err(|e| format!("backend setup failed: {e}"))?;
    let flow = FlowController::new(RootletSdk::new(backend, config));

    match command {
        Command::Discover { address, prices } => {
            let assets = commands::discover_assets(&flow, &address, prices).await?;
            print_json(&assets)?;
            Ok(true)
        }
        Command::Unlock { address, asset_id } => {
            let report = commands::unlock_asset(&flow, &address, &asset_id).await?;
            print_json(&report)?;
            Ok(report.outcome.is_completed())
        }
        Command::Link { .. } => Ok(true),
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = DeploymentConfig::for_build();
    log::info!(
        "network {} via {}, destination {}",
        config.network.as_str(),
        config.fullnode_url,
        config.destination
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(dispatch(cli.command, config)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
