//! tonctl: operator CLI for wallet, bridge, lottery and example
//! contracts.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::error;
use tonctl_cell::Address;
use tonctl_contract::BridgeConfig;

mod commands;
mod config;
mod convert;
mod logger;

use config::Context;
use convert::parse_tons;

#[derive(Parser)]
#[command(name = "tonctl")]
#[command(about = "Operator tool for wallet, bridge, lottery and example contracts")]
#[command(version)]
struct Cli {
    /// Node HTTP endpoint URL
    #[arg(long, env = "TONCTL_PROVIDER_URL", global = true, default_value = "")]
    url: String,

    /// Mnemonic key file
    #[arg(
        long,
        env = "TONCTL_KEYSTORE",
        global = true,
        default_value = "mnemonic.json"
    )]
    keystore: String,

    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Wallet operations
    Wallet {
        #[command(subcommand)]
        command: WalletCommand,
    },
    /// Bridge operations
    Bridge {
        #[command(subcommand)]
        command: BridgeCommand,
    },
    /// Lottery operations
    Lottery {
        #[command(subcommand)]
        command: LifecycleCommand,
    },
    /// Example contract operations
    Example {
        #[command(subcommand)]
        command: LifecycleCommand,
    },
}

#[derive(Subcommand)]
enum WalletCommand {
    /// Generate a wallet and estimate its deployment fee
    Prepare {
        /// Workchain id
        #[arg(default_value_t = 0)]
        workchain: i32,
    },
    /// Deploy a prepared wallet
    Deploy {
        /// Wallet address (user-friendly, bounceable)
        address: String,
    },
    /// Show wallet information
    Info {
        /// Wallet address
        address: String,
    },
    /// Transfer toncoins
    Transfer {
        /// Sender wallet address
        sender: String,
        /// Recipient wallet address
        recipient: String,
        /// Amount in TON
        amount: String,
        /// First transfer to an undeployed recipient
        #[arg(long)]
        state_init: bool,
        /// Transaction memo
        #[arg(long, default_value = "")]
        memo: String,
    },
}

#[derive(Subcommand)]
enum BridgeCommand {
    /// Generate a bridge and estimate its deployment fee
    Prepare {
        /// Workchain id
        #[arg(default_value_t = 0)]
        workchain: i32,
        #[command(flatten)]
        config: BridgeConfigArgs,
    },
    /// Deploy a prepared bridge
    Deploy {
        /// Bridge address (user-friendly, bounceable)
        address: String,
        #[command(flatten)]
        config: BridgeConfigArgs,
    },
    /// Show bridge information
    Info {
        /// Bridge address
        address: String,
    },
    /// Change the collector address
    ChangeCollector {
        /// Bridge address
        address: String,
        /// New collector address
        collector: String,
    },
    /// Change the fee schedule
    ChangeFees {
        /// Bridge address
        address: String,
        /// Flat reward in TON
        #[arg(long, default_value = "0")]
        flat_reward: String,
        /// Network fee in TON
        #[arg(long, default_value = "0")]
        network_fee: String,
        /// Fee factor (14 bits)
        #[arg(long, default_value_t = 0)]
        fee_factor: u16,
    },
    /// Withdraw the accumulated reward
    WithdrawReward {
        /// Bridge address
        address: String,
        /// Beneficiary address
        beneficiary: String,
    },
    /// Decode recent swap log events
    Events {
        /// Bridge address
        address: String,
    },
}

/// Bridge init parameters, needed whenever the data cell is rebuilt.
#[derive(Args)]
struct BridgeConfigArgs {
    /// Collector address
    #[arg(long, env = "TONCTL_COLLECTOR")]
    collector: String,

    /// Flat reward in TON
    #[arg(long, env = "TONCTL_FLAT_REWARD", default_value = "0")]
    flat_reward: String,

    /// Network fee in TON
    #[arg(long, env = "TONCTL_NETWORK_FEE", default_value = "0")]
    network_fee: String,

    /// Fee factor (14 bits)
    #[arg(long, env = "TONCTL_FEE_FACTOR", default_value_t = 0)]
    fee_factor: u16,
}

impl BridgeConfigArgs {
    fn into_config(self) -> Result<BridgeConfig> {
        Ok(BridgeConfig {
            collector: Address::parse(&self.collector)?,
            flat_reward: parse_tons(&self.flat_reward)?,
            network_fee: parse_tons(&self.network_fee)?,
            fee_factor: self.fee_factor,
        })
    }
}

#[derive(Subcommand)]
enum LifecycleCommand {
    /// Generate the contract and estimate its deployment fee
    Prepare {
        /// Workchain id
        #[arg(default_value_t = 0)]
        workchain: i32,
    },
    /// Deploy the prepared contract
    Deploy {
        /// Contract address (user-friendly, bounceable)
        address: String,
    },
    /// Show contract information
    Info {
        /// Contract address
        address: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    if let Err(err) = run(cli).await {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.url.is_empty() {
        anyhow::bail!("provider URL is not set (use --url or TONCTL_PROVIDER_URL)");
    }
    let ctx = Context::new(&cli.url, &cli.keystore);

    match cli.command {
        Command::Wallet { command } => match command {
            WalletCommand::Prepare { workchain } => commands::wallet::prepare(&ctx, workchain).await,
            WalletCommand::Deploy { address } => commands::wallet::deploy(&ctx, &address).await,
            WalletCommand::Info { address } => commands::wallet::info(&ctx, &address).await,
            WalletCommand::Transfer {
                sender,
                recipient,
                amount,
                state_init,
                memo,
            } => {
                commands::wallet::transfer(&ctx, &sender, &recipient, &amount, state_init, &memo)
                    .await
            }
        },
        Command::Bridge { command } => match command {
            BridgeCommand::Prepare { workchain, config } => {
                commands::bridge::prepare(&ctx, workchain, config.into_config()?).await
            }
            BridgeCommand::Deploy { address, config } => {
                commands::bridge::deploy(&ctx, &address, config.into_config()?).await
            }
            BridgeCommand::Info { address } => commands::bridge::info(&ctx, &address).await,
            BridgeCommand::ChangeCollector { address, collector } => {
                commands::bridge::change_collector(&ctx, &address, &collector).await
            }
            BridgeCommand::ChangeFees {
                address,
                flat_reward,
                network_fee,
                fee_factor,
            } => {
                commands::bridge::change_fees(
                    &ctx,
                    &address,
                    parse_tons(&flat_reward)?,
                    parse_tons(&network_fee)?,
                    fee_factor,
                )
                .await
            }
            BridgeCommand::WithdrawReward {
                address,
                beneficiary,
            } => commands::bridge::withdraw_reward(&ctx, &address, &beneficiary).await,
            BridgeCommand::Events { address } => commands::bridge::events(&ctx, &address).await,
        },
        Command::Lottery { command } => match command {
            LifecycleCommand::Prepare { workchain } => {
                commands::lottery::prepare(&ctx, workchain).await
            }
            LifecycleCommand::Deploy { address } => commands::lottery::deploy(&ctx, &address).await,
            LifecycleCommand::Info { address } => commands::lottery::info(&ctx, &address).await,
        },
        Command::Example { command } => match command {
            LifecycleCommand::Prepare { workchain } => {
                commands::example::prepare(&ctx, workchain).await
            }
            LifecycleCommand::Deploy { address } => commands::example::deploy(&ctx, &address).await,
            LifecycleCommand::Info { address } => commands::example::info(&ctx, &address).await,
        },
    }
}
