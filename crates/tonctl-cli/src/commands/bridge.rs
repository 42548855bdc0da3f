//! Bridge commands.

use anyhow::{bail, Context as _, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::info;
use tonctl_cell::Address;
use tonctl_contract::{BridgeConfig, Contract, ContractKind, Operation};
use tonctl_crypto::Ed25519Keypair;
use tonctl_provider::GetMethodResult;

use crate::commands::common;
use crate::config::Context;
use crate::convert::format_amount;

/// Bridge state as reported by the `get_bridge_data` getter.
#[derive(Debug)]
pub struct BridgeData {
    pub seqno: u32,
    pub public_key: [u8; 32],
    pub total_locked: u128,
    pub collector_workchain: i32,
    pub collector_hash: [u8; 32],
    pub flat_reward: u128,
    pub network_fee: u128,
    pub fee_factor: u16,
}

impl BridgeData {
    fn from_stack(result: &GetMethodResult) -> Result<Self> {
        if result.len() < 8 {
            bail!("get_bridge_data returned {} stack entries", result.len());
        }
        Ok(BridgeData {
            seqno: result.num_u64(0)? as u32,
            public_key: result.num_bytes32(1)?,
            total_locked: result.num_u128(2)?,
            collector_workchain: result.num_i64(3)? as i32,
            collector_hash: result.num_bytes32(4)?,
            flat_reward: result.num_u128(5)?,
            network_fee: result.num_u128(6)?,
            fee_factor: result.num_u64(7)? as u16,
        })
    }
}

/// Generate a bridge: new mnemonic, derived address, deployment fee
/// estimate.
pub async fn prepare(ctx: &Context, workchain: i32, config: BridgeConfig) -> Result<()> {
    info!("Prepare bridge:");
    common::prepare(ctx, ContractKind::Bridge, workchain, Some(config)).await
}

/// Deploy a prepared bridge.
pub async fn deploy(ctx: &Context, address: &str, config: BridgeConfig) -> Result<()> {
    info!("Deploy bridge:");
    common::deploy(ctx, ContractKind::Bridge, address, Some(config)).await
}

/// Show bridge addresses, balance and on-chain state.
pub async fn info(ctx: &Context, address_text: &str) -> Result<()> {
    info!("Bridge information:");

    let address =
        Address::parse(address_text).with_context(|| format!("bad address {}", address_text))?;
    let account = ctx.provider.get_address_info(address_text).await?;
    common::print_address_info(&address, &account);

    let result = ctx
        .provider
        .run_get_method(address_text, "get_bridge_data")
        .await?;
    if !result.is_ok() {
        return Ok(());
    }

    let data = BridgeData::from_stack(&result)?;
    info!("Sequence number: {}", data.seqno);
    info!("Public key: {}", hex::encode(data.public_key));
    info!("Total locked: {}", format_amount(data.total_locked));
    info!(
        "Collector address: {}:{}",
        data.collector_workchain,
        hex::encode(data.collector_hash)
    );
    info!("Flat reward: {}", format_amount(data.flat_reward));
    info!("Network fee: {}", format_amount(data.network_fee));
    info!("Fee factor: {}", data.fee_factor);
    Ok(())
}

/// Change the bridge's collector address.
pub async fn change_collector(
    ctx: &Context,
    address_text: &str,
    new_collector: &str,
) -> Result<()> {
    info!("Change bridge collector:");

    let collector = Address::parse(new_collector)
        .with_context(|| format!("invalid collector address {}", new_collector))?;
    let op = Operation::ChangeCollector { collector };
    run_operation(ctx, address_text, op).await?;
    info!("Bridge collector was changed successfully");
    Ok(())
}

/// Change the bridge's fee schedule.
pub async fn change_fees(
    ctx: &Context,
    address_text: &str,
    flat_reward: u128,
    network_fee: u128,
    fee_factor: u16,
) -> Result<()> {
    info!("Change bridge fees:");

    let op = Operation::ChangeFees {
        flat_reward,
        network_fee,
        fee_factor,
    };
    run_operation(ctx, address_text, op).await?;
    info!("Bridge fees were changed successfully");
    Ok(())
}

/// Withdraw the accumulated reward to a beneficiary.
pub async fn withdraw_reward(
    ctx: &Context,
    address_text: &str,
    beneficiary_text: &str,
) -> Result<()> {
    info!("Withdraw bridge reward:");

    let beneficiary = Address::parse(beneficiary_text)
        .with_context(|| format!("invalid beneficiary address {}", beneficiary_text))?;
    let op = Operation::WithdrawReward { beneficiary };
    run_operation(ctx, address_text, op).await?;
    info!("Bridge reward was withdrawn successfully");
    Ok(())
}

/// Decode swap log events from the bridge's recent transactions.
pub async fn events(ctx: &Context, address_text: &str) -> Result<()> {
    info!("Bridge log events:");

    if !Address::is_valid(address_text) {
        bail!("invalid contract address");
    }

    let transactions = ctx.provider.get_transactions(address_text, 20).await?;
    for transaction in &transactions {
        let Some(log_message) = transaction
            .out_msgs
            .iter()
            .find(|message| message.destination.is_empty())
        else {
            continue;
        };

        // log payload: 20-byte destination + 8-byte amount, newline-terminated
        let text = log_message.message.trim_end_matches('\n');
        let Ok(bytes) = STANDARD.decode(text) else {
            continue;
        };
        if bytes.len() != 28 {
            continue;
        }

        let receiver = format!("0x{}", hex::encode(&bytes[..20]));
        let mut amount_bytes = [0u8; 8];
        amount_bytes.copy_from_slice(&bytes[20..28]);
        let amount = u64::from_be_bytes(amount_bytes);

        let source = transaction
            .in_msg
            .as_ref()
            .map(|message| message.source.clone())
            .unwrap_or_default();

        info!(
            "SwapTonToEth: receiver {}, amount {}, from {}, lt {}, tx {}",
            receiver, amount, source, transaction.transaction_id.lt, transaction.transaction_id.hash
        );
    }
    Ok(())
}

/// Fetch the current seqno and submit a signed bridge operation.
async fn run_operation(ctx: &Context, address_text: &str, op: Operation) -> Result<()> {
    let address = Address::parse(address_text)
        .with_context(|| format!("bad contract address {}", address_text))?;

    let mnemonic = ctx.keystore.load(address_text)?;
    let keypair = mnemonic.to_keypair();

    let result = ctx
        .provider
        .run_get_method(address_text, "get_bridge_data")
        .await?;
    if !result.is_ok() {
        bail!("unable to get bridge data");
    }
    let data = BridgeData::from_stack(&result)?;
    if data.seqno == 0 {
        bail!("bridge is not initialized yet");
    }

    let contract = bridge_at(&address, &keypair)?;
    let estimate_message = contract.create_external_message(&op, data.seqno, &keypair, true)?;
    let fees = common::estimate_fee(ctx, &estimate_message).await?;
    common::print_fees(&fees.source_fees);

    let message = contract.create_external_message(&op, data.seqno, &keypair, false)?;
    common::send(ctx, &message).await
}

fn bridge_at(address: &Address, keypair: &Ed25519Keypair) -> Result<Contract> {
    let contract = Contract::new(
        ContractKind::Bridge,
        address.workchain(),
        Some(keypair.public_key),
    )?
    .with_address(address.clone());
    Ok(contract)
}
