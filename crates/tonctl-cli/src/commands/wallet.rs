//! Wallet commands.

use anyhow::{bail, Context as _, Result};
use log::info;
use tonctl_cell::Address;
use tonctl_contract::{build_comment, ContractKind, Operation, Transfer};

use crate::commands::common;
use crate::config::Context;
use crate::convert::{format_amount, parse_tons};

/// Generate a wallet: new mnemonic, derived address, deployment fee
/// estimate.
pub async fn prepare(ctx: &Context, workchain: i32) -> Result<()> {
    info!("Prepare wallet:");
    common::prepare(ctx, ContractKind::Wallet, workchain, None).await
}

/// Deploy a prepared wallet.
pub async fn deploy(ctx: &Context, address: &str) -> Result<()> {
    info!("Deploy wallet:");
    common::deploy(ctx, ContractKind::Wallet, address, None).await
}

/// Show wallet addresses, balance and seqno.
pub async fn info(ctx: &Context, address_text: &str) -> Result<()> {
    info!("Wallet information:");

    let address =
        Address::parse(address_text).with_context(|| format!("bad address {}", address_text))?;
    let account = ctx.provider.get_address_info(address_text).await?;
    let seqno = ctx.provider.seqno(address_text).await?;

    common::print_address_info(&address, &account);
    info!(
        "- Sequence number: {}",
        common::resolve_seqno(seqno, &account)?
    );
    Ok(())
}

/// Transfer toncoins from one wallet to another.
pub async fn transfer(
    ctx: &Context,
    sender_text: &str,
    recipient_text: &str,
    amount: &str,
    state_init: bool,
    memo: &str,
) -> Result<()> {
    info!("Transfer TON between wallets:");

    if !Address::is_valid(sender_text) {
        bail!("invalid sender address");
    }
    let sender = Address::parse(sender_text)?;

    let recipient = Address::parse(recipient_text)
        .with_context(|| format!("bad recipient address {}", recipient_text))?;
    if !recipient.is_user_friendly() {
        bail!("recipient address should be in user friendly format");
    }
    if state_init && recipient.is_bounceable() {
        bail!("recipient address should be non-bounceable for a state-init transfer");
    }
    if !state_init && !recipient.is_bounceable() {
        bail!("recipient address should be bounceable for a non state-init transfer");
    }

    let amount = parse_tons(amount)?;

    let mnemonic = ctx.keystore.load(sender_text)?;
    let keypair = mnemonic.to_keypair();
    let contract = common::build_contract(
        ContractKind::Wallet,
        sender.workchain(),
        keypair.public_key,
        None,
    )?;

    let account = ctx.provider.get_address_info(sender_text).await?;
    if amount > account.balance {
        bail!(
            "transfer amount {} exceeds balance {}",
            format_amount(amount),
            format_amount(account.balance)
        );
    }

    // seqno 0 means the sender is not deployed yet; the message builder
    // attaches the state-init in that case and the transfer doubles as the
    // deployment
    let seqno = ctx.provider.seqno(sender_text).await?;
    let seqno = common::resolve_seqno(seqno, &account)?;

    let mut transfer = Transfer::new(recipient.clone(), amount).with_bounce(recipient.is_bounceable());
    if !memo.is_empty() {
        transfer = transfer.with_payload(build_comment(memo)?);
    }
    let op = Operation::Transfer(transfer);

    let estimate_message = contract.create_external_message(&op, seqno, &keypair, true)?;
    let fees = common::estimate_fee(ctx, &estimate_message).await?;
    common::print_fees(&fees.source_fees);

    let message = contract.create_external_message(&op, seqno, &keypair, false)?;
    common::send(ctx, &message).await?;

    info!("{} were transferred successfully", format_amount(amount));
    if memo.is_empty() {
        info!("No memo");
    } else {
        info!("Memo: {}", memo);
    }
    Ok(())
}
