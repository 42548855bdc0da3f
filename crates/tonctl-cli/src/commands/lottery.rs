//! Lottery commands.

use anyhow::{Context as _, Result};
use log::info;
use tonctl_cell::Address;
use tonctl_contract::ContractKind;

use crate::commands::common;
use crate::config::Context;
use crate::convert::format_amount;

/// Generate a lottery: new mnemonic, derived address, deployment fee
/// estimate.
pub async fn prepare(ctx: &Context, workchain: i32) -> Result<()> {
    info!("Prepare lottery:");
    common::prepare(ctx, ContractKind::Lottery, workchain, None).await
}

/// Deploy a prepared lottery.
pub async fn deploy(ctx: &Context, address: &str) -> Result<()> {
    info!("Deploy lottery:");
    common::deploy(ctx, ContractKind::Lottery, address, None).await
}

/// Show lottery addresses, balances and seqno.
pub async fn info(ctx: &Context, address_text: &str) -> Result<()> {
    info!("Lottery information:");

    let address =
        Address::parse(address_text).with_context(|| format!("bad address {}", address_text))?;
    let account = ctx.provider.get_address_info(address_text).await?;
    let seqno = ctx.provider.seqno(address_text).await?;

    common::print_address_info(&address, &account);
    info!(
        "- Sequence number: {}",
        common::resolve_seqno(seqno, &account)?
    );

    // the prize pool tracked by the contract itself
    let result = ctx.provider.run_get_method(address_text, "balance").await?;
    if result.is_ok() && !result.is_empty() {
        info!("- Prize pool: {}", format_amount(result.num_u128(0)?));
    }
    Ok(())
}
