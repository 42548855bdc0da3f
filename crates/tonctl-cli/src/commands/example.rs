//! Example contract commands.

use anyhow::{Context as _, Result};
use log::info;
use tonctl_cell::Address;
use tonctl_contract::ContractKind;

use crate::commands::common;
use crate::config::Context;

/// Generate an example contract: new mnemonic, derived address, deployment
/// fee estimate.
pub async fn prepare(ctx: &Context, workchain: i32) -> Result<()> {
    info!("Prepare example contract:");
    common::prepare(ctx, ContractKind::Example, workchain, None).await
}

/// Deploy a prepared example contract.
pub async fn deploy(ctx: &Context, address: &str) -> Result<()> {
    info!("Deploy example contract:");
    common::deploy(ctx, ContractKind::Example, address, None).await
}

/// Show example contract addresses, seqno and public key.
pub async fn info(ctx: &Context, address_text: &str) -> Result<()> {
    info!("Example contract information:");

    let address =
        Address::parse(address_text).with_context(|| format!("bad address {}", address_text))?;
    let account = ctx.provider.get_address_info(address_text).await?;
    let seqno = ctx.provider.seqno(address_text).await?;

    common::print_address_info(&address, &account);
    info!(
        "- Sequence number: {}",
        common::resolve_seqno(seqno, &account)?
    );

    let result = ctx
        .provider
        .run_get_method(address_text, "get_public_key")
        .await?;
    if result.is_ok() && !result.is_empty() {
        info!("- Public key: {}", hex::encode(result.num_bytes32(0)?));
    }
    Ok(())
}
