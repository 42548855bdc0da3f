//! Shared pieces of the contract lifecycle commands.

use anyhow::{bail, Context as _, Result};
use log::info;
use tonctl_cell::{Address, BagOfCells, Cell};
use tonctl_contract::{BridgeConfig, Contract, ContractKind, ExternalMessage};
use tonctl_keystore::Mnemonic;
use tonctl_provider::{AccountState, AddressInfo, FeeRequest, Fees, SourceFees};

use crate::config::Context;
use crate::convert::format_amount;

/// Build a template with the key material and optional bridge parameters.
pub fn build_contract(
    kind: ContractKind,
    workchain: i32,
    public_key: [u8; 32],
    bridge: Option<BridgeConfig>,
) -> Result<Contract> {
    let mut contract = Contract::new(kind, workchain, Some(public_key))?;
    if let Some(config) = bridge {
        contract = contract.with_bridge_config(config);
    }
    Ok(contract)
}

/// Prepare a contract for deployment: generate and persist a mnemonic,
/// derive the address, estimate the deployment fee.
pub async fn prepare(
    ctx: &Context,
    kind: ContractKind,
    workchain: i32,
    bridge: Option<BridgeConfig>,
) -> Result<()> {
    let mnemonic = Mnemonic::generate();
    let keypair = mnemonic.to_keypair();

    let contract = build_contract(kind, workchain, keypair.public_key, bridge)?;
    let address = contract.address()?;
    let bounceable = address.to_user_friendly(true, true, false);

    ctx.keystore.save(&bounceable, &mnemonic)?;
    info!("Mnemonic saved to {}", ctx.keystore.path().display());

    let message = contract.create_init_external_message(&keypair)?;
    let fees = estimate_fee(ctx, &message).await?;
    print_fees(&fees.source_fees);

    let non_bounceable = address.to_user_friendly(false, true, false);
    info!(
        "{} is ready to be deployed: send at least {} to {}",
        capitalize(kind.name()),
        format_amount(fees.source_fees.total() as u128),
        non_bounceable
    );
    Ok(())
}

/// Deploy a prepared contract: load its mnemonic, rebuild the init message
/// and submit it.
pub async fn deploy(
    ctx: &Context,
    kind: ContractKind,
    address_text: &str,
    bridge: Option<BridgeConfig>,
) -> Result<()> {
    let address = parse_deploy_address(address_text)?;

    let mnemonic = ctx.keystore.load(address_text)?;
    let keypair = mnemonic.to_keypair();

    let contract = build_contract(kind, address.workchain(), keypair.public_key, bridge)?;
    let derived = contract.address()?;
    if derived != address {
        bail!(
            "stored mnemonic derives {}, not {}",
            derived.to_user_friendly(true, true, false),
            address_text
        );
    }

    let message = contract.create_init_external_message(&keypair)?;
    let fees = estimate_fee(ctx, &message).await?;
    print_fees(&fees.source_fees);

    send(ctx, &message).await?;
    info!("{} was deployed successfully", capitalize(kind.name()));
    Ok(())
}

/// An address used as a deployment target: user-friendly and bounceable.
pub fn parse_deploy_address(text: &str) -> Result<Address> {
    let address =
        Address::parse(text).with_context(|| format!("bad contract address {}", text))?;
    if !address.is_user_friendly() {
        bail!("contract address should be in user friendly format");
    }
    if !address.is_bounceable() {
        bail!("contract address should be bounceable");
    }
    Ok(address)
}

/// Estimate the fees of an assembled message.
pub async fn estimate_fee(ctx: &Context, message: &ExternalMessage) -> Result<Fees> {
    let request = FeeRequest {
        address: message.address.to_user_friendly(true, true, false),
        body: boc_base64(&message.body)?,
        init_code: match &message.code {
            Some(code) => Some(boc_base64(code)?),
            None => None,
        },
        init_data: match &message.data {
            Some(data) => Some(boc_base64(data)?),
            None => None,
        },
    };
    Ok(ctx.provider.estimate_fee(&request).await?)
}

/// Serialize and submit an assembled message.
pub async fn send(ctx: &Context, message: &ExternalMessage) -> Result<()> {
    let bytes = BagOfCells::from_root(message.message.clone()).serialize()?;
    ctx.provider.send_boc(&bytes).await?;
    Ok(())
}

/// Print the fee breakdown.
pub fn print_fees(fees: &SourceFees) {
    info!("Fees:");
    info!("- Gas fee:        {}", format_amount(fees.gas_fee as u128));
    info!("- In-Forward fee: {}", format_amount(fees.in_fwd_fee as u128));
    info!("- Forward fee:    {}", format_amount(fees.fwd_fee as u128));
    info!("- Storage fee:    {}", format_amount(fees.storage_fee as u128));
    info!("- Total fee:      {}", format_amount(fees.total() as u128));
}

/// Print the three address encodings, balance and account state.
pub fn print_address_info(address: &Address, info: &AddressInfo) {
    info!("- Raw address: {}", address.to_raw());
    info!(
        "- Non-bounceable address (for init):     {}",
        address.to_user_friendly(false, true, false)
    );
    info!(
        "- Bounceable address (for later access): {}",
        address.to_user_friendly(true, true, false)
    );
    info!("- Balance: {}", format_amount(info.balance));
    info!("- State: {}", info.state);
}

/// Resolve a fetched seqno: an undeployed account counts as 0, any other
/// missing value is an error.
pub fn resolve_seqno(seqno: Option<u32>, info: &AddressInfo) -> Result<u32> {
    match seqno {
        Some(value) => Ok(value),
        None if info.state == AccountState::Uninitialized => Ok(0),
        None => bail!("seqno getter returned no value on a {} account", info.state),
    }
}

/// Serialize a cell to a base64 BoC string.
pub fn boc_base64(cell: &Cell) -> Result<String> {
    Ok(BagOfCells::from_root(cell.clone()).serialize_to_base64()?)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
