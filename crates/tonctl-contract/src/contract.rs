//! Contract templates.

use std::sync::{Arc, OnceLock};

use tonctl_cell::{Address, Cell, CellBuilder};
use tonctl_crypto::Ed25519Keypair;

use crate::codes;
use crate::message::{
    common_msg_info, create_state_init, derive_address, external_message_header, ExternalMessage,
};
use crate::ops::Operation;
use crate::{ContractError, ContractResult};

/// The managed contract kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    /// Simple wallet: {seqno:32, pubkey:256}.
    Wallet,
    /// Cross-chain bridge with collector address and fee schedule.
    Bridge,
    /// Lottery contract.
    Lottery,
    /// Example contract.
    Example,
}

impl ContractKind {
    /// A short name for messages and errors.
    pub fn name(&self) -> &'static str {
        match self {
            ContractKind::Wallet => "wallet",
            ContractKind::Bridge => "bridge",
            ContractKind::Lottery => "lottery",
            ContractKind::Example => "example",
        }
    }

    /// The embedded program for this kind.
    pub fn code(&self) -> ContractResult<Arc<Cell>> {
        let code = match self {
            ContractKind::Wallet => codes::wallet_code()?,
            ContractKind::Bridge => codes::bridge_code()?,
            ContractKind::Lottery => codes::lottery_code()?,
            ContractKind::Example => codes::example_code()?,
        };
        Ok(code)
    }
}

impl std::fmt::Display for ContractKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Initial parameters of a bridge's data cell.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Where collected fees are sent.
    pub collector: Address,
    /// Flat reward in nanotons.
    pub flat_reward: u128,
    /// Network fee in nanotons.
    pub network_fee: u128,
    /// Fee factor, 14 bits.
    pub fee_factor: u16,
}

/// A contract template: code, target workchain, key material and
/// kind-specific init parameters.
///
/// The deployment address is derived from the code and the fully populated
/// data cell and memoized; templates for already-deployed contracts can
/// instead carry an explicit address.
#[derive(Debug)]
pub struct Contract {
    kind: ContractKind,
    workchain: i32,
    public_key: Option<[u8; 32]>,
    bridge_config: Option<BridgeConfig>,
    code: Arc<Cell>,
    provided_address: Option<Address>,
    derived_address: OnceLock<Address>,
}

impl Contract {
    /// Create a template for the given kind and workchain.
    pub fn new(
        kind: ContractKind,
        workchain: i32,
        public_key: Option<[u8; 32]>,
    ) -> ContractResult<Self> {
        Ok(Contract {
            kind,
            workchain,
            public_key,
            bridge_config: None,
            code: kind.code()?,
            provided_address: None,
            derived_address: OnceLock::new(),
        })
    }

    /// Attach bridge init parameters.
    pub fn with_bridge_config(mut self, config: BridgeConfig) -> Self {
        self.bridge_config = Some(config);
        self
    }

    /// Use an explicit account address instead of deriving one.
    pub fn with_address(mut self, address: Address) -> Self {
        self.provided_address = Some(address);
        self
    }

    /// The contract kind.
    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    /// The target workchain.
    pub fn workchain(&self) -> i32 {
        self.workchain
    }

    /// The public key, if set.
    pub fn public_key(&self) -> Option<&[u8; 32]> {
        self.public_key.as_ref()
    }

    /// The embedded code cell.
    pub fn code(&self) -> &Arc<Cell> {
        &self.code
    }

    /// The account address: the explicit one when given, otherwise derived
    /// from {workchain, code, data} and cached.
    ///
    /// Derivation requires the public key, since the data cell embeds it;
    /// deriving earlier would silently produce a different account.
    pub fn address(&self) -> ContractResult<Address> {
        if let Some(address) = &self.provided_address {
            return Ok(address.clone());
        }
        if let Some(address) = self.derived_address.get() {
            return Ok(address.clone());
        }
        let data = self.create_data_cell()?;
        let address = derive_address(self.workchain, &self.code, &data)?;
        let _ = self.derived_address.set(address.clone());
        Ok(address)
    }

    /// Build the initial persistent data cell.
    pub fn create_data_cell(&self) -> ContractResult<Cell> {
        let public_key = self.public_key.ok_or(ContractError::MissingPublicKey)?;

        let mut builder = CellBuilder::new();
        builder.store_u32(0)?; // seqno
        builder.store_bytes(&public_key)?;

        if self.kind == ContractKind::Bridge {
            let config = self
                .bridge_config
                .as_ref()
                .ok_or(ContractError::MissingBridgeConfig)?;
            builder.store_coins(0)?; // total_locked
            builder.store_address(Some(&config.collector))?;
            builder.store_coins(config.flat_reward)?;
            builder.store_coins(config.network_fee)?;
            builder.store_uint(config.fee_factor as u64, 14)?;
        }

        Ok(builder.build())
    }

    /// Build the signing message for an operation at the given seqno.
    pub fn create_signing_message(&self, seqno: u32, op: &Operation) -> ContractResult<Cell> {
        if !op.supported_by(self.kind) {
            return Err(ContractError::UnsupportedOperation {
                kind: self.kind.name(),
                op: op.name(),
            });
        }

        let mut builder = CellBuilder::new();
        builder.store_u32(seqno)?;
        builder.store_u32(op.opcode())?;
        op.store_fields(&mut builder)?;
        Ok(builder.build())
    }

    /// Build the deploying external message (seqno 0, state-init attached).
    pub fn create_init_external_message(
        &self,
        keypair: &Ed25519Keypair,
    ) -> ContractResult<ExternalMessage> {
        let signing_message = self.create_signing_message(0, &Operation::Deploy)?;
        let body = Self::signed_body(&signing_message, Some(keypair))?;

        let data = self.create_data_cell()?;
        let state_init = create_state_init(&self.code, &data)?;
        let address = self.address()?;

        let header = external_message_header(&address)?;
        let message = common_msg_info(&header, Some(&state_init), Some(&body))?;

        Ok(ExternalMessage {
            address,
            message,
            body,
            signing_message,
            state_init: Some(state_init),
            code: Some(self.code.clone()),
            data: Some(data),
        })
    }

    /// Build an operation external message.
    ///
    /// At seqno 0 the state-init is attached (the account is not deployed
    /// yet); afterwards the account already holds its code and data. With
    /// `dummy_signature` the 64 signature bytes are zero, producing the
    /// byte-identical layout used for fee estimation.
    pub fn create_external_message(
        &self,
        op: &Operation,
        seqno: u32,
        keypair: &Ed25519Keypair,
        dummy_signature: bool,
    ) -> ContractResult<ExternalMessage> {
        let signing_message = self.create_signing_message(seqno, op)?;
        let signer = if dummy_signature { None } else { Some(keypair) };
        let body = Self::signed_body(&signing_message, signer)?;

        let (state_init, code, data) = if seqno == 0 {
            let data = self.create_data_cell()?;
            let state_init = create_state_init(&self.code, &data)?;
            (Some(state_init), Some(self.code.clone()), Some(data))
        } else {
            (None, None, None)
        };

        let address = self.address()?;
        let header = external_message_header(&address)?;
        let message = common_msg_info(&header, state_init.as_ref(), Some(&body))?;

        Ok(ExternalMessage {
            address,
            message,
            body,
            signing_message,
            state_init,
            code,
            data,
        })
    }

    /// Sign the message hash and prepend the signature to the body;
    /// `None` writes the 64-zero-byte dummy signature.
    fn signed_body(
        signing_message: &Cell,
        keypair: Option<&Ed25519Keypair>,
    ) -> ContractResult<Cell> {
        let signature = match keypair {
            Some(keypair) => keypair.sign(&signing_message.hash()),
            None => [0u8; 64],
        };

        let mut builder = CellBuilder::new();
        builder.store_bytes(&signature)?;
        builder.store_cell(signing_message)?;
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Transfer;
    use tonctl_cell::CellSlice;

    fn test_keypair() -> Ed25519Keypair {
        Ed25519Keypair::from_secret_seed([7u8; 32])
    }

    fn wallet(public_key: [u8; 32]) -> Contract {
        Contract::new(ContractKind::Wallet, 0, Some(public_key)).unwrap()
    }

    fn bridge_config() -> BridgeConfig {
        BridgeConfig {
            collector: Address::new(0, [0x33; 32]),
            flat_reward: 5_000_000_000,
            network_fee: 1_000_000_000,
            fee_factor: 10_000,
        }
    }

    #[test]
    fn test_wallet_data_cell_golden_hash() {
        // fixed inputs: seqno 0, public key 0x01 * 32
        let contract = wallet([0x01; 32]);
        let data = contract.create_data_cell().unwrap();
        assert_eq!(data.bit_len(), 288);
        assert_eq!(
            hex::encode(data.hash()),
            "83caf776828356e5cffd001d4ad694b6f726bec2499659869fbfd5aaf6b8326e"
        );
    }

    #[test]
    fn test_missing_public_key_fails_fast() {
        let contract = Contract::new(ContractKind::Wallet, 0, None).unwrap();
        assert!(matches!(
            contract.create_data_cell(),
            Err(ContractError::MissingPublicKey)
        ));
        assert!(matches!(
            contract.address(),
            Err(ContractError::MissingPublicKey)
        ));
    }

    #[test]
    fn test_bridge_requires_config() {
        let contract = Contract::new(ContractKind::Bridge, 0, Some([1; 32])).unwrap();
        assert!(matches!(
            contract.create_data_cell(),
            Err(ContractError::MissingBridgeConfig)
        ));
    }

    #[test]
    fn test_bridge_data_cell_layout() {
        let contract = Contract::new(ContractKind::Bridge, 0, Some([0x01; 32]))
            .unwrap()
            .with_bridge_config(bridge_config());
        let data = contract.create_data_cell().unwrap();

        let mut slice = CellSlice::new(&data);
        assert_eq!(slice.load_u32().unwrap(), 0); // seqno
        assert_eq!(slice.load_bytes(32).unwrap(), vec![0x01; 32]); // pubkey
        assert_eq!(slice.load_coins().unwrap(), 0); // total_locked
        let collector = slice.load_address().unwrap().expect("collector");
        assert_eq!(collector.hash_part(), &[0x33; 32]);
        assert_eq!(slice.load_coins().unwrap(), 5_000_000_000);
        assert_eq!(slice.load_coins().unwrap(), 1_000_000_000);
        assert_eq!(slice.load_uint(14).unwrap(), 10_000);
        assert!(slice.is_empty());
    }

    #[test]
    fn test_change_fees_signing_message_golden_bytes() {
        let contract = Contract::new(ContractKind::Bridge, 0, Some([0x01; 32]))
            .unwrap()
            .with_bridge_config(bridge_config());

        let op = Operation::ChangeFees {
            flat_reward: 5_000_000_000,
            network_fee: 1_000_000_000,
            fee_factor: 10_000,
        };
        let message = contract.create_signing_message(3, &op).unwrap();

        // {seqno:32=3, opcode:32=2, coins(5e9), coins(1e9), 10000:14}
        assert_eq!(message.bit_len(), 158);
        assert_eq!(
            hex::encode(message.data()),
            "00000003000000025012a05f20043b9aca009c40"
        );
    }

    #[test]
    fn test_address_matches_independent_derivation() {
        let keypair = test_keypair();
        let contract = wallet(keypair.public_key);

        let data = contract.create_data_cell().unwrap();
        let expected = derive_address(0, contract.code(), &data).unwrap();
        assert_eq!(contract.address().unwrap(), expected);
        // memoized value stays stable
        assert_eq!(contract.address().unwrap(), expected);
    }

    #[test]
    fn test_deploy_message_embeds_matching_state_init() {
        let keypair = test_keypair();
        let contract = wallet(keypair.public_key);

        let message = contract.create_init_external_message(&keypair).unwrap();
        let state_init = message.state_init.as_ref().expect("state init attached");

        // the destination address equals the state-init hash
        assert_eq!(message.address.hash_part(), &state_init.hash());
        assert_eq!(
            message.address,
            derive_address(0, contract.code(), message.data.as_ref().unwrap()).unwrap()
        );
    }

    #[test]
    fn test_deploy_body_carries_valid_signature() {
        let keypair = test_keypair();
        let contract = wallet(keypair.public_key);
        let message = contract.create_init_external_message(&keypair).unwrap();

        let mut slice = CellSlice::new(&message.body);
        let signature_bytes = slice.load_bytes(64).unwrap();
        let mut signature = [0u8; 64];
        signature.copy_from_slice(&signature_bytes);
        assert!(keypair
            .verify(&message.signing_message.hash(), &signature)
            .is_ok());

        // the rest of the body is the signing message: {seqno 0, opcode 0}
        assert_eq!(slice.load_u32().unwrap(), 0);
        assert_eq!(slice.load_u32().unwrap(), 0);
        assert!(slice.is_empty());
    }

    #[test]
    fn test_operation_message_at_seqno_zero_attaches_state_init() {
        let keypair = test_keypair();
        let contract = wallet(keypair.public_key);

        let transfer = Operation::Transfer(Transfer::new(Address::new(0, [0xAA; 32]), 1));
        let with_init = contract
            .create_external_message(&transfer, 0, &keypair, false)
            .unwrap();
        assert!(with_init.state_init.is_some());

        let without_init = contract
            .create_external_message(&transfer, 1, &keypair, false)
            .unwrap();
        assert!(without_init.state_init.is_none());
        assert!(without_init.code.is_none());
        assert!(without_init.data.is_none());
    }

    #[test]
    fn test_dummy_signature_only_changes_signature_bits() {
        let keypair = test_keypair();
        let contract = wallet(keypair.public_key);
        let transfer = Operation::Transfer(Transfer::new(Address::new(0, [0xAA; 32]), 1));

        let dummy = contract
            .create_external_message(&transfer, 3, &keypair, true)
            .unwrap();
        let real = contract
            .create_external_message(&transfer, 3, &keypair, false)
            .unwrap();

        assert_eq!(dummy.signing_message.hash(), real.signing_message.hash());
        assert_eq!(dummy.message.bit_len(), real.message.bit_len());
        assert_eq!(dummy.message.reference_count(), real.message.reference_count());

        // dummy body starts with 64 zero bytes
        let mut slice = CellSlice::new(&dummy.body);
        assert_eq!(slice.load_bytes(64).unwrap(), vec![0u8; 64]);
    }

    #[test]
    fn test_unsupported_operation_rejected() {
        let contract = wallet([0x01; 32]);
        let op = Operation::ChangeFees {
            flat_reward: 0,
            network_fee: 0,
            fee_factor: 0,
        };
        assert!(matches!(
            contract.create_signing_message(1, &op),
            Err(ContractError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_explicit_address_skips_derivation() {
        let address = Address::new(0, [0x99; 32]);
        let contract = Contract::new(ContractKind::Bridge, 0, None)
            .unwrap()
            .with_address(address.clone());
        assert_eq!(contract.address().unwrap(), address);
    }

    #[test]
    fn test_deploy_message_roundtrips_through_boc() {
        use tonctl_cell::BagOfCells;

        let keypair = test_keypair();
        let contract = wallet(keypair.public_key);
        let message = contract.create_init_external_message(&keypair).unwrap();

        let bytes = BagOfCells::from_root(message.message.clone())
            .serialize()
            .unwrap();
        let restored = BagOfCells::deserialize(&bytes).unwrap();
        assert_eq!(
            restored.single_root().unwrap().hash(),
            message.message.hash()
        );
    }
}
