//! Typed contract operations.
//!
//! Every signing message starts with {seqno:32, opcode:32}; the remaining
//! fields are fixed per operation. Unsupported kind/operation combinations
//! are rejected before any cell is built.

use std::sync::Arc;

use tonctl_cell::{Address, Cell, CellBuilder, CellResult};

use crate::contract::ContractKind;

/// A wallet-to-wallet transfer.
#[derive(Debug, Clone)]
pub struct Transfer {
    /// Destination address.
    pub to: Address,
    /// Amount in nanotons.
    pub amount: u128,
    /// Bounce flag of the internal message.
    pub bounce: bool,
    /// Send mode (default 3: sender pays forward fees, ignore errors).
    pub mode: u8,
    /// Optional payload, typically a text comment cell.
    pub payload: Option<Arc<Cell>>,
}

impl Transfer {
    /// Create a transfer with the default mode and bounce flag.
    pub fn new(to: Address, amount: u128) -> Self {
        Transfer {
            to,
            amount,
            bounce: true,
            mode: 3,
            payload: None,
        }
    }

    /// Set the payload cell.
    pub fn with_payload(mut self, payload: Cell) -> Self {
        self.payload = Some(Arc::new(payload));
        self
    }

    /// Set the bounce flag.
    pub fn with_bounce(mut self, bounce: bool) -> Self {
        self.bounce = bounce;
        self
    }

    /// Set the send mode.
    pub fn with_mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }
}

/// An operation a signing message can carry.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Deployment (seqno 0, empty payload).
    Deploy,
    /// Wallet transfer.
    Transfer(Transfer),
    /// Replace the bridge's collector address.
    ChangeCollector {
        /// The new collector.
        collector: Address,
    },
    /// Replace the bridge's fee schedule.
    ChangeFees {
        /// Flat reward in nanotons.
        flat_reward: u128,
        /// Network fee in nanotons.
        network_fee: u128,
        /// Fee factor, 14 bits.
        fee_factor: u16,
    },
    /// Send the accumulated bridge reward to a beneficiary.
    WithdrawReward {
        /// The beneficiary address.
        beneficiary: Address,
    },
}

impl Operation {
    /// The 32-bit opcode written after the seqno.
    pub fn opcode(&self) -> u32 {
        match self {
            Operation::Deploy | Operation::Transfer(_) => 0,
            Operation::ChangeCollector { .. } => 1,
            Operation::ChangeFees { .. } => 2,
            Operation::WithdrawReward { .. } => 3,
        }
    }

    /// A short name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Deploy => "deploy",
            Operation::Transfer(_) => "transfer",
            Operation::ChangeCollector { .. } => "change-collector",
            Operation::ChangeFees { .. } => "change-fees",
            Operation::WithdrawReward { .. } => "withdraw-reward",
        }
    }

    /// Whether this contract kind accepts the operation.
    pub fn supported_by(&self, kind: ContractKind) -> bool {
        match self {
            Operation::Deploy => true,
            Operation::Transfer(_) => kind == ContractKind::Wallet,
            Operation::ChangeCollector { .. }
            | Operation::ChangeFees { .. }
            | Operation::WithdrawReward { .. } => kind == ContractKind::Bridge,
        }
    }

    /// Write the operation-specific fields after the {seqno, opcode} prefix.
    pub(crate) fn store_fields(&self, builder: &mut CellBuilder) -> CellResult<()> {
        match self {
            Operation::Deploy => {}
            Operation::Transfer(transfer) => {
                builder.store_u8(transfer.mode)?;
                builder.store_ref(Arc::new(build_internal_message(transfer)?))?;
            }
            Operation::ChangeCollector { collector } => {
                builder.store_address(Some(collector))?;
            }
            Operation::ChangeFees {
                flat_reward,
                network_fee,
                fee_factor,
            } => {
                builder.store_coins(*flat_reward)?;
                builder.store_coins(*network_fee)?;
                builder.store_uint(*fee_factor as u64, 14)?;
            }
            Operation::WithdrawReward { beneficiary } => {
                builder.store_address(Some(beneficiary))?;
            }
        }
        Ok(())
    }
}

/// Build the internal message a transfer carries.
fn build_internal_message(transfer: &Transfer) -> CellResult<Cell> {
    let mut builder = CellBuilder::new();

    // int_msg_info$0 ihr_disabled:Bool bounce:Bool bounced:Bool
    builder.store_bit(false)?;
    builder.store_bit(true)?; // ihr_disabled
    builder.store_bit(transfer.bounce)?;
    builder.store_bit(false)?; // bounced

    builder.store_address(None)?; // src filled in by the contract
    builder.store_address(Some(&transfer.to))?;
    builder.store_coins(transfer.amount)?;

    builder.store_bit(false)?; // no extra currencies
    builder.store_coins(0)?; // ihr_fee
    builder.store_coins(0)?; // fwd_fee
    builder.store_u64(0)?; // created_lt
    builder.store_u32(0)?; // created_at

    builder.store_bit(false)?; // no state_init
    match &transfer.payload {
        Some(payload) => {
            builder.store_bit(true)?;
            builder.store_ref(payload.clone())?;
        }
        None => {
            builder.store_bit(false)?;
        }
    }

    Ok(builder.build())
}

/// Build a text comment payload cell.
pub fn build_comment(text: &str) -> CellResult<Cell> {
    let mut builder = CellBuilder::new();
    builder.store_u32(0)?; // text comment op
    builder.store_bytes(text.as_bytes())?;
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcodes() {
        assert_eq!(Operation::Deploy.opcode(), 0);
        assert_eq!(
            Operation::ChangeCollector {
                collector: Address::new(0, [0; 32])
            }
            .opcode(),
            1
        );
        assert_eq!(
            Operation::ChangeFees {
                flat_reward: 0,
                network_fee: 0,
                fee_factor: 0
            }
            .opcode(),
            2
        );
        assert_eq!(
            Operation::WithdrawReward {
                beneficiary: Address::new(0, [0; 32])
            }
            .opcode(),
            3
        );
    }

    #[test]
    fn test_supported_by() {
        let transfer = Operation::Transfer(Transfer::new(Address::new(0, [0; 32]), 1));
        assert!(transfer.supported_by(ContractKind::Wallet));
        assert!(!transfer.supported_by(ContractKind::Bridge));

        let withdraw = Operation::WithdrawReward {
            beneficiary: Address::new(0, [0; 32]),
        };
        assert!(withdraw.supported_by(ContractKind::Bridge));
        assert!(!withdraw.supported_by(ContractKind::Lottery));

        assert!(Operation::Deploy.supported_by(ContractKind::Example));
    }

    #[test]
    fn test_internal_message_layout() {
        use tonctl_cell::CellSlice;

        let transfer = Transfer::new(Address::new(0, [0xAB; 32]), 1_000_000_000);
        let message = build_internal_message(&transfer).unwrap();

        let mut slice = CellSlice::new(&message);
        assert!(!slice.load_bit().unwrap()); // internal
        assert!(slice.load_bit().unwrap()); // ihr_disabled
        assert!(slice.load_bit().unwrap()); // bounce
        assert!(!slice.load_bit().unwrap()); // bounced
        assert!(slice.load_address().unwrap().is_none()); // src
        let dest = slice.load_address().unwrap().expect("dest present");
        assert_eq!(dest.hash_part(), &[0xAB; 32]);
        assert_eq!(slice.load_coins().unwrap(), 1_000_000_000);
    }

    #[test]
    fn test_comment_payload() {
        use tonctl_cell::CellSlice;

        let cell = build_comment("hi").unwrap();
        let mut slice = CellSlice::new(&cell);
        assert_eq!(slice.load_u32().unwrap(), 0);
        assert_eq!(slice.load_bytes(2).unwrap(), b"hi");
    }

    #[test]
    fn test_transfer_builder() {
        let transfer = Transfer::new(Address::new(0, [0; 32]), 5)
            .with_bounce(false)
            .with_mode(128);
        assert!(!transfer.bounce);
        assert_eq!(transfer.mode, 128);
    }
}
