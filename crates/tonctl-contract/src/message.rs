//! State-init, message envelopes and address derivation.

use std::sync::Arc;

use tonctl_cell::{Address, Cell, CellBuilder, CellResult};

/// A fully assembled external message, ready for fee estimation or
/// submission.
#[derive(Debug, Clone)]
pub struct ExternalMessage {
    /// Destination account.
    pub address: Address,
    /// The complete message cell handed to the network.
    pub message: Cell,
    /// The signed body (signature + signing message).
    pub body: Cell,
    /// The signing message the signature covers.
    pub signing_message: Cell,
    /// State-init cell, present on deploying messages.
    pub state_init: Option<Cell>,
    /// Code cell, present on deploying messages.
    pub code: Option<Arc<Cell>>,
    /// Data cell, present on deploying messages.
    pub data: Option<Cell>,
}

/// Build a state-init cell from code and data.
///
/// Layout: no split_depth, no tick-tock, code and data as references,
/// no library.
pub fn create_state_init(code: &Arc<Cell>, data: &Cell) -> CellResult<Cell> {
    let mut builder = CellBuilder::new();
    builder.store_bit(false)?; // split_depth
    builder.store_bit(false)?; // tick-tock
    builder.store_bit(true)?; // code
    builder.store_ref(code.clone())?;
    builder.store_bit(true)?; // data
    builder.store_ref(Arc::new(data.clone()))?;
    builder.store_bit(false)?; // library
    Ok(builder.build())
}

/// Derive a contract's deployment address from its code and fully
/// populated data cell.
pub fn derive_address(workchain: i32, code: &Arc<Cell>, data: &Cell) -> CellResult<Address> {
    let state_init = create_state_init(code, data)?;
    Ok(Address::new(workchain, state_init.hash()))
}

/// Build the header of an inbound external message.
///
/// ext_in_msg_info$10, source absent, the destination address, zero
/// import fee.
pub fn external_message_header(dest: &Address) -> CellResult<Cell> {
    let mut builder = CellBuilder::new();
    builder.store_uint(0b10, 2)?;
    builder.store_address(None)?;
    builder.store_address(Some(dest))?;
    builder.store_coins(0)?;
    Ok(builder.build())
}

/// Combine header, optional state-init and optional body into the final
/// message cell.
///
/// The state-init and body are spliced inline when the remaining bit and
/// reference capacity allows, and attached as references otherwise; this
/// matches the network's Maybe/Either encoding.
pub fn common_msg_info(
    header: &Cell,
    state_init: Option<&Cell>,
    body: Option<&Cell>,
) -> CellResult<Cell> {
    let mut builder = CellBuilder::new();
    builder.store_cell(header)?;

    match state_init {
        Some(init) => {
            builder.store_bit(true)?;
            store_inline_or_ref(&mut builder, init)?;
        }
        None => {
            builder.store_bit(false)?;
        }
    }

    match body {
        Some(body) => {
            store_inline_or_ref(&mut builder, body)?;
        }
        None => {
            builder.store_bit(false)?;
        }
    }

    Ok(builder.build())
}

fn store_inline_or_ref(builder: &mut CellBuilder, cell: &Cell) -> CellResult<()> {
    let fits = builder.bits_left() >= 1 + cell.bit_len()
        && builder.refs_left() >= cell.reference_count();
    if fits {
        builder.store_bit(false)?;
        builder.store_cell(cell)?;
    } else {
        builder.store_bit(true)?;
        builder.store_ref(Arc::new(cell.clone()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonctl_cell::CellSlice;

    fn dummy_code() -> Arc<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_u32(0xC0DE).unwrap();
        Arc::new(builder.build())
    }

    fn dummy_data() -> Cell {
        let mut builder = CellBuilder::new();
        builder.store_u32(0xDA7A).unwrap();
        builder.build()
    }

    #[test]
    fn test_state_init_layout() {
        let code = dummy_code();
        let data = dummy_data();
        let init = create_state_init(&code, &data).unwrap();

        assert_eq!(init.bit_len(), 5);
        assert_eq!(init.reference_count(), 2);

        let mut slice = CellSlice::new(&init);
        assert!(!slice.load_bit().unwrap()); // split_depth
        assert!(!slice.load_bit().unwrap()); // tick-tock
        assert!(slice.load_bit().unwrap()); // code present
        assert!(slice.load_bit().unwrap()); // data present
        assert!(!slice.load_bit().unwrap()); // library
        assert_eq!(slice.load_ref().unwrap().hash(), code.hash());
        assert_eq!(slice.load_ref().unwrap().hash(), data.hash());
    }

    #[test]
    fn test_derive_address_deterministic() {
        let code = dummy_code();
        let data = dummy_data();
        let a = derive_address(0, &code, &data).unwrap();
        let b = derive_address(0, &code, &data).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.workchain(), 0);

        // address is the state-init hash
        let init = create_state_init(&code, &data).unwrap();
        assert_eq!(a.hash_part(), &init.hash());
    }

    #[test]
    fn test_derive_address_depends_on_data() {
        let code = dummy_code();
        let mut other_builder = CellBuilder::new();
        other_builder.store_u32(0xBEEF).unwrap();
        let other = other_builder.build();

        let a = derive_address(0, &code, &dummy_data()).unwrap();
        let b = derive_address(0, &code, &other).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_external_message_header_layout() {
        let dest = Address::new(0, [0x11; 32]);
        let header = external_message_header(&dest).unwrap();

        let mut slice = CellSlice::new(&header);
        assert_eq!(slice.load_uint(2).unwrap(), 0b10);
        assert!(slice.load_address().unwrap().is_none()); // src absent
        let parsed = slice.load_address().unwrap().expect("dest present");
        assert_eq!(parsed, dest);
        assert_eq!(slice.load_coins().unwrap(), 0); // import fee
        assert!(slice.is_empty());
    }

    #[test]
    fn test_common_msg_info_inlines_small_parts() {
        let dest = Address::new(0, [0x11; 32]);
        let header = external_message_header(&dest).unwrap();
        let init = create_state_init(&dummy_code(), &dummy_data()).unwrap();
        let mut body_builder = CellBuilder::new();
        body_builder.store_u32(7).unwrap();
        let body = body_builder.build();

        let message = common_msg_info(&header, Some(&init), Some(&body)).unwrap();
        // header bits + maybe(1) + either(1) + init bits + either(1) + body
        let expected_bits = header.bit_len() + 1 + 1 + init.bit_len() + 1 + body.bit_len();
        assert_eq!(message.bit_len(), expected_bits);
        // inlined state-init contributes its code and data references
        assert_eq!(message.reference_count(), 2);
    }

    #[test]
    fn test_common_msg_info_falls_back_to_ref() {
        let dest = Address::new(0, [0x11; 32]);
        let header = external_message_header(&dest).unwrap();

        // a body too large to inline next to the 275-bit header
        let mut big = CellBuilder::new();
        for _ in 0..14 {
            big.store_u64(0xFFFF_FFFF_FFFF_FFFF).unwrap();
        }
        let body = big.build();

        let message = common_msg_info(&header, None, Some(&body)).unwrap();
        assert_eq!(message.reference_count(), 1);
        assert_eq!(
            message.reference(0).unwrap().hash(),
            body.hash()
        );
    }

    #[test]
    fn test_common_msg_info_without_parts() {
        let dest = Address::new(0, [0x11; 32]);
        let header = external_message_header(&dest).unwrap();
        let message = common_msg_info(&header, None, None).unwrap();
        // header + maybe(0) + either-body(0)
        assert_eq!(message.bit_len(), header.bit_len() + 2);
    }
}
