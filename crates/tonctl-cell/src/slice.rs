//! Sequential reader over a cell.

use crate::{Address, Cell, CellError, CellResult};

/// A read cursor over a cell's data bits and references.
///
/// # Example
///
/// ```
/// use tonctl_cell::{CellBuilder, CellSlice};
///
/// let mut builder = CellBuilder::new();
/// builder.store_u32(0x12345678).unwrap();
/// let cell = builder.build();
///
/// let mut slice = CellSlice::new(&cell);
/// assert_eq!(slice.load_u32().unwrap(), 0x12345678);
/// ```
#[derive(Debug, Clone)]
pub struct CellSlice<'a> {
    cell: &'a Cell,
    bit_offset: usize,
    bits_left: usize,
    ref_offset: usize,
}

impl<'a> CellSlice<'a> {
    /// Create a slice at the start of a cell.
    pub fn new(cell: &'a Cell) -> Self {
        CellSlice {
            cell,
            bit_offset: 0,
            bits_left: cell.bit_len(),
            ref_offset: 0,
        }
    }

    /// Load a single bit.
    pub fn load_bit(&mut self) -> CellResult<bool> {
        if self.bits_left == 0 {
            return Err(CellError::NotEnoughBits { need: 1, have: 0 });
        }
        let bit = self.cell.get_bit(self.bit_offset).unwrap_or(false);
        self.bit_offset += 1;
        self.bits_left -= 1;
        Ok(bit)
    }

    /// Load an unsigned 8-bit integer.
    pub fn load_u8(&mut self) -> CellResult<u8> {
        self.load_uint(8).map(|v| v as u8)
    }

    /// Load an unsigned 16-bit integer (big-endian).
    pub fn load_u16(&mut self) -> CellResult<u16> {
        self.load_uint(16).map(|v| v as u16)
    }

    /// Load an unsigned 32-bit integer (big-endian).
    pub fn load_u32(&mut self) -> CellResult<u32> {
        self.load_uint(32).map(|v| v as u32)
    }

    /// Load an unsigned 64-bit integer (big-endian).
    pub fn load_u64(&mut self) -> CellResult<u64> {
        self.load_uint(64)
    }

    /// Load a signed 8-bit integer.
    pub fn load_i8(&mut self) -> CellResult<i8> {
        self.load_int(8).map(|v| v as i8)
    }

    /// Load a signed 32-bit integer (big-endian).
    pub fn load_i32(&mut self) -> CellResult<i32> {
        self.load_int(32).map(|v| v as i32)
    }

    /// Load an unsigned integer with a specific bit width.
    pub fn load_uint(&mut self, bits: usize) -> CellResult<u64> {
        if bits == 0 {
            return Ok(0);
        }
        if bits > 64 {
            return Err(CellError::InvalidBitWidth(bits));
        }
        if bits > self.bits_left {
            return Err(CellError::NotEnoughBits {
                need: bits,
                have: self.bits_left,
            });
        }

        let mut result: u64 = 0;
        for _ in 0..bits {
            result = (result << 1) | (self.load_bit()? as u64);
        }
        Ok(result)
    }

    /// Load a signed integer with a specific bit width (two's complement).
    pub fn load_int(&mut self, bits: usize) -> CellResult<i64> {
        if bits == 0 {
            return Ok(0);
        }
        if bits > 64 {
            return Err(CellError::InvalidBitWidth(bits));
        }

        let unsigned = self.load_uint(bits)?;
        if bits < 64 && (unsigned & (1u64 << (bits - 1))) != 0 {
            // sign extend
            let mask = !((1u64 << bits) - 1);
            Ok((unsigned | mask) as i64)
        } else {
            Ok(unsigned as i64)
        }
    }

    /// Load a byte array.
    pub fn load_bytes(&mut self, count: usize) -> CellResult<Vec<u8>> {
        let need = count * 8;
        if need > self.bits_left {
            return Err(CellError::NotEnoughBits {
                need,
                have: self.bits_left,
            });
        }
        let mut result = Vec::with_capacity(count);
        for _ in 0..count {
            result.push(self.load_u8()?);
        }
        Ok(result)
    }

    /// Load the next referenced cell.
    pub fn load_ref(&mut self) -> CellResult<&'a Cell> {
        let reference = self
            .cell
            .reference(self.ref_offset)
            .ok_or(CellError::NotEnoughRefs { need: 1, have: 0 })?;
        self.ref_offset += 1;
        Ok(reference.as_ref())
    }

    /// Load a coin amount (VarUInteger 16).
    pub fn load_coins(&mut self) -> CellResult<u128> {
        let byte_len = self.load_uint(4)? as usize;
        let mut result: u128 = 0;
        for _ in 0..byte_len {
            result = (result << 8) | (self.load_u8()? as u128);
        }
        Ok(result)
    }

    /// Load an address: `None` for the absent tag, the address otherwise.
    pub fn load_address(&mut self) -> CellResult<Option<Address>> {
        let tag = self.load_uint(2)? as u8;
        match tag {
            0b00 => Ok(None),
            0b10 => {
                let anycast = self.load_bit()?;
                if anycast {
                    let depth = self.load_uint(5)?;
                    self.skip_bits(depth as usize)?;
                }
                let workchain = self.load_int(8)? as i32;
                let bytes = self.load_bytes(32)?;
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&bytes);
                Ok(Some(Address::new(workchain, hash)))
            }
            other => Err(CellError::InvalidAddress(format!(
                "unsupported address tag: {:02b}",
                other
            ))),
        }
    }

    /// Skip a number of bits.
    pub fn skip_bits(&mut self, count: usize) -> CellResult<()> {
        if count > self.bits_left {
            return Err(CellError::NotEnoughBits {
                need: count,
                have: self.bits_left,
            });
        }
        self.bit_offset += count;
        self.bits_left -= count;
        Ok(())
    }

    /// Number of bits remaining.
    pub fn bits_left(&self) -> usize {
        self.bits_left
    }

    /// Number of references remaining.
    pub fn refs_left(&self) -> usize {
        self.cell.reference_count() - self.ref_offset
    }

    /// True when no bits and no references remain.
    pub fn is_empty(&self) -> bool {
        self.bits_left == 0 && self.refs_left() == 0
    }
}
