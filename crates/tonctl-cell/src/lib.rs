//! Cell and Bag of Cells (BoC) primitives.
//!
//! Everything the operator tool sends to the network is ultimately a tree of
//! cells serialized into the BoC wire format:
//!
//! - **CellBuilder**: bit-level writer for assembling a cell
//! - **Cell**: finalized cell with its structural hash
//! - **CellSlice**: sequential reader over a cell
//! - **BagOfCells**: wire (de)serialization of a cell tree
//! - **Address**: account address with raw and user-friendly encodings
//!
//! A cell holds up to 1023 bits of data and up to 4 references to other
//! cells. Cells are immutable once built; their SHA256 hash covers the data
//! and the hashes of all referenced cells, so the root hash identifies the
//! whole tree.
//!
//! # Example
//!
//! ```
//! use tonctl_cell::{BagOfCells, CellBuilder};
//!
//! let mut builder = CellBuilder::new();
//! builder.store_u32(0x12345678).unwrap();
//! builder.store_bytes(&[1, 2, 3, 4]).unwrap();
//! let cell = builder.build();
//!
//! let hash = cell.hash();
//!
//! let boc = BagOfCells::from_root(cell);
//! let bytes = boc.serialize().unwrap();
//! let boc2 = BagOfCells::deserialize(&bytes).unwrap();
//! assert_eq!(boc2.single_root().unwrap().hash(), hash);
//! ```

use sha2::{Digest, Sha256};
use thiserror::Error;

mod address;
mod boc;
mod builder;
mod cell;
mod slice;

pub use address::Address;
pub use boc::BagOfCells;
pub use builder::CellBuilder;
pub use cell::{Cell, HASH_BYTES};
pub use slice::CellSlice;

/// Errors that can occur during cell construction and (de)serialization.
#[derive(Debug, Error)]
pub enum CellError {
    /// Writing would exceed the 1023-bit cell capacity.
    #[error("cell capacity exceeded: {0} bits (max {MAX_CELL_BITS})")]
    CapacityExceeded(usize),

    /// The cell would have more than 4 references.
    #[error("too many cell references: {0} (max {MAX_CELL_REFS})")]
    TooManyRefs(usize),

    /// An unsigned value does not fit in the requested bit width.
    #[error("value {value} does not fit in {bits} bits")]
    ValueOutOfRange { value: u128, bits: usize },

    /// A signed value does not fit in the requested bit width.
    #[error("value {value} does not fit in {bits} signed bits")]
    IntOutOfRange { value: i64, bits: usize },

    /// Requested bit width is not supported by the writer/reader.
    #[error("invalid bit width: {0}")]
    InvalidBitWidth(usize),

    /// Not enough bits left in the slice.
    #[error("not enough bits: need {need}, have {have}")]
    NotEnoughBits { need: usize, have: usize },

    /// Not enough references left in the slice.
    #[error("not enough refs: need {need}, have {have}")]
    NotEnoughRefs { need: usize, have: usize },

    /// Malformed bag-of-cells data.
    #[error("invalid BoC: {0}")]
    InvalidBoc(String),

    /// A reference index pointed outside the cell list.
    #[error("cell not found: index {0}")]
    CellNotFound(usize),

    /// The BoC checksum did not match.
    #[error("CRC32 mismatch: expected 0x{expected:08x}, got 0x{actual:08x}")]
    CrcMismatch { expected: u32, actual: u32 },

    /// Input ended before the structure was complete.
    #[error("unexpected end of data")]
    UnexpectedEof,

    /// Malformed or checksum-failing address text.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid base64 input.
    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    /// Expected exactly one root cell.
    #[error("expected single root, found {0}")]
    NotSingleRoot(usize),
}

/// Result type for cell operations.
pub type CellResult<T> = Result<T, CellError>;

/// Maximum number of data bits in a cell.
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum number of references a cell can hold.
pub const MAX_CELL_REFS: usize = 4;

/// Magic prefix of the generic BoC format.
pub const BOC_GENERIC_MAGIC: u32 = 0xb5ee9c72;

/// Magic prefix of the indexed BoC format.
pub const BOC_INDEXED_MAGIC: u32 = 0x68ff65f3;

/// Magic prefix of the indexed BoC format with CRC32C.
pub const BOC_INDEXED_CRC32_MAGIC: u32 = 0xacc3a728;

/// Compute SHA256 of the input data.
fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute CRC32-C (Castagnoli) checksum.
fn crc32c(data: &[u8]) -> u32 {
    const CRC32C: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI);
    CRC32C.checksum(data)
}
