//! Account addresses.
//!
//! An address is a (workchain, 256-bit hash) pair. Two textual encodings are
//! supported:
//!
//! - raw: `workchain:hex_hash`, e.g. `0:abc1…`
//! - user-friendly: base64 (or base64url) of 36 bytes:
//!   1 tag byte + 1 workchain byte + 32 hash bytes + 2 bytes CRC-16/XMODEM.
//!
//! The tag byte is 0x11 for bounceable and 0x51 for non-bounceable
//! addresses, with 0x80 added for test-only addresses.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;

use crate::{CellError, CellResult};

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TEST_ONLY: u8 = 0x80;

/// An account address.
///
/// Identity is the (workchain, hash) pair; the encoding flags remembered
/// from parsing are presentation attributes and do not participate in
/// equality.
#[derive(Debug, Clone)]
pub struct Address {
    workchain: i32,
    hash_part: [u8; 32],
    user_friendly: bool,
    bounceable: bool,
    test_only: bool,
    url_safe: bool,
}

impl Address {
    /// Create an address from its parts.
    pub fn new(workchain: i32, hash_part: [u8; 32]) -> Self {
        Address {
            workchain,
            hash_part,
            user_friendly: false,
            bounceable: false,
            test_only: false,
            url_safe: true,
        }
    }

    /// Parse an address in raw or user-friendly form.
    pub fn parse(text: &str) -> CellResult<Self> {
        let text = text.trim();
        if let Some(colon) = text.find(':') {
            return Self::parse_raw(&text[..colon], &text[colon + 1..]);
        }
        Self::parse_user_friendly(text)
    }

    /// Non-throwing validity check.
    pub fn is_valid(text: &str) -> bool {
        Self::parse(text).is_ok()
    }

    fn parse_raw(workchain_str: &str, hash_str: &str) -> CellResult<Self> {
        let workchain: i32 = workchain_str
            .parse()
            .map_err(|_| CellError::InvalidAddress(format!("bad workchain: {}", workchain_str)))?;

        if hash_str.len() != 64 {
            return Err(CellError::InvalidAddress(format!(
                "hash part must be 64 hex chars, got {}",
                hash_str.len()
            )));
        }
        let bytes = hex::decode(hash_str)
            .map_err(|_| CellError::InvalidAddress(format!("bad hex: {}", hash_str)))?;
        let mut hash_part = [0u8; 32];
        hash_part.copy_from_slice(&bytes);

        Ok(Address {
            workchain,
            hash_part,
            user_friendly: false,
            bounceable: false,
            test_only: false,
            url_safe: true,
        })
    }

    fn parse_user_friendly(text: &str) -> CellResult<Self> {
        if text.len() != 48 {
            return Err(CellError::InvalidAddress(format!(
                "user-friendly address must be 48 chars, got {}",
                text.len()
            )));
        }

        let url_safe = !text.contains('+') && !text.contains('/');
        let standard: String = text
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                c => c,
            })
            .collect();

        let bytes = STANDARD
            .decode(standard.as_bytes())
            .map_err(|e| CellError::InvalidBase64(e.to_string()))?;
        if bytes.len() != 36 {
            return Err(CellError::InvalidAddress(format!(
                "user-friendly payload must be 36 bytes, got {}",
                bytes.len()
            )));
        }

        let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
        let actual = crc16_xmodem(&bytes[..34]);
        if expected != actual {
            return Err(CellError::InvalidAddress(format!(
                "checksum mismatch: expected {:04x}, got {:04x}",
                expected, actual
            )));
        }

        let mut tag = bytes[0];
        let test_only = tag & TAG_TEST_ONLY != 0;
        tag &= !TAG_TEST_ONLY;
        let bounceable = match tag {
            TAG_BOUNCEABLE => true,
            TAG_NON_BOUNCEABLE => false,
            other => {
                return Err(CellError::InvalidAddress(format!(
                    "unknown address tag: 0x{:02x}",
                    other
                )))
            }
        };

        let workchain = bytes[1] as i8 as i32;
        let mut hash_part = [0u8; 32];
        hash_part.copy_from_slice(&bytes[2..34]);

        Ok(Address {
            workchain,
            hash_part,
            user_friendly: true,
            bounceable,
            test_only,
            url_safe,
        })
    }

    /// Encode as raw `workchain:hex` text.
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash_part))
    }

    /// Encode as user-friendly base64 text with the given flags.
    pub fn to_user_friendly(&self, bounceable: bool, url_safe: bool, test_only: bool) -> String {
        let mut tag = if bounceable {
            TAG_BOUNCEABLE
        } else {
            TAG_NON_BOUNCEABLE
        };
        if test_only {
            tag |= TAG_TEST_ONLY;
        }

        let mut payload = Vec::with_capacity(36);
        payload.push(tag);
        payload.push(self.workchain as i8 as u8);
        payload.extend_from_slice(&self.hash_part);
        let crc = crc16_xmodem(&payload);
        payload.extend_from_slice(&crc.to_be_bytes());

        if url_safe {
            URL_SAFE.encode(&payload)
        } else {
            STANDARD.encode(&payload)
        }
    }

    /// The workchain id.
    pub fn workchain(&self) -> i32 {
        self.workchain
    }

    /// The 256-bit hash part.
    pub fn hash_part(&self) -> &[u8; 32] {
        &self.hash_part
    }

    /// Whether this address was parsed from the user-friendly encoding.
    pub fn is_user_friendly(&self) -> bool {
        self.user_friendly
    }

    /// Whether the parsed encoding carried the bounceable tag.
    pub fn is_bounceable(&self) -> bool {
        self.bounceable
    }

    /// Whether the parsed encoding carried the test-only flag.
    pub fn is_test_only(&self) -> bool {
        self.test_only
    }

    /// Whether the parsed encoding used the url-safe alphabet.
    pub fn is_url_safe(&self) -> bool {
        self.url_safe
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.workchain == other.workchain && self.hash_part == other.hash_part
    }
}

impl Eq for Address {}

impl std::hash::Hash for Address {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.workchain.hash(state);
        self.hash_part.hash(state);
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_raw())
    }
}

impl std::str::FromStr for Address {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

/// CRC-16/XMODEM over the address payload.
fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
