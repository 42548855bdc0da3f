//! Key derivation: HMAC-SHA512 and PBKDF2-SHA512.
//!
//! Mnemonic key derivation computes an HMAC of the phrase first, then
//! stretches it with PBKDF2 under a fixed salt.

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Compute HMAC-SHA512 of `data` under `key`.
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac =
        HmacSha512::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    let result = mac.finalize();
    let mut output = [0u8; 64];
    output.copy_from_slice(&result.into_bytes());
    output
}

/// Derive key material with PBKDF2-HMAC-SHA512.
pub fn pbkdf2_sha512(password: &[u8], salt: &[u8], iterations: u32, output: &mut [u8]) {
    pbkdf2::pbkdf2::<HmacSha512>(password, salt, iterations, output)
        .expect("HMAC accepts any key length");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pbkdf2_sha512_deterministic() {
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        pbkdf2_sha512(b"password", b"salt", 1000, &mut a);
        pbkdf2_sha512(b"password", b"salt", 1000, &mut b);
        assert_eq!(a, b);
        assert_ne!(a, [0u8; 64]);
    }

    #[test]
    fn test_pbkdf2_sha512_salt_sensitivity() {
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        pbkdf2_sha512(b"password", b"salt1", 1000, &mut a);
        pbkdf2_sha512(b"password", b"salt2", 1000, &mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hmac_sha512_rfc4231_vector() {
        // RFC 4231 test case 1
        let key = [0x0bu8; 20];
        let mac = hmac_sha512(&key, b"Hi There");
        let expected = [
            0x87, 0xaa, 0x7c, 0xde, 0xa5, 0xef, 0x61, 0x9d, 0x4f, 0xf0, 0xb4, 0x24, 0x1a, 0x1d,
            0x6c, 0xb0, 0x23, 0x79, 0xf4, 0xe2, 0xce, 0x4e, 0xc2, 0x78, 0x7a, 0xd0, 0xb3, 0x05,
            0x45, 0xe1, 0x7c, 0xde, 0xda, 0xa8, 0x33, 0xb7, 0xd6, 0xb8, 0xa7, 0x02, 0x03, 0x8b,
            0x27, 0x4e, 0xae, 0xa3, 0xf4, 0xe4, 0xbe, 0x9d, 0x91, 0x4e, 0xeb, 0x61, 0xf1, 0x70,
            0x2e, 0x69, 0x6c, 0x20, 0x3a, 0x12, 0x68, 0x54,
        ];
        assert_eq!(mac, expected);
    }
}
