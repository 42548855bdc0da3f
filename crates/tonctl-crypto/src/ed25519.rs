//! Ed25519 signatures.
//!
//! External messages carry a detached signature over the signing-message
//! cell hash; the matching public key lives in the contract's data cell.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Errors from Ed25519 operations.
#[derive(Debug, Error)]
pub enum Ed25519Error {
    /// The provided key bytes are invalid.
    #[error("invalid key bytes: {0}")]
    InvalidKey(String),

    /// Signature verification failed.
    #[error("signature verification failed")]
    VerificationFailed,
}

/// An Ed25519 keypair: a 32-byte secret seed and the derived public key.
///
/// The seed is zeroized on drop. Signing is deterministic.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Ed25519Keypair {
    /// The 32-byte secret seed.
    secret: [u8; 32],
    /// The 32-byte public key (not secret).
    #[zeroize(skip)]
    pub public_key: [u8; 32],
    /// The dalek signing key; holds the same secret as `secret`, which is
    /// the field that gets zeroized.
    #[zeroize(skip)]
    signing_key: SigningKey,
}

impl Ed25519Keypair {
    /// Generate a random keypair from the OS RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self::from_signing_key(signing_key)
    }

    /// Build a keypair from a 32-byte secret seed.
    pub fn from_secret_seed(secret: [u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(&secret))
    }

    /// Build a keypair from a byte slice; errors unless it is 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Ed25519Error> {
        if bytes.len() != 32 {
            return Err(Ed25519Error::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut secret = [0u8; 32];
        secret.copy_from_slice(bytes);
        Ok(Self::from_secret_seed(secret))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(signing_key.as_bytes());
        let mut public_key = [0u8; 32];
        public_key.copy_from_slice(signing_key.verifying_key().as_bytes());
        Self {
            secret,
            public_key,
            signing_key,
        }
    }

    /// Produce a detached 64-byte signature over `message`.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Verify a signature made with this keypair.
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> Result<(), Ed25519Error> {
        let signature = Signature::from_bytes(signature);
        self.signing_key
            .verifying_key()
            .verify(message, &signature)
            .map_err(|_| Ed25519Error::VerificationFailed)
    }

    /// The secret seed bytes.
    pub fn secret_seed(&self) -> &[u8; 32] {
        &self.secret
    }
}

impl std::fmt::Debug for Ed25519Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Keypair")
            .field("public_key", &hex_fmt(&self.public_key))
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

fn hex_fmt(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Verify a signature with a bare public key.
pub fn verify_signature(
    public_key: &[u8; 32],
    message: &[u8],
    signature: &[u8; 64],
) -> Result<(), Ed25519Error> {
    let verifying_key = VerifyingKey::from_bytes(public_key)
        .map_err(|e| Ed25519Error::InvalidKey(e.to_string()))?;
    let signature = Signature::from_bytes(signature);
    verifying_key
        .verify(message, &signature)
        .map_err(|_| Ed25519Error::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let keypair = Ed25519Keypair::generate();
        let message = b"hello";
        let signature = keypair.sign(message);
        assert!(keypair.verify(message, &signature).is_ok());
        assert!(keypair.verify(b"other", &signature).is_err());
    }

    #[test]
    fn test_corrupted_signature_rejected() {
        let keypair = Ed25519Keypair::generate();
        let mut signature = keypair.sign(b"hello");
        signature[0] ^= 0xFF;
        assert!(keypair.verify(b"hello", &signature).is_err());
    }

    #[test]
    fn test_seed_roundtrip() {
        let keypair = Ed25519Keypair::generate();
        let restored = Ed25519Keypair::from_secret_seed(*keypair.secret_seed());
        assert_eq!(keypair.public_key, restored.public_key);
    }

    #[test]
    fn test_deterministic_signing() {
        let keypair = Ed25519Keypair::generate();
        assert_eq!(keypair.sign(b"hello"), keypair.sign(b"hello"));
    }

    #[test]
    fn test_standalone_verify() {
        let keypair = Ed25519Keypair::generate();
        let signature = keypair.sign(b"hello");
        assert!(verify_signature(&keypair.public_key, b"hello", &signature).is_ok());
    }

    #[test]
    fn test_from_bytes_length_check() {
        assert!(Ed25519Keypair::from_bytes(&[0u8; 31]).is_err());
        assert!(Ed25519Keypair::from_bytes(&[7u8; 32]).is_ok());
    }
}
