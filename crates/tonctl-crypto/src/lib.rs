//! Cryptographic primitives for the operator tool:
//!
//! - **Ed25519**: key pairs for signing external messages
//! - **KDF**: HMAC-SHA512 and PBKDF2-SHA512 for mnemonic key derivation

pub mod ed25519;
pub mod kdf;

pub use ed25519::{verify_signature, Ed25519Error, Ed25519Keypair};
pub use kdf::{hmac_sha512, pbkdf2_sha512};
