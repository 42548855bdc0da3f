//! 24-word seed phrases with HMAC-based validation.
//!
//! Unlike plain BIP39, validity is not a wordlist checksum: a phrase is
//! valid when PBKDF2 over its HMAC entropy under the version salt starts
//! with a zero byte. Generation simply retries random phrases until one
//! passes.

use rand::rngs::OsRng;
use rand::Rng;

use crate::error::{KeystoreError, KeystoreResult};

/// Number of words in a phrase.
const WORD_COUNT: usize = 24;

/// PBKDF2 iterations for seed derivation.
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt for seed derivation.
const SEED_SALT: &[u8] = b"TON default seed";

/// Salt for phrase validation.
const VERSION_SALT: &[u8] = b"TON seed version";

/// The 2048-word English wordlist.
fn wordlist() -> &'static [&'static str] {
    bip39::Language::English.words_by_prefix("")
}

/// A 24-word mnemonic phrase.
#[derive(Clone)]
pub struct Mnemonic {
    words: Vec<String>,
}

impl Mnemonic {
    /// Generate a new random valid mnemonic.
    ///
    /// Draws 24 random words and retries until the phrase passes the
    /// basic-seed validation, so every generated phrase derives a usable
    /// keypair.
    pub fn generate() -> Self {
        let list = wordlist();
        let mut rng = OsRng;

        loop {
            let words: Vec<String> = (0..WORD_COUNT)
                .map(|_| list[rng.gen_range(0..list.len())].to_string())
                .collect();
            let mnemonic = Self { words };
            if mnemonic.is_basic_seed() {
                return mnemonic;
            }
        }
    }

    /// Parse a phrase, checking word count and wordlist membership.
    pub fn from_phrase(phrase: &str) -> KeystoreResult<Self> {
        let words: Vec<String> = phrase
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();

        if words.len() != WORD_COUNT {
            return Err(KeystoreError::WrongWordCount(words.len()));
        }

        let list = wordlist();
        for word in &words {
            if list.binary_search(&word.as_str()).is_err() {
                return Err(KeystoreError::InvalidWord(word.clone()));
            }
        }

        Ok(Self { words })
    }

    /// Parse a word vector with full validation.
    pub fn from_words(words: &[String]) -> KeystoreResult<Self> {
        let mnemonic = Self::from_phrase(&words.join(" "))?;
        if !mnemonic.is_basic_seed() {
            return Err(KeystoreError::InvalidMnemonic(
                "phrase fails basic-seed validation".to_string(),
            ));
        }
        Ok(mnemonic)
    }

    /// The words of the phrase.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The phrase as a single space-joined string.
    pub fn to_phrase(&self) -> String {
        self.words.join(" ")
    }

    /// Whether the phrase passes word count, wordlist and basic-seed checks.
    pub fn is_valid(&self) -> bool {
        self.words.len() == WORD_COUNT
            && {
                let list = wordlist();
                self.words
                    .iter()
                    .all(|w| list.binary_search(&w.as_str()).is_ok())
            }
            && self.is_basic_seed()
    }

    /// The basic-seed test: PBKDF2 of the phrase entropy under the version
    /// salt, reduced iterations, must start with a zero byte.
    fn is_basic_seed(&self) -> bool {
        let entropy = self.entropy("");
        let mut probe = [0u8; 64];
        tonctl_crypto::pbkdf2_sha512(
            &entropy,
            VERSION_SALT,
            PBKDF2_ITERATIONS.div_euclid(256).max(1),
            &mut probe,
        );
        probe[0] == 0
    }

    /// HMAC entropy of the phrase under an optional password.
    fn entropy(&self, password: &str) -> [u8; 64] {
        tonctl_crypto::hmac_sha512(self.to_phrase().as_bytes(), password.as_bytes())
    }

    /// Derive the 64-byte seed.
    pub fn to_seed(&self, password: &str) -> [u8; 64] {
        let entropy = self.entropy(password);
        let mut seed = [0u8; 64];
        tonctl_crypto::pbkdf2_sha512(&entropy, SEED_SALT, PBKDF2_ITERATIONS, &mut seed);
        seed
    }

    /// Derive the Ed25519 keypair from the first half of the seed.
    pub fn to_keypair(&self) -> tonctl_crypto::Ed25519Keypair {
        let seed = self.to_seed("");
        let mut ed_seed = [0u8; 32];
        ed_seed.copy_from_slice(&seed[..32]);
        tonctl_crypto::Ed25519Keypair::from_secret_seed(ed_seed)
    }
}

impl std::fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mnemonic")
            .field("words", &"[REDACTED]")
            .finish()
    }
}
