//! Runtime context shared by the command handlers.

use tonctl_keystore::KeyStore;
use tonctl_provider::HttpProvider;

/// Everything a command needs to talk to the network and the key file.
#[derive(Debug, Clone)]
pub struct Context {
    /// The node endpoint client.
    pub provider: HttpProvider,
    /// The mnemonic key file.
    pub keystore: KeyStore,
}

impl Context {
    /// Build the context from the resolved CLI options.
    pub fn new(provider_url: &str, keystore_path: &str) -> Self {
        Context {
            provider: HttpProvider::new(provider_url),
            keystore: KeyStore::new(keystore_path),
        }
    }
}
