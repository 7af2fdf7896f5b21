use super::{key_store::KeyStore, signing_client::SoftSigner};

/// signing account used for a sequence of operations.
///
/// `counter` is the next counter to use. it only moves forward, once per
/// injected operation content (a reveal takes its own counter).
#[derive(Debug)]
pub struct Account {
    pub key_store: KeyStore,
    pub signer: SoftSigner,
    pub counter: u64,
    pub revealed: bool,
}

impl Account {
    pub fn new(key_store: KeyStore, signer: SoftSigner, counter: u64, revealed: bool) -> Self {
        Self {
            key_store,
            signer,
            counter,
            revealed,
        }
    }

    pub fn address(&self) -> &str {
        &self.key_store.public_key_hash
    }

    /// registers `count` injected contents
    pub fn advance(&mut self, count: u64) {
        self.counter += count;
        self.revealed = true;
    }
}
