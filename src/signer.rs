use std::fmt;

use alloy::{hex, primitives::B256};
use ed25519_dalek::{Signer, SigningKey};
use sha3::{Digest, Sha3_256};

use crate::errors::EntryError;

// Single-key Ed25519 authentication scheme id, appended to the public key before hashing
const ED25519_SCHEME: u8 = 0x00;

const SECRET_KEY_HEX_LEN: usize = 64;

/// 32-byte account address, rendered as `0x` followed by 64 hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountAddress(pub B256);

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_prefixed(self.0))
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Validates a hex secret key (optional `0x`) and decodes it to 32 bytes.
/// Runs before any network activity for an entry.
pub fn decode_secret_key(secret_key: &str) -> Result<[u8; 32], EntryError> {
    let stripped = secret_key.trim();
    let stripped = stripped.strip_prefix("0x").unwrap_or(stripped);

    if stripped.len() != SECRET_KEY_HEX_LEN {
        return Err(EntryError::InvalidKeyLength(stripped.len()));
    }

    let mut bytes = [0u8; 32];
    hex::decode_to_slice(stripped, &mut bytes)
        .map_err(|e| EntryError::InvalidKeyEncoding(e.to_string()))?;

    Ok(bytes)
}

/// Signing capability of one account. Pure: no I/O, same input always gives same output.
pub struct SignerIdentity {
    signing_key: SigningKey,
    address: AccountAddress,
}

impl SignerIdentity {
    pub fn from_secret_key(secret_key: &str) -> Result<Self, EntryError> {
        let signing_key = SigningKey::from_bytes(&decode_secret_key(secret_key)?);

        let mut hasher = Sha3_256::new();
        hasher.update(signing_key.verifying_key().as_bytes());
        hasher.update([ED25519_SCHEME]);
        let address = AccountAddress(B256::from_slice(&hasher.finalize()));

        Ok(Self {
            signing_key,
            address,
        })
    }

    pub fn address(&self) -> AccountAddress {
        self.address
    }

    pub fn public_key(&self) -> String {
        hex::encode_prefixed(self.signing_key.verifying_key().as_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> String {
        hex::encode_prefixed(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for SignerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerIdentity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Ownership statement the claims server re-creates and verifies byte for byte.
pub fn claim_message(address: &AccountAddress, application: &str, nonce: &str) -> String {
    format!(
        "APTOS\naddress: {address}\napplication: {application}\nmessage: Please sign this message to confirm ownership. Nonce: {nonce}\nnonce: {nonce}"
    )
}
