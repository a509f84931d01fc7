//! Ed25519 document signing.
//!
//! The reference [`Cryptographer`] wraps document content in a JSON
//! envelope carrying the signer key id, a SHA-256 digest and an Ed25519
//! signature over the content.

use std::fmt;

use anyhow::{anyhow, bail, Context};
use base64::{engine::general_purpose, Engine as _};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of an Ed25519 seed.
pub const SEED_LEN: usize = 32;

/// Signing identity shared by every document of a batch.
///
/// The secret is opaque to the pipeline; only the cryptographer
/// interprets it. `Debug` never prints it.
#[derive(Clone)]
pub struct Credential {
    key_id: String,
    secret: Vec<u8>,
}

impl Credential {
    pub fn new(key_id: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: secret.into(),
        }
    }

    /// Build a credential from base64-encoded secret material.
    pub fn from_base64(key_id: &str, secret_base64: &str) -> Result<Self, String> {
        let secret = general_purpose::STANDARD
            .decode(secret_base64)
            .map_err(|e| format!("Failed to decode base64: {}", e))?;
        Ok(Self::new(key_id, secret))
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key_id", &self.key_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Produces signed content from plain content.
pub trait Cryptographer {
    fn sign(&self, content: &[u8], credential: &Credential) -> anyhow::Result<Vec<u8>>;
}

/// Signed content as emitted by [`Ed25519Cryptographer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    pub key_id: String,
    /// Hex SHA-256 of the original content.
    pub digest: String,
    /// Base64 Ed25519 signature over the original content.
    pub signature: String,
    /// Base64 original content.
    pub content: String,
}

/// Signs with the credential secret used as an Ed25519 seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Cryptographer;

impl Ed25519Cryptographer {
    fn signing_key(credential: &Credential) -> anyhow::Result<SigningKey> {
        let seed: [u8; SEED_LEN] = credential.secret().try_into().map_err(|_| {
            anyhow!(
                "Invalid key length for {}: expected {}, got {}",
                credential.key_id(),
                SEED_LEN,
                credential.secret().len()
            )
        })?;
        Ok(SigningKey::from_bytes(&seed))
    }

    /// Public half of the credential, for handing to verifiers.
    pub fn verifying_key(credential: &Credential) -> anyhow::Result<VerifyingKey> {
        Ok(Self::signing_key(credential)?.verifying_key())
    }
}

impl Cryptographer for Ed25519Cryptographer {
    fn sign(&self, content: &[u8], credential: &Credential) -> anyhow::Result<Vec<u8>> {
        let signing_key = Self::signing_key(credential)?;
        let signature = signing_key.sign(content);

        let envelope = SignedEnvelope {
            key_id: credential.key_id().to_string(),
            digest: compute_hash(content),
            signature: general_purpose::STANDARD.encode(signature.to_bytes()),
            content: general_purpose::STANDARD.encode(content),
        };

        serde_json::to_vec(&envelope).context("Failed to encode signed envelope")
    }
}

/// Check a signed envelope and return the original content.
pub fn verify_envelope(signed: &[u8], verifying_key: &VerifyingKey) -> anyhow::Result<Vec<u8>> {
    let envelope: SignedEnvelope =
        serde_json::from_slice(signed).context("Failed to parse signed envelope")?;

    let content = general_purpose::STANDARD
        .decode(&envelope.content)
        .context("Failed to decode content")?;

    if compute_hash(&content) != envelope.digest {
        bail!("Digest mismatch for key {}", envelope.key_id);
    }

    let signature_bytes = general_purpose::STANDARD
        .decode(&envelope.signature)
        .context("Failed to decode signature")?;
    let signature = Signature::from_slice(&signature_bytes)
        .map_err(|e| anyhow!("Parse error: {}", e))?;

    verifying_key
        .verify(&content, &signature)
        .map_err(|e| anyhow!("Verification failed: {}", e))?;

    Ok(content)
}

/// Compute SHA256 hash of content.
pub fn compute_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
