//! Ed25519 request signature verification for the interactions endpoint.
//!
//! Discord signs `timestamp || body` with the application's key and sends
//! the hex signature in `X-Signature-Ed25519`.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use ironlog_core::error::ChannelError;
use tracing::debug;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    /// Build from the hex public key shown in the Developer Portal.
    pub fn from_hex(public_key: &str) -> Result<Self, ChannelError> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|e| ChannelError::NotConfigured(format!("public key is not hex: {e}")))?;
        let bytes: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            ChannelError::NotConfigured("public key must be 32 bytes".into())
        })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| ChannelError::NotConfigured(format!("invalid public key: {e}")))?;
        Ok(Self { key })
    }

    pub fn from_key(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Whether `signature_hex` signs `timestamp` followed by `body`.
    pub fn verify(&self, timestamp: &str, body: &[u8], signature_hex: &str) -> bool {
        let Ok(sig_bytes) = hex::decode(signature_hex) else {
            debug!("Signature is not hex");
            return false;
        };
        let Ok(sig_bytes) = <[u8; 64]>::try_from(sig_bytes.as_slice()) else {
            debug!("Signature has wrong length");
            return false;
        };
        let signature = Signature::from_bytes(&sig_bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key.verify(&message, &signature).is_ok()
    }
}
