//! Generated credentials and their encryption for output state.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::Rng as _;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::{Oaep, RsaPublicKey};
use sha2::{Digest, Sha256};
use tfmysql_core::{Error, Result};

pub const GENERATED_PASSWORD_LEN: usize = 32;

/// A fresh random password from the OS CSPRNG.
pub fn generate_password() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// An RSA public key supplied by the caller to receive a secret.
#[derive(Debug, Clone)]
pub struct RecipientKey {
    key: RsaPublicKey,
    fingerprint: String,
}

impl RecipientKey {
    /// Parse a `PUBLIC KEY` (SPKI) or `RSA PUBLIC KEY` (PKCS#1) PEM block.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let pem = pem.trim();
        let key = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|e| Error::Crypto(format!("invalid RSA public key: {e}")))?;

        let der = key
            .to_public_key_der()
            .map_err(|e| Error::Crypto(format!("failed to encode public key: {e}")))?;
        let fingerprint = Sha256::digest(der.as_bytes())
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();

        Ok(Self { key, fingerprint })
    }

    /// Lower-case hex SHA-256 of the DER-encoded public key.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// RSA-OAEP(SHA-256) encrypt `secret`, base64 encoded.
    pub fn encrypt(&self, secret: &str) -> Result<String> {
        let ciphertext = self
            .key
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), secret.as_bytes())
            .map_err(|e| Error::Crypto(format!("encryption failed: {e}")))?;
        Ok(STANDARD.encode(ciphertext))
    }
}
