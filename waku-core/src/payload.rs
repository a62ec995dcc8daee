//! Waku message payload codec.
//!
//! Version 0 payloads are carried as-is. Version 1 payloads are sealed with
//! AES-256-GCM, either under a pre-shared 32-byte symmetric key or under a
//! key derived from an ephemeral X25519 Diffie-Hellman exchange with the
//! recipient's public key.
//!
//! Wire layouts:
//! - symmetric:  `nonce(12) ‖ ciphertext+tag`
//! - asymmetric: `ephemeral_pub(32) ‖ nonce(12) ‖ ciphertext+tag`

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit};
use bytes::Bytes;
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey, SharedSecret, StaticSecret};

const NONCE_SIZE: usize = 12;
const PUBLIC_KEY_SIZE: usize = 32;
const AEAD_TAG_SIZE: usize = 16;

const KDF_INFO: &[u8] = b"waku-payload-v1";

/// Key material for sealing a payload.
pub enum EncryptionKey {
    /// Pre-shared 32-byte key.
    Symmetric([u8; 32]),
    /// Recipient's X25519 public key.
    Asymmetric(PublicKey),
}

/// Key material for opening a payload.
pub enum DecryptionKey {
    /// Pre-shared 32-byte key.
    Symmetric([u8; 32]),
    /// Recipient's X25519 secret key.
    Asymmetric(StaticSecret),
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The message version is not 0 or 1.
    #[error("unsupported payload version: {0}")]
    UnsupportedVersion(u32),

    /// A version 1 payload requires key material.
    #[error("missing key material for encrypted payload")]
    MissingKey,

    /// The payload is too short to carry the expected header fields.
    #[error("malformed encrypted payload")]
    MalformedPayload,

    /// Authentication failed; wrong key or tampered ciphertext.
    #[error("payload decryption failed")]
    DecryptionFailed,
}

/// Seal `data` according to `version`.
///
/// Version 0 returns the data unchanged (no key expected). Version 1
/// requires a key.
pub fn encode_payload(
    version: u32,
    data: &[u8],
    key: Option<&EncryptionKey>,
) -> Result<Bytes, PayloadError> {
    match version {
        0 => Ok(Bytes::copy_from_slice(data)),
        1 => match key.ok_or(PayloadError::MissingKey)? {
            EncryptionKey::Symmetric(key) => encrypt_symmetric(data, key),
            EncryptionKey::Asymmetric(recipient) => encrypt_asymmetric(data, recipient),
        },
        version => Err(PayloadError::UnsupportedVersion(version)),
    }
}

/// Open a payload sealed with [`encode_payload`].
pub fn decode_payload(
    version: u32,
    payload: &[u8],
    key: Option<&DecryptionKey>,
) -> Result<Bytes, PayloadError> {
    match version {
        0 => Ok(Bytes::copy_from_slice(payload)),
        1 => match key.ok_or(PayloadError::MissingKey)? {
            DecryptionKey::Symmetric(key) => decrypt_symmetric(payload, key),
            DecryptionKey::Asymmetric(secret) => decrypt_asymmetric(payload, secret),
        },
        version => Err(PayloadError::UnsupportedVersion(version)),
    }
}

fn seal(data: &[u8], key: &[u8; 32], out_prefix: Vec<u8>) -> Result<Bytes, PayloadError> {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let cipher = Aes256Gcm::new(key.into());
    let ciphertext = cipher
        .encrypt((&nonce).into(), data)
        .map_err(|_| PayloadError::DecryptionFailed)?;

    let mut out = out_prefix;
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(Bytes::from(out))
}

fn open(payload: &[u8], key: &[u8; 32]) -> Result<Bytes, PayloadError> {
    if payload.len() < NONCE_SIZE + AEAD_TAG_SIZE {
        return Err(PayloadError::MalformedPayload);
    }
    let (nonce, ciphertext) = payload.split_at(NONCE_SIZE);
    let nonce: [u8; NONCE_SIZE] = nonce
        .try_into()
        .map_err(|_| PayloadError::MalformedPayload)?;

    let cipher = Aes256Gcm::new(key.into());
    let plaintext = cipher
        .decrypt((&nonce).into(), ciphertext)
        .map_err(|_| PayloadError::DecryptionFailed)?;

    Ok(Bytes::from(plaintext))
}

fn encrypt_symmetric(data: &[u8], key: &[u8; 32]) -> Result<Bytes, PayloadError> {
    seal(data, key, Vec::new())
}

fn decrypt_symmetric(payload: &[u8], key: &[u8; 32]) -> Result<Bytes, PayloadError> {
    open(payload, key)
}

fn derive_key(shared: &SharedSecret) -> [u8; 32] {
    let hkdf = Hkdf::<Sha256>::new(None, shared.as_bytes());
    let mut key = [0u8; 32];
    hkdf.expand(KDF_INFO, &mut key)
        .expect("32 bytes is a valid HKDF-SHA256 output length");
    key
}

fn encrypt_asymmetric(data: &[u8], recipient: &PublicKey) -> Result<Bytes, PayloadError> {
    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_pub = PublicKey::from(&ephemeral);
    let shared = ephemeral.diffie_hellman(recipient);

    seal(data, &derive_key(&shared), ephemeral_pub.as_bytes().to_vec())
}

fn decrypt_asymmetric(payload: &[u8], secret: &StaticSecret) -> Result<Bytes, PayloadError> {
    if payload.len() < PUBLIC_KEY_SIZE + NONCE_SIZE + AEAD_TAG_SIZE {
        return Err(PayloadError::MalformedPayload);
    }
    let (ephemeral_pub, sealed) = payload.split_at(PUBLIC_KEY_SIZE);

    let ephemeral_pub: [u8; PUBLIC_KEY_SIZE] = ephemeral_pub
        .try_into()
        .map_err(|_| PayloadError::MalformedPayload)?;
    let shared = secret.diffie_hellman(&PublicKey::from(ephemeral_pub));

    open(sealed, &derive_key(&shared))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_payload_v0_passthrough() {
        // Given
        let data = b"plaintext payload";

        // When
        let encoded = encode_payload(0, data, None).unwrap();
        let decoded = decode_payload(0, &encoded, None).unwrap();

        // Then
        assert_eq!(encoded.as_ref(), data);
        assert_eq!(decoded.as_ref(), data);
    }

    #[test]
    fn test_payload_v1_symmetric_roundtrip() {
        // Given
        let data = b"symmetric secret";
        let key = [7u8; 32];

        // When
        let encoded = encode_payload(1, data, Some(&EncryptionKey::Symmetric(key))).unwrap();
        let decoded = decode_payload(1, &encoded, Some(&DecryptionKey::Symmetric(key))).unwrap();

        // Then
        assert_ne!(encoded.as_ref(), data.as_slice());
        assert_eq!(decoded.as_ref(), data);
    }

    #[test]
    fn test_payload_v1_symmetric_wrong_key() {
        // Given
        let data = b"symmetric secret";
        let encoded = encode_payload(1, data, Some(&EncryptionKey::Symmetric([7u8; 32]))).unwrap();

        // When
        let result = decode_payload(1, &encoded, Some(&DecryptionKey::Symmetric([8u8; 32])));

        // Then
        assert_matches!(result, Err(PayloadError::DecryptionFailed));
    }

    #[test]
    fn test_payload_v1_asymmetric_roundtrip() {
        // Given
        let data = b"asymmetric secret";
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);

        // When
        let encoded = encode_payload(1, data, Some(&EncryptionKey::Asymmetric(public))).unwrap();
        let decoded =
            decode_payload(1, &encoded, Some(&DecryptionKey::Asymmetric(secret))).unwrap();

        // Then
        assert_eq!(decoded.as_ref(), data);
    }

    #[test]
    fn test_payload_v1_asymmetric_wrong_key() {
        // Given
        let data = b"asymmetric secret";
        let public = PublicKey::from(&StaticSecret::random_from_rng(OsRng));
        let encoded = encode_payload(1, data, Some(&EncryptionKey::Asymmetric(public))).unwrap();

        // When
        let other_secret = StaticSecret::random_from_rng(OsRng);
        let result = decode_payload(1, &encoded, Some(&DecryptionKey::Asymmetric(other_secret)));

        // Then
        assert_matches!(result, Err(PayloadError::DecryptionFailed));
    }

    #[test]
    fn test_payload_v1_missing_key() {
        // Given/When
        let result = encode_payload(1, b"data", None);

        // Then
        assert_matches!(result, Err(PayloadError::MissingKey));
    }

    #[test]
    fn test_payload_unsupported_version() {
        // Given/When
        let result = encode_payload(2, b"data", None);

        // Then
        assert_matches!(result, Err(PayloadError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_payload_v1_truncated() {
        // Given
        let key = [7u8; 32];

        // When
        let result = decode_payload(1, &[0u8; 4], Some(&DecryptionKey::Symmetric(key)));

        // Then
        assert_matches!(result, Err(PayloadError::MalformedPayload));
    }
}
