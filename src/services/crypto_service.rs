//! Key derivation and the cipher adapter for credential secrets.
//!
//! The master key is derived once at startup from the operator secret and
//! salt using Argon2id, then handed to a [`CipherAdapter`] that encrypts
//! individual secrets with AES-256-GCM under a fresh random IV per call.
//!
//! Ciphertext envelope: `base64(iv) ":" base64(ciphertext || tag)`. The
//! colon is outside the base64 alphabet, so splitting on it is unambiguous.
//! The format is persisted and must stay stable across deploys.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, UnboundKey, AES_256_GCM};
use ring::digest;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::types::errors::{ConfigError, CryptoError};

/// Argon2id memory cost in KiB (64 MB).
const ARGON2_MEMORY_KB: u32 = 65536;

/// Argon2id iteration count.
const ARGON2_ITERATIONS: u32 = 3;

/// Argon2id parallelism (threads).
const ARGON2_PARALLELISM: u32 = 4;

/// Normalized salt length in bytes for Argon2id.
const SALT_LENGTH: usize = 16;

/// AES-256-GCM key length in bytes.
const KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce/IV length in bytes.
const NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
const TAG_LENGTH: usize = 16;

/// Separator between the IV and payload parts of the ciphertext envelope.
const ENVELOPE_SEPARATOR: char = ':';

/// The process-wide symmetric key, derived once at startup and immutable
/// afterwards. Holds its bytes in a [`Zeroizing`] buffer so they are wiped
/// on drop, and deliberately implements neither `Debug` nor serde traits.
pub struct MasterKey {
    bytes: Zeroizing<[u8; KEY_LENGTH]>,
}

impl MasterKey {
    /// Derives a 32-byte key from the operator secret and salt using Argon2id.
    ///
    /// The operator salt is an arbitrary string; it is normalized to the
    /// fixed length Argon2 expects by hashing it with SHA-256 and taking the
    /// first 16 bytes. Derivation is deterministic for a given secret/salt
    /// pair.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingSecret` / `ConfigError::MissingSalt` if
    /// either input is empty; the process must never derive a key from
    /// empty input.
    pub fn derive(secret: &str, salt: &str) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if salt.is_empty() {
            return Err(ConfigError::MissingSalt);
        }

        let salt_digest = digest::digest(&digest::SHA256, salt.as_bytes());
        let mut salt_bytes = [0u8; SALT_LENGTH];
        salt_bytes.copy_from_slice(&salt_digest.as_ref()[..SALT_LENGTH]);

        let params = argon2::Params::new(
            ARGON2_MEMORY_KB,
            ARGON2_ITERATIONS,
            ARGON2_PARALLELISM,
            Some(KEY_LENGTH),
        )
        .map_err(|e| ConfigError::KeyDerivation(format!("invalid Argon2id parameters: {}", e)))?;

        let argon2 =
            argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

        let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
        argon2
            .hash_password_into(secret.as_bytes(), &salt_bytes, key.as_mut())
            .map_err(|e| ConfigError::KeyDerivation(e.to_string()))?;

        Ok(Self { bytes: key })
    }

    /// Returns the raw key bytes for use by the cipher adapter.
    fn bytes(&self) -> &[u8] {
        &self.bytes[..]
    }
}

/// A nonce sequence that uses a single nonce value.
/// Used for one-shot encryption/decryption operations.
struct SingleNonce {
    nonce: Option<[u8; NONCE_LENGTH]>,
}

impl SingleNonce {
    fn new(nonce_bytes: [u8; NONCE_LENGTH]) -> Self {
        Self {
            nonce: Some(nonce_bytes),
        }
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> Result<Nonce, ring::error::Unspecified> {
        self.nonce
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

/// Trait defining the cipher boundary for credential secrets.
pub trait CipherAdapterTrait {
    /// Encrypts a plaintext secret into a self-describing envelope string.
    /// A fresh random IV is generated per call, so two encryptions of the
    /// same plaintext produce different envelopes.
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError>;

    /// Parses an envelope, decrypts, and returns the original plaintext.
    fn decrypt(&self, envelope: &str) -> Result<String, CryptoError>;
}

/// Cipher adapter holding the derived master key.
///
/// The only component allowed to turn plaintext secrets into ciphertext and
/// back; everything above it treats the envelope as an opaque string.
pub struct CipherAdapter {
    key: MasterKey,
    rng: SystemRandom,
}

impl CipherAdapter {
    /// Creates a new adapter around an already-derived master key.
    pub fn new(key: MasterKey) -> Self {
        Self {
            key,
            rng: SystemRandom::new(),
        }
    }
}

impl CipherAdapterTrait for CipherAdapter {
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        // Generate a random nonce/IV per call; never fixed, never reused
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CryptoError::RandomGeneration("Failed to generate IV".to_string()))?;

        let unbound_key = UnboundKey::new(&AES_256_GCM, self.key.bytes())
            .map_err(|_| CryptoError::Encryption("Failed to create encryption key".to_string()))?;

        let nonce_sequence = SingleNonce::new(nonce_bytes);
        let mut sealing_key = aead::SealingKey::new(unbound_key, nonce_sequence);

        // Seal in place; ring appends the auth tag to the ciphertext
        let mut in_out = plaintext.as_bytes().to_vec();
        sealing_key
            .seal_in_place_append_tag(Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::Encryption("Encryption operation failed".to_string()))?;

        Ok(format!(
            "{}{}{}",
            BASE64.encode(nonce_bytes),
            ENVELOPE_SEPARATOR,
            BASE64.encode(&in_out)
        ))
    }

    fn decrypt(&self, envelope: &str) -> Result<String, CryptoError> {
        let parts: Vec<&str> = envelope.split(ENVELOPE_SEPARATOR).collect();
        if parts.len() != 2 {
            return Err(CryptoError::MalformedCiphertext(format!(
                "Expected 2 envelope parts, got {}",
                parts.len()
            )));
        }

        let iv = BASE64
            .decode(parts[0])
            .map_err(|_| CryptoError::MalformedCiphertext("IV is not valid base64".to_string()))?;
        let payload = BASE64.decode(parts[1]).map_err(|_| {
            CryptoError::MalformedCiphertext("Payload is not valid base64".to_string())
        })?;

        if iv.len() != NONCE_LENGTH {
            return Err(CryptoError::MalformedCiphertext(format!(
                "IV must be {} bytes, got {}",
                NONCE_LENGTH,
                iv.len()
            )));
        }
        if payload.len() < TAG_LENGTH {
            return Err(CryptoError::MalformedCiphertext(format!(
                "Payload shorter than the {}-byte auth tag",
                TAG_LENGTH
            )));
        }

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        nonce_bytes.copy_from_slice(&iv);

        let unbound_key = UnboundKey::new(&AES_256_GCM, self.key.bytes()).map_err(|_| {
            CryptoError::DecryptionFailure("Failed to create decryption key".to_string())
        })?;

        let nonce_sequence = SingleNonce::new(nonce_bytes);
        let mut opening_key = aead::OpeningKey::new(unbound_key, nonce_sequence);

        let mut in_out = payload;
        let plaintext = opening_key
            .open_in_place(Aad::empty(), &mut in_out)
            .map_err(|_| {
                CryptoError::DecryptionFailure(
                    "Decryption failed: invalid key or corrupted data".to_string(),
                )
            })?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| {
            CryptoError::DecryptionFailure("Decrypted data is not valid UTF-8".to_string())
        })
    }
}
