//! Unit tests for key derivation and the cipher adapter.
//!
//! The properties that matter most here: a fresh IV per encryption (never a
//! fixed or reused one), the stable two-part envelope format, and clean
//! rejection of malformed or tampered ciphertext.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rstest::rstest;

use passvault::services::crypto_service::{CipherAdapter, CipherAdapterTrait, MasterKey};
use passvault::types::errors::{ConfigError, CryptoError};

fn adapter() -> CipherAdapter {
    CipherAdapter::new(MasterKey::derive("unit-test-secret", "unit-test-salt").unwrap())
}

// ─── Key Derivation ───

#[test]
fn test_derive_rejects_empty_secret() {
    assert!(matches!(
        MasterKey::derive("", "salt"),
        Err(ConfigError::MissingSecret)
    ));
}

#[test]
fn test_derive_rejects_empty_salt() {
    assert!(matches!(
        MasterKey::derive("secret", ""),
        Err(ConfigError::MissingSalt)
    ));
}

#[test]
fn test_derive_accepts_short_salt() {
    // Operator salts are arbitrary strings; even very short ones are
    // normalized before Argon2 sees them.
    assert!(MasterKey::derive("secret", "s").is_ok());
}

#[test]
fn test_same_inputs_yield_interchangeable_keys() {
    let first = CipherAdapter::new(MasterKey::derive("secret", "salt").unwrap());
    let second = CipherAdapter::new(MasterKey::derive("secret", "salt").unwrap());

    let envelope = first.encrypt("cross-check").unwrap();
    assert_eq!(second.decrypt(&envelope).unwrap(), "cross-check");
}

// ─── Round-trip ───

#[test]
fn test_roundtrip_plain_string() {
    let cipher = adapter();
    let envelope = cipher.encrypt("hunter2").unwrap();
    assert_eq!(cipher.decrypt(&envelope).unwrap(), "hunter2");
}

#[test]
fn test_roundtrip_empty_string() {
    let cipher = adapter();
    let envelope = cipher.encrypt("").unwrap();
    assert_eq!(cipher.decrypt(&envelope).unwrap(), "");
}

#[test]
fn test_roundtrip_string_containing_delimiter() {
    // ':' is the envelope separator; plaintext containing it must survive
    let cipher = adapter();
    let plaintext = "user:pass:extra::";
    let envelope = cipher.encrypt(plaintext).unwrap();
    assert_eq!(cipher.decrypt(&envelope).unwrap(), plaintext);
}

#[test]
fn test_roundtrip_unicode() {
    let cipher = adapter();
    let plaintext = "пароль-暗号-🔐";
    let envelope = cipher.encrypt(plaintext).unwrap();
    assert_eq!(cipher.decrypt(&envelope).unwrap(), plaintext);
}

// ─── IV freshness ───

#[test]
fn test_identical_plaintext_encrypts_differently() {
    let cipher = adapter();
    let first = cipher.encrypt("same-value").unwrap();
    let second = cipher.encrypt("same-value").unwrap();
    assert_ne!(first, second, "a fresh IV must be generated per call");
}

#[test]
fn test_iv_part_differs_between_calls() {
    let cipher = adapter();
    let iv_of = |envelope: &str| envelope.split(':').next().unwrap().to_string();

    let first = cipher.encrypt("x").unwrap();
    let second = cipher.encrypt("x").unwrap();
    assert_ne!(iv_of(&first), iv_of(&second));
}

// ─── Envelope format ───

#[test]
fn test_envelope_is_two_base64_parts() {
    let cipher = adapter();
    let envelope = cipher.encrypt("payload").unwrap();

    let parts: Vec<&str> = envelope.split(':').collect();
    assert_eq!(parts.len(), 2);

    let iv = BASE64.decode(parts[0]).expect("IV part must be base64");
    assert_eq!(iv.len(), 12, "AES-256-GCM IV is 12 bytes");

    let payload = BASE64.decode(parts[1]).expect("payload part must be base64");
    assert!(payload.len() >= 16, "payload carries at least the auth tag");
}

#[rstest]
#[case("")]
#[case("no-separator")]
#[case("a:b:c")]
#[case(":::")]
#[case("!!!not-base64!!!:AAAA")]
#[case("AAAA:!!!not-base64!!!")]
// valid base64 but a 3-byte IV
#[case("AAAA:AAAAAAAAAAAAAAAAAAAAAAAA")]
fn test_decrypt_rejects_malformed_envelope(#[case] envelope: &str) {
    let cipher = adapter();
    let result = cipher.decrypt(envelope);
    assert!(
        matches!(result, Err(CryptoError::MalformedCiphertext(_))),
        "envelope {:?} should be rejected as malformed",
        envelope
    );
}

#[test]
fn test_decrypt_rejects_payload_shorter_than_tag() {
    let cipher = adapter();
    let iv = BASE64.encode([0u8; 12]);
    let short_payload = BASE64.encode([0u8; 4]);
    let result = cipher.decrypt(&format!("{}:{}", iv, short_payload));
    assert!(matches!(result, Err(CryptoError::MalformedCiphertext(_))));
}

// ─── Decryption failures ───

#[test]
fn test_decrypt_with_wrong_key_fails() {
    let cipher = adapter();
    let envelope = cipher.encrypt("secret data").unwrap();

    let wrong = CipherAdapter::new(MasterKey::derive("other-secret", "unit-test-salt").unwrap());
    assert!(matches!(
        wrong.decrypt(&envelope),
        Err(CryptoError::DecryptionFailure(_))
    ));
}

#[test]
fn test_decrypt_with_wrong_salt_fails() {
    let cipher = adapter();
    let envelope = cipher.encrypt("secret data").unwrap();

    let wrong = CipherAdapter::new(MasterKey::derive("unit-test-secret", "other-salt").unwrap());
    assert!(matches!(
        wrong.decrypt(&envelope),
        Err(CryptoError::DecryptionFailure(_))
    ));
}

#[test]
fn test_decrypt_tampered_payload_fails() {
    let cipher = adapter();
    let envelope = cipher.encrypt("sensitive data").unwrap();

    let parts: Vec<&str> = envelope.split(':').collect();
    let mut payload = BASE64.decode(parts[1]).unwrap();
    payload[0] ^= 0xFF;
    let tampered = format!("{}:{}", parts[0], BASE64.encode(&payload));

    assert!(matches!(
        cipher.decrypt(&tampered),
        Err(CryptoError::DecryptionFailure(_))
    ));
}

#[test]
fn test_decrypt_tampered_iv_fails() {
    let cipher = adapter();
    let envelope = cipher.encrypt("sensitive data").unwrap();

    let parts: Vec<&str> = envelope.split(':').collect();
    let mut iv = BASE64.decode(parts[0]).unwrap();
    iv[0] ^= 0xFF;
    let tampered = format!("{}:{}", BASE64.encode(&iv), parts[1]);

    assert!(matches!(
        cipher.decrypt(&tampered),
        Err(CryptoError::DecryptionFailure(_))
    ));
}
