//! Property-based tests for the cipher adapter round-trip.
//!
//! The envelope format must reconstitute any plaintext exactly, including
//! the empty string and strings containing the ':' separator, and every
//! encryption must use a fresh IV.

use std::sync::OnceLock;

use passvault::services::crypto_service::{CipherAdapter, CipherAdapterTrait, MasterKey};
use proptest::prelude::*;

// Key derivation is deliberately slow; derive once for the whole run.
fn adapter() -> &'static CipherAdapter {
    static ADAPTER: OnceLock<CipherAdapter> = OnceLock::new();
    ADAPTER.get_or_init(|| {
        CipherAdapter::new(MasterKey::derive("property-secret", "property-salt").unwrap())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn roundtrip_preserves_any_plaintext(plaintext in any::<String>()) {
        let cipher = adapter();

        let envelope = cipher.encrypt(&plaintext).expect("encryption should succeed");
        let decrypted = cipher.decrypt(&envelope).expect("decryption should succeed");

        prop_assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn roundtrip_preserves_delimiter_heavy_plaintext(plaintext in "[:a-z0-9]{0,64}") {
        let cipher = adapter();

        let envelope = cipher.encrypt(&plaintext).expect("encryption should succeed");
        let decrypted = cipher.decrypt(&envelope).expect("decryption should succeed");

        prop_assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn repeated_encryption_never_reuses_an_envelope(plaintext in any::<String>()) {
        let cipher = adapter();

        let first = cipher.encrypt(&plaintext).expect("encryption should succeed");
        let second = cipher.encrypt(&plaintext).expect("encryption should succeed");

        prop_assert_ne!(first, second, "IV must be fresh on every call");
    }

    #[test]
    fn envelope_always_has_two_parts(plaintext in any::<String>()) {
        let cipher = adapter();

        let envelope = cipher.encrypt(&plaintext).expect("encryption should succeed");
        prop_assert_eq!(envelope.split(':').count(), 2);
    }
}
