use std::fmt;

// === ConfigError ===

/// Errors raised while loading startup configuration or deriving the master key.
///
/// All of these are fatal: the process must not come up with a missing or
/// empty encryption secret.
#[derive(Debug)]
pub enum ConfigError {
    /// The operator encryption secret is missing or empty.
    MissingSecret,
    /// The operator encryption salt is missing or empty.
    MissingSalt,
    /// Key derivation from the operator secret failed.
    KeyDerivation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingSecret => {
                write!(f, "Encryption secret is missing or empty")
            }
            ConfigError::MissingSalt => write!(f, "Encryption salt is missing or empty"),
            ConfigError::KeyDerivation(msg) => write!(f, "Key derivation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// === CryptoError ===

/// Errors related to encrypting and decrypting credential secrets.
#[derive(Debug)]
pub enum CryptoError {
    /// Stored or supplied ciphertext does not match the two-part envelope format.
    MalformedCiphertext(String),
    /// The envelope was well-formed but the cipher operation failed
    /// (wrong key, corrupted data, or tampering).
    DecryptionFailure(String),
    /// Encryption operation failed.
    Encryption(String),
    /// Failed to generate random bytes for the IV.
    RandomGeneration(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::MalformedCiphertext(msg) => {
                write!(f, "Malformed ciphertext: {}", msg)
            }
            CryptoError::DecryptionFailure(msg) => write!(f, "Decryption failed: {}", msg),
            CryptoError::Encryption(msg) => write!(f, "Encryption failed: {}", msg),
            CryptoError::RandomGeneration(msg) => {
                write!(f, "Random generation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for CryptoError {}

// === CredentialError ===

/// Errors returned by the credential repository and service.
///
/// `NotFound` covers both a genuinely absent row and a row owned by a
/// different user; callers cannot tell the two apart.
#[derive(Debug)]
pub enum CredentialError {
    /// Credential does not exist, or exists under a different owner.
    NotFound,
    /// One or more requested tag ids did not resolve under the caller's ownership.
    TagNotFound,
    /// A tag with the same name already exists for this owner.
    DuplicateTag(String),
    /// Request input failed validation before any encryption or persistence.
    Validation(String),
    /// Database operation failed.
    Database(String),
    /// Cipher operation failed while handling a credential secret.
    Crypto(CryptoError),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::NotFound => write!(f, "Credential not found"),
            CredentialError::TagNotFound => write!(f, "One or more tags not found"),
            CredentialError::DuplicateTag(name) => write!(f, "Duplicate tag name: {}", name),
            CredentialError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            CredentialError::Database(msg) => {
                write!(f, "Credential database error: {}", msg)
            }
            CredentialError::Crypto(err) => write!(f, "Credential crypto error: {}", err),
        }
    }
}

impl std::error::Error for CredentialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CredentialError::Crypto(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CryptoError> for CredentialError {
    fn from(err: CryptoError) -> Self {
        CredentialError::Crypto(err)
    }
}
