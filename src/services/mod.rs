// passvault services
// Services provide core functionality: key derivation, the cipher boundary,
// and the credential use cases.

pub mod credential_service;
pub mod crypto_service;
