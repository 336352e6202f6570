//! passvault — personal password manager core.
//!
//! An encrypted credential store scoped per user: secrets are encrypted
//! with a process-wide key derived once at startup, persisted as opaque
//! ciphertext envelopes, and reconstituted only on explicit single fetches.
//! Transport, authentication, and UI are external collaborators that call
//! in through [`services::credential_service::CredentialService`].

pub mod config;
pub mod database;
pub mod repositories;
pub mod services;
pub mod types;
