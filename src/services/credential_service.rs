//! Credential service for passvault.
//!
//! Orchestrates encryption, ownership checks, and tag resolution for the
//! create/fetch/list/update/delete use cases. This is the only layer that
//! ever holds plaintext secrets outside the cipher adapter, and only
//! transiently inside a single call.

use std::collections::HashSet;
use std::sync::Arc;

use crate::database::Database;
use crate::repositories::credential_repository::{CredentialRepository, CredentialRepositoryTrait};
use crate::repositories::tag_repository::{TagRepository, TagRepositoryTrait};
use crate::services::crypto_service::{CipherAdapter, CipherAdapterTrait};
use crate::types::credential::{Credential, CredentialRecord, CredentialUpdate, NewCredential, Tag};
use crate::types::errors::CredentialError;

/// Fixed placeholder emitted in place of a secret on list and write paths.
/// Deliberately not length- or content-derived.
pub const SECRET_MASK: &str = "********";

/// Trait defining the credential use cases exposed to transport callers.
///
/// `owner_id` is a verified identity supplied by the surrounding auth
/// layer; the service authorizes against it but never authenticates.
pub trait CredentialServiceTrait {
    /// Creates a credential. The returned record carries the masked secret;
    /// the caller already holds the plaintext it sent.
    fn create(
        &mut self,
        owner_id: &str,
        input: &NewCredential,
    ) -> Result<CredentialRecord, CredentialError>;
    /// Fetches one credential with its secret decrypted. The only read path
    /// that returns usable plaintext.
    fn fetch_one(&self, owner_id: &str, id: &str) -> Result<CredentialRecord, CredentialError>;
    /// Lists every credential for the owner with secrets masked. Listing
    /// never decrypts in bulk.
    fn list_all(&self, owner_id: &str) -> Result<Vec<CredentialRecord>, CredentialError>;
    /// Applies a partial update. Only fields present in `changes` are
    /// touched; the stored ciphertext is re-encrypted only when a new
    /// plaintext secret was supplied.
    fn update(
        &mut self,
        owner_id: &str,
        id: &str,
        changes: &CredentialUpdate,
    ) -> Result<CredentialRecord, CredentialError>;
    /// Hard-deletes a credential, owner-scoped.
    fn delete(&mut self, owner_id: &str, id: &str) -> Result<(), CredentialError>;
    /// Lists the owner's tags.
    fn list_tags(&self, owner_id: &str) -> Result<Vec<Tag>, CredentialError>;
    /// Creates a tag for the owner. Names are unique per owner.
    fn create_tag(&mut self, owner_id: &str, name: &str) -> Result<Tag, CredentialError>;
    /// Deletes a tag, detaching it from credentials without deleting them.
    fn delete_tag(&mut self, owner_id: &str, id: &str) -> Result<(), CredentialError>;
}

/// Credential service backed by SQLite + the cipher adapter.
pub struct CredentialService {
    db: Arc<Database>,
    cipher: CipherAdapter,
}

impl CredentialService {
    pub fn new(db: Arc<Database>, cipher: CipherAdapter) -> Self {
        Self { db, cipher }
    }

    fn masked_secret(ciphertext: &str) -> String {
        if ciphertext.is_empty() {
            String::new()
        } else {
            SECRET_MASK.to_string()
        }
    }

    fn to_record(credential: Credential, secret: String) -> CredentialRecord {
        CredentialRecord {
            id: credential.id,
            name: credential.name,
            username: credential.username,
            secret,
            url: credential.url,
            notes: credential.notes,
            tags: credential.tags,
            created_at: credential.created_at,
            updated_at: credential.updated_at,
        }
    }

    /// Resolves tag ids restricted to the owner. Count mismatch means at
    /// least one id is absent or foreign-owned.
    fn resolve_tags(&self, owner_id: &str, tag_ids: &[String]) -> Result<Vec<Tag>, CredentialError> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        let repo = TagRepository::new(self.db.connection());
        let tags = repo.find_by_ids_and_owner(tag_ids, owner_id)?;
        if tags.len() != tag_ids.len() {
            return Err(CredentialError::TagNotFound);
        }
        Ok(tags)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), CredentialError> {
    if value.is_empty() {
        return Err(CredentialError::Validation(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

fn require_unique_ids(ids: &[String]) -> Result<(), CredentialError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(CredentialError::Validation(format!(
                "Duplicate tag id: {}",
                id
            )));
        }
    }
    Ok(())
}

fn validate_new(owner_id: &str, input: &NewCredential) -> Result<(), CredentialError> {
    require_non_empty("owner id", owner_id)?;
    require_non_empty("name", &input.name)?;
    require_non_empty("username", &input.username)?;
    require_non_empty("secret", &input.secret)?;
    require_unique_ids(&input.tag_ids)?;
    Ok(())
}

fn validate_update(owner_id: &str, changes: &CredentialUpdate) -> Result<(), CredentialError> {
    require_non_empty("owner id", owner_id)?;
    if let Some(name) = &changes.name {
        require_non_empty("name", name)?;
    }
    if let Some(username) = &changes.username {
        require_non_empty("username", username)?;
    }
    if let Some(secret) = &changes.secret {
        require_non_empty("secret", secret)?;
    }
    if let Some(tag_ids) = &changes.tag_ids {
        require_unique_ids(tag_ids)?;
    }
    Ok(())
}

impl CredentialServiceTrait for CredentialService {
    fn create(
        &mut self,
        owner_id: &str,
        input: &NewCredential,
    ) -> Result<CredentialRecord, CredentialError> {
        validate_new(owner_id, input)?;

        let tags = self.resolve_tags(owner_id, &input.tag_ids)?;
        let ciphertext = self.cipher.encrypt(&input.secret)?;

        let mut repo = CredentialRepository::new(self.db.connection());
        let credential = repo.save(
            owner_id,
            &input.name,
            &input.username,
            &ciphertext,
            input.url.as_deref(),
            input.notes.as_deref(),
            &tags,
        )?;

        let masked = Self::masked_secret(&credential.secret_ciphertext);
        Ok(Self::to_record(credential, masked))
    }

    fn fetch_one(&self, owner_id: &str, id: &str) -> Result<CredentialRecord, CredentialError> {
        require_non_empty("owner id", owner_id)?;

        let repo = CredentialRepository::new(self.db.connection());
        let credential = repo.find_by_id_and_owner(id, owner_id)?;

        // Never retried: a wrong key or corrupted row will not fix itself.
        let plaintext = self
            .cipher
            .decrypt(&credential.secret_ciphertext)
            .map_err(|e| {
                tracing::error!(credential_id = %credential.id, error = %e,
                    "failed to decrypt stored secret");
                CredentialError::from(e)
            })?;

        Ok(Self::to_record(credential, plaintext))
    }

    fn list_all(&self, owner_id: &str) -> Result<Vec<CredentialRecord>, CredentialError> {
        require_non_empty("owner id", owner_id)?;

        let repo = CredentialRepository::new(self.db.connection());
        let credentials = repo.list_by_owner(owner_id)?;

        Ok(credentials
            .into_iter()
            .map(|c| {
                let masked = Self::masked_secret(&c.secret_ciphertext);
                Self::to_record(c, masked)
            })
            .collect())
    }

    fn update(
        &mut self,
        owner_id: &str,
        id: &str,
        changes: &CredentialUpdate,
    ) -> Result<CredentialRecord, CredentialError> {
        validate_update(owner_id, changes)?;

        let mut credential = {
            let repo = CredentialRepository::new(self.db.connection());
            repo.find_by_id_and_owner(id, owner_id)?
        };

        if let Some(name) = &changes.name {
            credential.name = name.clone();
        }
        if let Some(username) = &changes.username {
            credential.username = username.clone();
        }
        if let Some(secret) = &changes.secret {
            credential.secret_ciphertext = self.cipher.encrypt(secret)?;
        }
        if let Some(tag_ids) = &changes.tag_ids {
            // Present-with-empty clears the set; absent leaves it alone
            credential.tags = self.resolve_tags(owner_id, tag_ids)?;
        }
        if let Some(url) = &changes.url {
            credential.url = Some(url.clone());
        }
        if let Some(notes) = &changes.notes {
            credential.notes = Some(notes.clone());
        }

        let mut repo = CredentialRepository::new(self.db.connection());
        let updated = repo.update(&credential)?;

        let masked = Self::masked_secret(&updated.secret_ciphertext);
        Ok(Self::to_record(updated, masked))
    }

    fn delete(&mut self, owner_id: &str, id: &str) -> Result<(), CredentialError> {
        require_non_empty("owner id", owner_id)?;

        let mut repo = CredentialRepository::new(self.db.connection());
        repo.delete(id, owner_id)
    }

    fn list_tags(&self, owner_id: &str) -> Result<Vec<Tag>, CredentialError> {
        require_non_empty("owner id", owner_id)?;

        let repo = TagRepository::new(self.db.connection());
        repo.list_by_owner(owner_id)
    }

    fn create_tag(&mut self, owner_id: &str, name: &str) -> Result<Tag, CredentialError> {
        require_non_empty("owner id", owner_id)?;
        require_non_empty("name", name)?;

        let mut repo = TagRepository::new(self.db.connection());
        repo.save(owner_id, name)
    }

    fn delete_tag(&mut self, owner_id: &str, id: &str) -> Result<(), CredentialError> {
        require_non_empty("owner id", owner_id)?;

        let mut repo = TagRepository::new(self.db.connection());
        repo.delete(id, owner_id)
    }
}
