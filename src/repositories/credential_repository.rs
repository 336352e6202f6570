//! Credential repository for passvault.
//!
//! Implements `CredentialRepositoryTrait` — owner-scoped CRUD for stored
//! credentials, backed by SQLite via `rusqlite`. Every query carries the
//! owner in its filter predicate; this is the authorization boundary, not a
//! post-fetch check that could be forgotten.

use rusqlite::{params, Connection};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::types::credential::{Credential, Tag};
use crate::types::errors::CredentialError;

/// Trait defining owner-scoped credential persistence operations.
pub trait CredentialRepositoryTrait {
    /// Lists every credential owned by `owner_id`, tags populated, newest first.
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Credential>, CredentialError>;
    /// Fetches one credential by id, restricted to `owner_id`. A valid id
    /// owned by someone else is `NotFound`.
    fn find_by_id_and_owner(&self, id: &str, owner_id: &str)
        -> Result<Credential, CredentialError>;
    /// Inserts a new credential row plus its tag associations. Assigns the
    /// id and both timestamps. `secret_ciphertext` must already be an
    /// opaque envelope; this layer never sees plaintext.
    #[allow(clippy::too_many_arguments)]
    fn save(
        &mut self,
        owner_id: &str,
        name: &str,
        username: &str,
        secret_ciphertext: &str,
        url: Option<&str>,
        notes: Option<&str>,
        tags: &[Tag],
    ) -> Result<Credential, CredentialError>;
    /// Full replace of a previously fetched, owner-validated entity.
    /// Refreshes `updated_at` and replaces the whole tag set.
    fn update(&mut self, credential: &Credential) -> Result<Credential, CredentialError>;
    /// Deletes a credential, owner-scoped. Zero affected rows (id absent,
    /// or owned by someone else) is `NotFound`.
    fn delete(&mut self, id: &str, owner_id: &str) -> Result<(), CredentialError>;
}

/// Credential repository backed by a SQLite connection.
pub struct CredentialRepository<'a> {
    conn: &'a Connection,
}

impl<'a> CredentialRepository<'a> {
    /// Creates a new `CredentialRepository` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the current UNIX timestamp in seconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    /// Reads a single credential row into a struct, tags left empty.
    fn row_to_credential(row: &rusqlite::Row) -> rusqlite::Result<Credential> {
        Ok(Credential {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            username: row.get(3)?,
            secret_ciphertext: row.get(4)?,
            url: row.get(5)?,
            notes: row.get(6)?,
            tags: Vec::new(),
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    /// Loads the tags attached to a credential.
    fn tags_for(&self, credential_id: &str) -> Result<Vec<Tag>, CredentialError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT t.id, t.owner_id, t.name FROM tags t \
                 JOIN credential_tags ct ON ct.tag_id = t.id \
                 WHERE ct.credential_id = ?1 ORDER BY t.name",
            )
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![credential_id], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    name: row.get(2)?,
                })
            })
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(row.map_err(|e| CredentialError::Database(e.to_string()))?);
        }
        Ok(tags)
    }

    /// Inserts join rows for the given tag set.
    ///
    /// A tag owned by a different user than the credential is a hard error,
    /// never silently filtered.
    fn attach_tags(
        &self,
        credential_id: &str,
        owner_id: &str,
        tags: &[Tag],
    ) -> Result<(), CredentialError> {
        if tags.iter().any(|t| t.owner_id != owner_id) {
            return Err(CredentialError::TagNotFound);
        }
        for tag in tags {
            self.conn
                .execute(
                    "INSERT INTO credential_tags (credential_id, tag_id) VALUES (?1, ?2)",
                    params![credential_id, tag.id],
                )
                .map_err(|e| CredentialError::Database(e.to_string()))?;
        }
        Ok(())
    }
}

impl<'a> CredentialRepositoryTrait for CredentialRepository<'a> {
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Credential>, CredentialError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, owner_id, name, username, secret_ciphertext, url, notes, \
                 created_at, updated_at FROM credentials WHERE owner_id = ?1 \
                 ORDER BY updated_at DESC",
            )
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![owner_id], Self::row_to_credential)
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            let mut credential = row.map_err(|e| CredentialError::Database(e.to_string()))?;
            credential.tags = self.tags_for(&credential.id)?;
            results.push(credential);
        }
        Ok(results)
    }

    fn find_by_id_and_owner(
        &self,
        id: &str,
        owner_id: &str,
    ) -> Result<Credential, CredentialError> {
        let mut credential = self
            .conn
            .query_row(
                "SELECT id, owner_id, name, username, secret_ciphertext, url, notes, \
                 created_at, updated_at FROM credentials WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
                Self::row_to_credential,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => CredentialError::NotFound,
                other => CredentialError::Database(other.to_string()),
            })?;

        credential.tags = self.tags_for(&credential.id)?;
        Ok(credential)
    }

    fn save(
        &mut self,
        owner_id: &str,
        name: &str,
        username: &str,
        secret_ciphertext: &str,
        url: Option<&str>,
        notes: Option<&str>,
        tags: &[Tag],
    ) -> Result<Credential, CredentialError> {
        let id = Uuid::new_v4().to_string();
        let now = Self::now();

        self.conn
            .execute(
                "INSERT INTO credentials (id, owner_id, name, username, secret_ciphertext, \
                 url, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![id, owner_id, name, username, secret_ciphertext, url, notes, now, now],
            )
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        self.attach_tags(&id, owner_id, tags)?;

        self.find_by_id_and_owner(&id, owner_id)
    }

    fn update(&mut self, credential: &Credential) -> Result<Credential, CredentialError> {
        let now = Self::now();

        let affected = self
            .conn
            .execute(
                "UPDATE credentials SET name = ?1, username = ?2, secret_ciphertext = ?3, \
                 url = ?4, notes = ?5, updated_at = ?6 WHERE id = ?7 AND owner_id = ?8",
                params![
                    credential.name,
                    credential.username,
                    credential.secret_ciphertext,
                    credential.url,
                    credential.notes,
                    now,
                    credential.id,
                    credential.owner_id
                ],
            )
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        if affected == 0 {
            return Err(CredentialError::NotFound);
        }

        // Replace the whole tag set
        self.conn
            .execute(
                "DELETE FROM credential_tags WHERE credential_id = ?1",
                params![credential.id],
            )
            .map_err(|e| CredentialError::Database(e.to_string()))?;
        self.attach_tags(&credential.id, &credential.owner_id, &credential.tags)?;

        self.find_by_id_and_owner(&credential.id, &credential.owner_id)
    }

    fn delete(&mut self, id: &str, owner_id: &str) -> Result<(), CredentialError> {
        // Join rows first; the cascade only fires when the foreign_keys
        // pragma is on.
        self.conn
            .execute(
                "DELETE FROM credential_tags WHERE credential_id IN \
                 (SELECT id FROM credentials WHERE id = ?1 AND owner_id = ?2)",
                params![id, owner_id],
            )
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        let affected = self
            .conn
            .execute(
                "DELETE FROM credentials WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
            )
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        if affected == 0 {
            return Err(CredentialError::NotFound);
        }
        Ok(())
    }
}
