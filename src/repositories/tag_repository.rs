//! Tag repository for passvault.
//!
//! Owner-scoped CRUD for tags. Tags are created ahead of time and only
//! referenced by credentials; deleting a tag detaches it but never deletes
//! a credential.

use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use crate::types::credential::Tag;
use crate::types::errors::CredentialError;

/// Trait defining owner-scoped tag persistence operations.
pub trait TagRepositoryTrait {
    /// Lists every tag owned by `owner_id`, ordered by name.
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Tag>, CredentialError>;
    /// Resolves the given ids restricted to `owner_id`. Ids that do not
    /// resolve under that owner are simply absent from the result; the
    /// service layer detects the count mismatch.
    fn find_by_ids_and_owner(
        &self,
        ids: &[String],
        owner_id: &str,
    ) -> Result<Vec<Tag>, CredentialError>;
    /// Inserts a new tag. Names are unique per owner; a duplicate is a
    /// `DuplicateTag` error.
    fn save(&mut self, owner_id: &str, name: &str) -> Result<Tag, CredentialError>;
    /// Deletes a tag, owner-scoped, detaching it from any credentials.
    /// Absent or foreign-owned ids are `NotFound`.
    fn delete(&mut self, id: &str, owner_id: &str) -> Result<(), CredentialError>;
}

/// Tag repository backed by a SQLite connection.
pub struct TagRepository<'a> {
    conn: &'a Connection,
}

impl<'a> TagRepository<'a> {
    /// Creates a new `TagRepository` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_tag(row: &rusqlite::Row) -> rusqlite::Result<Tag> {
        Ok(Tag {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
        })
    }
}

impl<'a> TagRepositoryTrait for TagRepository<'a> {
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Tag>, CredentialError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, owner_id, name FROM tags WHERE owner_id = ?1 ORDER BY name")
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![owner_id], Self::row_to_tag)
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| CredentialError::Database(e.to_string()))?);
        }
        Ok(results)
    }

    fn find_by_ids_and_owner(
        &self,
        ids: &[String],
        owner_id: &str,
    ) -> Result<Vec<Tag>, CredentialError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql =
            String::from("SELECT id, owner_id, name FROM tags WHERE owner_id = ? AND id IN (");
        sql.push_str(&vec!["?"; ids.len()].join(", "));
        sql.push(')');

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        let bind_values = std::iter::once(owner_id.to_string()).chain(ids.iter().cloned());
        let rows = stmt
            .query_map(params_from_iter(bind_values), Self::row_to_tag)
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| CredentialError::Database(e.to_string()))?);
        }
        Ok(results)
    }

    fn save(&mut self, owner_id: &str, name: &str) -> Result<Tag, CredentialError> {
        let id = Uuid::new_v4().to_string();

        self.conn
            .execute(
                "INSERT INTO tags (id, owner_id, name) VALUES (?1, ?2, ?3)",
                params![id, owner_id, name],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    CredentialError::DuplicateTag(name.to_string())
                }
                other => CredentialError::Database(other.to_string()),
            })?;

        Ok(Tag {
            id,
            owner_id: owner_id.to_string(),
            name: name.to_string(),
        })
    }

    fn delete(&mut self, id: &str, owner_id: &str) -> Result<(), CredentialError> {
        // Detach from credentials first, restricted to the caller's own
        // tags so a foreign owner cannot strip another user's associations.
        self.conn
            .execute(
                "DELETE FROM credential_tags WHERE tag_id IN \
                 (SELECT id FROM tags WHERE id = ?1 AND owner_id = ?2)",
                params![id, owner_id],
            )
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        let affected = self
            .conn
            .execute(
                "DELETE FROM tags WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
            )
            .map_err(|e| CredentialError::Database(e.to_string()))?;

        if affected == 0 {
            return Err(CredentialError::NotFound);
        }
        Ok(())
    }
}
