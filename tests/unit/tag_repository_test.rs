//! Unit tests for the tag repository.

use passvault::database::Database;
use passvault::repositories::credential_repository::{
    CredentialRepository, CredentialRepositoryTrait,
};
use passvault::repositories::tag_repository::{TagRepository, TagRepositoryTrait};
use passvault::types::errors::CredentialError;

fn setup() -> Database {
    Database::open_in_memory().expect("open_in_memory failed")
}

#[test]
fn test_save_and_list_by_owner() {
    let db = setup();
    let mut repo = TagRepository::new(db.connection());

    repo.save("alice", "work").unwrap();
    repo.save("alice", "banking").unwrap();
    repo.save("bob", "games").unwrap();

    let alice_tags = repo.list_by_owner("alice").unwrap();
    assert_eq!(alice_tags.len(), 2);
    // Ordered by name
    assert_eq!(alice_tags[0].name, "banking");
    assert_eq!(alice_tags[1].name, "work");
}

#[test]
fn test_duplicate_name_same_owner_rejected() {
    let db = setup();
    let mut repo = TagRepository::new(db.connection());

    repo.save("alice", "work").unwrap();
    let result = repo.save("alice", "work");
    assert!(matches!(result, Err(CredentialError::DuplicateTag(name)) if name == "work"));
}

#[test]
fn test_same_name_different_owners_allowed() {
    let db = setup();
    let mut repo = TagRepository::new(db.connection());

    repo.save("alice", "work").unwrap();
    assert!(repo.save("bob", "work").is_ok());
}

#[test]
fn test_find_by_ids_and_owner_filters_foreign_ids() {
    let db = setup();
    let mut repo = TagRepository::new(db.connection());

    let alices = repo.save("alice", "work").unwrap();
    let bobs = repo.save("bob", "games").unwrap();

    let resolved = repo
        .find_by_ids_and_owner(&[alices.id.clone(), bobs.id.clone()], "alice")
        .unwrap();

    // Bob's tag does not resolve under Alice's ownership
    assert_eq!(resolved, vec![alices]);
}

#[test]
fn test_find_by_ids_and_owner_empty_input() {
    let db = setup();
    let repo = TagRepository::new(db.connection());
    assert!(repo.find_by_ids_and_owner(&[], "alice").unwrap().is_empty());
}

#[test]
fn test_delete_detaches_tag_without_deleting_credentials() {
    let db = setup();
    let tag = {
        let mut tags = TagRepository::new(db.connection());
        tags.save("alice", "work").unwrap()
    };

    let credential = {
        let mut creds = CredentialRepository::new(db.connection());
        creds
            .save("alice", "Jira", "a", "aXY=:cGF5bG9hZA==", None, None, &[tag.clone()])
            .unwrap()
    };

    let mut tags = TagRepository::new(db.connection());
    tags.delete(&tag.id, "alice").unwrap();

    // Credential survives with an empty tag set
    let creds = CredentialRepository::new(db.connection());
    let found = creds.find_by_id_and_owner(&credential.id, "alice").unwrap();
    assert!(found.tags.is_empty());
}

#[test]
fn test_delete_foreign_owner_is_not_found() {
    let db = setup();
    let mut repo = TagRepository::new(db.connection());

    let tag = repo.save("alice", "work").unwrap();
    let result = repo.delete(&tag.id, "bob");
    assert!(matches!(result, Err(CredentialError::NotFound)));

    // Still listed for the true owner
    assert_eq!(repo.list_by_owner("alice").unwrap().len(), 1);
}
