//! Shared test utilities for document and credential store tests
#![allow(dead_code)]

use std::path::Path;

use ::common::credentials::{credential_line, hash_password, CredentialStore};
use ::common::document::DocumentStore;
use tempfile::TempDir;

/// Set up an empty document store rooted in a fresh temporary directory
pub async fn setup_test_store() -> (DocumentStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::open(temp_dir.path().join("data"))
        .await
        .unwrap();
    (store, temp_dir)
}

/// Write a credential file holding the given accounts and return a store over it
pub fn setup_credentials(dir: &Path, accounts: &[(&str, &str)]) -> CredentialStore {
    let path = dir.join("users.txt");
    let contents = accounts
        .iter()
        .map(|(user, password)| credential_line(user, &hash_password(password).unwrap()))
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(&path, contents + "\n").unwrap();
    CredentialStore::new(path)
}
