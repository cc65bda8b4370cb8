/**
 * Account lookups against the flat credential file,
 *  plus the password hashing used to provision it.
 */
pub mod credentials;
/**
 * Storage of documents as plain files inside a
 *  single root directory.
 * Handles name validation, format detection and
 *  the read / write / delete primitives.
 */
pub mod document;

pub mod prelude {
    pub use crate::credentials::{hash_password, CredentialStore};
    pub use crate::document::{Document, DocumentError, DocumentStore, Format};
}
