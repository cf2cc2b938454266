//! Credential input checks
//!
//! Rejects malformed usernames before the credential store is consulted.

use super::credentials::{CredentialStore, UserRecord};
use crate::error::AuthError;

/// Longest username accepted for lookup.
pub const MAX_USERNAME_LENGTH: usize = 64;

fn is_valid_input(input: &str, max_length: usize) -> bool {
    !input.trim().is_empty() && input.len() <= max_length && !input.contains(['\r', '\n', '\0'])
}

/// Looks `username` up in `store`, rejecting malformed names without a lookup.
pub fn validate_user(store: &dyn CredentialStore, username: &str) -> Result<UserRecord, AuthError> {
    if !is_valid_input(username, MAX_USERNAME_LENGTH) {
        return Err(AuthError::UnknownUser(username.to_string()));
    }
    store
        .lookup(username)
        .ok_or_else(|| AuthError::UnknownUser(username.to_string()))
}
