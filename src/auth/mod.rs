//! Authentication system
//!
//! Handles the credential store and the USER/PASS/ACCT state machine.

pub mod credentials;
pub mod state;
pub mod validator;

pub use credentials::{CredentialStore, MemoryCredentialStore, UserRecord};
pub use state::{AuthOutcome, AuthState, Authenticator};
