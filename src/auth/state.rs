//! Authentication state machine
//!
//! USER selects a record; PASS and ACCT then satisfy its requirements in
//! either order. A credential the record does not require counts as
//! satisfied. The session is logged in exactly when all three are.

use log::debug;

use super::credentials::{CredentialStore, UserRecord};
use super::validator::validate_user;
use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    UsernameOk,
    AwaitingPassword,
    AwaitingAccount,
    Authenticated,
}

/// What the client should do next after a successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    LoggedIn,
    NeedAccountAndPassword,
    NeedPassword,
    NeedAccount,
}

impl AuthOutcome {
    pub fn prompt(self) -> &'static str {
        match self {
            AuthOutcome::LoggedIn => "Logged in",
            AuthOutcome::NeedAccountAndPassword => "User-id valid, send account and password",
            AuthOutcome::NeedPassword => "Account valid, send password",
            AuthOutcome::NeedAccount => "Password ok, send account",
        }
    }
}

#[derive(Debug, Default)]
pub struct Authenticator {
    record: Option<UserRecord>,
    password_valid: bool,
    account_valid: bool,
}

impl Authenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// USER: exactly one lookup; any previous record is discarded.
    pub fn user(
        &mut self,
        store: &dyn CredentialStore,
        username: &str,
    ) -> Result<AuthOutcome, AuthError> {
        self.record = None;
        self.password_valid = false;
        self.account_valid = false;

        let record = validate_user(store, username)?;
        self.password_valid = !record.has_password();
        self.account_valid = !record.has_accounts();
        self.record = Some(record);

        let outcome = self.outcome();
        debug!("USER {username} -> {:?}", self.state());
        Ok(match outcome {
            AuthOutcome::LoggedIn => AuthOutcome::LoggedIn,
            _ => AuthOutcome::NeedAccountAndPassword,
        })
    }

    /// PASS: verbatim comparison; trivially satisfied if no password is required.
    pub fn pass(&mut self, password: &str) -> Result<AuthOutcome, AuthError> {
        let record = self.record.as_ref().ok_or(AuthError::NoUser)?;
        if record.has_password() && !record.password_matches(password) {
            return Err(AuthError::WrongPassword);
        }
        self.password_valid = true;
        debug!("PASS accepted -> {:?}", self.state());
        Ok(self.outcome())
    }

    /// ACCT: first exact match wins; any name is accepted when the record has no accounts.
    pub fn acct(&mut self, account: &str) -> Result<AuthOutcome, AuthError> {
        let record = self.record.as_ref().ok_or(AuthError::NoUser)?;
        if record.has_accounts() && !record.has_account(account) {
            return Err(AuthError::InvalidAccount(account.to_string()));
        }
        self.account_valid = true;
        debug!("ACCT {account} accepted -> {:?}", self.state());
        Ok(self.outcome())
    }

    fn outcome(&self) -> AuthOutcome {
        match (self.password_valid, self.account_valid) {
            (true, true) => AuthOutcome::LoggedIn,
            (true, false) => AuthOutcome::NeedAccount,
            (false, true) => AuthOutcome::NeedPassword,
            (false, false) => AuthOutcome::NeedAccountAndPassword,
        }
    }

    pub fn state(&self) -> AuthState {
        if self.record.is_none() {
            return AuthState::Unauthenticated;
        }
        match (self.password_valid, self.account_valid) {
            (true, true) => AuthState::Authenticated,
            (true, false) => AuthState::AwaitingAccount,
            (false, true) => AuthState::AwaitingPassword,
            (false, false) => AuthState::UsernameOk,
        }
    }

    pub fn username_valid(&self) -> bool {
        self.record.is_some()
    }

    pub fn password_valid(&self) -> bool {
        self.record.is_some() && self.password_valid
    }

    pub fn account_valid(&self) -> bool {
        self.record.is_some() && self.account_valid
    }

    pub fn is_logged_in(&self) -> bool {
        self.state() == AuthState::Authenticated
    }

    pub fn username(&self) -> Option<&str> {
        self.record.as_ref().map(|record| record.username.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryCredentialStore;

    fn store() -> MemoryCredentialStore {
        [
            UserRecord::new("full")
                .with_password("secret")
                .with_accounts(["billing", "ops"]),
            UserRecord::new("passonly").with_password("secret"),
            UserRecord::new("acctonly").with_accounts(["billing"]),
            UserRecord::new("open"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn open_user_logs_in_immediately() {
        let mut auth = Authenticator::new();
        assert_eq!(auth.user(&store(), "open").unwrap(), AuthOutcome::LoggedIn);
        assert!(auth.is_logged_in());
    }

    #[test]
    fn unknown_user_is_rejected() {
        let mut auth = Authenticator::new();
        assert!(matches!(
            auth.user(&store(), "nobody"),
            Err(AuthError::UnknownUser(_))
        ));
        assert_eq!(auth.state(), AuthState::Unauthenticated);
    }

    #[test]
    fn pass_then_acct_logs_in() {
        let mut auth = Authenticator::new();
        assert_eq!(
            auth.user(&store(), "full").unwrap(),
            AuthOutcome::NeedAccountAndPassword
        );
        assert_eq!(auth.state(), AuthState::UsernameOk);
        assert_eq!(auth.pass("secret").unwrap(), AuthOutcome::NeedAccount);
        assert_eq!(auth.state(), AuthState::AwaitingAccount);
        assert_eq!(auth.acct("ops").unwrap(), AuthOutcome::LoggedIn);
        assert!(auth.is_logged_in());
    }

    #[test]
    fn acct_then_pass_logs_in() {
        let mut auth = Authenticator::new();
        auth.user(&store(), "full").unwrap();
        assert_eq!(auth.acct("billing").unwrap(), AuthOutcome::NeedPassword);
        assert_eq!(auth.state(), AuthState::AwaitingPassword);
        assert_eq!(auth.pass("secret").unwrap(), AuthOutcome::LoggedIn);
        assert!(auth.is_logged_in());
    }

    #[test]
    fn wrong_credentials_leave_state_unchanged() {
        let mut auth = Authenticator::new();
        auth.user(&store(), "full").unwrap();
        assert!(matches!(auth.pass("Secret"), Err(AuthError::WrongPassword)));
        assert!(matches!(
            auth.acct("Billing"),
            Err(AuthError::InvalidAccount(_))
        ));
        assert_eq!(auth.state(), AuthState::UsernameOk);
        assert_eq!(auth.pass("secret").unwrap(), AuthOutcome::NeedAccount);
    }

    #[test]
    fn any_password_satisfies_a_record_without_one() {
        let mut auth = Authenticator::new();
        auth.user(&store(), "acctonly").unwrap();
        assert_eq!(auth.pass("whatever").unwrap(), AuthOutcome::NeedAccount);
        assert_eq!(auth.acct("billing").unwrap(), AuthOutcome::LoggedIn);
    }

    #[test]
    fn any_account_satisfies_a_record_without_accounts() {
        let mut auth = Authenticator::new();
        auth.user(&store(), "passonly").unwrap();
        assert_eq!(auth.acct("anything").unwrap(), AuthOutcome::NeedPassword);
        assert_eq!(auth.pass("secret").unwrap(), AuthOutcome::LoggedIn);
    }

    #[test]
    fn pass_and_acct_need_user_first() {
        let mut auth = Authenticator::new();
        assert!(matches!(auth.pass("secret"), Err(AuthError::NoUser)));
        assert!(matches!(auth.acct("ops"), Err(AuthError::NoUser)));
    }

    #[test]
    fn new_user_discards_previous_login() {
        let mut auth = Authenticator::new();
        auth.user(&store(), "open").unwrap();
        assert!(auth.is_logged_in());

        auth.user(&store(), "full").unwrap();
        assert!(!auth.is_logged_in());
        assert_eq!(auth.username(), Some("full"));

        assert!(auth.user(&store(), "nobody").is_err());
        assert!(!auth.username_valid());
        assert!(!auth.is_logged_in());
    }
}
