//! Credential check that yields the identity later submissions carry.

use log::{info, warn};
use crate::server::database::store::KotStore;
use crate::server::kot::KotError;
use crate::server::model::identity::{AuthOutcome, Identity};

pub mod password;

pub(crate) struct AuthGate<S: KotStore> {
    store: S,
}

impl<S: KotStore> AuthGate<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// A credential mismatch is a rejection, not an error. Only store
    /// failures come back as `Err`.
    pub async fn authenticate(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<AuthOutcome, KotError> {
        let (Some(username), Some(password)) = (username, password) else {
            return Ok(AuthOutcome::Rejected);
        };
        if username.is_empty() || password.is_empty() {
            return Ok(AuthOutcome::Rejected);
        }
        let Some(credential) = self.store.find_credential(username).await? else {
            warn!("login rejected for unknown user {}", username);
            return Ok(AuthOutcome::Rejected);
        };
        if !password::verify_password(password, &credential.salt, &credential.hash) {
            warn!("login rejected for user {}", username);
            return Ok(AuthOutcome::Rejected);
        }
        info!("user_id={} logged in", credential.user_id);
        Ok(AuthOutcome::Accepted(Identity {
            user_id: credential.user_id,
            username: credential.username,
        }))
    }
}
