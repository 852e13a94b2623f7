//! Identity provider seam.
//!
//! Authentication itself is an external collaborator: the console only needs
//! sign-in, sign-out, and an attribute fetch, and renders provider failures
//! as alerts carrying the error's name and message.

use serde_json::{Map, Value};
use std::env;
use std::fmt;

use crate::store;

/// Error surfaced by an identity provider, shaped for alert rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthError {
    pub name: String,
    pub message: String,
}

impl AuthError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        AuthError {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for AuthError {}

/// The operations the console needs from whatever performs authentication.
pub trait IdentityProvider {
    fn sign_in(&self, username: &str, password: &str) -> Result<(), AuthError>;
    fn sign_out(&self) -> Result<(), AuthError>;
    /// Profile attributes of the authenticated user as a JSON object.
    /// Unknown keys are tolerated downstream, so providers may return more
    /// than the session displays.
    fn user_attributes(&self) -> Result<Map<String, Value>, AuthError>;
}

/// Discover the identity token: environment first, then the local store.
pub fn find_identity_token() -> Option<String> {
    if let Ok(val) = env::var("BEDROCK_CONSOLE_ID_TOKEN") {
        let trimmed = val.trim().to_string();
        if !trimmed.is_empty() {
            return Some(trimmed);
        }
    }

    match store::load_token() {
        Ok(Some(token)) if !token.trim().is_empty() => Some(token.trim().to_string()),
        _ => None,
    }
}

/// Thin provider backed by the credential store.
///
/// It does not talk to Cognito; it checks that the console is configured and
/// that an identity token is discoverable, which is what the backend actually
/// verifies on each request. Attribute fetches echo the identity recorded at
/// sign-in.
#[derive(Debug, Default)]
pub struct StoredTokenProvider {
    signed_in: std::cell::RefCell<Option<String>>,
}

impl IdentityProvider for StoredTokenProvider {
    fn sign_in(&self, username: &str, _password: &str) -> Result<(), AuthError> {
        let configured = store::load_credentials()
            .map_err(|e| AuthError::new("StorageError", e.to_string()))?;
        if configured.is_none() {
            return Err(AuthError::new(
                "NotConfigured",
                "save the user pool id, application id, and API URL first",
            ));
        }
        if find_identity_token().is_none() {
            return Err(AuthError::new(
                "MissingToken",
                "no identity token found (set BEDROCK_CONSOLE_ID_TOKEN or store one)",
            ));
        }
        *self.signed_in.borrow_mut() = Some(username.to_string());
        Ok(())
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        *self.signed_in.borrow_mut() = None;
        Ok(())
    }

    fn user_attributes(&self) -> Result<Map<String, Value>, AuthError> {
        let signed_in = self.signed_in.borrow();
        let name = signed_in
            .as_ref()
            .ok_or_else(|| AuthError::new("NotAuthenticated", "no user is signed in"))?;

        let mut attrs = Map::new();
        attrs.insert("name".into(), Value::String(name.clone()));
        attrs.insert("nickname".into(), Value::String(name.clone()));
        Ok(attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_display() {
        let err = AuthError::new("NotAuthorizedException", "Incorrect username or password.");
        assert_eq!(
            err.to_string(),
            "NotAuthorizedException: Incorrect username or password."
        );
    }

    #[test]
    fn attributes_require_sign_in() {
        let provider = StoredTokenProvider::default();
        let err = provider.user_attributes().unwrap_err();
        assert_eq!(err.name, "NotAuthenticated");
    }
}
