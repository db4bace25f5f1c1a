//! Account credentials and the bearer-token derivation.
//!
//! The account token is a secret. It lives in [`AccountToken`], which redacts
//! itself in every string representation, so neither `Debug` output, log
//! lines, nor error messages can leak it.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::errors::ConfigError;

/// The Central Portal account token (password). Redacted in `Debug` and
/// `Display`; the raw value is only reachable inside the crate.
#[derive(Clone)]
pub struct AccountToken(String);

impl AccountToken {
    /// Wraps a raw token string.
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for AccountToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for AccountToken {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

impl fmt::Debug for AccountToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccountToken").field(&"<redacted>").finish()
    }
}

impl fmt::Display for AccountToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// The account id / token pair used to authenticate against the publisher.
///
/// The derived `Debug` impl goes through [`AccountToken`]'s redaction, so a
/// `Credentials` value is safe to log.
#[derive(Debug, Clone)]
pub struct Credentials {
    account_id: String,
    token: AccountToken,
}

impl Credentials {
    /// Creates a credentials pair.
    ///
    /// Accepts anything convertible into the component types; emptiness is
    /// checked later by [`validate`](Self::validate) so a half-configured CI
    /// environment fails before any bytes leave the machine.
    pub fn new<I, T>(account_id: I, token: T) -> Self
    where
        I: Into<String>,
        T: Into<AccountToken>,
    {
        Self {
            account_id: account_id.into(),
            token: token.into(),
        }
    }

    /// The (non-secret) account id.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Rejects empty components before any header is derived from them.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.account_id.is_empty() {
            return Err(ConfigError::EmptyAccountId);
        }
        if self.token.is_empty() {
            return Err(ConfigError::EmptyAccountToken);
        }
        Ok(())
    }

    /// Derives the bearer token: `base64("account_id:token")`.
    ///
    /// Callers must run [`validate`](Self::validate) first; deriving a header
    /// from empty input would produce a syntactically valid but meaningless
    /// credential.
    pub(crate) fn bearer_token(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.account_id, self.token.expose()))
    }
}
