//! Operator credentials and admission.

use std::fmt;

use crate::error::ServiceError;

/// Message shown to operators whose credentials were rejected.
pub const ACCESS_DENIED: &str = "ACCESS DENIED: Invalid Credentials";

/// The single credential pair that admits an operator.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    id: String,
    key: String,
}

impl AdminCredentials {
    /// Credential pair that admits `id` with `key`.
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }

    /// Check a submitted identifier and key against the configured pair.
    pub fn authenticate(&self, id: &str, key: &str) -> bool {
        self.id == id && self.key == key
    }

    /// Identifier of the configured operator.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Admission state of an operator, handed explicitly to whatever opens a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AdminSession {
    /// Not signed in, or signed in with rejected credentials.
    #[default]
    Anonymous,
    /// Signed in with the configured pair.
    Admitted {
        /// Identifier the operator signed in with.
        admin_id: String,
    },
}

impl AdminSession {
    /// Attempt to sign in; rejected credentials leave the session anonymous.
    pub fn sign_in(credentials: &AdminCredentials, id: &str, key: &str) -> Self {
        if credentials.authenticate(id, key) {
            AdminSession::Admitted {
                admin_id: id.to_owned(),
            }
        } else {
            AdminSession::Anonymous
        }
    }

    /// Whether the operator was admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdminSession::Admitted { .. })
    }

    /// Fail with [`ServiceError::Unauthorized`] unless the operator was admitted.
    pub fn require_admitted(&self) -> Result<&str, ServiceError> {
        match self {
            AdminSession::Admitted { admin_id } => Ok(admin_id),
            AdminSession::Anonymous => Err(ServiceError::Unauthorized(ACCESS_DENIED.into())),
        }
    }
}
