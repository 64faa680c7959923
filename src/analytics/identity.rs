//! User identity source and the one-way hash applied before anything leaves
//! the process.

use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use crate::core::errors::{DcapError, Result};

/// Resolves the signed-in user's entity reference (e.g. `user:default/jane`).
pub trait IdentityApi {
    fn user_entity_ref(&self) -> Result<String>;
}

/// Identity known up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity(pub String);

impl StaticIdentity {
    #[must_use]
    pub fn new(entity_ref: impl Into<String>) -> Self {
        Self(entity_ref.into())
    }
}

impl IdentityApi for StaticIdentity {
    fn user_entity_ref(&self) -> Result<String> {
        if self.0.trim().is_empty() {
            return Err(DcapError::Identity {
                details: "empty user entity ref".to_string(),
            });
        }
        Ok(self.0.clone())
    }
}

/// SHA-256 of the entity ref as lowercase hex.
#[must_use]
pub fn hash_user_ref(entity_ref: &str) -> String {
    let digest = Sha256::digest(entity_ref.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
