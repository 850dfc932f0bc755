//! Pseudonymous visitor identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// Prefix of generated visitor tokens.
pub const VISITOR_TOKEN_PREFIX: &str = "visitor_";

/// Stable correlation key for one device/browser.
///
/// Not tied to any authentication system; the backend only stores it
/// alongside conversations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(pub String);

impl VisitorId {
    /// Synthesize a fresh random token (`visitor_<32 hex chars>`).
    pub fn generate() -> Self {
        Self(format!("{VISITOR_TOKEN_PREFIX}{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_has_prefix_and_entropy() {
        let id = VisitorId::generate();
        assert!(id.as_str().starts_with(VISITOR_TOKEN_PREFIX));
        assert_eq!(id.as_str().len(), VISITOR_TOKEN_PREFIX.len() + 32);
    }

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(VisitorId::generate(), VisitorId::generate());
    }
}
