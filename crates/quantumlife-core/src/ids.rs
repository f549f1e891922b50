//! Stable identifiers used across the Attention Pipeline.
//!
//! Most ids here are content-derived rather than random — they exist so two
//! runs over the same input produce the same id.

use std::fmt;

use crate::hashing::short_hash;

/// Canonical Event id: `<kind>_<first 16 hex chars of sha256(kind:vendor:account:source_id)>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub String);

impl EventId {
    /// Derive an event id from its defining fields.
    pub fn derive(kind: &str, vendor: &str, account: &str, source_id: &str) -> Self {
        let message = format!("{kind}:{vendor}:{account}:{source_id}");
        let digest = short_hash(message.as_bytes());
        Self(format!("{kind}_{}", &digest[..16]))
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The sole visible identifier for an Interrupt Candidate: an opaque content
/// hash, never a raw circle/member id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateHash(pub String);

impl fmt::Display for CandidateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CandidateHash {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CandidateHash {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_is_deterministic_and_prefixed() {
        let a = EventId::derive("email", "gmail", "acct1", "msg-1");
        let b = EventId::derive("email", "gmail", "acct1", "msg-1");
        assert_eq!(a, b);
        assert!(a.0.starts_with("email_"));
        assert_eq!(a.0.len(), "email_".len() + 16);
    }

    #[test]
    fn event_id_varies_with_source_id() {
        let a = EventId::derive("email", "gmail", "acct1", "msg-1");
        let b = EventId::derive("email", "gmail", "acct1", "msg-2");
        assert_ne!(a, b);
    }
}
