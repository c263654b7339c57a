//! Player identity.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Opaque, stable identifier of a player across sessions.
///
/// Equality is exact string match; no case folding or trimming is applied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_equality() {
        assert_eq!(PlayerId::from("7656119"), PlayerId::new("7656119".to_string()));
        assert_ne!(PlayerId::from("abc"), PlayerId::from("ABC"));
        assert_ne!(PlayerId::from("abc"), PlayerId::from("abc "));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::from("p1")).unwrap();
        assert_eq!(json, "\"p1\"");
    }
}
