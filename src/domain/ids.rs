//! Domain identifier types with validation
//!
//! Newtype wrappers for the names Dredge passes to external services. Each
//! type validates on construction so that bad input fails before any
//! network call is made.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Characters OpenSearch rejects in index names
const FORBIDDEN_INDEX_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ':'];

/// Search index name newtype wrapper
///
/// Follows the OpenSearch naming rules: lowercase, no whitespace or reserved
/// characters, no leading `-`, `_` or `+`, at most 255 bytes.
///
/// # Examples
///
/// ```
/// use dredge::domain::ids::IndexName;
/// use std::str::FromStr;
///
/// let index = IndexName::from_str("inventory").unwrap();
/// assert_eq!(index.as_str(), "inventory");
/// assert!(IndexName::from_str("Inventory").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IndexName(String);

impl IndexName {
    /// Creates a new IndexName from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(IndexName)` if the name is valid, `Err` otherwise
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err("Index name cannot be empty".to_string());
        }
        if name == "." || name == ".." {
            return Err(format!("Index name cannot be '{name}'"));
        }
        if name.len() > 255 {
            return Err(format!(
                "Index name must be at most 255 bytes, got {}",
                name.len()
            ));
        }
        if name.starts_with(['-', '_', '+']) {
            return Err(format!(
                "Index name '{name}' cannot start with '-', '_' or '+'"
            ));
        }
        if name.chars().any(|c| c.is_uppercase()) {
            return Err(format!("Index name '{name}' must be lowercase"));
        }
        if let Some(c) = name
            .chars()
            .find(|c| c.is_whitespace() || FORBIDDEN_INDEX_CHARS.contains(c))
        {
            return Err(format!(
                "Index name '{name}' contains invalid character '{c}'"
            ));
        }

        Ok(Self(name))
    }

    /// Returns the index name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IndexName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for IndexName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IndexName> for String {
    fn from(index: IndexName) -> Self {
        index.0
    }
}

impl AsRef<str> for IndexName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Object storage bucket name newtype wrapper
///
/// Validated against the S3 rules: 3-63 characters of lowercase letters,
/// digits, dots and hyphens, starting and ending with a letter or digit.
///
/// # Examples
///
/// ```
/// use dredge::domain::ids::BucketName;
/// use std::str::FromStr;
///
/// let bucket = BucketName::from_str("backups-prod").unwrap();
/// assert_eq!(bucket.as_str(), "backups-prod");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BucketName(String);

impl BucketName {
    /// Creates a new BucketName from a string
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();

        if !(3..=63).contains(&name.len()) {
            return Err(format!(
                "Bucket name must be between 3 and 63 characters, got {}",
                name.len()
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
        {
            return Err(format!(
                "Bucket name '{name}' may only contain lowercase letters, digits, '.' and '-'"
            ));
        }
        let starts_ok = name
            .chars()
            .next()
            .map(|c| c.is_ascii_alphanumeric())
            .unwrap_or(false);
        let ends_ok = name
            .chars()
            .last()
            .map(|c| c.is_ascii_alphanumeric())
            .unwrap_or(false);
        if !starts_ok || !ends_ok {
            return Err(format!(
                "Bucket name '{name}' must start and end with a letter or digit"
            ));
        }

        Ok(Self(name))
    }

    /// Returns the bucket name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BucketName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for BucketName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BucketName> for String {
    fn from(bucket: BucketName) -> Self {
        bucket.0
    }
}

impl AsRef<str> for BucketName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_name_valid() {
        let index = IndexName::new("inventory").unwrap();
        assert_eq!(index.as_str(), "inventory");
        assert_eq!(index.to_string(), "inventory");

        assert!(IndexName::new("logs-2025.01.01").is_ok());
        assert!(IndexName::new(".kibana_1").is_ok());
    }

    #[test]
    fn test_index_name_empty() {
        assert!(IndexName::new("").is_err());
        assert!(IndexName::new("   ").is_err());
    }

    #[test]
    fn test_index_name_rejects_uppercase() {
        let err = IndexName::new("Inventory").unwrap_err();
        assert!(err.contains("lowercase"));
    }

    #[test]
    fn test_index_name_rejects_reserved_characters() {
        for name in ["a/b", "a b", "a*b", "a,b", "a#b", "a:b", "a|b"] {
            assert!(IndexName::new(name).is_err(), "{name} should be rejected");
        }
    }

    #[test]
    fn test_index_name_rejects_leading_symbols() {
        assert!(IndexName::new("-logs").is_err());
        assert!(IndexName::new("_logs").is_err());
        assert!(IndexName::new("+logs").is_err());
        assert!(IndexName::new(".").is_err());
        assert!(IndexName::new("..").is_err());
    }

    #[test]
    fn test_index_name_length_limit() {
        assert!(IndexName::new("a".repeat(255)).is_ok());
        assert!(IndexName::new("a".repeat(256)).is_err());
    }

    #[test]
    fn test_index_name_serde_validates() {
        let index: IndexName = serde_json::from_str("\"inventory\"").unwrap();
        assert_eq!(index.as_str(), "inventory");

        let result: Result<IndexName, _> = serde_json::from_str("\"Bad Name\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_bucket_name_valid() {
        assert!(BucketName::new("my-backups").is_ok());
        assert!(BucketName::new("backups.2025").is_ok());
        assert!(BucketName::new("abc").is_ok());
    }

    #[test]
    fn test_bucket_name_invalid() {
        assert!(BucketName::new("ab").is_err());
        assert!(BucketName::new("a".repeat(64)).is_err());
        assert!(BucketName::new("My-Backups").is_err());
        assert!(BucketName::new("-backups").is_err());
        assert!(BucketName::new("backups-").is_err());
        assert!(BucketName::new("back_ups").is_err());
    }
}
