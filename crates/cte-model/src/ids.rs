#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Registry identifier of a clinical trial (`NCT` followed by eight digits).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct NctId(String);

impl NctId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let normalized = value.trim().to_ascii_uppercase();
        let Some(digits) = normalized.strip_prefix("NCT") else {
            return Err(ModelError::InvalidNctId(value));
        };
        if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ModelError::InvalidNctId(value));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NctId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NctId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for NctId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NctId> for String {
    fn from(value: NctId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lowercase_and_whitespace() {
        let id = NctId::new("  nct01234567 ").unwrap();
        assert_eq!(id.as_str(), "NCT01234567");
    }

    #[test]
    fn rejects_wrong_digit_count() {
        assert!(NctId::new("NCT123").is_err());
        assert!(NctId::new("NCT0123456789").is_err());
        assert!(NctId::new("ABC01234567").is_err());
        assert!(NctId::new("NCT0123456X").is_err());
    }
}
