use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// ISO 3166-1 alpha-3 country code, stored upper-case.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IsoCode([u8; 3]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ISO3 country code {0:?}")]
pub struct IsoCodeError(pub String);

impl IsoCode {
    /// Parses a three-letter code, accepting any letter case.
    pub fn parse(raw: &str) -> Result<Self, IsoCodeError> {
        let trimmed = raw.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(IsoCodeError(raw.to_string()));
        }
        Ok(IsoCode([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for IsoCode {
    type Err = IsoCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IsoCode::parse(s)
    }
}

impl TryFrom<String> for IsoCode {
    type Error = IsoCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        IsoCode::parse(&value)
    }
}

impl From<IsoCode> for String {
    fn from(code: IsoCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for IsoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for IsoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IsoCode({})", self.as_str())
    }
}
