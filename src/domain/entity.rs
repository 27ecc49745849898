//! Mock entity metadata and the identifiers its artifacts are stored under

use std::{fmt, fmt::Write as _, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_]+$").expect("identifier pattern compiles"));

/// Separates the encoded method from the encoded URI. `S` is never a hex
/// digit, so it cannot be read as the start of an escape.
const METHOD_SEPARATOR: &str = "_S";

/// Routing metadata for one simulated endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockEntity {
    pub uri: String,
    pub method: String,
    #[serde(rename = "contenttype")]
    pub content_type: String,
    #[serde(rename = "status")]
    pub status_code: u16,
}

impl MockEntity {
    pub fn identifier(&self) -> Identifier {
        Identifier::for_endpoint(&self.method, &self.uri)
    }
}

/// Storage name shared by the metadata and body artifacts of an entity.
///
/// Always non-empty and made of `[0-9A-Za-z_]` only, so it can never escape
/// the data directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("name may only be [0-9A-Za-z_]: {0:?}")]
pub struct InvalidIdentifier(pub String);

impl Identifier {
    /// Accepts a raw name only when every character is in the allowed class.
    pub fn parse(raw: &str) -> Result<Self, InvalidIdentifier> {
        if IDENTIFIER_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidIdentifier(raw.to_string()))
        }
    }

    /// One-to-one name for a method and URI pair, e.g. `GET /api/users`
    /// becomes `GET_S_2Fapi_2Fusers`.
    ///
    /// ASCII letters and digits are kept, `_` becomes `__` and every other
    /// byte becomes `_` plus two uppercase hex digits.
    pub fn for_endpoint(method: &str, uri: &str) -> Self {
        let mut encoded = String::with_capacity(method.len() + uri.len() + 2);
        escape_into(&mut encoded, method);
        encoded.push_str(METHOD_SEPARATOR);
        escape_into(&mut encoded, uri);
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn escape_into(out: &mut String, raw: &str) {
    for byte in raw.bytes() {
        match byte {
            b'_' => out.push_str("__"),
            byte if byte.is_ascii_alphanumeric() => out.push(char::from(byte)),
            byte => {
                let _ = write!(out, "_{byte:02X}");
            }
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
