//! Scaling descriptor codec
//!
//! Tag values cannot hold raw JSON, so the descriptor is stored as standard
//! padded base64 of its JSON form. Every character of that alphabet
//! (`A-Z a-z 0-9 + / =`) is accepted in a tag value.

use crate::error::CodecError;
use crate::models::ScalingDescriptor;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;

/// Tag-safe encoding of a [`ScalingDescriptor`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedDescriptor(String);

impl EncodedDescriptor {
    /// Wrap a token read back from a tag
    pub fn from_tag(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode a descriptor; the output is deterministic for a given value
pub fn encode(descriptor: &ScalingDescriptor) -> EncodedDescriptor {
    // Serializing three integers into a String cannot fail
    let json = serde_json::to_string(descriptor).unwrap_or_default();
    EncodedDescriptor(STANDARD.encode(json))
}

/// Decode a token produced by [`encode`]
///
/// Whitespace inside the JSON is tolerated, so tokens written by other tools
/// (`{"minSize": 1, ...}`) decode as well.
pub fn decode(encoded: &EncodedDescriptor) -> Result<ScalingDescriptor, CodecError> {
    let bytes = STANDARD.decode(encoded.as_str().trim())?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&json)?)
}
