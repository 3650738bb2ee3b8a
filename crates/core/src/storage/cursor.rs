//! Opaque continuation tokens for paginated listing.
//!
//! A cursor wraps the sort key of the last item a page returned. Clients only
//! ever see the URL-safe base64 encoding.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use super::keys::DATE_PREFIX;
use super::CursorError;

/// Continuation token pointing just past the last item of a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    /// Wraps a last-evaluated sort key.
    pub fn from_sort_key(sort_key: impl Into<String>) -> Self {
        Self(sort_key.into())
    }

    /// The wrapped sort key.
    pub fn sort_key(&self) -> &str {
        &self.0
    }

    /// Encodes the cursor for handing to a client.
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0.as_bytes())
    }

    /// Decodes a token previously produced by [`Cursor::encode`].
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| CursorError::Malformed)?;
        let sort_key = String::from_utf8(bytes).map_err(|_| CursorError::Malformed)?;
        if !sort_key.starts_with(DATE_PREFIX) {
            return Err(CursorError::UnexpectedKey);
        }
        Ok(Self(sort_key))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Cursor {
    type Err = CursorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
