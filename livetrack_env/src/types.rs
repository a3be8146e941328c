//! Common types for the LiveTrack environment abstraction.

use serde::{Deserialize, Serialize};

use crate::error::EnvError;

/// Opaque token selecting which remote share stream to subscribe to.
///
/// The identifier is minted by the backend and carried in the share URL's
/// `id` query parameter; the viewer never interprets its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShareId(String);

impl ShareId {
    /// Creates a ShareId from a bare identifier string.
    ///
    /// Rejects empty or whitespace-only input — an absent identifier means
    /// "no subscription", which callers must handle explicitly.
    pub fn new(id: impl Into<String>) -> Result<Self, EnvError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EnvError::invalid_id("empty identifier"));
        }
        Ok(Self(id))
    }

    /// Extracts the share identifier from a share URL's query string.
    ///
    /// Accepts anything of the form `...?...id=<token>...`; only the `id`
    /// key is consulted.
    pub fn from_share_url(url: &str) -> Result<Self, EnvError> {
        let query = url
            .split_once('?')
            .map(|(_, q)| q)
            .ok_or_else(|| EnvError::invalid_id(format!("no query string in {url:?}")))?;
        // Drop a #fragment if the caller pasted a full browser URL
        let query = query.split('#').next().unwrap_or(query);

        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("id", value)) if !value.is_empty() => return Self::new(value),
                _ => continue,
            }
        }
        Err(EnvError::invalid_id(format!("no id parameter in {url:?}")))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the live location record under the collaborator's namespace.
    pub fn location_path(&self) -> String {
        format!("shares/{}/location", self.0)
    }

    /// Path of the append-only points history (source-capped, see
    /// [`crate::HISTORY_LIMIT`]).
    pub fn history_path(&self) -> String {
        format!("tracks/{}/points", self.0)
    }
}

impl std::fmt::Display for ShareId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
