//! Session settings: the descriptor a host advertises.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute key carrying the caller-defined match type tag.
pub const MATCH_TYPE_KEY: &str = "MatchType";

/// Advertised key/value attributes of a session.
///
/// A `BTreeMap` keeps iteration (and therefore logs and serialized
/// output) in a stable order.
pub type AttributeMap = BTreeMap<String, String>;

/// Everything a backend needs to host and advertise a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Number of public player slots. Always positive.
    pub max_connections: u32,

    /// `true` when the session lives on a LAN-only backend.
    pub is_lan_match: bool,

    /// Players may join after the match has started.
    pub allow_join_in_progress: bool,

    /// The session shows up in searches.
    pub should_advertise: bool,

    /// The session is discoverable through the presence layer.
    pub uses_presence: bool,

    /// Friends may join through their presence info.
    pub allow_join_via_presence: bool,

    /// Prefer lobbies on backends that offer them.
    pub use_lobbies_if_available: bool,

    /// Advertised attributes (match type and anything else).
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl SessionSettings {
    /// Settings for a session hosted through the coordinator.
    ///
    /// Joinable mid-game, advertised, and discoverable through presence.
    pub fn hosted(max_connections: u32, match_type: &str, is_lan_match: bool) -> Self {
        let mut attributes = AttributeMap::new();
        attributes.insert(MATCH_TYPE_KEY.to_string(), match_type.to_string());
        Self {
            max_connections,
            is_lan_match,
            allow_join_in_progress: true,
            should_advertise: true,
            uses_presence: true,
            allow_join_via_presence: true,
            use_lobbies_if_available: true,
            attributes,
        }
    }

    /// The advertised match type, if one was set.
    pub fn match_type(&self) -> Option<&str> {
        self.attributes.get(MATCH_TYPE_KEY).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosted_sets_advertisement_flags() {
        let settings = SessionSettings::hosted(4, "FreeForAll", false);

        assert_eq!(settings.max_connections, 4);
        assert!(settings.allow_join_in_progress);
        assert!(settings.should_advertise);
        assert!(settings.uses_presence);
        assert!(settings.allow_join_via_presence);
        assert!(!settings.is_lan_match);
    }

    #[test]
    fn test_hosted_tags_match_type() {
        let settings = SessionSettings::hosted(2, "Duel", true);
        assert_eq!(settings.match_type(), Some("Duel"));
        assert!(settings.is_lan_match);
    }

    #[test]
    fn test_match_type_missing_returns_none() {
        let mut settings = SessionSettings::hosted(2, "Duel", true);
        settings.attributes.clear();
        assert_eq!(settings.match_type(), None);
    }
}
