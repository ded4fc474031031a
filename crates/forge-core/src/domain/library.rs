//! Library domain: apps the user saved from the catalog.
//!
//! A library entry is created by a save command, mutated by launch, and
//! destroyed by remove.  Its identity is the id of the catalog item it was
//! saved from, but the entry survives if that item later disappears from
//! the catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a library entry.
///
/// `idle` and `running` are the states the client understands; any other
/// value the backend reports is preserved verbatim in [`LifecycleState::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LifecycleState {
    Idle,
    Running,
    Other(String),
}

impl LifecycleState {
    pub fn as_str(&self) -> &str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Running => "running",
            LifecycleState::Other(raw) => raw,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, LifecycleState::Running)
    }
}

impl From<String> for LifecycleState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "idle" => LifecycleState::Idle,
            "running" => LifecycleState::Running,
            _ => LifecycleState::Other(raw),
        }
    }
}

impl From<LifecycleState> for String {
    fn from(state: LifecycleState) -> Self {
        match state {
            LifecycleState::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One app in the user's library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    /// Identity; equal to the id of the catalog item it was saved from.
    pub id: String,
    pub name: String,
    pub category: String,
    pub provider_id: String,
    pub provider_name: String,
    pub version: String,
    pub state: LifecycleState,
    /// Unix timestamp (seconds) of the most recent launch, if any.
    pub last_launched: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_states_round_trip_through_strings() {
        for state in [LifecycleState::Idle, LifecycleState::Running] {
            let raw: String = state.clone().into();
            assert_eq!(LifecycleState::from(raw), state);
        }
    }

    #[test]
    fn test_unknown_state_is_preserved_verbatim() {
        // Arrange / Act
        let state = LifecycleState::from("updating".to_string());

        // Assert
        assert_eq!(state, LifecycleState::Other("updating".to_string()));
        assert_eq!(state.to_string(), "updating");
        assert!(!state.is_running());
    }

    #[test]
    fn test_entry_state_serializes_as_plain_string() {
        let entry = LibraryEntry {
            id: "e1".to_string(),
            name: "Editor".to_string(),
            category: "Tools".to_string(),
            provider_id: "p1".to_string(),
            provider_name: "P One".to_string(),
            version: "1.0.0".to_string(),
            state: LifecycleState::Running,
            last_launched: Some(1_700_000_000),
        };

        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["state"], "running");
        assert_eq!(json["lastLaunched"], 1_700_000_000u64);
    }
}
