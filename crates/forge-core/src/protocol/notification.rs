//! Push notifications emitted by the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An asynchronous, payload-free signal that a backend domain changed.
///
/// Notifications only say *that* something changed; the client refetches
/// the affected domain to learn *what* changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Notification {
    /// The backend rebuilt its catalog cache (`catalog-refreshed`).
    CatalogRefreshed,
    /// A library entry was saved, launched, or removed (`library-changed`).
    LibraryChanged,
}

impl Notification {
    /// The wire name of the notification.
    pub fn name(self) -> &'static str {
        match self {
            Notification::CatalogRefreshed => "catalog-refreshed",
            Notification::LibraryChanged => "library-changed",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
