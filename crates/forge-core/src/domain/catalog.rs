//! Catalog domain: providers, discoverable items, and the catalog filter.
//!
//! Catalog data is read-only on the client.  Items are immutable once
//! fetched within a session and are superseded wholesale whenever a new
//! catalog listing arrives.

use serde::{Deserialize, Serialize};

/// An upstream source of catalog items.
///
/// Providers are read-only reference data; the client only displays them
/// (e.g. in the provider drop-down of the discover screen).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub region: String,
    pub source_url: String,
}

/// One discoverable app in the catalog.
///
/// `price_usd` is non-negative and `rating` lies in `0.0..=5.0`; the backend
/// validates both before an item ever reaches a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Opaque identifier, unique within one catalog listing.
    pub id: String,
    pub name: String,
    pub category: String,
    pub provider_id: String,
    pub provider_name: String,
    pub source_url: String,
    pub price_usd: f64,
    pub rating: f64,
    pub stock: u32,
}

/// The optional free-text query and provider restriction for a catalog
/// listing.
///
/// Both parts are normalised on construction: surrounding whitespace is
/// trimmed and an empty string means "absent".  A filter with both parts
/// absent is the unfiltered listing.
///
/// # Inclusion test
///
/// An item is included when
///
/// - the provider part is absent, or equals the item's provider id
///   (ASCII case-insensitive), **and**
/// - the query part is absent, or occurs case-insensitively in the item's
///   name, category, or provider name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilter {
    query: Option<String>,
    provider_id: Option<String>,
}

impl CatalogFilter {
    /// Creates a filter from raw form input.
    ///
    /// ```rust
    /// use forge_core::CatalogFilter;
    ///
    /// let filter = CatalogFilter::new(Some("  editor "), Some(""));
    /// assert_eq!(filter.query(), Some("editor"));
    /// assert_eq!(filter.provider_id(), None);
    /// ```
    pub fn new(query: Option<&str>, provider_id: Option<&str>) -> Self {
        Self {
            query: normalise(query),
            provider_id: normalise(provider_id),
        }
    }

    /// The filter that matches every item.
    pub fn unfiltered() -> Self {
        Self::default()
    }

    /// Returns a copy of this filter with the query replaced.
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = normalise(Some(query));
        self
    }

    /// Returns a copy of this filter with the provider restriction replaced.
    pub fn with_provider(mut self, provider_id: &str) -> Self {
        self.provider_id = normalise(Some(provider_id));
        self
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn provider_id(&self) -> Option<&str> {
        self.provider_id.as_deref()
    }

    /// `true` when neither a query nor a provider restriction is set.
    pub fn is_unfiltered(&self) -> bool {
        self.query.is_none() && self.provider_id.is_none()
    }

    /// Applies the inclusion test described on [`CatalogFilter`].
    pub fn matches(&self, item: &CatalogItem) -> bool {
        let provider_ok = self
            .provider_id
            .as_deref()
            .map_or(true, |provider| item.provider_id.eq_ignore_ascii_case(provider));

        let query_ok = self.query.as_deref().map_or(true, |query| {
            let needle = query.to_lowercase();
            [&item.name, &item.category, &item.provider_name]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        });

        provider_ok && query_ok
    }
}

fn normalise(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
