//! Catalog index: the backend's cached, filterable copy of every provider's
//! catalog.
//!
//! # How the catalog is built (for beginners)
//!
//! Each upstream source (a website listing apps) is wrapped in a
//! [`CatalogAdapter`].  Building the catalog walks the adapters in order:
//!
//! ```text
//! adapter.fetch_raw()  ──►  normalize()  ──►  validate()  ──►  de-duplicate by id
//!     (raw listing)        (fill gaps)       (drop bad rows)     (first one wins)
//! ```
//!
//! The result is cached in a [`CatalogIndex`].  Listings served to clients
//! are filtered with [`CatalogFilter::matches`] and ordered by rating,
//! highest first.  The cache is rebuilt only when a client asks for a
//! refresh.

use std::collections::HashSet;

use forge_core::{CatalogFilter, CatalogItem, Provider};
use thiserror::Error;
use tracing::warn;

/// Why an adapter-supplied item was dropped from the catalog.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    #[error("item {item_id:?} is missing required field `{field}`")]
    MissingField { item_id: String, field: &'static str },

    #[error("item {item_id} has a negative price ({price})")]
    NegativePrice { item_id: String, price: f64 },

    #[error("item {item_id} has a rating outside 0.0..=5.0 ({rating})")]
    RatingOutOfRange { item_id: String, rating: f64 },
}

/// An upstream source of catalog items.
///
/// Implementors supply [`CatalogAdapter::provider`] and
/// [`CatalogAdapter::fetch_raw`]; the remaining steps have defaults that
/// adapters override only when their source needs special treatment.
pub trait CatalogAdapter: Send + Sync {
    /// The provider this adapter represents.
    fn provider(&self) -> Provider;

    /// The provider's listing, as scraped.
    fn fetch_raw(&self) -> Vec<CatalogItem>;

    /// Fills fields the source leaves blank from [`CatalogAdapter::provider`]
    /// and trims surrounding whitespace from display text.
    fn normalize(&self, raw: Vec<CatalogItem>) -> Vec<CatalogItem> {
        let provider = self.provider();
        raw.into_iter()
            .map(|mut item| {
                item.name = item.name.trim().to_string();
                item.category = item.category.trim().to_string();
                if item.provider_id.is_empty() {
                    item.provider_id = provider.id.clone();
                }
                if item.provider_name.is_empty() {
                    item.provider_name = provider.name.clone();
                }
                if item.source_url.is_empty() {
                    item.source_url = provider.source_url.clone();
                }
                item
            })
            .collect()
    }

    /// Checks one normalised item.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] naming the first rule the item breaks.
    fn validate(&self, item: &CatalogItem) -> Result<(), AdapterError> {
        for (field, value) in [
            ("id", &item.id),
            ("name", &item.name),
            ("providerId", &item.provider_id),
        ] {
            if value.is_empty() {
                return Err(AdapterError::MissingField {
                    item_id: item.id.clone(),
                    field,
                });
            }
        }
        if item.price_usd.is_nan() || item.price_usd < 0.0 {
            return Err(AdapterError::NegativePrice {
                item_id: item.id.clone(),
                price: item.price_usd,
            });
        }
        if !(0.0..=5.0).contains(&item.rating) {
            return Err(AdapterError::RatingOutOfRange {
                item_id: item.id.clone(),
                rating: item.rating,
            });
        }
        Ok(())
    }

    /// Runs the whole pipeline and returns only the valid items.
    fn fetch_catalog(&self) -> Vec<CatalogItem> {
        self.normalize(self.fetch_raw())
            .into_iter()
            .filter(|item| match self.validate(item) {
                Ok(()) => true,
                Err(e) => {
                    warn!(provider = %self.provider().id, "dropping catalog item: {e}");
                    false
                }
            })
            .collect()
    }
}

/// The cached catalog and the provider list it was built from.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    providers: Vec<Provider>,
    items: Vec<CatalogItem>,
}

impl CatalogIndex {
    /// Builds the index from `adapters`, keeping the first item seen for
    /// each id.
    pub fn build(adapters: &[Box<dyn CatalogAdapter>]) -> Self {
        let providers = adapters.iter().map(|adapter| adapter.provider()).collect();

        let mut ids = HashSet::new();
        let mut items = Vec::new();
        for adapter in adapters {
            for item in adapter.fetch_catalog() {
                if ids.insert(item.id.clone()) {
                    items.push(item);
                }
            }
        }

        Self { providers, items }
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items matching `filter`, highest rating first.
    pub fn filter(&self, filter: &CatalogFilter) -> Vec<CatalogItem> {
        filter_catalog(&self.items, filter)
    }
}

/// Applies `filter` to `items` and orders the result by rating, highest
/// first.  Items with equal ratings keep their catalog order.
pub fn filter_catalog(items: &[CatalogItem], filter: &CatalogFilter) -> Vec<CatalogItem> {
    let mut filtered: Vec<CatalogItem> = items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect();
    filtered.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    filtered
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Adapter whose raw listing is supplied by the test.
    struct FixedAdapter {
        provider_id: &'static str,
        items: Vec<CatalogItem>,
    }

    impl CatalogAdapter for FixedAdapter {
        fn provider(&self) -> Provider {
            Provider {
                id: self.provider_id.to_string(),
                name: format!("{} Name", self.provider_id),
                region: "Global".to_string(),
                source_url: format!("https://{}.example", self.provider_id),
            }
        }

        fn fetch_raw(&self) -> Vec<CatalogItem> {
            self.items.clone()
        }
    }

    fn raw_item(id: &str, name: &str, rating: f64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            category: "Tools".to_string(),
            provider_id: String::new(),
            provider_name: String::new(),
            source_url: String::new(),
            price_usd: 1.5,
            rating,
            stock: 10,
        }
    }

    fn adapter(provider_id: &'static str, items: Vec<CatalogItem>) -> Box<dyn CatalogAdapter> {
        Box::new(FixedAdapter { provider_id, items })
    }

    #[test]
    fn test_normalize_fills_provider_fields_from_adapter() {
        // Arrange
        let a = FixedAdapter {
            provider_id: "p1",
            items: vec![raw_item("x", "  Padded Name ", 4.0)],
        };

        // Act
        let items = a.fetch_catalog();

        // Assert
        assert_eq!(items[0].provider_id, "p1");
        assert_eq!(items[0].provider_name, "p1 Name");
        assert_eq!(items[0].source_url, "https://p1.example");
        assert_eq!(items[0].name, "Padded Name");
    }

    #[test]
    fn test_validate_rejects_missing_name() {
        let a = FixedAdapter {
            provider_id: "p1",
            items: vec![],
        };
        let mut item = raw_item("x", "", 4.0);
        item.provider_id = "p1".to_string();

        let result = a.validate(&item);

        assert_eq!(
            result,
            Err(AdapterError::MissingField {
                item_id: "x".to_string(),
                field: "name",
            })
        );
    }

    #[test]
    fn test_validate_rejects_negative_price_and_bad_rating() {
        let a = FixedAdapter {
            provider_id: "p1",
            items: vec![],
        };
        let mut cheap = raw_item("cheap", "Cheap", 4.0);
        cheap.provider_id = "p1".to_string();
        cheap.price_usd = -0.01;
        let mut overrated = raw_item("over", "Over", 5.1);
        overrated.provider_id = "p1".to_string();

        assert!(matches!(
            a.validate(&cheap),
            Err(AdapterError::NegativePrice { .. })
        ));
        assert!(matches!(
            a.validate(&overrated),
            Err(AdapterError::RatingOutOfRange { .. })
        ));
    }

    #[test]
    fn test_fetch_catalog_drops_invalid_items() {
        let a = FixedAdapter {
            provider_id: "p1",
            items: vec![raw_item("ok", "Fine", 4.0), raw_item("bad", "Bad", 9.0)],
        };

        let items = a.fetch_catalog();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "ok");
    }

    #[test]
    fn test_build_keeps_first_item_for_duplicate_id() {
        // Arrange – both adapters list "dup"
        let adapters = vec![
            adapter("p1", vec![raw_item("dup", "First", 3.0)]),
            adapter("p2", vec![raw_item("dup", "Second", 4.0), raw_item("y", "Y", 2.0)]),
        ];

        // Act
        let index = CatalogIndex::build(&adapters);

        // Assert
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("dup").unwrap().name, "First");
        assert_eq!(index.providers().len(), 2);
    }

    #[test]
    fn test_filter_orders_by_rating_descending() {
        let adapters = vec![adapter(
            "p1",
            vec![
                raw_item("low", "Low", 1.0),
                raw_item("high", "High", 4.9),
                raw_item("mid", "Mid", 3.0),
            ],
        )];
        let index = CatalogIndex::build(&adapters);

        let ids: Vec<String> = index
            .filter(&CatalogFilter::unfiltered())
            .into_iter()
            .map(|item| item.id)
            .collect();

        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_filter_keeps_catalog_order_for_equal_ratings() {
        let items = vec![raw_item("a", "A", 4.0), raw_item("b", "B", 4.0)];
        let filtered = filter_catalog(&items, &CatalogFilter::unfiltered());
        assert_eq!(filtered[0].id, "a");
        assert_eq!(filtered[1].id, "b");
    }

    #[test]
    fn test_filter_applies_query_and_provider() {
        let adapters = vec![
            adapter("p1", vec![raw_item("a", "Editor", 4.0)]),
            adapter("p2", vec![raw_item("b", "Editor Pro", 4.5)]),
        ];
        let index = CatalogIndex::build(&adapters);

        let filtered = index.filter(&CatalogFilter::new(Some("editor"), Some("P2")));

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "b");
    }

    #[test]
    fn test_empty_index_filters_to_nothing() {
        let index = CatalogIndex::default();
        assert!(index.is_empty());
        assert!(index.filter(&CatalogFilter::unfiltered()).is_empty());
    }
}
