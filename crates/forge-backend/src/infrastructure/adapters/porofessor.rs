//! Porofessor: match analysis and session tooling.
//!
//! The upstream listing does not repeat provider fields per item; the
//! default [`CatalogAdapter::normalize`] fills them in.

use forge_core::{CatalogItem, Provider};

use crate::application::catalog_index::CatalogAdapter;

pub struct PorofessorAdapter;

impl CatalogAdapter for PorofessorAdapter {
    fn provider(&self) -> Provider {
        Provider {
            id: "porofessor".to_string(),
            name: "Porofessor".to_string(),
            region: "Global".to_string(),
            source_url: "https://porofessor.gg".to_string(),
        }
    }

    fn fetch_raw(&self) -> Vec<CatalogItem> {
        [
            ("porofessor-match-insight", "Match Insight Panel", "Analysis", 4.99, 4.8, 95),
            ("porofessor-rune-assist", "Rune Assist Module", "Assistant", 2.99, 4.4, 180),
            ("porofessor-session-recap", "Session Recap Exporter", "Reporting", 5.49, 4.6, 70),
        ]
        .into_iter()
        .map(|(id, name, category, price_usd, rating, stock)| CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            provider_id: String::new(),
            provider_name: String::new(),
            source_url: String::new(),
            price_usd,
            rating,
            stock,
        })
        .collect()
    }
}
