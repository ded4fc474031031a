//! TFTMeta: team-composition and overlay tooling.

use forge_core::{CatalogItem, Provider};

use crate::application::catalog_index::CatalogAdapter;

const PROVIDER_ID: &str = "tftmeta";
const PROVIDER_NAME: &str = "TFTMeta";
const SOURCE_URL: &str = "https://tftmeta.gg";

pub struct TftMetaAdapter;

impl CatalogAdapter for TftMetaAdapter {
    fn provider(&self) -> Provider {
        Provider {
            id: PROVIDER_ID.to_string(),
            name: PROVIDER_NAME.to_string(),
            region: "Global".to_string(),
            source_url: SOURCE_URL.to_string(),
        }
    }

    fn fetch_raw(&self) -> Vec<CatalogItem> {
        [
            ("tftmeta-comp-scout", "Comp Scout Pack", "Team Comp", 2.49, 4.7, 150),
            ("tftmeta-trait-tracker", "Trait Tracker Widget", "Overlay Widget", 3.99, 4.5, 80),
            ("tftmeta-level-timer", "Level Timer HUD", "HUD", 1.99, 4.2, 210),
        ]
        .into_iter()
        .map(|(id, name, category, price_usd, rating, stock)| CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            provider_id: PROVIDER_ID.to_string(),
            provider_name: PROVIDER_NAME.to_string(),
            source_url: SOURCE_URL.to_string(),
            price_usd,
            rating,
            stock,
        })
        .collect()
    }
}
