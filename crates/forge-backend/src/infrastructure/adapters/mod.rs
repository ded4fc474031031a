//! Built-in upstream provider adapters.
//!
//! Each adapter returns a fixed listing for its provider.  Adding a provider
//! means adding a module here and listing it in [`configured_adapters`].

use crate::application::catalog_index::CatalogAdapter;

pub mod porofessor;
pub mod tftmeta;

/// Every adapter the backend builds its catalog from, in listing order.
pub fn configured_adapters() -> Vec<Box<dyn CatalogAdapter>> {
    vec![
        Box::new(tftmeta::TftMetaAdapter),
        Box::new(porofessor::PorofessorAdapter),
    ]
}
