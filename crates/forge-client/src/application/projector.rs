//! Presentation Projector contract.
//!
//! After every store mutation the controller hands the affected part of the
//! store to a [`Projector`] and forwards whatever it returns to the view
//! channel.  The projector only borrows the snapshot for the duration of the
//! call; it must not keep it, mutate anything, or call the backend.
//!
//! Empty catalogs, empty libraries, a cleared selection, and a runtime
//! configuration that has not been fetched yet are all ordinary inputs.

use forge_core::{CatalogSnapshot, LibrarySnapshot, ProviderSnapshot, RuntimeSnapshot};

/// The part of the store that a mutation touched.
#[derive(Debug, Clone, Copy)]
pub enum SnapshotView<'a> {
    Providers(&'a ProviderSnapshot),
    /// Catalog listing together with the selection.
    Catalog(&'a CatalogSnapshot),
    Runtime(&'a RuntimeSnapshot),
    /// A library change and the runtime counters that go with it.  The two
    /// always land together, so they are projected together.
    LibraryWithRuntime {
        library: &'a LibrarySnapshot,
        runtime: &'a RuntimeSnapshot,
    },
}

impl SnapshotView<'_> {
    /// Short domain name used in logs.
    pub fn domain(&self) -> &'static str {
        match self {
            SnapshotView::Providers(_) => "providers",
            SnapshotView::Catalog(_) => "catalog",
            SnapshotView::Runtime(_) => "runtime",
            SnapshotView::LibraryWithRuntime { .. } => "library+runtime",
        }
    }
}

/// Pure function from a snapshot view to a renderable value.
pub trait Projector: Send + Sync + 'static {
    type Output: Send + 'static;

    fn project(&self, view: SnapshotView<'_>) -> Self::Output;
}
