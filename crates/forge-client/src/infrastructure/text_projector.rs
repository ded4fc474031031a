//! Plain-text projector used by the headless shell.
//!
//! Turns each [`SnapshotView`] into a [`RenderedView`]: a list of titled
//! sections of text lines.  The output is deterministic (no clocks, no
//! locale), so tests can compare it line by line, and it serialises to JSON
//! for a UI shell that prefers to do its own layout.
//!
//! Empty snapshots are rendered with a placeholder line rather than an empty
//! section.

use std::fmt;

use forge_core::{
    CatalogItem, CatalogSnapshot, LibraryEntry, LibrarySnapshot, ProviderSnapshot, RuntimeSnapshot,
};
use serde::Serialize;

use crate::application::projector::{Projector, SnapshotView};

pub const NO_ITEMS: &str = "No apps found for this filter.";
pub const NO_SELECTION: &str = "Pick an app to inspect details.";
pub const NO_LIBRARY: &str = "No apps saved.";
pub const NO_LIBRARY_HINT: &str = "Save apps from Discover and they appear here.";
pub const NO_RUNTIME: &str = "Runtime settings not loaded yet.";
pub const NO_COUNTERS: &str = "Counters not loaded yet.";

/// One titled block of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub heading: String,
    pub lines: Vec<String>,
}

impl Section {
    fn new(heading: &str, lines: Vec<String>) -> Self {
        Self {
            heading: heading.to_string(),
            lines,
        }
    }
}

/// The rendering of one projected snapshot view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedView {
    /// Which part of the store the view came from (see [`SnapshotView::domain`]).
    pub domain: &'static str,
    pub sections: Vec<Section>,
}

impl RenderedView {
    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading == heading)
    }
}

impl fmt::Display for RenderedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "== {} ==", section.heading)?;
            for line in &section.lines {
                writeln!(f, "  {line}")?;
            }
        }
        Ok(())
    }
}

/// Stateless [`Projector`] producing [`RenderedView`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextProjector;

impl Projector for TextProjector {
    type Output = RenderedView;

    fn project(&self, view: SnapshotView<'_>) -> RenderedView {
        let sections = match view {
            SnapshotView::Providers(providers) => vec![providers_section(providers)],
            SnapshotView::Catalog(catalog) => {
                vec![discover_section(catalog), detail_section(catalog)]
            }
            SnapshotView::Runtime(runtime) => vec![runtime_section(runtime)],
            SnapshotView::LibraryWithRuntime { library, runtime } => {
                vec![library_section(library, runtime), runtime_section(runtime)]
            }
        };
        RenderedView {
            domain: view.domain(),
            sections,
        }
    }
}

fn providers_section(snapshot: &ProviderSnapshot) -> Section {
    let mut lines = vec!["All Providers".to_string()];
    lines.extend(
        snapshot
            .providers()
            .iter()
            .map(|p| format!("{} ({}) [{}]", p.name, p.region, p.id)),
    );
    Section::new("Providers", lines)
}

fn discover_section(catalog: &CatalogSnapshot) -> Section {
    if catalog.is_empty() {
        return Section::new("Discover", vec![NO_ITEMS.to_string()]);
    }
    let selected = catalog.selected_id();
    let lines = catalog
        .items()
        .iter()
        .map(|item| {
            let marker = if Some(item.id.as_str()) == selected {
                "> "
            } else {
                "  "
            };
            format!("{marker}{}", item_line(item))
        })
        .collect();
    Section::new("Discover", lines)
}

fn item_line(item: &CatalogItem) -> String {
    format!(
        "{} [{}]: {} • {} • ${:.2}",
        item.name, item.id, item.provider_name, item.category, item.price_usd
    )
}

fn detail_section(catalog: &CatalogSnapshot) -> Section {
    let lines = match catalog.selection() {
        None => vec![NO_SELECTION.to_string()],
        Some(item) => vec![
            item.name.clone(),
            format!("Provider: {}", item.provider_name),
            format!("Category: {}", item.category),
            format!("Price: ${:.2}", item.price_usd),
            format!("Rating: {:.1} / 5", item.rating),
            format!("Stock: {}", item.stock),
            format!("Source: {}", item.source_url),
        ],
    };
    Section::new("Details", lines)
}

fn library_section(library: &LibrarySnapshot, runtime: &RuntimeSnapshot) -> Section {
    if library.is_empty() {
        return Section::new(
            "Library",
            vec![NO_LIBRARY.to_string(), NO_LIBRARY_HINT.to_string()],
        );
    }

    // Counters only ever come from the backend.
    let summary = match runtime.config() {
        Some(config) => format!(
            "{} apps saved, {} running.",
            config.library_count, config.running_count
        ),
        None => NO_COUNTERS.to_string(),
    };

    let mut lines = vec![summary];
    lines.extend(library.entries().iter().map(entry_line));
    Section::new("Library", lines)
}

fn entry_line(entry: &LibraryEntry) -> String {
    let last_launched = entry
        .last_launched
        .map_or_else(|| "never".to_string(), |ts| ts.to_string());
    format!(
        "{} [{}]: {} • {} • v{} • {} • last launched: {}",
        entry.name,
        entry.id,
        entry.provider_name,
        entry.category,
        entry.version,
        entry.state,
        last_launched
    )
}

fn runtime_section(runtime: &RuntimeSnapshot) -> Section {
    let lines = match runtime.config() {
        None => vec![NO_RUNTIME.to_string()],
        Some(config) => vec![
            format!(
                "Low resource mode: {}",
                if config.low_resource_mode { "on" } else { "off" }
            ),
            format!(
                "Data ingestion: {}",
                if config.ingestion_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            ),
            format!("Sync interval: {}s", config.sync_interval_sec),
            format!("Managed apps: {}", config.library_count),
            format!("Running apps: {}", config.running_count),
        ],
    };
    Section::new("Runtime", lines)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::{CatalogFilter, DomainStore, LifecycleState, RuntimeConfig};

    fn item(id: &str, name: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            category: "Overlay".to_string(),
            provider_id: "tftmeta".to_string(),
            provider_name: "TFT Meta".to_string(),
            source_url: "https://tftmeta.example".to_string(),
            price_usd: 4.5,
            rating: 4.5,
            stock: 12,
        }
    }

    fn entry(id: &str, state: LifecycleState) -> LibraryEntry {
        LibraryEntry {
            id: id.to_string(),
            name: "Level Timer".to_string(),
            category: "Overlay".to_string(),
            provider_id: "tftmeta".to_string(),
            provider_name: "TFT Meta".to_string(),
            version: "1.0.0".to_string(),
            state,
            last_launched: None,
        }
    }

    fn project_catalog(store: &DomainStore) -> RenderedView {
        TextProjector.project(SnapshotView::Catalog(store.catalog()))
    }

    #[test]
    fn test_empty_catalog_renders_placeholders() {
        // Arrange
        let store = DomainStore::new();

        // Act
        let view = project_catalog(&store);

        // Assert
        assert_eq!(view.domain, "catalog");
        assert_eq!(view.section("Discover").unwrap().lines, vec![NO_ITEMS]);
        assert_eq!(view.section("Details").unwrap().lines, vec![NO_SELECTION]);
    }

    #[test]
    fn test_selected_item_is_marked_and_detailed() {
        // Arrange
        let mut store = DomainStore::new();
        store.replace_catalog(
            CatalogFilter::unfiltered(),
            vec![item("a", "Alpha"), item("b", "Beta")],
        );
        store.select(item("b", "Beta"));

        // Act
        let view = project_catalog(&store);

        // Assert
        let list = &view.section("Discover").unwrap().lines;
        assert_eq!(list[0], "  Alpha [a]: TFT Meta • Overlay • $4.50");
        assert_eq!(list[1], "> Beta [b]: TFT Meta • Overlay • $4.50");
        let detail = &view.section("Details").unwrap().lines;
        assert_eq!(detail[0], "Beta");
        assert!(detail.contains(&"Rating: 4.5 / 5".to_string()));
        assert!(detail.contains(&"Stock: 12".to_string()));
    }

    #[test]
    fn test_selection_outside_listing_is_detailed_but_not_marked() {
        let mut store = DomainStore::new();
        store.replace_catalog(CatalogFilter::unfiltered(), vec![item("a", "Alpha")]);
        store.select(item("z", "Zeta"));

        let view = project_catalog(&store);

        assert!(view.section("Discover").unwrap().lines[0].starts_with("  "));
        assert_eq!(view.section("Details").unwrap().lines[0], "Zeta");
    }

    #[test]
    fn test_empty_library_renders_hint() {
        let store = DomainStore::new();

        let view = TextProjector.project(SnapshotView::LibraryWithRuntime {
            library: store.library(),
            runtime: store.runtime(),
        });

        assert_eq!(
            view.section("Library").unwrap().lines,
            vec![NO_LIBRARY, NO_LIBRARY_HINT]
        );
        assert_eq!(view.section("Runtime").unwrap().lines, vec![NO_RUNTIME]);
    }

    #[test]
    fn test_library_summary_uses_backend_counters() {
        // Arrange – backend counters deliberately differ from the listed entries
        let mut store = DomainStore::new();
        store.replace_library(vec![entry("e1", LifecycleState::Idle)]);
        store.replace_runtime(RuntimeConfig {
            low_resource_mode: false,
            ingestion_enabled: true,
            sync_interval_sec: 45,
            library_count: 2,
            running_count: 1,
        });

        // Act
        let view = TextProjector.project(SnapshotView::LibraryWithRuntime {
            library: store.library(),
            runtime: store.runtime(),
        });

        // Assert
        let library = &view.section("Library").unwrap().lines;
        assert_eq!(library[0], "2 apps saved, 1 running.");
        assert!(library[1].ends_with("v1.0.0 • idle • last launched: never"));
        let runtime = &view.section("Runtime").unwrap().lines;
        assert_eq!(
            runtime,
            &vec![
                "Low resource mode: off".to_string(),
                "Data ingestion: enabled".to_string(),
                "Sync interval: 45s".to_string(),
                "Managed apps: 2".to_string(),
                "Running apps: 1".to_string(),
            ]
        );
    }

    #[test]
    fn test_library_without_counters_lists_entries_but_no_summary() {
        let mut store = DomainStore::new();
        store.replace_library(vec![
            entry("e1", LifecycleState::Running),
            entry("e2", LifecycleState::Idle),
        ]);

        let view = TextProjector.project(SnapshotView::LibraryWithRuntime {
            library: store.library(),
            runtime: store.runtime(),
        });

        let lines = &view.section("Library").unwrap().lines;
        assert_eq!(lines[0], NO_COUNTERS);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_display_prints_headings_and_indented_lines() {
        let store = DomainStore::new();
        let view = TextProjector.project(SnapshotView::Runtime(store.runtime()));

        assert_eq!(view.to_string(), format!("== Runtime ==\n  {NO_RUNTIME}\n"));
    }
}
