//! Chart instance registry.
//!
//! Maps transcript-entry ids to live rendering handles, 1:1. The registry
//! exclusively owns its handles: it creates one per entry on first sight,
//! updates it in place on re-registration, and is solely responsible for
//! disposal. No other component may hold a handle across a disposal
//! boundary. Records keep registration order, which the export
//! coordinator relies on.

use crate::normalize::{chart_title, normalize_chart_config};
use serde_json::Value;
use sheetchat_core::error::{Result, SheetchatError};
use std::sync::Arc;

/// Fallback filename stem when a chart declares no title.
const DEFAULT_EXPORT_STEM: &str = "chart";

/// Raster export parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Pixel density multiplier.
    pub pixel_ratio: f64,
    /// Background fill; exports are opaque.
    pub background: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pixel_ratio: 2.0,
            background: "#ffffff".to_string(),
        }
    }
}

/// A live, disposable rendering-engine instance bound to one entry's
/// chart configuration.
pub trait ChartHandle: Send {
    /// Replaces the handle's configuration in place.
    fn apply(&mut self, config: &Value) -> Result<()>;

    /// Renders the handle's current state to a raster image.
    fn render_png(&self, options: &RenderOptions) -> Result<Vec<u8>>;

    /// Releases engine resources. Called exactly once by the registry;
    /// implementations should tolerate further calls as no-ops.
    fn dispose(&mut self);
}

/// Factory seam for the rendering engine.
pub trait ChartRenderer: Send + Sync {
    fn create(&self, config: &Value) -> Result<Box<dyn ChartHandle>>;
}

struct ChartRecord {
    entry_id: String,
    title: Option<String>,
    handle: Box<dyn ChartHandle>,
}

/// One rendered image ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartExport {
    pub filename: String,
    pub image: Vec<u8>,
}

/// Owned mapping from transcript-entry id to rendering handle.
///
/// Owned by exactly one view; teardown goes through [`Self::clear`].
pub struct ChartRegistry {
    renderer: Arc<dyn ChartRenderer>,
    records: Vec<ChartRecord>,
}

impl ChartRegistry {
    pub fn new(renderer: Arc<dyn ChartRenderer>) -> Self {
        Self {
            renderer,
            records: Vec::new(),
        }
    }

    /// Registers a chart for an entry. First registration creates a
    /// handle; re-registration for the same id updates the existing
    /// handle's configuration in place (idempotent upsert).
    pub fn register(&mut self, entry_id: &str, config: &Value) -> Result<()> {
        let normalized = normalize_chart_config(config);
        let title = chart_title(&normalized).map(str::to_string);

        if let Some(record) = self.record_mut(entry_id) {
            record.handle.apply(&normalized)?;
            record.title = title;
            return Ok(());
        }

        let handle = self.renderer.create(&normalized)?;
        self.records.push(ChartRecord {
            entry_id: entry_id.to_string(),
            title,
            handle,
        });
        Ok(())
    }

    /// Disposes the handle for an entry and removes its record.
    /// Double-unregister and never-registered ids are no-ops.
    pub fn unregister(&mut self, entry_id: &str) {
        if let Some(index) = self.records.iter().position(|r| r.entry_id == entry_id) {
            let mut record = self.records.remove(index);
            record.handle.dispose();
        }
    }

    /// Disposes every handle. Called once on view teardown.
    pub fn clear(&mut self) {
        for record in &mut self.records {
            record.handle.dispose();
        }
        self.records.clear();
    }

    /// Entry ids in registration order.
    pub fn entry_ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.entry_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, entry_id: &str) -> bool {
        self.records.iter().any(|r| r.entry_id == entry_id)
    }

    /// Renders one chart to an image named after its title (falling back
    /// to a literal "chart") plus a timestamp.
    pub fn export_one(&self, entry_id: &str) -> Result<ChartExport> {
        let record = self
            .records
            .iter()
            .find(|r| r.entry_id == entry_id)
            .ok_or_else(|| SheetchatError::not_found("chart", entry_id))?;

        let image = record.handle.render_png(&RenderOptions::default())?;
        let stem = sanitize_stem(record.title.as_deref().unwrap_or(DEFAULT_EXPORT_STEM));
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        Ok(ChartExport {
            filename: format!("{stem}_{timestamp}.png"),
            image,
        })
    }

    fn record_mut(&mut self, entry_id: &str) -> Option<&mut ChartRecord> {
        self.records.iter_mut().find(|r| r.entry_id == entry_id)
    }
}

/// Makes a chart title safe to use as a filename stem: path separators and
/// other filesystem-hostile characters become underscores. Titles that
/// reduce to nothing fall back to the default stem.
fn sanitize_stem(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim();
    let only_filler = cleaned
        .chars()
        .all(|c| c == '_' || c.is_whitespace());
    if only_filler {
        DEFAULT_EXPORT_STEM.to_string()
    } else {
        cleaned.to_string()
    }
}

impl Drop for ChartRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}
