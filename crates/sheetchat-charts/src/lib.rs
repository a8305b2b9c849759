//! Chart-handle lifecycle for the sheetchat client.
//!
//! A transcript entry that carries a chart config gets exactly one live
//! rendering handle, created when the entry is first displayed and
//! disposed when its view unmounts. This crate owns that bookkeeping: the
//! registry (idempotent upsert/dispose keyed by entry id), config
//! normalization before a handle sees it, and the staggered export-all
//! batch.

pub mod export;
pub mod normalize;
pub mod registry;

pub use export::{EXPORT_STAGGER, ExportCoordinator, ExportSink};
pub use normalize::{chart_title, normalize_chart_config};
pub use registry::{ChartExport, ChartHandle, ChartRegistry, ChartRenderer, RenderOptions};
