//! Batched chart export.
//!
//! Walks the registry in registration order and triggers one export per
//! record, staggered at a fixed interval so a browser-style download
//! target is never hit with a burst. Exports are best-effort: one
//! record's failure is logged and never stops the rest of the batch.

use crate::registry::ChartRegistry;
use sheetchat_core::error::Result;
use std::time::Duration;

/// Fixed delay between consecutive exports in a batch.
pub const EXPORT_STAGGER: Duration = Duration::from_millis(300);

/// Delivery target for exported images (a download trigger, a directory
/// writer in tests).
pub trait ExportSink: Send + Sync {
    fn deliver(&self, filename: &str, image: &[u8]) -> Result<()>;
}

/// Schedules staggered, best-effort batch exports over a registry.
#[derive(Debug, Clone)]
pub struct ExportCoordinator {
    stagger: Duration,
}

impl Default for ExportCoordinator {
    fn default() -> Self {
        Self {
            stagger: EXPORT_STAGGER,
        }
    }
}

impl ExportCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the stagger interval.
    pub fn with_stagger(stagger: Duration) -> Self {
        Self { stagger }
    }

    /// Exports every registered chart, in registration order, at offsets
    /// 0, 1x, 2x, ... of the stagger interval. Returns how many exports
    /// were delivered. An empty registry performs zero operations.
    pub async fn export_all(&self, registry: &ChartRegistry, sink: &dyn ExportSink) -> usize {
        let entry_ids = registry.entry_ids();
        if entry_ids.is_empty() {
            tracing::info!("nothing to export");
            return 0;
        }

        let mut delivered = 0;
        for (index, entry_id) in entry_ids.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.stagger).await;
            }

            match registry.export_one(entry_id) {
                Ok(export) => match sink.deliver(&export.filename, &export.image) {
                    Ok(()) => delivered += 1,
                    Err(error) => {
                        tracing::warn!(%entry_id, %error, "chart export delivery failed");
                    }
                },
                Err(error) => {
                    tracing::warn!(%entry_id, %error, "chart export failed");
                }
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::test_support::MockRenderer;
    use serde_json::json;
    use sheetchat_core::error::SheetchatError;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    struct RecordingSink {
        deliveries: Mutex<Vec<(String, Instant)>>,
        attempts: Mutex<usize>,
        fail_on: Option<usize>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                deliveries: Mutex::new(Vec::new()),
                attempts: Mutex::new(0),
                fail_on: None,
            }
        }
    }

    impl ExportSink for RecordingSink {
        fn deliver(&self, filename: &str, _image: &[u8]) -> sheetchat_core::error::Result<()> {
            let mut attempts = self.attempts.lock().unwrap();
            let attempt = *attempts;
            *attempts += 1;
            if self.fail_on == Some(attempt) {
                return Err(SheetchatError::chart("sink full"));
            }
            self.deliveries
                .lock()
                .unwrap()
                .push((filename.to_string(), Instant::now()));
            Ok(())
        }
    }

    fn registry_with(entries: &[&str]) -> ChartRegistry {
        let mut registry = ChartRegistry::new(Arc::new(MockRenderer::default()));
        for entry in entries {
            registry
                .register(entry, &json!({"title": {"text": *entry}}))
                .unwrap();
        }
        registry
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_charts_staggered_at_fixed_offsets() {
        let registry = registry_with(&["e1", "e2", "e3"]);
        let sink = RecordingSink::new();

        let start = Instant::now();
        let delivered = ExportCoordinator::new().export_all(&registry, &sink).await;
        assert_eq!(delivered, 3);

        let deliveries = sink.deliveries.lock().unwrap();
        let offsets: Vec<Duration> = deliveries.iter().map(|(_, at)| *at - start).collect();
        assert_eq!(
            offsets,
            vec![
                Duration::from_millis(0),
                Duration::from_millis(300),
                Duration::from_millis(600)
            ]
        );
        // Registration order is preserved
        assert!(deliveries[0].0.starts_with("e1_"));
        assert!(deliveries[2].0.starts_with("e3_"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_registry_exports_nothing() {
        let registry = registry_with(&[]);
        let sink = RecordingSink::new();

        let start = Instant::now();
        let delivered = ExportCoordinator::new().export_all(&registry, &sink).await;
        assert_eq!(delivered, 0);
        assert!(sink.deliveries.lock().unwrap().is_empty());
        // No scheduling happened at all
        assert_eq!(Instant::now() - start, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failure_does_not_stop_the_batch() {
        let registry = registry_with(&["e1", "e2", "e3"]);
        let mut sink = RecordingSink::new();
        sink.fail_on = Some(1);

        let delivered = ExportCoordinator::new().export_all(&registry, &sink).await;
        assert_eq!(delivered, 2);

        let deliveries = sink.deliveries.lock().unwrap();
        assert!(deliveries[0].0.starts_with("e1_"));
        assert!(deliveries[1].0.starts_with("e3_"));
    }
}
