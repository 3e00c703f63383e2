//! Configuration file watcher for hot reload.
//!
//! Only configurations that pass validation are sent on; a broken edit
//! leaves the running gate untouched.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::EdgeConfig;
use crate::observability::metrics;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<EdgeConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<EdgeConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Config file change detected, reloading");
                        match load_config(&path) {
                            Ok(new_config) => {
                                tracing::debug!(
                                    app_upstream = %new_config.app.upstream_url,
                                    backend = ?new_config.backend.base_url,
                                    locales = ?new_config.locale.locales,
                                    "Reloaded gate configuration validated"
                                );
                                if tx.send(new_config).is_err() {
                                    tracing::warn!("Server is gone, dropping reloaded configuration");
                                }
                            }
                            Err(e) => {
                                metrics::record_config_reload(false);
                                tracing::error!(
                                    path = ?path,
                                    error = %e,
                                    "Rejected config edit, gate keeps its current rules"
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_edit_is_delivered_after_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[app]\nupstream_url = \"http://renderer-a:3000\"").unwrap();

        let (watcher, mut updates) = ConfigWatcher::new(file.path());
        let _handle = watcher.run().unwrap();

        std::fs::write(file.path(), "[app]\nupstream_url = \"http://renderer-b:3000\"\n").unwrap();

        // A truncate-then-write may surface an intermediate empty file first.
        let delivered = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(config) = updates.recv().await {
                if config.app.upstream_url == "http://renderer-b:3000" {
                    return true;
                }
            }
            false
        })
        .await;
        assert!(matches!(delivered, Ok(true)), "reloaded config never arrived");
    }
}
