use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::pool::types::ProviderEntry;

pub(crate) type PoolMap = DashMap<String, Vec<ProviderEntry>>;

/// Reads the pool document. A missing file is an empty document; anything
/// else that fails is an error the caller must treat as "do not write".
pub(crate) fn read_pool_document(
    path: &Path,
) -> Result<serde_json::Map<String, serde_json::Value>, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(serde_json::Map::new()),
        Err(e) => return Err(format!("failed_to_read_pool_document: {}", e)),
    };

    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("failed_to_parse_pool_document: {}", e))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Ok(serde_json::Map::new()),
        _ => Err("pool_document_is_not_a_json_object".to_string()),
    }
}

fn write_pool_document(
    path: &Path,
    document: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("failed_to_create_pool_directory: {}", e))?;
        }
    }

    let content = serde_json::to_string_pretty(document)
        .map_err(|e| format!("failed_to_serialize_pool_document: {}", e))?;

    // Temp file + rename so a crash mid-write cannot truncate the document.
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)
        .map_err(|e| format!("failed_to_write_pool_document: {}", e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| format!("failed_to_replace_pool_document: {}", e))
}

/// Debounced, coalesced writer for the pool document.
///
/// `schedule` adds a family to the pending set and rearms a single timer;
/// when it fires, every pending family's in-memory list is projected into
/// the on-disk document in one write. Families whose flush fails stay dirty
/// and ride the next debounce.
#[derive(Clone)]
pub(crate) struct SaveScheduler {
    pools: Arc<PoolMap>,
    file_path: PathBuf,
    debounce: Duration,
    pending: Arc<Mutex<HashSet<String>>>,
    timer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SaveScheduler {
    pub(crate) fn new(pools: Arc<PoolMap>, file_path: PathBuf, debounce: Duration) -> Self {
        Self {
            pools,
            file_path,
            debounce,
            pending: Arc::new(Mutex::new(HashSet::new())),
            timer: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn schedule(&self, family: &str) {
        self.pending.lock().insert(family.to_string());

        let mut slot = self.timer.lock();
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        let saver = self.clone();
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(saver.debounce).await;
            saver.flush();
        }));
    }

    /// Writes every pending family immediately. No-op when nothing is dirty.
    pub(crate) fn flush(&self) {
        let families: Vec<String> = {
            let mut pending = self.pending.lock();
            if pending.is_empty() {
                return;
            }
            pending.drain().collect()
        };

        let mut document = match read_pool_document(&self.file_path) {
            Ok(document) => document,
            Err(e) => {
                tracing::error!("[E-POOL-SAVE-READ] aborting_pool_flush: {}", e);
                self.requeue(families);
                return;
            }
        };

        for family in &families {
            let Some(entries) = self.pools.get(family) else {
                continue;
            };
            match serde_json::to_value(entries.value()) {
                Ok(value) => {
                    document.insert(family.clone(), value);
                }
                Err(e) => {
                    tracing::error!(
                        "[E-POOL-SAVE-PROJECT] failed_to_project_family {}: {}",
                        family,
                        e
                    );
                }
            }
        }

        if let Err(e) = write_pool_document(&self.file_path, &document) {
            tracing::error!("[E-POOL-SAVE-WRITE] pool_flush_failed: {}", e);
            self.requeue(families);
            return;
        }

        tracing::debug!(
            "[Persist] Flushed {} family list(s) to {}",
            families.len(),
            self.file_path.display()
        );
    }

    /// Stops the armed timer and flushes whatever is pending. For shutdown.
    pub(crate) fn shutdown_flush(&self) {
        if let Some(handle) = self.timer.lock().take() {
            handle.abort();
        }
        self.flush();
    }

    #[cfg(test)]
    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    fn requeue(&self, families: Vec<String>) {
        let mut pending = self.pending.lock();
        for family in families {
            pending.insert(family);
        }
    }
}
