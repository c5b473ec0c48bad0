//! Change notifier for the cluster context file
//!
//! Watches one file (through its directory, so editors that replace the file are seen)
//! and broadcasts a `FileChanged` for every matching filesystem event. Events are not
//! coalesced; subscribers must tolerate duplicates.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tekton_shared::{Result, TektonError};
use tokio::sync::broadcast;
use tracing::{debug, error, info};

const CHANNEL_CAPACITY: usize = 64;

/// Emitted when the watched file changed. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileChanged;

pub struct ChangeNotifier {
    path: PathBuf,
    sender: broadcast::Sender<FileChanged>,
    watcher: Mutex<Option<RecommendedWatcher>>,
    closed: Arc<AtomicBool>,
}

impl ChangeNotifier {
    /// Start watching `directory/file_name`
    pub fn watch(directory: &Path, file_name: &str) -> Result<Self> {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let closed = Arc::new(AtomicBool::new(false));

        let tx = sender.clone();
        let flag = closed.clone();
        let target = file_name.to_string();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if flag.load(Ordering::SeqCst) {
                return;
            }
            match res {
                Ok(event) if is_change_of(&event, &target) => {
                    debug!("Context file event: {:?}", event.kind);
                    // No subscribers is fine; nothing to refresh yet.
                    let _ = tx.send(FileChanged);
                }
                Ok(_) => {}
                Err(e) => error!("Error watching context file: {}", e),
            }
        })
        .map_err(|e| TektonError::Watch(format!("Failed to create watcher: {}", e)))?;

        watcher
            .watch(directory, RecursiveMode::NonRecursive)
            .map_err(|e| {
                TektonError::Watch(format!(
                    "Failed to watch directory {}: {}",
                    directory.display(),
                    e
                ))
            })?;

        let path = directory.join(file_name);
        info!("Watching cluster context file {}", path.display());

        Ok(Self {
            path,
            sender,
            watcher: Mutex::new(Some(watcher)),
            closed,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FileChanged> {
        self.sender.subscribe()
    }

    /// Release the OS watch handle. No events fire afterwards.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if self.watcher.lock().take().is_some() {
            debug!("Stopped watching {}", self.path.display());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

fn is_change_of(event: &Event, file_name: &str) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    );
    relevant
        && event
            .paths
            .iter()
            .any(|p| p.file_name().and_then(|n| n.to_str()) == Some(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_emits_on_content_change() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config"), "a").unwrap();

        let notifier = ChangeNotifier::watch(temp_dir.path(), "config").unwrap();
        let mut rx = notifier.subscribe();

        std::fs::write(temp_dir.path().join("config"), "current-context: b").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no change event")
            .unwrap();
        assert_eq!(event, FileChanged);
    }

    #[tokio::test]
    async fn test_ignores_other_files() {
        let temp_dir = TempDir::new().unwrap();
        let notifier = ChangeNotifier::watch(temp_dir.path(), "config").unwrap();
        let mut rx = notifier.subscribe();

        std::fs::write(temp_dir.path().join("cache.json"), "{}").unwrap();

        let waited = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_no_events_after_close() {
        let temp_dir = TempDir::new().unwrap();
        let notifier = ChangeNotifier::watch(temp_dir.path(), "config").unwrap();
        let mut rx = notifier.subscribe();

        notifier.close();
        assert!(notifier.is_closed());
        std::fs::write(temp_dir.path().join("config"), "changed").unwrap();

        let waited = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(waited.is_err());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        assert!(matches!(
            ChangeNotifier::watch(&missing, "config"),
            Err(TektonError::Watch(_))
        ));
    }
}
