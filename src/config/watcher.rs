//! File watching for hot reload.
//!
//! Both the configuration file and the registry file are watched the same
//! way: a non-recursive watch on the parent directory, filtered to events
//! naming the file. Files replaced by rename (editors, mounted ConfigMaps)
//! keep being seen.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::TrackerConfig;

/// Watch `path`, calling `on_change` for every content change.
///
/// The watch ends when the returned handle is dropped.
pub fn watch_file<F>(path: &Path, on_change: F) -> Result<RecommendedWatcher, notify::Error>
where
    F: Fn(&EventKind) + Send + 'static,
{
    let file_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| notify::Error::generic("watched path has no file name"))?;
    let dir = watch_dir(path);

    let watched = path.to_path_buf();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) if is_content_change(&event.kind) && names_file(&event, &file_name) => {
                on_change(&event.kind)
            }
            Ok(_) => {}
            Err(e) => tracing::error!(path = ?watched, "Watch error: {:?}", e),
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    )?;

    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

/// Directory holding `path`; a bare file name lives in the working directory.
fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn names_file(event: &Event, file_name: &OsString) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

fn is_content_change(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create() || kind.is_remove()
}

/// Reloads the configuration file and forwards every valid new version.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<TrackerConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<TrackerConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Invalid edits are logged and the current configuration kept.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let reload_path = path.clone();

        let watcher = watch_file(&path, move |_| match load_config(&reload_path) {
            Ok(config) => {
                tracing::info!(path = ?reload_path, "Config file changed, reloading");
                let _ = update_tx.send(config);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
            }
        })?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};

    #[test]
    fn test_content_change_kinds() {
        assert!(is_content_change(&EventKind::Modify(ModifyKind::Any)));
        assert!(is_content_change(&EventKind::Create(CreateKind::File)));
        assert!(!is_content_change(&EventKind::Access(notify::event::AccessKind::Any)));
    }

    #[test]
    fn test_watch_missing_directory_fails() {
        assert!(watch_file(Path::new("/nonexistent/site-tracker.toml"), |_| {}).is_err());
    }

    #[test]
    fn test_watch_dir() {
        assert_eq!(watch_dir(Path::new("sites.toml")), PathBuf::from("."));
        assert_eq!(watch_dir(Path::new("/etc/tracker/sites.toml")), PathBuf::from("/etc/tracker"));
    }

    #[test]
    fn test_events_filtered_by_file_name() {
        let name = OsString::from("sites.toml");
        let ours = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/etc/tracker/sites.toml"));
        let other = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/etc/tracker/.sites.toml.swp"));
        assert!(names_file(&ours, &name));
        assert!(!names_file(&other, &name));
    }

    #[test]
    fn test_replaced_file_still_watched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.toml");
        std::fs::write(&path, "[[sites]]\nid = 1\n").unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        let _watcher = watch_file(&path, move |_| {
            let _ = tx.send(());
        })
        .unwrap();

        // Write a sibling and rename it over the watched file twice.
        for round in 0..2 {
            let staged = dir.path().join(format!("staged-{}", round));
            std::fs::write(&staged, format!("[[sites]]\nid = {}\n", round + 2)).unwrap();
            std::fs::rename(&staged, &path).unwrap();
            assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
            while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}
        }
    }
}
