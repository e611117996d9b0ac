//! Durable JSON-lines observer
//!
//! Appends one line per monitor notification:
//!
//! ```text
//! {"type":"event","strategy_name":"cache_aside","subject_id":7,...}
//! {"type":"alert","kind":"slow_query","message":"...",...}
//! ```

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use dashgate_core::monitor::{MonitorNotification, ObserverError, PerformanceObserver};
use dashgate_domain::{Alert, ExecutionEvent};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::errors::InfraResult;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LogLine<'a> {
    Event(&'a ExecutionEvent),
    Alert(&'a Alert),
}

impl<'a> From<&MonitorNotification<'a>> for LogLine<'a> {
    fn from(notification: &MonitorNotification<'a>) -> Self {
        match *notification {
            MonitorNotification::Event(event) => LogLine::Event(event),
            MonitorNotification::Alert(alert) => LogLine::Alert(alert),
        }
    }
}

pub struct FileLogObserver {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileLogObserver {
    /// Open `path` for appending, creating it and its parent directories.
    pub fn open(path: impl AsRef<Path>) -> InfraResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        debug!(path = %path.display(), "File log observer opened");
        Ok(Self { path, file: Mutex::new(file) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for FileLogObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLogObserver").field("path", &self.path).finish()
    }
}

impl PerformanceObserver for FileLogObserver {
    fn name(&self) -> &str {
        "file_log"
    }

    fn update(&self, notification: &MonitorNotification<'_>) -> Result<(), ObserverError> {
        let mut line = serde_json::to_vec(&LogLine::from(notification))?;
        line.push(b'\n');

        let mut file = self.file.lock();
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }
}
