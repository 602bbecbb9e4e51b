//! FileAlarm - appends notifications to a JSON-lines file

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use contracts::ContractError;
use tracing::{debug, error};

use super::Notification;

/// Alarm that appends one JSON object per line
#[derive(Debug)]
pub struct FileAlarm {
    path: PathBuf,
    file: File,
}

impl FileAlarm {
    /// Open (or create) the output file
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!(path = %path.display(), "FileAlarm opened");

        Ok(Self { path, file })
    }

    pub fn notify(&mut self, notification: &Notification) -> Result<(), ContractError> {
        self.append(notification).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Write failed");
            ContractError::sink_update(&notification.manager, e.to_string())
        })
    }

    fn append(&mut self, notification: &Notification) -> std::io::Result<()> {
        let line = serde_json::to_string(notification)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.file, "{line}")?;
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Event, EventKind, SinkConfig};
    use tempfile::tempdir;

    #[test]
    fn test_file_alarm_appends_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("alarms.jsonl");
        let config = SinkConfig::new("Alpha");

        let mut alarm = FileAlarm::new(&path).unwrap();
        for id in ["a", "b"] {
            let event = Event::new(EventKind::Pokestop, id);
            alarm.notify(&Notification::new(&config, &event, 0)).unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], "a");
        assert_eq!(lines[1]["manager"], "Alpha");
        assert_eq!(lines[1]["kind"], "pokestop");
    }
}
