//! Persisted record of the last spawned server.
//!
//! Lets a later controller find a server started by an earlier one.
//!
//! Format: line-oriented text file
//! ```text
//! <pid>
//! <port>
//! <model name>
//! <llama-server binary>   (optional)
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use llamadeck_core::paths::state_file_path;

/// Contents of the state file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRecord {
    pub pid: u32,
    pub port: u16,
    pub model: String,
    /// Binary the server was launched from.
    pub binary: Option<PathBuf>,
}

/// Handle on the state file at a fixed path.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The state file under the llamadeck data directory.
    pub fn default_location() -> io::Result<Self> {
        state_file_path().map(Self::at).map_err(io::Error::other)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write atomically using temp file + rename.
    pub fn write(&self, record: &StateRecord) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut content = format!("{}\n{}\n{}\n", record.pid, record.port, record.model);
        if let Some(binary) = &record.binary {
            content.push_str(&binary.to_string_lossy());
            content.push('\n');
        }
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path)
    }

    /// `Ok(None)` when no state file exists.
    pub fn read(&self) -> io::Result<Option<StateRecord>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => parse(&content).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete the state file (idempotent - no error if missing).
    pub fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn parse(content: &str) -> io::Result<StateRecord> {
    let invalid = |what: &str| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Invalid {what} in state file"),
        )
    };

    let mut lines = content.lines();
    let pid = lines
        .next()
        .and_then(|l| l.trim().parse().ok())
        .ok_or_else(|| invalid("PID"))?;
    let port = lines
        .next()
        .and_then(|l| l.trim().parse().ok())
        .ok_or_else(|| invalid("port"))?;
    let model = lines
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| invalid("model"))?
        .to_string();
    let binary = lines
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from);

    Ok(StateRecord {
        pid,
        port,
        model,
        binary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StateRecord {
        StateRecord {
            pid: 4242,
            port: 8080,
            model: "qwen2.5-7b.gguf".to_string(),
            binary: Some(PathBuf::from("/opt/llama.cpp/bin/llama-server")),
        }
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::at(dir.path().join("nested/server.pid"));

        file.write(&record()).unwrap();
        assert_eq!(file.read().unwrap(), Some(record()));
        assert!(!file.path().with_extension("tmp").exists());
    }

    #[test]
    fn missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(StateFile::at(dir.path().join("server.pid")).read().unwrap(), None);
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::at(dir.path().join("server.pid"));
        file.write(&record()).unwrap();

        file.remove().unwrap();
        file.remove().unwrap();
        assert!(!file.path().exists());
    }

    #[test]
    fn malformed_content_rejected() {
        assert!(parse("not-a-pid\n8080\nm.gguf\n").is_err());
        assert!(parse("12\n").is_err());
        assert!(parse("12\n8080\n\n").is_err());
        assert_eq!(parse("12\n8080\nm.gguf").unwrap().pid, 12);
    }

    #[test]
    fn binary_line_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::at(dir.path().join("server.pid"));
        let record = StateRecord {
            binary: None,
            ..record()
        };

        file.write(&record).unwrap();
        assert_eq!(file.read().unwrap(), Some(record.clone()));
        assert_eq!(parse("4242\n8080\nqwen2.5-7b.gguf\n").unwrap(), record);
    }
}
