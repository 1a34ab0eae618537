//! Persisted login session.
//!
//! Records which user is logged in between invocations. The file is plain
//! JSON; a missing file means nobody is logged in.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{GatorError, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    current_user: Option<String>,
}

/// Who is logged in.
#[derive(Debug, Default)]
pub struct Session {
    current_user: Option<String>,
    path: Option<PathBuf>,
}

impl Session {
    /// Session that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the session stored at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str::<SessionFile>(&content).map_err(|e| {
                GatorError::Config(format!("invalid session file {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No session file");
                SessionFile::default()
            }
            Err(e) => return Err(GatorError::Io(e)),
        };

        Ok(Self {
            current_user: file.current_user,
            path: Some(path.to_path_buf()),
        })
    }

    /// Name of the logged-in user, if any.
    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    /// Log `name` in and persist.
    pub fn set_user(&mut self, name: impl Into<String>) -> Result<()> {
        self.current_user = Some(name.into());
        self.save()
    }

    /// Log out and persist.
    pub fn clear(&mut self) -> Result<()> {
        self.current_user = None;
        self.save()
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = SessionFile {
            current_user: self.current_user.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| GatorError::Config(format!("failed to encode session: {e}")))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
