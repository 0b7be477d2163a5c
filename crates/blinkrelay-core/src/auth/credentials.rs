use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::StoredSession;

/// Somewhere a session can be persisted between process runs.
pub trait SessionStore {
    fn load(&self) -> Result<Option<StoredSession>>;
    fn save(&self, stored: &StoredSession) -> Result<()>;
    /// Human-readable location for log and error messages
    fn location(&self) -> String;
}

/// File-backed session store. The file holds the token material as JSON.
/// One process at a time; there is no locking.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for CredentialStore {
    fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read credential file")?;
        let stored: StoredSession =
            serde_json::from_str(&contents).context("Failed to parse credential file")?;
        Ok(Some(stored))
    }

    fn save(&self, stored: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create credential directory")?;
            }
        }
        let contents = serde_json::to_string_pretty(stored)?;
        write_private(&self.path, &contents)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Write `contents` to a file only the owner can read. The mode is set at
/// creation, and tightened before writing when the file already existed.
fn write_private(path: &Path, contents: &str) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).context("Failed to open credential file")?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .context("Failed to restrict credential file permissions")?;
    }
    file.write_all(contents.as_bytes())
        .context("Failed to write credential file")?;
    Ok(())
}
