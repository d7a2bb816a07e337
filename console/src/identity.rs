use std::fs;
use std::path::PathBuf;

use anyhow::Context;

/// File-backed display name, the one piece of client state that survives a
/// restart. Mirrors what the rest of the system treats as an opaque
/// get/set pair; the on-disk format is just the trimmed name.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The persisted name, if a non-empty one was ever stored.
    pub fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let name = raw.trim();

        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    pub fn store(&self, name: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("could not create {}", parent.display()))?;
            }
        }

        fs::write(&self.path, name)
            .with_context(|| format!("could not persist identity to {}", self.path.display()))
    }
}
