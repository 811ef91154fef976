//! Roster file persistence

use super::Client;
use crate::error::{PanelError, Result};
#[cfg(unix)]
use crate::security::ROSTER_FILE_MODE;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Reads and writes the JSON roster file
#[derive(Debug, Clone)]
pub struct RosterStore {
    path: PathBuf,
}

impl RosterStore {
    /// Create a store for the roster at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the roster file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the data directory and an empty roster if none exists
    pub async fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    PanelError::Roster(format!(
                        "Failed to create data directory {:?}: {}",
                        parent, e
                    ))
                })?;
            }
        }

        if fs::try_exists(&self.path).await? {
            debug!("Roster already present at {:?}", self.path);
            return Ok(());
        }

        info!("Creating empty roster at {:?}", self.path);
        self.save(&[]).await
    }

    /// Load all clients
    ///
    /// A missing file is an empty roster. A file that does not parse is an
    /// error, so a damaged roster is never overwritten with an empty one.
    pub async fn load(&self) -> Result<Vec<Client>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PanelError::Roster(format!(
                    "Failed to read roster {:?}: {}",
                    self.path, e
                )))
            }
        };

        serde_json::from_str(&contents).map_err(|e| {
            PanelError::Roster(format!("Failed to parse roster {:?}: {}", self.path, e))
        })
    }

    /// Replace the roster with `clients`
    pub async fn save(&self, clients: &[Client]) -> Result<()> {
        let json = serde_json::to_string_pretty(clients)?;

        let tmp = self.path.with_extension("json.tmp");
        write_private(&tmp, json.as_bytes()).await.map_err(|e| {
            PanelError::Roster(format!("Failed to write roster {:?}: {}", tmp, e))
        })?;
        fs::rename(&tmp, &self.path).await.map_err(|e| {
            PanelError::Roster(format!("Failed to replace roster {:?}: {}", self.path, e))
        })?;

        debug!("Saved {} client(s) to {:?}", clients.len(), self.path);
        Ok(())
    }
}

/// Write `contents` to a file only the owner can read (the roster holds
/// private keys)
async fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(ROSTER_FILE_MODE);

    let mut file = options.open(path).await?;
    file.write_all(contents).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::test_support::client;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_empty_roster() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("nested").join("clients.json");
        let store = RosterStore::new(&path);

        store.init().await.unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_init_keeps_existing_roster() {
        let tmp_dir = TempDir::new().unwrap();
        let store = RosterStore::new(tmp_dir.path().join("clients.json"));
        store.save(&[client("laptop", "10.8.0.2/32")]).await.unwrap();

        store.init().await.unwrap();
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let tmp_dir = TempDir::new().unwrap();
        let store = RosterStore::new(tmp_dir.path().join("clients.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let tmp_dir = TempDir::new().unwrap();
        let store = RosterStore::new(tmp_dir.path().join("clients.json"));
        let clients = vec![
            client("laptop", "10.8.0.2/32"),
            client("phone", "10.8.0.3/32"),
        ];

        store.save(&clients).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, clients);

        // Pretty-printed with two-space indentation
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("[\n  {\n    \"id\""));
        assert!(!tmp_dir.path().join("clients.json.tmp").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_roster_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp_dir = TempDir::new().unwrap();
        let store = RosterStore::new(tmp_dir.path().join("clients.json"));
        store.init().await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_corrupt_roster_is_error() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("clients.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = RosterStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, PanelError::Roster(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }
}
