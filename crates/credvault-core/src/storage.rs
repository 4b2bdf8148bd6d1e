//! File storage for vault snapshots and configuration
//!
//! Handles reading/writing per-user vault files with:
//! - Atomic writes (write to temp, then rename)
//! - A backup of the previous file before each write
//! - Version checking for migrations
//!
//! Snapshots are plain JSON of the record and event shapes. Encryption at
//! rest belongs in a layer below this one.

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::error::{VaultError, VaultResult};
use crate::models::{VaultConfig, VaultSnapshot};

/// Default data directory name
const DATA_DIR: &str = ".credvault";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "CREDVAULT_DIR";

/// Subdirectory holding one file per user
const VAULTS_DIR: &str = "vaults";

/// Config file name
const CONFIG_FILE: &str = "config.toml";

/// Data directory from `CREDVAULT_DIR`, else `~/.credvault`
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR)
}

/// Get the config file path
pub fn config_file_path(base_dir: &Path) -> PathBuf {
    base_dir.join(CONFIG_FILE)
}

/// Get the snapshot path for a user
pub fn vault_file_path(base_dir: &Path, user_id: &Uuid) -> PathBuf {
    base_dir.join(VAULTS_DIR).join(format!("{}.json", user_id))
}

/// Get the backup path for a user's snapshot
pub fn backup_file_path(base_dir: &Path, user_id: &Uuid) -> PathBuf {
    base_dir
        .join(VAULTS_DIR)
        .join(format!("{}.json.backup", user_id))
}

/// Ensure a directory exists with owner-only permissions
pub async fn ensure_dir(dir: &Path) -> VaultResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            std::fs::set_permissions(dir, perms)?;
        }
    }
    Ok(())
}

/// Check if a user has a stored vault
pub async fn vault_exists(base_dir: &Path, user_id: &Uuid) -> bool {
    vault_file_path(base_dir, user_id).exists()
}

/// Load a user's snapshot; a missing file is an empty vault
pub async fn load_snapshot(base_dir: &Path, user_id: &Uuid) -> VaultResult<VaultSnapshot> {
    let path = vault_file_path(base_dir, user_id);

    if !path.exists() {
        return Ok(VaultSnapshot::empty());
    }

    let data = fs::read(&path).await?;
    let snapshot: VaultSnapshot = serde_json::from_slice(&data)?;

    if snapshot.version > VaultSnapshot::CURRENT_VERSION {
        return Err(VaultError::UnsupportedVersion(snapshot.version));
    }

    debug!(path = %path.display(), records = snapshot.records.len(), "Snapshot loaded");
    Ok(snapshot)
}

/// Save a user's snapshot (backs up the previous file first)
pub async fn save_snapshot(
    base_dir: &Path,
    user_id: &Uuid,
    snapshot: &VaultSnapshot,
) -> VaultResult<()> {
    let path = vault_file_path(base_dir, user_id);
    let backup_path = backup_file_path(base_dir, user_id);

    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    if path.exists() {
        if backup_path.exists() {
            fs::remove_file(&backup_path).await?;
        }
        fs::copy(&path, &backup_path).await?;
    }

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("json.tmp");
    write_private_file(&temp_path, &serde_json::to_vec_pretty(snapshot)?).await?;
    fs::rename(&temp_path, &path).await?;

    debug!(path = %path.display(), records = snapshot.records.len(), "Snapshot saved");
    Ok(())
}

/// Delete a user's snapshot and its backup
pub async fn delete_snapshot(base_dir: &Path, user_id: &Uuid) -> VaultResult<()> {
    for path in [
        vault_file_path(base_dir, user_id),
        backup_file_path(base_dir, user_id),
    ] {
        if path.exists() {
            fs::remove_file(&path).await?;
        }
    }
    Ok(())
}

async fn write_private_file(path: &Path, data: &[u8]) -> VaultResult<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;

    // Set file permissions to 600 (owner only) on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Load vault configuration
pub async fn load_config(base_dir: &Path) -> VaultResult<VaultConfig> {
    let config_path = config_file_path(base_dir);

    if !config_path.exists() {
        return Ok(VaultConfig::default());
    }

    let content = fs::read_to_string(&config_path).await?;
    let config: VaultConfig =
        toml::from_str(&content).map_err(|e| VaultError::Config(e.to_string()))?;

    Ok(config)
}

/// Save vault configuration
pub async fn save_config(base_dir: &Path, config: &VaultConfig) -> VaultResult<()> {
    ensure_dir(base_dir).await?;

    let content =
        toml::to_string_pretty(config).map_err(|e| VaultError::Config(e.to_string()))?;
    write_private_file(&config_file_path(base_dir), content.as_bytes()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLanguage, CredentialRecord, User};
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_snapshot_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let snapshot = load_snapshot(temp_dir.path(), &Uuid::new_v4()).await.unwrap();
        assert_eq!(snapshot, VaultSnapshot::empty());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let base_dir = temp_dir.path();
        let user_id = Uuid::new_v4();

        let mut snapshot = VaultSnapshot::empty();
        snapshot.records.push(CredentialRecord::new(
            "Facebook".to_string(),
            "anna@mail.com".to_string(),
            "abc".to_string(),
            Utc::now(),
        ));

        save_snapshot(base_dir, &user_id, &snapshot).await.unwrap();
        assert!(vault_exists(base_dir, &user_id).await);
        assert!(!backup_file_path(base_dir, &user_id).exists());

        let reloaded = load_snapshot(base_dir, &user_id).await.unwrap();
        assert_eq!(reloaded, snapshot);

        // second save keeps the first as backup
        save_snapshot(base_dir, &user_id, &VaultSnapshot::empty()).await.unwrap();
        assert!(backup_file_path(base_dir, &user_id).exists());
        assert!(load_snapshot(base_dir, &user_id).await.unwrap().records.is_empty());
    }

    #[tokio::test]
    async fn test_snapshots_are_per_user() {
        let temp_dir = TempDir::new().unwrap();
        let base_dir = temp_dir.path();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        let mut snapshot = VaultSnapshot::empty();
        snapshot.records.push(CredentialRecord::new(
            "a.com".to_string(),
            "alice".to_string(),
            "pw".to_string(),
            Utc::now(),
        ));
        save_snapshot(base_dir, &alice, &snapshot).await.unwrap();

        assert!(load_snapshot(base_dir, &bob).await.unwrap().records.is_empty());
    }

    #[tokio::test]
    async fn test_newer_version_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let base_dir = temp_dir.path();
        let user_id = Uuid::new_v4();

        let snapshot = VaultSnapshot {
            version: VaultSnapshot::CURRENT_VERSION + 1,
            ..VaultSnapshot::empty()
        };
        save_snapshot(base_dir, &user_id, &snapshot).await.unwrap();

        let result = load_snapshot(base_dir, &user_id).await;
        assert!(matches!(result, Err(VaultError::UnsupportedVersion(_))));
    }

    #[tokio::test]
    async fn test_delete_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let base_dir = temp_dir.path();
        let user_id = Uuid::new_v4();

        save_snapshot(base_dir, &user_id, &VaultSnapshot::empty()).await.unwrap();
        save_snapshot(base_dir, &user_id, &VaultSnapshot::empty()).await.unwrap();
        delete_snapshot(base_dir, &user_id).await.unwrap();

        assert!(!vault_exists(base_dir, &user_id).await);
        assert!(!backup_file_path(base_dir, &user_id).exists());
    }

    #[tokio::test]
    async fn test_config_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let base_dir = temp_dir.path();

        assert_eq!(load_config(base_dir).await.unwrap(), VaultConfig::default());

        let config = VaultConfig {
            activity_language: ActivityLanguage::Polish,
            recent_limit: 8,
            user: Some(User::new("Anna", "Nowak", "anna@mail.com")),
            ..VaultConfig::default()
        };
        save_config(base_dir, &config).await.unwrap();

        assert_eq!(load_config(base_dir).await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_bad_config_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(config_file_path(temp_dir.path()), "recent_limit = \"many\"").unwrap();

        let result = load_config(temp_dir.path()).await;
        assert!(matches!(result, Err(VaultError::Config(_))));
    }
}
