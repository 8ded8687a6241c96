//! `SessionManifold` — owns every session's filesystem workspace and
//! persisted manifest (spec.md §4.4).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use autosage_core::value::StructuredValue;
use autosage_core::{Error, Result};

use crate::assets::{resolve_within, sanitize_filename};
use crate::lock::SessionLockMap;
use crate::manifest::{MessageRole, SessionManifest, SessionStatus, SESSION_SUBDIRECTORIES};

pub struct SessionManifold {
    run_root: PathBuf,
    locks: SessionLockMap,
    next_id: AtomicU64,
}

fn format_id(n: u64) -> String {
    format!("session_{n:04}")
}

fn parse_id(id: &str) -> Option<u64> {
    id.strip_prefix("session_").and_then(|n| n.parse().ok())
}

impl SessionManifold {
    pub fn new(run_root: impl Into<PathBuf>) -> Result<Self> {
        let run_root = run_root.into();
        std::fs::create_dir_all(&run_root)?;

        let mut max_seen = 0u64;
        for entry in std::fs::read_dir(&run_root)? {
            let entry = entry?;
            if let Some(n) = entry
                .file_name()
                .to_str()
                .and_then(parse_id)
            {
                max_seen = max_seen.max(n);
            }
        }

        Ok(Self {
            run_root,
            locks: SessionLockMap::new(),
            next_id: AtomicU64::new(max_seen + 1),
        })
    }

    fn session_directory(&self, id: &str) -> PathBuf {
        self.run_root.join(id)
    }

    fn manifest_path(&self, id: &str) -> PathBuf {
        self.session_directory(id).join("manifest.json")
    }

    fn persist(&self, manifest: &SessionManifest) -> Result<()> {
        let path = self.manifest_path(&manifest.session_id);
        let pretty = serde_json::to_string_pretty(manifest)?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, pretty)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn read(&self, id: &str) -> Result<SessionManifest> {
        let path = self.manifest_path(id);
        if !path.exists() {
            return Err(Error::NotFound(id.to_string()));
        }
        let raw = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// `create_from_upload(filename, bytes) -> SessionManifest`.
    pub fn create_from_upload(&self, filename: &str, bytes: &[u8]) -> Result<SessionManifest> {
        let safe_name = sanitize_filename(filename)?;
        let id = format_id(self.next_id.fetch_add(1, Ordering::SeqCst));

        let session_dir = self.session_directory(&id);
        std::fs::create_dir_all(&session_dir)?;
        for sub in SESSION_SUBDIRECTORIES {
            std::fs::create_dir_all(session_dir.join(sub))?;
        }

        std::fs::write(session_dir.join("input").join(&safe_name), bytes)?;

        let now = Utc::now();
        let mut manifest = SessionManifest::new(id, now);
        manifest.push_asset(format!("input/{safe_name}"));
        self.persist(&manifest)?;
        Ok(manifest)
    }

    /// `get(id) -> SessionManifest` — always re-reads disk.
    pub fn get(&self, id: &str) -> Result<SessionManifest> {
        self.read(id)
    }

    /// `append_user_prompt(id, prompt)`.
    pub async fn append_user_prompt(&self, id: &str, prompt: &str) -> Result<SessionManifest> {
        let _permit = self.locks.acquire(id).await;
        let mut manifest = self.read(id)?;
        manifest.push_message(MessageRole::User, prompt.to_string(), Utc::now());
        manifest.updated_at = Utc::now();
        self.persist(&manifest)?;
        Ok(manifest)
    }

    /// `apply_transition(...)` — atomic under the per-session lock.
    #[allow(clippy::too_many_arguments)]
    pub async fn apply_transition(
        &self,
        id: &str,
        status: SessionStatus,
        stage: &str,
        planned_tool: Option<String>,
        assistant_message: Option<String>,
        append_assets: &[String],
        metadata: &[(&str, StructuredValue)],
    ) -> Result<SessionManifest> {
        let _permit = self.locks.acquire(id).await;
        let mut manifest = self.read(id)?;

        manifest.status = status;
        manifest.stage = stage.to_string();
        manifest.planned_tool = planned_tool;
        let now = Utc::now();
        if let Some(message) = assistant_message {
            manifest.push_message(MessageRole::Assistant, message, now);
        }
        for asset in append_assets {
            manifest.push_asset(asset.clone());
        }
        for (key, value) in metadata {
            manifest.metadata.insert(*key, value.clone());
        }
        manifest.updated_at = now;

        self.persist(&manifest)?;
        Ok(manifest)
    }

    /// `asset_reader(id, relative_path) -> bytes | not-found | forbidden`.
    pub fn asset_reader(&self, id: &str, relative_path: &str) -> Result<Vec<u8>> {
        // Reading a session's existence first avoids leaking whether an
        // id exists via a different error shape than a bad path would.
        if !self.session_directory(id).exists() {
            return Err(Error::NotFound(id.to_string()));
        }
        let resolved = resolve_within(&self.session_directory(id), relative_path)?;
        std::fs::read(&resolved).map_err(|_| Error::NotFound(format!("{id}/{relative_path}")))
    }

    pub fn session_directory_for(&self, id: &str) -> PathBuf {
        self.session_directory(id)
    }

    pub fn run_root(&self) -> &Path {
        &self.run_root
    }
}
