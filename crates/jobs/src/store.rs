//! `JobStore` — on-disk job lifecycle tracking with startup hydration.
//!
//! Grounded in the teacher's `sa_sessions::store::SessionStore`: a single
//! mutex-guarded in-memory index backed by write-to-temp-then-rename JSON
//! files, readable back into the same shape on restart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::warn;

use autosage_core::execution::ToolResult;
use autosage_core::value::StructuredValue;
use autosage_core::{Error, Result};

use crate::record::{ArtifactEntry, JobError, JobRecord, JobStatus};

struct Inner {
    records: HashMap<String, JobRecord>,
    next_id: u64,
}

pub struct JobStore {
    run_root: PathBuf,
    inner: Mutex<Inner>,
}

fn format_id(n: u64) -> String {
    format!("job_{n:04}")
}

fn parse_id(id: &str) -> Option<u64> {
    id.strip_prefix("job_").and_then(|n| n.parse().ok())
}

impl JobStore {
    /// Open (and optionally hydrate) a store rooted at `run_root`.
    /// Corrupt or partial job directories are skipped with a warning,
    /// never fatal — the store is still usable afterward.
    pub fn new(run_root: impl Into<PathBuf>, load_from_disk: bool) -> Result<Self> {
        let run_root = run_root.into();
        std::fs::create_dir_all(&run_root)?;

        let mut records = HashMap::new();
        let mut max_seen = 0u64;

        if load_from_disk {
            for entry in std::fs::read_dir(&run_root)? {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(error = %e, "failed to read run root entry during hydration");
                        continue;
                    }
                };
                let path = entry.path();
                if !path.is_dir() {
                    continue;
                }
                let summary_path = path.join("summary.json");
                if !summary_path.exists() {
                    continue;
                }
                match std::fs::read_to_string(&summary_path)
                    .map_err(Error::from)
                    .and_then(|raw| serde_json::from_str::<JobRecord>(&raw).map_err(Error::from))
                {
                    Ok(record) => {
                        if let Some(n) = parse_id(&record.id) {
                            max_seen = max_seen.max(n);
                        }
                        records.insert(record.id.clone(), record);
                    }
                    Err(e) => {
                        warn!(path = %summary_path.display(), error = %e, "skipping corrupt job directory");
                    }
                }
            }
        }

        Ok(Self {
            run_root,
            inner: Mutex::new(Inner {
                records,
                next_id: max_seen + 1,
            }),
        })
    }

    fn job_directory(&self, id: &str) -> PathBuf {
        self.run_root.join(id)
    }

    /// Allocate the next `job_NNNN` id from this store's counter without
    /// creating a tracked record — for callers (e.g. the synchronous
    /// `/v1/tools/execute` route) that need a collision-free job directory
    /// name under the same run root but don't want a `JobStore`-tracked
    /// lifecycle.
    pub fn reserve_id(&self) -> String {
        let mut inner = self.inner.lock();
        let id = format_id(inner.next_id);
        inner.next_id += 1;
        id
    }

    fn persist_summary(&self, record: &JobRecord) -> Result<()> {
        let path = self.job_directory(&record.id).join("summary.json");
        write_json_atomic(&path, record)
    }

    /// `create(tool_name, input, request_body?) -> JobRecord`.
    pub fn create(
        &self,
        tool_name: impl Into<String>,
        request_body: Option<&StructuredValue>,
    ) -> Result<JobRecord> {
        let tool_name = tool_name.into();
        let mut inner = self.inner.lock();
        let id = format_id(inner.next_id);
        inner.next_id += 1;

        let job_dir = self.job_directory(&id);
        std::fs::create_dir_all(&job_dir)?;

        if let Some(body) = request_body {
            write_json_atomic(&job_dir.join("request.json"), body)?;
        }

        let record = JobRecord::new(id.clone(), tool_name, Utc::now());
        self.persist_summary(&record)?;
        inner.records.insert(id, record.clone());
        Ok(record)
    }

    /// `start(id)` — queued → running. A no-op (logged) if not queued.
    pub fn start(&self, id: &str) -> Result<JobRecord> {
        let mut inner = self.inner.lock();
        let record = inner
            .records
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        if record.status != JobStatus::Queued {
            warn!(job_id = id, status = ?record.status, "start() on non-queued job is a no-op");
            return Ok(record.clone());
        }

        record.status = JobStatus::Running;
        record.started_at = Some(Utc::now());
        let snapshot = record.clone();
        self.persist_summary(&snapshot)?;
        Ok(snapshot)
    }

    /// `complete(id, result, summary)` — running → succeeded.
    pub fn complete(&self, id: &str, result: ToolResult, summary: String) -> Result<JobRecord> {
        let mut inner = self.inner.lock();
        let record = inner
            .records
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        if record.status != JobStatus::Running {
            warn!(job_id = id, status = ?record.status, "complete() on non-running job is a no-op");
            return Ok(record.clone());
        }

        record.status = JobStatus::Succeeded;
        record.finished_at = Some(Utc::now());
        record.summary = Some(summary);
        record.result = Some(result);
        let snapshot = record.clone();

        write_json_atomic(
            &self.job_directory(id).join("result.json"),
            snapshot.result.as_ref().unwrap(),
        )?;
        self.persist_summary(&snapshot)?;
        Ok(snapshot)
    }

    /// `fail(id, error)` — running → failed.
    pub fn fail(&self, id: &str, error: JobError) -> Result<JobRecord> {
        let mut inner = self.inner.lock();
        let record = inner
            .records
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        if record.status != JobStatus::Running {
            warn!(job_id = id, status = ?record.status, "fail() on non-running job is a no-op");
            return Ok(record.clone());
        }

        record.status = JobStatus::Failed;
        record.finished_at = Some(Utc::now());
        record.summary = Some(error.message.clone());
        record.error = Some(error);
        let snapshot = record.clone();
        self.persist_summary(&snapshot)?;
        Ok(snapshot)
    }

    pub fn get(&self, id: &str) -> Result<JobRecord> {
        self.inner
            .lock()
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// `list_artifacts(id)` — every regular file under the job directory,
    /// walked recursively (several built-in tools write into subdirectories
    /// like `solve/` or `render/`), symlinks excluded. `name` is the path
    /// relative to the job directory, suitable for passing straight to
    /// `read_artifact`.
    pub fn list_artifacts(&self, id: &str) -> Result<Vec<ArtifactEntry>> {
        if !self.inner.lock().records.contains_key(id) {
            return Err(Error::NotFound(id.to_string()));
        }
        let job_dir = self.job_directory(id);
        let mut entries = Vec::new();
        walk_artifacts(&job_dir, &job_dir, id, &mut entries)?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// `read_artifact(id, name)` — path-traversal defended.
    pub fn read_artifact(&self, id: &str, name: &str) -> Result<Vec<u8>> {
        if !self.inner.lock().records.contains_key(id) {
            return Err(Error::NotFound(id.to_string()));
        }
        let job_dir = self.job_directory(id);
        let resolved = resolve_within(&job_dir, name)?;
        std::fs::read(&resolved).map_err(|_| Error::NotFound(format!("{id}/{name}")))
    }
}

/// Recursively collect regular files under `dir` (relative to `job_dir`)
/// into `entries`. Directories are descended into; symlinks are skipped
/// rather than followed.
fn walk_artifacts(job_dir: &Path, dir: &Path, id: &str, entries: &mut Vec<ArtifactEntry>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();

        if file_type.is_dir() {
            walk_artifacts(job_dir, &path, id, entries)?;
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        let relative = path
            .strip_prefix(job_dir)
            .expect("walked path is always under job_dir")
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/");
        let metadata = entry.metadata()?;
        entries.push(ArtifactEntry {
            mime_type: autosage_tools_mime_or_default(&relative),
            path: format!("{id}/{relative}"),
            bytes: metadata.len(),
            name: relative,
        });
    }
    Ok(())
}

/// Resolve `relative` against `root`, rejecting any path that escapes it
/// (mirrors `SessionManifold::asset_reader`'s defense).
pub(crate) fn resolve_within(root: &Path, relative: &str) -> Result<PathBuf> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            std::path::Component::Normal(part) => resolved.push(part),
            std::path::Component::CurDir => {}
            _ => return Err(Error::Forbidden(relative.to_string())),
        }
    }
    if !resolved.starts_with(root) {
        return Err(Error::Forbidden(relative.to_string()));
    }
    Ok(resolved)
}

fn autosage_tools_mime_or_default(name: &str) -> String {
    // JobStore must not depend on autosage-tools (layering: tools sits
    // above jobs in the dependency graph via the gateway), so the same
    // small extension table is inlined here.
    let ext = name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()).unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "tiff" => "image/tiff",
        "json" => "application/json",
        "txt" | "log" => "text/plain; charset=utf-8",
        "pvd" | "vtk" | "tet" | "obj" | "step" => "application/octet-stream",
        _ => "application/octet-stream",
    }
    .to_string()
}

fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value)?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, pretty)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
