use crate::model::{Job, JobStatus, LimitGroup, Task};
use crate::repository::{JobRepository, LimitGroupStore, RepositoryError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// On-disk layout of a repository snapshot
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDocument {
    #[serde(default)]
    pub jobs: Vec<Job>,
    /// job id -> tasks
    #[serde(default)]
    pub tasks: BTreeMap<String, Vec<Task>>,
    #[serde(default)]
    pub limit_groups: Vec<LimitGroup>,
}

/// Repository snapshot stored in a JSON file with atomic writes
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<RepositoryDocument, RepositoryError> {
        if !self.path.exists() {
            debug!("Repository file does not exist, returning empty repository");
            return Ok(RepositoryDocument::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| RepositoryError::FileReadError {
            message: format!("{}: {}", self.path.display(), e),
        })?;

        if content.trim().is_empty() {
            return Ok(RepositoryDocument::default());
        }

        serde_json::from_str(&content).map_err(|e| RepositoryError::JsonError {
            message: e.to_string(),
        })
    }

    pub fn save(&self, document: &RepositoryDocument) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| RepositoryError::FileWriteError {
                message: format!("Failed to create directory {}: {}", parent.display(), e),
            })?;
        }

        let json = serde_json::to_string_pretty(document).map_err(|e| RepositoryError::JsonError {
            message: e.to_string(),
        })?;

        let parent_dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut temp_file =
            NamedTempFile::new_in(parent_dir).map_err(|e| RepositoryError::FileWriteError {
                message: format!("Failed to create temp file: {}", e),
            })?;

        temp_file
            .write_all(json.as_bytes())
            .map_err(|e| RepositoryError::FileWriteError {
                message: format!("Failed to write to temp file: {}", e),
            })?;
        temp_file.flush().map_err(|e| RepositoryError::FileWriteError {
            message: format!("Failed to flush temp file: {}", e),
        })?;

        temp_file
            .persist(&self.path)
            .map_err(|e| RepositoryError::FileWriteError {
                message: format!("Failed to persist temp file: {}", e),
            })?;

        debug!("Repository saved to {}", self.path.display());
        Ok(())
    }
}

impl JobRepository for JsonFileRepository {
    fn jobs_in_state(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError> {
        Ok(self
            .load()?
            .jobs
            .into_iter()
            .filter(|job| job.status == status)
            .collect())
    }

    fn job_tasks(&self, job: &Job) -> Result<Vec<Task>, RepositoryError> {
        Ok(self.load()?.tasks.remove(&job.id).unwrap_or_default())
    }

    fn job(&self, job_id: &str) -> Result<Option<Job>, RepositoryError> {
        Ok(self.load()?.jobs.into_iter().find(|job| job.id == job_id))
    }
}

impl LimitGroupStore for JsonFileRepository {
    fn limit_group(
        &self,
        name: &str,
        create_if_missing: bool,
    ) -> Result<Option<LimitGroup>, RepositoryError> {
        let mut document = self.load()?;
        if let Some(group) = document.limit_groups.iter().find(|g| g.name == name) {
            return Ok(Some(group.clone()));
        }
        if !create_if_missing || name.trim().is_empty() {
            return Ok(None);
        }

        debug!(group = %name, "Creating missing limit group");
        let group = LimitGroup::new(name);
        document.limit_groups.push(group.clone());
        self.save(&document)?;
        Ok(Some(group))
    }

    fn save_limit_group(&self, group: &LimitGroup) -> Result<(), RepositoryError> {
        let mut document = self.load()?;
        match document
            .limit_groups
            .iter_mut()
            .find(|g| g.name == group.name)
        {
            Some(existing) => *existing = group.clone(),
            None => document.limit_groups.push(group.clone()),
        }
        self.save(&document)
    }
}
