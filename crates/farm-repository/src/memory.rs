//! In-memory repository for tests and local dry runs

use crate::model::{Job, JobStatus, LimitGroup, Task};
use crate::repository::{JobRepository, LimitGroupStore, RepositoryError};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct State {
    jobs: Vec<Job>,
    tasks: BTreeMap<String, Vec<Task>>,
    limit_groups: BTreeMap<String, LimitGroup>,
    saved: Vec<LimitGroup>,
    failing_groups: HashSet<String>,
}

/// Job repository and limit-group store backed by in-process maps
pub struct InMemoryRepository {
    state: Mutex<State>,
    create_groups: bool,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            create_groups: true,
        }
    }

    /// Refuse to create limit groups that do not already exist
    pub fn without_group_creation(mut self) -> Self {
        self.create_groups = false;
        self
    }

    pub fn with_job(self, job: Job) -> Self {
        self.lock().jobs.push(job);
        self
    }

    pub fn with_tasks(self, job_id: &str, tasks: Vec<Task>) -> Self {
        self.lock().tasks.insert(job_id.to_string(), tasks);
        self
    }

    pub fn with_limit_group(self, group: LimitGroup) -> Self {
        self.lock().limit_groups.insert(group.name.clone(), group);
        self
    }

    /// Make every fetch of `name` fail with [`RepositoryError::Unavailable`]
    pub fn failing_group(self, name: &str) -> Self {
        self.lock().failing_groups.insert(name.to_string());
        self
    }

    /// Current stored copy of a limit group
    pub fn stored_group(&self, name: &str) -> Option<LimitGroup> {
        self.lock().limit_groups.get(name).cloned()
    }

    /// Every group passed to `save_limit_group`, in call order
    pub fn saved_groups(&self) -> Vec<LimitGroup> {
        self.lock().saved.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked mid-update.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl JobRepository for InMemoryRepository {
    fn jobs_in_state(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError> {
        Ok(self
            .lock()
            .jobs
            .iter()
            .filter(|job| job.status == status)
            .cloned()
            .collect())
    }

    fn job_tasks(&self, job: &Job) -> Result<Vec<Task>, RepositoryError> {
        Ok(self.lock().tasks.get(&job.id).cloned().unwrap_or_default())
    }

    fn job(&self, job_id: &str) -> Result<Option<Job>, RepositoryError> {
        Ok(self.lock().jobs.iter().find(|job| job.id == job_id).cloned())
    }
}

impl LimitGroupStore for InMemoryRepository {
    fn limit_group(
        &self,
        name: &str,
        create_if_missing: bool,
    ) -> Result<Option<LimitGroup>, RepositoryError> {
        let mut state = self.lock();
        if state.failing_groups.contains(name) {
            return Err(RepositoryError::Unavailable {
                message: format!("limit group {} could not be fetched", name),
            });
        }
        if let Some(group) = state.limit_groups.get(name) {
            return Ok(Some(group.clone()));
        }
        if !create_if_missing || !self.create_groups || name.trim().is_empty() {
            return Ok(None);
        }

        debug!(group = %name, "Creating missing limit group");
        let group = LimitGroup::new(name);
        state.limit_groups.insert(name.to_string(), group.clone());
        Ok(Some(group))
    }

    fn save_limit_group(&self, group: &LimitGroup) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        state.saved.push(group.clone());
        state.limit_groups.insert(group.name.clone(), group.clone());
        Ok(())
    }
}
