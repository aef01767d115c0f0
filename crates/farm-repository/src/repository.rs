use crate::model::{Job, JobStatus, LimitGroup, Task};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Failed to read repository file: {message}")]
    FileReadError { message: String },

    #[error("Failed to write repository file: {message}")]
    FileWriteError { message: String },

    #[error("Invalid repository JSON: {message}")]
    JsonError { message: String },

    #[error("Repository unavailable: {message}")]
    Unavailable { message: String },
}

/// Read-only queries against the farm's job repository
pub trait JobRepository: Send + Sync {
    /// All jobs currently in `status`
    fn jobs_in_state(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError>;

    /// Every task belonging to `job`
    fn job_tasks(&self, job: &Job) -> Result<Vec<Task>, RepositoryError>;

    /// Look up a single job by id
    fn job(&self, job_id: &str) -> Result<Option<Job>, RepositoryError>;
}

/// Fetch-mutate-save access to limit groups
pub trait LimitGroupStore: Send + Sync {
    /// Fetch a limit group by name.
    ///
    /// With `create_if_missing` the store creates an empty group when none
    /// exists. `Ok(None)` means the group neither exists nor could be created.
    fn limit_group(
        &self,
        name: &str,
        create_if_missing: bool,
    ) -> Result<Option<LimitGroup>, RepositoryError>;

    fn save_limit_group(&self, group: &LimitGroup) -> Result<(), RepositoryError>;
}
