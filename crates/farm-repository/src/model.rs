//! Render-farm entities as seen through the job repository.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Job lifecycle state as reported by the farm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JobStatus {
    Active,
    Suspended,
    Pending,
    Completed,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Active => "Active",
            JobStatus::Suspended => "Suspended",
            JobStatus::Pending => "Pending",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
            JobStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Task state as reported by the farm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    Queued,
    Suspended,
    Rendering,
    Completed,
    Failed,
    Pending,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Whether the task still needs a worker: queued or currently rendering.
    pub fn is_pending(self) -> bool {
        matches!(self, TaskStatus::Queued | TaskStatus::Rendering)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub pool: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub task_count: u32,
}

impl Job {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: JobStatus::Active,
            pool: String::new(),
            group: String::new(),
            task_count: 0,
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_pool(mut self, pool: impl Into<String>) -> Self {
        self.pool = pool.into();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_task_count(mut self, task_count: u32) -> Self {
        self.task_count = task_count;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub job_id: String,
    pub task_id: u32,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    pub fn new(job_id: impl Into<String>, task_id: u32, status: TaskStatus) -> Self {
        Self {
            job_id: job_id.into(),
            task_id,
            status,
        }
    }
}

/// Named allow/deny list of workers.
///
/// `listed_workers` are explicitly assigned to the group, `excluded_workers`
/// are explicitly barred from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitGroup {
    pub name: String,
    #[serde(default)]
    pub listed_workers: Vec<String>,
    #[serde(default)]
    pub excluded_workers: Vec<String>,
}

impl LimitGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listed_workers: Vec::new(),
            excluded_workers: Vec::new(),
        }
    }

    pub fn set_listed_workers(&mut self, workers: Vec<String>) {
        self.listed_workers = workers;
    }

    pub fn set_excluded_workers(&mut self, workers: Vec<String>) {
        self.excluded_workers = workers;
    }
}
