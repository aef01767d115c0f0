//! Render-farm job repository and limit-group store contracts
//!
//! The farm's scheduler owns jobs, tasks and limit groups. This crate models
//! the slice of that API the automation plugins consume, plus two stand-in
//! implementations: an in-memory store for tests and a JSON-file snapshot for
//! the command-line tools.

pub mod file;
pub mod memory;
pub mod model;
pub mod repository;

pub use file::{JsonFileRepository, RepositoryDocument};
pub use memory::InMemoryRepository;
pub use model::{Job, JobStatus, LimitGroup, Task, TaskStatus};
pub use repository::{JobRepository, LimitGroupStore, RepositoryError};
