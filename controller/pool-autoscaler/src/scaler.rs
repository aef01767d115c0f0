//! Job lifecycle handler that requests nodes for monitored pools

use anyhow::Result;
use farm_repository::{Job, JobRepository, JobStatus, RepositoryError};
use std::sync::Arc;
use thiserror::Error;

use crate::autoscale::{PoolScaleClient, ScaleError, ScaleRequest};
use crate::config::{split_list, ConfigSource, ENABLED_GROUPS, ENABLED_POOLS};
use crate::dispatch::{EventDispatcher, JobEventListener, LifecycleHook, ListenerId};
use crate::log::EventLog;

#[derive(Error, Debug)]
pub enum ScalerError {
    #[error("Job repository query failed: {0}")]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Scale(#[from] ScaleError),
}

/// Which branch a lifecycle event took through the scaler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleOutcome {
    NoPoolsConfigured,
    SuspendedJob,
    NotMonitored,
    NothingPending { pool: String },
    Requested { pool: String, nodes: u32 },
}

/// Requests pool nodes when jobs land in a monitored pool or group
pub struct JobPoolScaler<R: JobRepository, C: PoolScaleClient> {
    config: Arc<dyn ConfigSource>,
    repository: Arc<R>,
    client: Arc<C>,
    log: Arc<dyn EventLog>,
}

impl<R: JobRepository + 'static, C: PoolScaleClient + 'static> JobPoolScaler<R, C> {
    pub const HOOKS: [LifecycleHook; 4] = [
        LifecycleHook::Submitted,
        LifecycleHook::Imported,
        LifecycleHook::Requeued,
        LifecycleHook::Resumed,
    ];

    pub fn new(
        config: Arc<dyn ConfigSource>,
        repository: Arc<R>,
        client: Arc<C>,
        log: Arc<dyn EventLog>,
    ) -> Self {
        Self {
            config,
            repository,
            client,
            log,
        }
    }

    /// Subscribe to the submitted, imported, requeued and resumed hooks
    pub fn register(self: Arc<Self>, dispatcher: &mut EventDispatcher) -> ListenerId {
        dispatcher.register(&Self::HOOKS, self)
    }

    /// Drop every subscription made by [`JobPoolScaler::register`]
    pub fn cleanup(dispatcher: &mut EventDispatcher, id: ListenerId) -> usize {
        dispatcher.deregister(id)
    }

    pub fn scale_pool_for_job(&self, job: &Job) -> Result<ScaleOutcome, ScalerError> {
        let enabled_pools = split_list(&self.config.config_entry_with_default(ENABLED_POOLS, ""));
        let enabled_groups = split_list(&self.config.config_entry_with_default(ENABLED_GROUPS, ""));

        if enabled_pools.is_empty() && enabled_groups.is_empty() {
            self.log.info("No pools or groups specified in plugin configuration, exiting.");
            return Ok(ScaleOutcome::NoPoolsConfigured);
        }

        if job.status == JobStatus::Suspended {
            self.log.info(&format!("Ignoring suspended job {}", job.name));
            return Ok(ScaleOutcome::SuspendedJob);
        }

        let target_pool = if enabled_pools.contains(&job.pool) {
            Some(job.pool.clone())
        } else if enabled_groups.contains(&job.group) {
            Some(job.group.clone())
        } else {
            None
        };

        self.log.info(&format!(
            "Received event for job {} ({}) with pool {} and group {}",
            job.name, job.status, job.pool, job.group
        ));

        let Some(pool) = target_pool else {
            return Ok(ScaleOutcome::NotMonitored);
        };

        let mut total_pending = job.task_count;
        for other in self.repository.jobs_in_state(JobStatus::Active)? {
            if other.id == job.id {
                self.log.info(&format!(
                    "Skipping current job {} ({})",
                    other.name, other.status
                ));
                continue;
            }
            if other.pool != pool {
                continue;
            }

            let pending = self
                .repository
                .job_tasks(&other)?
                .iter()
                .filter(|task| task.status.is_pending())
                .count();
            let pending = u32::try_from(pending).unwrap_or(u32::MAX);

            self.log.info(&format!(
                "Job {} ({}) has {} incomplete tasks",
                other.name, other.status, pending
            ));
            total_pending = total_pending.saturating_add(pending);
        }

        self.log.info(&format!("Requesting {} nodes", total_pending));

        if total_pending == 0 {
            return Ok(ScaleOutcome::NothingPending { pool });
        }

        let response = self
            .client
            .scale_pool(&ScaleRequest::new(pool.clone(), total_pending))?;
        self.log.info(&format!("Got response {}", response));

        Ok(ScaleOutcome::Requested {
            pool,
            nodes: total_pending,
        })
    }
}

impl<R: JobRepository + 'static, C: PoolScaleClient + 'static> JobEventListener
    for JobPoolScaler<R, C>
{
    fn name(&self) -> &str {
        "pool-autoscaler"
    }

    fn on_job_event(&self, _hook: LifecycleHook, job: &Job) -> Result<()> {
        self.scale_pool_for_job(job)?;
        Ok(())
    }
}
