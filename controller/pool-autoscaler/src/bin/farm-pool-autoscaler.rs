//! Pool Autoscaler binary - delivers one job lifecycle event to the scaler

use anyhow::Context;
use farm_repository::{JobRepository, JsonFileRepository};
use pool_autoscaler::{
    Config, EventDispatcher, HttpPoolScaleClient, JobPoolScaler, LogOnlyPoolScaleClient,
    PluginConfig, PoolScaleClient, TracingEventLog,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = Config::parse_config();

    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    }

    info!("Starting farm pool autoscaler");
    info!("  Event: {}", config.event);
    info!("  Job: {}", config.job_id);
    info!("  Repository: {}", config.repository.display());
    info!("  Dry-run: {}", config.dry_run);

    let plugin_config = config
        .plugin_config()
        .context("Failed to load plugin configuration")?;
    let repository = Arc::new(JsonFileRepository::new(config.repository.clone()));

    if config.dry_run {
        info!("Using log-only scale client (dry-run mode)");
        run_event(&config, plugin_config, repository, Arc::new(LogOnlyPoolScaleClient))
    } else {
        let client = HttpPoolScaleClient::from_config(&plugin_config)
            .context("Failed to create pool scale client")?;
        run_event(&config, plugin_config, repository, Arc::new(client))
    }
}

/// Register the scaler, deliver the configured event, then tear down
fn run_event<C: PoolScaleClient + 'static>(
    config: &Config,
    plugin_config: PluginConfig,
    repository: Arc<JsonFileRepository>,
    client: Arc<C>,
) -> anyhow::Result<()> {
    let job = repository
        .job(&config.job_id)
        .context("Failed to read job repository")?
        .with_context(|| format!("Job {} not found in repository", config.job_id))?;

    let mut dispatcher = EventDispatcher::new();
    let scaler = Arc::new(JobPoolScaler::new(
        Arc::new(plugin_config),
        repository,
        client,
        Arc::new(TracingEventLog),
    ));
    let registration = scaler.register(&mut dispatcher);

    let result = dispatcher.dispatch(config.event, &job);
    JobPoolScaler::<JsonFileRepository, C>::cleanup(&mut dispatcher, registration);

    match result {
        Ok(()) => {
            info!(job_id = %job.id, event = %config.event, "Job event handled");
            Ok(())
        }
        Err(e) => {
            error!(job_id = %job.id, event = %config.event, "Job event failed: {:#}", e);
            Err(e)
        }
    }
}
