//! Pool Autoscaler - reacts to job lifecycle events and requests render nodes
//!
//! When a job is submitted, imported, requeued or resumed in a monitored pool
//! (or group), the scaler totals the pending tasks of every active job in that
//! pool and POSTs the count to the render hub's pool scaling endpoint.

pub mod autoscale;
pub mod config;
pub mod dispatch;
pub mod log;
pub mod scaler;

pub use autoscale::{HttpPoolScaleClient, LogOnlyPoolScaleClient, PoolScaleClient, ScaleRequest};
pub use config::{Config, ConfigSource, PluginConfig};
pub use dispatch::{EventDispatcher, JobEventListener, LifecycleHook, ListenerId};
pub use log::{EventLog, MemoryEventLog, TracingEventLog};
pub use scaler::{JobPoolScaler, ScaleOutcome, ScalerError};
