//! Job lifecycle hooks and the listener dispatch table

use anyhow::Result;
use clap::ValueEnum;
use farm_repository::Job;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Job lifecycle points a listener can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum LifecycleHook {
    Submitted,
    Imported,
    Requeued,
    Resumed,
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleHook::Submitted => "submitted",
            LifecycleHook::Imported => "imported",
            LifecycleHook::Requeued => "requeued",
            LifecycleHook::Resumed => "resumed",
        };
        f.write_str(s)
    }
}

/// Observer notified when a subscribed lifecycle hook fires
pub trait JobEventListener: Send + Sync {
    fn name(&self) -> &str;

    fn on_job_event(&self, hook: LifecycleHook, job: &Job) -> Result<()>;
}

/// Handle returned by [`EventDispatcher::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Dispatch table mapping lifecycle hooks to registered listeners
#[derive(Default)]
pub struct EventDispatcher {
    next_id: u64,
    listeners: HashMap<LifecycleHook, Vec<(ListenerId, Arc<dyn JobEventListener>)>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to each of `hooks`
    pub fn register(
        &mut self,
        hooks: &[LifecycleHook],
        listener: Arc<dyn JobEventListener>,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        for hook in hooks {
            debug!(listener = listener.name(), hook = %hook, "Registering listener");
            self.listeners
                .entry(*hook)
                .or_default()
                .push((id, Arc::clone(&listener)));
        }
        id
    }

    /// Remove a listener from every hook. Returns the number of subscriptions dropped.
    pub fn deregister(&mut self, id: ListenerId) -> usize {
        let mut removed = 0;
        for subscribers in self.listeners.values_mut() {
            let before = subscribers.len();
            subscribers.retain(|(listener_id, _)| *listener_id != id);
            removed += before - subscribers.len();
        }
        self.listeners.retain(|_, subscribers| !subscribers.is_empty());
        removed
    }

    pub fn listener_count(&self, hook: LifecycleHook) -> usize {
        self.listeners.get(&hook).map_or(0, Vec::len)
    }

    /// Notify listeners of `hook` in registration order.
    ///
    /// The first listener error aborts the dispatch and is returned.
    pub fn dispatch(&self, hook: LifecycleHook, job: &Job) -> Result<()> {
        let Some(subscribers) = self.listeners.get(&hook) else {
            debug!(hook = %hook, job_id = %job.id, "No listeners registered");
            return Ok(());
        };

        for (_, listener) in subscribers {
            debug!(
                listener = listener.name(),
                hook = %hook,
                job_id = %job.id,
                "Dispatching job event"
            );
            listener.on_job_event(hook, job)?;
        }
        Ok(())
    }
}
