//! Limit group updater
//!
//! Adds a worker to the allow list (or, with `exclude`, the deny list) of one
//! or more limit groups, saving each group after the update.

use farm_repository::{LimitGroup, LimitGroupStore, RepositoryError};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Limit group {group} could not be fetched: {source}")]
    Fetch {
        group: String,
        #[source]
        source: RepositoryError,
    },

    #[error("Limit group {group} could not be saved: {source}")]
    Save {
        group: String,
        #[source]
        source: RepositoryError,
    },
}

/// Which list of the limit group the worker goes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Listed,
    Excluded,
}

impl Membership {
    pub fn from_exclude_flag(exclude: bool) -> Self {
        if exclude {
            Membership::Excluded
        } else {
            Membership::Listed
        }
    }
}

/// Per-group result of an update run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupUpdate {
    /// Worker appended, group saved
    Added(String),
    /// Worker was already on the list, group saved unchanged
    AlreadyPresent(String),
    /// Group missing and could not be created
    NotFound(String),
}

pub struct LimitGroupUpdater<'a, S: LimitGroupStore> {
    store: &'a S,
}

impl<'a, S: LimitGroupStore> LimitGroupUpdater<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Update each group in order. A store error stops the run at that group.
    pub fn add_worker(
        &self,
        worker: &str,
        groups: &[String],
        membership: Membership,
    ) -> Result<Vec<GroupUpdate>, UpdateError> {
        groups
            .iter()
            .map(|group| self.add_worker_to_group(worker, group, membership))
            .collect()
    }

    pub fn add_worker_to_group(
        &self,
        worker: &str,
        group_name: &str,
        membership: Membership,
    ) -> Result<GroupUpdate, UpdateError> {
        let fetched = self
            .store
            .limit_group(group_name, true)
            .map_err(|source| UpdateError::Fetch {
                group: group_name.to_string(),
                source,
            })?;

        let Some(mut group) = fetched else {
            println!("The limit group {} was not found", group_name);
            warn!(group = %group_name, "Limit group not found");
            return Ok(GroupUpdate::NotFound(group_name.to_string()));
        };

        let added = append_worker(&mut group, worker, membership);

        self.store
            .save_limit_group(&group)
            .map_err(|source| UpdateError::Save {
                group: group_name.to_string(),
                source,
            })?;

        if added {
            info!(
                group = %group_name,
                worker = %worker,
                membership = ?membership,
                "Added worker to limit group"
            );
            Ok(GroupUpdate::Added(group_name.to_string()))
        } else {
            debug!(
                group = %group_name,
                worker = %worker,
                "Worker already present in limit group"
            );
            Ok(GroupUpdate::AlreadyPresent(group_name.to_string()))
        }
    }
}

fn append_worker(group: &mut LimitGroup, worker: &str, membership: Membership) -> bool {
    let current = match membership {
        Membership::Listed => &group.listed_workers,
        Membership::Excluded => &group.excluded_workers,
    };
    if current.iter().any(|w| w == worker) {
        return false;
    }

    let mut updated = current.clone();
    updated.push(worker.to_string());
    match membership {
        Membership::Listed => group.set_listed_workers(updated),
        Membership::Excluded => group.set_excluded_workers(updated),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_repository::InMemoryRepository;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exclude_appends_to_excluded_workers_and_saves() {
        let store = InMemoryRepository::new().with_limit_group(LimitGroup::new("maya"));
        let updater = LimitGroupUpdater::new(&store);

        let result = updater
            .add_worker("render-01", &groups(&["maya"]), Membership::Excluded)
            .unwrap();

        assert_eq!(result, vec![GroupUpdate::Added("maya".to_string())]);
        let saved = store.saved_groups();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].excluded_workers, vec!["render-01".to_string()]);
        assert!(saved[0].listed_workers.is_empty());
    }

    #[test]
    fn listed_membership_appends_to_listed_workers() {
        let store = InMemoryRepository::new();
        let updater = LimitGroupUpdater::new(&store);

        updater
            .add_worker("render-01", &groups(&["nuke"]), Membership::Listed)
            .unwrap();

        let stored = store.stored_group("nuke").unwrap();
        assert_eq!(stored.listed_workers, vec!["render-01".to_string()]);
        assert!(stored.excluded_workers.is_empty());
    }

    #[test]
    fn existing_worker_is_not_duplicated_but_group_is_saved() {
        let mut group = LimitGroup::new("maya");
        group.set_listed_workers(vec!["render-01".to_string()]);
        let store = InMemoryRepository::new().with_limit_group(group);
        let updater = LimitGroupUpdater::new(&store);

        let result = updater
            .add_worker("render-01", &groups(&["maya"]), Membership::Listed)
            .unwrap();

        assert_eq!(result, vec![GroupUpdate::AlreadyPresent("maya".to_string())]);
        assert_eq!(store.saved_groups().len(), 1);
        assert_eq!(
            store.stored_group("maya").unwrap().listed_workers,
            vec!["render-01".to_string()]
        );
    }

    #[test]
    fn excluded_worker_is_not_duplicated_but_group_is_saved() {
        let mut group = LimitGroup::new("maya");
        group.set_excluded_workers(vec!["render-01".to_string()]);
        let store = InMemoryRepository::new().with_limit_group(group);
        let updater = LimitGroupUpdater::new(&store);

        let result = updater
            .add_worker("render-01", &groups(&["maya"]), Membership::Excluded)
            .unwrap();

        assert_eq!(result, vec![GroupUpdate::AlreadyPresent("maya".to_string())]);
        assert_eq!(store.saved_groups().len(), 1);
        let stored = store.stored_group("maya").unwrap();
        assert_eq!(stored.excluded_workers, vec!["render-01".to_string()]);
        assert!(stored.listed_workers.is_empty());
    }

    #[test]
    fn missing_group_is_skipped_and_batch_continues() {
        let store = InMemoryRepository::new()
            .without_group_creation()
            .with_limit_group(LimitGroup::new("houdini"));
        let updater = LimitGroupUpdater::new(&store);

        let result = updater
            .add_worker("render-02", &groups(&["ghost", "houdini"]), Membership::Excluded)
            .unwrap();

        assert_eq!(
            result,
            vec![
                GroupUpdate::NotFound("ghost".to_string()),
                GroupUpdate::Added("houdini".to_string()),
            ]
        );
        assert_eq!(store.saved_groups().len(), 1);
    }

    #[test]
    fn store_error_aborts_remaining_groups() {
        let store = InMemoryRepository::new().failing_group("broken");
        let updater = LimitGroupUpdater::new(&store);

        let result = updater.add_worker(
            "render-03",
            &groups(&["maya", "broken", "nuke"]),
            Membership::Listed,
        );

        assert!(matches!(result, Err(UpdateError::Fetch { ref group, .. }) if group == "broken"));
        assert!(store.stored_group("maya").is_some());
        assert!(store.stored_group("nuke").is_none());
    }
}
