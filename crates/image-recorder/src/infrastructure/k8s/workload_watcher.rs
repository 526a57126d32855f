//! Subscription facility for workload resources.
//!
//! `kube::runtime::watcher` only yields the current state of an object, so the
//! watcher keeps the last snapshot it saw per object and pairs it with the next
//! one. A relist (`Restarted`) redelivers every known object; pairs whose
//! resource version did not move are absorbed by the diff engine.

use std::collections::HashMap;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use error_stack::Report;
use futures::StreamExt;
use kube::runtime::watcher::watcher;
use kube::runtime::watcher::Config;
use kube::runtime::watcher::Event;
use kube::Api;
use kube::Client;
use kube::Resource;
use serde::de::DeserializeOwned;
use tokio::select;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::domain::IntoSnapshot;
use crate::domain::UpdateHandler;
use crate::domain::WorkloadKind;
use crate::domain::WorkloadSnapshot;
use crate::infrastructure::k8s::KubernetesError;

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Watch event already converted to snapshots.
#[derive(Debug, Clone)]
pub enum SnapshotEvent {
    Applied(WorkloadSnapshot),
    Deleted(WorkloadSnapshot),
    Restarted(Vec<WorkloadSnapshot>),
}

impl SnapshotEvent {
    fn from_watch_event<K: IntoSnapshot>(event: Event<K>, include_init_containers: bool) -> Self {
        match event {
            Event::Applied(obj) => Self::Applied(obj.to_snapshot(include_init_containers)),
            Event::Deleted(obj) => Self::Deleted(obj.to_snapshot(include_init_containers)),
            Event::Restarted(objs) => Self::Restarted(
                objs.iter()
                    .map(|obj| obj.to_snapshot(include_init_containers))
                    .collect(),
            ),
        }
    }
}

/// Last observed snapshot per (namespace, name).
#[derive(Debug, Default)]
pub struct SnapshotCache {
    snapshots: HashMap<(String, String), WorkloadSnapshot>,
}

impl SnapshotCache {
    /// Update the cache and hand every resulting (old, new) pair to `handler`.
    ///
    /// Objects seen for the first time have no predecessor and are only cached.
    pub fn dispatch(&mut self, event: SnapshotEvent, handler: &dyn UpdateHandler) {
        match event {
            SnapshotEvent::Applied(new) => {
                if let Some(old) = self.snapshots.insert(new.key(), new.clone()) {
                    handler.handle(&old, &new);
                }
            }
            SnapshotEvent::Deleted(gone) => {
                self.snapshots.remove(&gone.key());
            }
            SnapshotEvent::Restarted(current) => {
                let mut previous = std::mem::take(&mut self.snapshots);
                for new in current {
                    if let Some(old) = previous.remove(&new.key()) {
                        handler.handle(&old, &new);
                    }
                    self.snapshots.insert(new.key(), new);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Watches one workload kind across all non-excluded namespaces.
pub struct WorkloadWatcher<K> {
    client: Client,
    field_selector: Option<String>,
    include_init_containers: bool,
    handler: Arc<dyn UpdateHandler>,
    ready: watch::Sender<bool>,
    _kind: PhantomData<fn() -> K>,
}

impl<K> WorkloadWatcher<K>
where
    K: IntoSnapshot + Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + 'static,
{
    /// # Arguments
    ///
    /// * `field_selector` - Server-side filter, e.g. the namespace exclusion selector
    /// * `handler` - Receives every (old, new) pair, serially
    pub fn new(
        client: Client,
        field_selector: Option<String>,
        include_init_containers: bool,
        handler: Arc<dyn UpdateHandler>,
    ) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            client,
            field_selector,
            include_init_containers,
            handler,
            ready,
            _kind: PhantomData,
        }
    }

    pub fn kind(&self) -> WorkloadKind {
        K::KIND
    }

    /// Turns `true` once the initial list has been cached.
    pub fn readiness(&self) -> watch::Receiver<bool> {
        self.ready.subscribe()
    }

    /// Watch until `cancellation_token` fires, restarting the watch on failure.
    ///
    /// The snapshot cache survives restarts, so changes made while the
    /// stream was down are still reported on the following relist.
    #[tracing::instrument(skip(self, cancellation_token), fields(kind = %K::KIND, selector = ?self.field_selector))]
    pub async fn run(
        &self,
        cancellation_token: CancellationToken,
    ) -> Result<(), Report<KubernetesError>> {
        info!("Starting workload watcher");
        let mut cache = SnapshotCache::default();

        loop {
            select! {
                _ = cancellation_token.cancelled() => {
                    info!("Workload watcher shutdown requested");
                    break;
                }
                result = self.watch_workloads(&mut cache) => {
                    match result {
                        Ok(()) => {
                            warn!("Workload watch stream ended unexpectedly, restarting...");
                        }
                        Err(e) => {
                            error!("Workload watch failed: {e:?}");
                            select! {
                                _ = cancellation_token.cancelled() => break,
                                _ = tokio::time::sleep(RETRY_DELAY) => {}
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn watch_workloads(
        &self,
        cache: &mut SnapshotCache,
    ) -> Result<(), Report<KubernetesError>> {
        let api: Api<K> = Api::all(self.client.clone());

        let mut config = Config::default();
        if let Some(selector) = &self.field_selector {
            config = config.fields(selector);
        }

        let mut stream = watcher(api, config).boxed();

        while let Some(event) = stream.next().await {
            let event = event.map_err(|e| {
                Report::new(KubernetesError::WatchFailed {
                    message: format!("Watch stream error: {e}"),
                })
            })?;

            let event = SnapshotEvent::from_watch_event(event, self.include_init_containers);
            let relisted = matches!(event, SnapshotEvent::Restarted(_));

            cache.dispatch(event, self.handler.as_ref());

            if relisted {
                if cache.is_empty() {
                    debug!("Workload list synced, no workloads outside excluded namespaces");
                } else {
                    debug!(cached = cache.len(), "Workload list synced");
                }
                if !*self.ready.borrow() {
                    info!(cached = cache.len(), "Initial workload cache populated");
                    self.ready.send_replace(true);
                }
            }
        }

        Ok(())
    }
}
