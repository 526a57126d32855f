use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use k8s_openapi::api::apps::v1::DaemonSet;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::apps::v1::StatefulSet;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::app::core::Application;
use crate::domain::UpdateHandler;
use crate::domain::WorkloadKind;
use crate::infrastructure::k8s::WorkloadWatcher;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Task manager, responsible for starting and managing the watcher tasks
pub struct Tasks {
    pub tasks: Vec<JoinHandle<()>>,
    readiness: Vec<(WorkloadKind, watch::Receiver<bool>)>,
    readiness_task: Option<JoinHandle<()>>,
    cancellation_token: CancellationToken,
}

impl Default for Tasks {
    fn default() -> Self {
        Self::new()
    }
}

impl Tasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            readiness: Vec::new(),
            readiness_task: None,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Start one watcher per configured workload kind
    pub fn spawn_all_tasks(&mut self, app: &Application) -> Result<()> {
        if app.config().kinds.is_empty() {
            anyhow::bail!("no workload kinds configured");
        }

        for kind in app.config().kinds.clone() {
            let task = match kind {
                WorkloadKind::Deployment => self.spawn_watcher_task::<Deployment>(app),
                WorkloadKind::StatefulSet => self.spawn_watcher_task::<StatefulSet>(app),
                WorkloadKind::DaemonSet => self.spawn_watcher_task::<DaemonSet>(app),
            };
            self.tasks.push(task);
        }

        self.spawn_readiness_task();
        Ok(())
    }

    fn spawn_watcher_task<K>(&mut self, app: &Application) -> JoinHandle<()>
    where
        K: crate::domain::IntoSnapshot
            + kube::Resource<DynamicType = ()>
            + Clone
            + serde::de::DeserializeOwned
            + std::fmt::Debug
            + Send
            + Sync
            + 'static,
    {
        let config = app.config();
        let handler: Arc<dyn UpdateHandler> = app.pipeline();
        let watcher = WorkloadWatcher::<K>::new(
            app.client().clone(),
            config.excluded_namespaces.field_selector(),
            config.include_init_containers,
            handler,
        );
        self.readiness.push((watcher.kind(), watcher.readiness()));

        let token = self.cancellation_token.clone();
        tokio::spawn(async move {
            let kind = watcher.kind();
            tracing::info!(%kind, "Starting workload watcher task");
            if let Err(e) = watcher.run(token).await {
                tracing::error!(%kind, "Workload watcher failed: {e:?}");
            } else {
                tracing::info!(%kind, "Workload watcher completed");
            }
        })
    }

    /// Log once every watcher has populated its initial cache.
    fn spawn_readiness_task(&mut self) {
        let readiness = std::mem::take(&mut self.readiness);
        let token = self.cancellation_token.clone();

        self.readiness_task = Some(tokio::spawn(async move {
            for (kind, mut ready) in readiness {
                tokio::select! {
                    _ = token.cancelled() => return,
                    synced = async { ready.wait_for(|ready| *ready).await.is_ok() } => {
                        if !synced {
                            return;
                        }
                        tracing::debug!(%kind, "Watcher ready");
                    }
                }
            }
            tracing::info!("All workload caches synced, recording image changes");
        }));
    }

    /// wait for tasks to complete or receive shutdown signal
    pub async fn wait_for_completion(&mut self) -> Result<()> {
        let signal_handler = {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                let mut sigterm = signal(SignalKind::terminate())?;
                let mut sigint = signal(SignalKind::interrupt())?;

                tokio::spawn(async move {
                    tokio::select! {
                        _ = sigterm.recv() => {
                            tracing::info!("Received SIGTERM, initiating graceful shutdown");
                        }
                        _ = sigint.recv() => {
                            tracing::info!("Received SIGINT, initiating graceful shutdown");
                        }
                    }
                })
            }
            #[cfg(not(unix))]
            {
                tokio::spawn(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for Ctrl+C: {e}");
                    }
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                })
            }
        };

        tokio::select! {
            _ = signal_handler => {
                tracing::info!("Shutdown signal received, cancelling all tasks");
                self.cancellation_token.cancel();
                self.tasks.extend(self.readiness_task.take());

                self.wait_for_tasks_with_timeout(SHUTDOWN_TIMEOUT).await;
            }
            // watchers only return once cancelled, so any completion here is unexpected
            result = futures::future::select_all(&mut self.tasks) => {
                let (result, _index, _remaining) = result;
                self.cancellation_token.cancel();
                if let Err(e) = result {
                    tracing::error!("Task completed with error: {e}");
                    return Err(e.into());
                }
                tracing::warn!("Task completed unexpectedly");
            }
        }

        Ok(())
    }

    async fn wait_for_tasks_with_timeout(&mut self, timeout: Duration) {
        tokio::time::timeout(timeout, async {
            for task in &mut self.tasks {
                if let Err(e) = task.await {
                    tracing::error!("Task failed during shutdown: {e}");
                }
            }
        })
        .await
        .unwrap_or_else(|_| {
            tracing::warn!("Task shutdown timed out after {:?}", timeout);
        });
    }
}
