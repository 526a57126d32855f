use std::sync::Arc;

use anyhow::Result;
use kube::Client;

use crate::app::tasks::Tasks;
use crate::app::ChangePipeline;
use crate::config::RecorderConfig;

/// Application core structure with explicit dependencies
pub struct Application {
    config: Arc<RecorderConfig>,
    client: Client,
    pipeline: Arc<ChangePipeline>,
}

impl Application {
    pub fn new(config: Arc<RecorderConfig>, client: Client, pipeline: Arc<ChangePipeline>) -> Self {
        Self {
            config,
            client,
            pipeline,
        }
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn pipeline(&self) -> Arc<ChangePipeline> {
        self.pipeline.clone()
    }

    /// Start the watchers and block until a shutdown signal arrives.
    pub async fn run(&self) -> Result<()> {
        tracing::info!("Starting all application tasks...");

        let mut tasks = Tasks::new();

        if let Err(e) = tasks.spawn_all_tasks(self) {
            tracing::error!("Failed to spawn application tasks: {}", e);
            return Err(e);
        }

        if let Err(e) = tasks.wait_for_completion().await {
            tracing::error!("Error during task execution: {}", e);
            return Err(e);
        }

        tracing::info!("Application run completed");
        Ok(())
    }
}
