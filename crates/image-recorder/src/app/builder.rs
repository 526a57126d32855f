use std::sync::Arc;

use anyhow::Result;

use crate::app::Application;
use crate::app::ChangePipeline;
use crate::config::RecorderConfig;
use crate::domain::SystemClock;
use crate::infrastructure::emitter::RecordEmitter;
use crate::infrastructure::k8s::kube_client;

/// Application builder
pub struct ApplicationBuilder {
    config: RecorderConfig,
}

impl ApplicationBuilder {
    pub fn new(config: RecorderConfig) -> Self {
        Self { config }
    }

    /// Connect to the cluster and wire the change pipeline.
    pub async fn build(self) -> Result<Application> {
        tracing::info!("Building application components...");

        let config = Arc::new(self.config);

        let client = kube_client::init_kube_client(config.kubeconfig.clone())
            .await
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;

        let emitter = Arc::new(RecordEmitter::new(&config.sinks));
        let pipeline = Arc::new(ChangePipeline::new(
            config.clone(),
            emitter,
            Arc::new(SystemClock),
        ));

        Ok(Application::new(config, client, pipeline))
    }
}
