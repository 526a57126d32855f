use anyhow::Result;
use clap::Parser;
use image_recorder::app::ApplicationBuilder;
use image_recorder::config::Cli;
use image_recorder::config::RecorderConfig;
use utils::version;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_global_hooks();
    utils::logging::init();

    let cli = Cli::parse();

    tracing::info!("Starting image recorder {}", &**version::VERSION);

    let config = RecorderConfig::from_cli(&cli).map_err(|e| {
        tracing::error!("Invalid configuration: {e:?}");
        anyhow::anyhow!("{}", e.current_context())
    })?;

    tracing::info!(
        pattern = config.classifier.as_str(),
        excluded = %cli.not_watched_ns,
        kinds = ?config.kinds,
        record_file = ?config.sinks.record_file,
        report_mode = %config.diff_options.report_mode,
        "Configuration loaded"
    );

    let app = ApplicationBuilder::new(config).build().await?;
    app.run().await?;

    tracing::info!("Image recorder stopped");
    Ok(())
}
