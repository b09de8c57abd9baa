// Sentiment Stream - real-time post sentiment analyzer
// Consumes posts from the input channel, enriches each with a sentiment
// score and shift alert, republishes to the output channel

use anyhow::{Context, Result};
use sentiment_stream::bus::{UdpSink, UdpSource};
use sentiment_stream::config::{Config, MonitoringConfig};
use sentiment_stream::pipeline::StreamPipeline;
use sentiment_stream::scorer::LexiconScorer;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::load_or_default()?;
    init_logging(&config.monitoring);

    info!("🚀 Sentiment Stream Analyzer Starting...");

    // Fail fast on bad detector settings, before touching the bus
    config.validate().context("Invalid configuration")?;
    info!(
        "⚙️  window_size={}, alert_threshold={}",
        config.detector.window_size, config.detector.alert_threshold
    );

    let mut source = UdpSource::bind(&config.bus.host, config.bus.input_port).await?;
    let mut sink = UdpSink::connect(&config.bus.host, config.bus.output_port).await?;

    let mut pipeline = StreamPipeline::new(
        LexiconScorer::new(),
        config.detector.window_size,
        config.detector.alert_threshold,
    )?;
    info!("✅ Pipeline ready, waiting for posts...");

    // Ctrl-C flips the stop flag; the loop finishes the in-flight post
    let (stop_tx, mut stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("🛑 Ctrl-C received, stopping after current post...");
                let _ = stop_tx.send(true);
            }
            Err(e) => {
                warn!("⚠️ Ctrl-C handler unavailable: {}", e);
                // Hold the sender so the loop is not stopped spuriously
                std::future::pending::<()>().await
            }
        }
    });

    pipeline
        .run(&mut source, &mut sink, &mut stop_rx)
        .await
        .context("Stream processing failed")?;

    let (received, parse_errors) = source.stats();
    info!(
        "👋 Shutdown complete: {} received, {} malformed, {} published",
        received,
        parse_errors,
        sink.published()
    );
    Ok(())
}

fn init_logging(monitoring: &MonitoringConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(monitoring.log_level.clone()));

    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if monitoring.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}
