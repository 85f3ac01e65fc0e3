use anyhow::Result;
use outbreak_timeline::{config::Config, pipeline};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::default();

    // ─── 3) fetch → clean → plot ─────────────────────────────────────
    let timeline = pipeline::run(&config)?;

    info!(rows = timeline.len(), "all done");
    Ok(())
}
