//! Command-line launcher for the stale pull request bot.
//!
//! Parses flags, wires stdout and OTLP tracing, loads the `STALE_BOT_*`
//! configuration and hands control to [`stale_pr_bot::start`].

use clap::Parser;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use stale_pr_bot::base::{config::Config, types::Void};
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Reports GitHub pull requests that have sat without activity past a threshold.
///
/// Ask the bot `what prs are stale?` in a direct message or by mentioning it,
/// or set `STALE_BOT_BROADCAST_CHANNEL` to get the report posted on the
/// `STALE_BOT_SCHEDULE` cron expression.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// TOML file to read settings from; `.hidden/config.toml` when omitted.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Log more (`-v` for DEBUG, `-vv` for TRACE).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn level(&self) -> Level {
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    init_tracing(args.level())?;

    let config = Config::load(args.config.as_deref())?;

    stale_pr_bot::start(config).await
}

/// Installs the stdout formatter and the OTLP span exporter.
fn init_tracing(level: Level) -> Void {
    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_target(false)
        .with_file(false)
        .with_span_events(FmtSpan::CLOSE);

    let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_batch_exporter(exporter).build();
    let otel = tracing_opentelemetry::layer().with_tracer(provider.tracer("stale-pr-bot"));

    tracing_subscriber::registry().with(otel).with(LevelFilter::from_level(level)).with(stdout).init();

    Ok(())
}
