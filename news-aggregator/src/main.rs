use clap::{Parser, ValueEnum};
use news_aggregator::{
    ExtractorRegistry, FetchConfig, JsonLinesSink, RecordSink, ReqwestTransport, SourceConfig,
    Supervisor, TextSink,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Polls news front pages and prints each new headline once.
#[derive(Debug, Parser)]
#[command(name = "news-aggregator", version)]
struct Cli {
    /// Source to poll as URL=SECONDS. Repeatable; defaults to the built-in sites.
    #[arg(long = "source", value_name = "URL=SECONDS")]
    sources: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,

    /// Attempts per fetch before giving up on timeouts.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    max_retries: u32,

    #[arg(long)]
    user_agent: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl Cli {
    fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig {
            timeout_seconds: self.timeout_secs,
            max_retries: self.max_retries,
            ..FetchConfig::default()
        };
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }

    fn source_configs(&self) -> Vec<news_aggregator::Result<SourceConfig>> {
        if self.sources.is_empty() {
            SourceConfig::defaults()
        } else {
            self.sources.iter().map(|s| SourceConfig::parse(s)).collect()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let fetch_config = cli.fetch_config();

    let registry = ExtractorRegistry::with_defaults()?;
    let transport = Arc::new(ReqwestTransport::new(&fetch_config)?);
    let supervisor =
        Supervisor::from_configs(cli.source_configs(), &registry, transport, &fetch_config);

    if supervisor.is_empty() {
        warn!("no usable sources configured, exiting");
        return Ok(());
    }

    info!(sources = supervisor.len(), "starting news aggregator");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received interrupt signal"),
            Err(e) => error!(error = %e, "failed to listen for interrupt, shutting down"),
        }
        signal_token.cancel();
    });

    let sink: Box<dyn RecordSink> = match cli.format {
        OutputFormat::Text => Box::new(TextSink::stdout()),
        OutputFormat::Json => Box::new(JsonLinesSink::stdout()),
    };

    let report = supervisor.run(sink, shutdown).await;

    info!(
        forwarded = report.aggregator.forwarded,
        duplicates = report.aggregator.duplicates,
        abandoned = report.timed_out().count(),
        "news aggregator finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let cli = Cli::try_parse_from(["news-aggregator"]).unwrap();
        let config = cli.fetch_config();
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.max_retries, 3);
        assert_eq!(cli.source_configs().len(), 3);
    }

    #[test]
    fn test_zero_retries_rejected() {
        assert!(Cli::try_parse_from(["news-aggregator", "--max-retries", "0"]).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Cli::try_parse_from(["news-aggregator", "--timeout-secs", "0"]).is_err());
    }

    #[test]
    fn test_overrides_reach_fetch_config() {
        let cli = Cli::try_parse_from([
            "news-aggregator",
            "--timeout-secs",
            "5",
            "--max-retries",
            "1",
            "--user-agent",
            "test-agent/2.0",
            "--source",
            "https://www.bisnis.com/=120",
        ])
        .unwrap();
        let config = cli.fetch_config();
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.user_agent, "test-agent/2.0");
        assert_eq!(cli.source_configs().len(), 1);
    }
}
