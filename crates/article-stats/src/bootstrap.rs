use std::path::{Path, PathBuf};

use stats_core::error::StatsError;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map the CLI level names onto `tracing` filter directives.
///
/// Unknown names are passed through as-is so `RUST_LOG`-style directives work.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber, logging to stderr so that
/// report output on stdout stays clean. Falls back to `"info"` if the level
/// string is not a valid filter.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Source loading ─────────────────────────────────────────────────────────────

/// The two raw source texts.
#[derive(Debug)]
pub struct Sources {
    pub articles: String,
    pub taxonomy: Option<String>,
}

/// Read the article export and (optionally) the taxonomy export concurrently.
///
/// The article export is mandatory. A taxonomy that cannot be read is logged
/// and dropped, which turns the hierarchical sections off.
pub async fn load_sources(articles: &Path, taxonomy: Option<&Path>) -> anyhow::Result<Sources> {
    let taxonomy_task = async {
        match taxonomy {
            Some(path) => match read_source(path.to_path_buf()).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("{}; continuing without taxonomy", e);
                    None
                }
            },
            None => None,
        }
    };

    let (articles, taxonomy) = tokio::join!(read_source(articles.to_path_buf()), taxonomy_task);

    Ok(Sources {
        articles: articles?,
        taxonomy,
    })
}

async fn read_source(path: PathBuf) -> Result<String, StatsError> {
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| StatsError::FileRead { path, source })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
