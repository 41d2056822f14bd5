mod bootstrap;
mod report;

use std::collections::HashSet;

use anyhow::Result;
use stats_core::error::StatsError;
use stats_core::settings::Settings;
use stats_data::analysis::{analyze_export, AnalysisOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("article-stats v{} starting", env!("CARGO_PKG_VERSION"));

    let Some(articles_path) = settings.articles.as_deref() else {
        return Err(StatsError::Config("no article export given (use --articles)".to_string()).into());
    };

    let sources = bootstrap::load_sources(articles_path, settings.taxonomy.as_deref()).await?;

    let options = AnalysisOptions {
        last_entries: settings.last_entries,
        reference_date: settings.reference_date,
    };
    let report = analyze_export(&sources.articles, sources.taxonomy.as_deref(), &options);

    tracing::info!(
        "View: {}, format: {}, {} articles, {} categories, {} geos, {} templates",
        settings.view,
        settings.format,
        report.total_articles,
        report.categories.len(),
        report.geos.len(),
        report.templates.len()
    );

    let expanded: HashSet<String> = settings.expand.iter().cloned().collect();

    let output = if settings.format == "json" {
        report::render_json(&report, &settings.view, &expanded).map_err(StatsError::from)?
    } else {
        match settings.view.as_str() {
            "hierarchical" => report::render_hierarchical(&report, &expanded),
            "timeline" => report::render_timelines(&report),
            _ => report::render_flat(&report),
        }
    };

    println!("{}", output);

    Ok(())
}
