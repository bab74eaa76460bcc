mod bootstrap;
mod report;

use std::sync::Arc;

use anyhow::Result;
use census_core::aggregator::CategoryAggregator;
use census_core::models::Record;
use census_core::settings::Settings;
use census_data::source::DataSource;
use census_runtime::orchestrator::{fetch_records, FetchEvent, FetchOrchestrator};
use census_ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    let log_path = bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("house-census v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Variant: {}, Theme: {}, Log: {}",
        settings.view,
        settings.variant,
        settings.theme,
        log_path.display()
    );

    let source = DataSource::from_options(
        &settings.url,
        settings.input.clone(),
        settings.timeout_secs,
    );
    let categories = settings.category_set();

    match settings.view.as_str() {
        "report" => {
            // Bad CLI bounds are the one failure that ends the run early.
            let range = settings.range_input().to_range()?;

            let records: Arc<[Record]> = match fetch_records(&source).await {
                FetchEvent::Loaded(records) => records,
                FetchEvent::Failed(message) => {
                    eprintln!("warning: could not load dataset: {message}");
                    Arc::from(Vec::new())
                }
            };

            let summary = CategoryAggregator::summarize(&records, &categories, &range);
            print!("{}", report::render_report(&summary, &range));
        }

        _ => {
            tracing::info!(source = %source.describe(), "starting interactive chart");

            let app = App::new(
                &settings.theme,
                source.describe(),
                settings.range_input(),
                categories,
            );
            let (rx, handle) = FetchOrchestrator::new(source).start();

            // Run the TUI event loop. The loop exits on Esc / 'q' / Ctrl+C inside
            // the TUI. We also listen for Ctrl+C at the OS level so that signals
            // received while the terminal is in raw mode are handled cleanly.
            tokio::select! {
                result = app.run(rx) => {
                    handle.abort();
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down fetch task");
                    handle.abort();
                }
            }
        }
    }

    Ok(())
}
