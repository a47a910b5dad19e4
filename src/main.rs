use clap::Parser;
use color_eyre::Result;
use jellyfin_exporter::{
    exposition::render,
    init_errors,
    init_logging,
    server,
};
use jellyfin_exporter_collector::{
    CollectorContext,
    CollectorRegistry,
    HttpFetcher,
    Scraper,
};
use jellyfin_exporter_config::{
    Args,
    Config,
};
use std::{
    io::Write as _,
    sync::Arc,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();

    // Registration errors are programming errors and must surface before anything is served.
    let registry = CollectorRegistry::with_builtin()?;
    if args.list_collectors {
        for registration in registry.list_all() {
            let state = if registration.enabled_by_default() { "enabled" } else { "disabled" };
            println!("{:<10} {state}", registration.name());
        }
        return Ok(());
    }

    let once = args.once;
    let config = Config::new(args)?;
    init_logging(&config.log_level)?;

    let fetcher = Arc::new(HttpFetcher::new(config.jellyfin.timeout)?);
    let context = CollectorContext::new(fetcher, Arc::new(config.jellyfin.clone()), config.activity_days);
    let collectors = registry.build(&config.collectors, &context)?;
    let scraper = Arc::new(Scraper::new(collectors));
    tracing::info!(collectors = ?scraper.collector_names().collect::<Vec<_>>(), "starting jellyfin exporter");

    if once {
        let body = render(&scraper.scrape().await)?;
        std::io::stdout().write_all(&body)?;
        return Ok(());
    }

    server::serve(config.listen_address, &config.metrics_path(), scraper).await
}
