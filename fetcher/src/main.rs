// Fetcher main entry point
use anyhow::Context;
use clap::Parser;
use fetcher::config::{Credentials, FetcherSettings};
use fetcher::data::CsvSeriesStore;
use fetcher::provider::binance::BinanceClient;
use fetcher::services::SeriesUpdater;
use tracing::{debug, info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about = "Incrementally archive exchange klines to CSV")]
struct Args {
    /// Print stage-by-stage progress
    #[arg(long, default_value_t = false)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    // A missing .env is fine; the variables may come from the real environment.
    let _ = dotenvy::dotenv();

    let settings = FetcherSettings::from_env();
    let credentials = Credentials::from_env().context("Failed to read exchange credentials")?;
    info!(
        base_url = %settings.base_url,
        data_dir = %settings.data_dir.display(),
        jobs = settings.jobs.len(),
        "Starting kline fetcher"
    );

    let provider = BinanceClient::new(&settings, credentials)?;
    let updater = SeriesUpdater::new(provider, CsvSeriesStore::new(&settings.data_dir));

    let reports = updater.run(&settings.jobs).await?;
    for report in &reports {
        debug!(
            symbol = %report.symbol,
            timeframe = %report.timeframe,
            new_rows = report.new_rows,
            total_rows = report.total_rows,
            "Series refreshed"
        );
    }
    info!(series = reports.len(), "All series updated");
    Ok(())
}
