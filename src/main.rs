mod app;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use taxon_lens::LensConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON catalog: an array of records, a wrapper object, or an id-keyed map.
    catalog: PathBuf,

    /// JSON file overriding resolver thresholds, scoring weights and physics.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "taxon_lens=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let config = match &args.config {
        Some(path) => LensConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => LensConfig::default(),
    };
    tracing::info!(catalog = %args.catalog.display(), "starting viewer");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "taxon-lens",
        options,
        Box::new(move |cc| Ok(Box::new(app::TaxonLensApp::new(cc, args.catalog, config)))),
    )
    .map_err(|error| anyhow::anyhow!("viewer exited with an error: {error}"))
}
