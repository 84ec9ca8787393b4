//! Dataset ingest pipelines.
//!
//! `census` downloads the per-municipality shape and attribute payloads,
//! decodes the compressed geometry and merges both into one region dataset.
//! `microdata` downloads and unpacks a fixed-width survey archive and
//! converts it to CSV using its SAS input layout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use recenso::dataset::{
    fetch::{extract_zip, Fetcher},
    merge_municipality, AttributeTable, Config, DatasetStore, DecodedShapes,
    MONTHLY_AVERAGE_INCOME,
};
use recenso::microdata;
use recenso::models::Region;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Ingest census datasets")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download, decode and merge the weighting-area shapes and one
    /// attribute variable
    Census {
        /// Attribute variable id
        #[arg(long, default_value_t = MONTHLY_AVERAGE_INCOME)]
        variable: u32,

        /// Re-fetch and rebuild even if outputs already exist
        #[arg(long)]
        force: bool,
    },
    /// Download a fixed-width microdata archive and convert it to CSV
    Microdata {
        /// URL of the zipped data file
        #[arg(long)]
        data_url: String,

        /// URL of the SAS input layout
        #[arg(long)]
        layout_url: String,

        /// Dataset name, used as the output directory under data_dir
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::load_from_file(&args.config)?;

    match args.command {
        Command::Census { variable, force } => run_census(&config, variable, force).await,
        Command::Microdata {
            data_url,
            layout_url,
            name,
        } => run_microdata(&config, &data_url, &layout_url, &name).await,
    }
}

async fn run_census(config: &Config, variable: u32, force: bool) -> Result<()> {
    let store = DatasetStore::new(&config.global.data_dir);

    if store.merged_path(variable).exists() && !force {
        info!(
            "Merged dataset already exists: {} (use --force to rebuild)",
            store.merged_path(variable).display()
        );
        return Ok(());
    }

    let fetcher = Fetcher::new()?;

    info!(
        "Fetching shapes and variable {} for {} municipalities",
        variable,
        config.municipalities.len()
    );
    let pb = ProgressBar::new(config.municipalities.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    for m in &config.municipalities {
        let key = m.name_key();
        pb.set_message(key.clone());

        if force || !store.shapes_path(&key).exists() {
            let payload = fetcher
                .fetch_text(&config.shape_url(m.code))
                .await
                .with_context(|| format!("fetch shapes for {key}"))?;
            let decoded = DecodedShapes::from_payload(&payload)
                .with_context(|| format!("decode shapes for {key}"))?;
            store.save_shapes(&key, &decoded)?;
        }

        if force || !store.variable_path(m.code, &key, variable).exists() {
            let payload = fetcher
                .fetch_text(&config.variable_url(m.code, variable))
                .await
                .with_context(|| format!("fetch variable {variable} for {key}"))?;
            // Validate before persisting so a bad payload fails loudly here.
            AttributeTable::from_payload(&payload)
                .with_context(|| format!("parse variable {variable} for {key}"))?;
            store.save_variable_payload(m.code, &key, variable, &payload)?;
        }

        pb.inc(1);
    }
    pb.finish_with_message("done");

    info!("Merging geometry with variable {}", variable);
    let mut regions: Vec<Region> = Vec::new();
    for m in &config.municipalities {
        let key = m.name_key();
        let shapes = store.load_shapes(&key)?;
        let attributes =
            AttributeTable::from_payload(&store.load_variable_payload(m.code, &key, variable)?)?;
        regions.extend(merge_municipality(&key, shapes, &attributes)?);
    }

    store.save_merged(variable, &regions)?;
    info!(
        "Wrote {} regions to {}",
        regions.len(),
        store.merged_path(variable).display()
    );
    Ok(())
}

async fn run_microdata(config: &Config, data_url: &str, layout_url: &str, name: &str) -> Result<()> {
    let dest = config.global.data_dir.join(name);
    let fetcher = Fetcher::new()?;

    info!("Downloading microdata archive");
    let archive = fetcher.download_file(data_url, &dest).await?;
    info!("Downloading SAS input layout");
    let layout_path = fetcher.download_file(layout_url, &dest).await?;

    info!("Extracting dataset files");
    extract_zip(&archive, &dest)?;

    let columns = microdata::parse_sas_layout(&layout_path)?;
    info!("Layout defines {} columns", columns.len());

    let data_path = find_data_file(&dest, &archive, &layout_path)?;
    let rows = microdata::read_fixed_width(&data_path, &columns)?;

    let csv_path = dest.join(format!("{name}.csv"));
    microdata::write_csv(&csv_path, &columns, &rows)?;
    info!("Wrote {} rows to {}", rows.len(), csv_path.display());

    // Column-label dictionary alongside the data, since CSV headers drop
    // the layout's documentation.
    let columns_path = dest.join(format!("{name}_columns.json"));
    std::fs::write(&columns_path, serde_json::to_string_pretty(&columns)?)?;
    Ok(())
}

/// Pick the extracted fixed-width data file: the largest `.txt` that is
/// neither the archive nor the layout.
fn find_data_file(dest: &Path, archive: &Path, layout: &Path) -> Result<PathBuf> {
    let mut best: Option<(u64, PathBuf)> = None;
    for entry in std::fs::read_dir(dest)? {
        let entry = entry?;
        let path = entry.path();
        if path.as_path() == archive || path.as_path() == layout {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let size = entry.metadata()?.len();
        if best.as_ref().map(|(s, _)| size > *s).unwrap_or(true) {
            best = Some((size, path));
        }
    }
    best.map(|(_, p)| p)
        .context("no fixed-width data file found after extraction")
}
